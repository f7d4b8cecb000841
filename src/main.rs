fn main() {
    if let Err(err) = commission_tree::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
