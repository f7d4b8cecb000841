use crate::config::{Config, is_json5, load_config};
use crate::input::{parse_levels, parse_levels_json5};
use crate::layout_dump::write_layout_dump;
use crate::model::{Level, find_node};
use crate::render::{render_svg, write_output_svg};
use crate::tree::validate;
use crate::view::HierarchyView;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ctree", version, about = "Commission structure hierarchy layout")]
pub struct Args {
    /// Levels snapshot (.json or .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON or JSON5 file (theme, themeVariables, layout, render, zoom)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Collapse this node (repeatable)
    #[arg(long = "collapse", value_name = "ID")]
    pub collapse: Vec<String>,

    /// Zoom in this many steps
    #[arg(long = "zoom-in", default_value_t = 0)]
    pub zoom_in: u8,

    /// Zoom out this many steps
    #[arg(long = "zoom-out", default_value_t = 0)]
    pub zoom_out: u8,

    /// Fail on duplicate member ids and manager cycles instead of repairing them
    #[arg(long = "strict")]
    pub strict: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let levels = read_levels(args.input.as_deref())?;
    if args.strict {
        validate(&levels).context("level snapshot rejected")?;
    }

    let mut view = build_view(&levels, &config);
    for id in &args.collapse {
        if find_node(view.roots(), id).is_none() {
            warn!(node = %id, "cannot collapse unknown node");
            continue;
        }
        if view.expansion().is_expanded(id) {
            view.toggle(id);
        }
    }
    step_zoom(&mut view, args.zoom_in, args.zoom_out);
    info!(
        roots = view.roots().len(),
        cards = view.layout().positions.len(),
        zoom = view.zoom().scale(),
        "hierarchy ready"
    );

    match args.output_format {
        OutputFormat::Json => {
            write_layout_dump(
                args.output.as_deref(),
                view.layout(),
                view.roots(),
                view.expansion(),
            )?;
        }
        OutputFormat::Svg => {
            let svg = render_view(&view, &config);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&view, &config, args.output.as_deref())?,
    }
    Ok(())
}

fn build_view(levels: &[Level], config: &Config) -> HierarchyView {
    let mut view = HierarchyView::from_levels(levels, config.layout.clone());
    view.set_zoom(config.zoom);
    view
}

// Steps are taken from the configured zoom, clamping at either end.
fn step_zoom(view: &mut HierarchyView, zoom_in: u8, zoom_out: u8) {
    for _ in 0..zoom_in {
        view.zoom_in();
    }
    for _ in 0..zoom_out {
        view.zoom_out();
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be set when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn render_view(view: &HierarchyView, config: &Config) -> String {
    render_svg(
        view.layout(),
        view.roots(),
        &config.theme,
        &config.layout,
        &config.render,
        view.zoom(),
    )
}

#[cfg(feature = "png")]
fn write_png(view: &HierarchyView, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_view(view, config);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_view: &HierarchyView, _config: &Config, _output: Option<&Path>) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_levels(path: Option<&Path>) -> Result<Vec<Level>> {
    let (input, json5) = read_input(path)?;
    let levels = if json5 {
        parse_levels_json5(&input)?
    } else {
        parse_levels(&input)?
    };
    Ok(levels)
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading levels from {}", path.display()))?;
        return Ok((content, is_json5(path)));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}
