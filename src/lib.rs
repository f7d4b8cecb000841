#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod events;
pub mod expansion;
pub mod input;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod theme;
pub mod tree;
pub mod view;
pub mod zoom;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use events::NodeAction;
pub use expansion::ExpansionState;
pub use input::{InputError, parse_levels};
pub use layout::{Connector, CubicPath, HierarchyLayout, Position, compute_layout};
pub use model::{CommissionKind, Level, Member, Node, SubjectRef};
pub use theme::Theme;
pub use tree::{BuildError, build, validate};
pub use view::HierarchyView;
pub use zoom::Zoom;
