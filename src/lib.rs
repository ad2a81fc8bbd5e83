#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod reader;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewportStyle, load_config};
pub use error::{Error, Result};
pub use ir::{LegSelection, PlanSource, TubeRecord, TubeSheet};
pub use layout::{DiagramModel, compute_layout};
pub use reader::{read_plan, read_tubesheet};
pub use render::render_svg;
pub use theme::Theme;

/// Reads a tubesheet table, overlays `plans` and renders the SVG in one go.
///
/// Duplicate tube ids follow `config.layout.strict`: rejected when strict,
/// otherwise the later row wins.
pub fn render_with_config(input: &str, plans: &[PlanSource], config: &Config) -> Result<String> {
    let policy = if config.layout.strict {
        ir::DuplicatePolicy::Reject
    } else {
        ir::DuplicatePolicy::Overwrite
    };
    let sheet = TubeSheet::from_records(read_tubesheet(input, config.input.delimiter)?, policy)?;
    let model = compute_layout(&sheet, plans, &config.theme, &config.layout)?;
    Ok(render_svg(&model, &config.theme, &config.layout))
}
