use crate::ir::LegSelection;
use crate::layout::Viewport;
use crate::reader::DEFAULT_DELIMITER;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ViewportStyle {
    /// Signed min/max of the tubes, rounded outward and padded by the margins.
    #[default]
    Signed,
    /// Symmetric about the origin, sized by the largest absolute coordinate.
    Absolute,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub leg: LegSelection,
    pub tube_od: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub channel_half_width: f32,
    pub viewport_style: ViewportStyle,
    pub viewport: Option<Viewport>,
    pub guide_lines: bool,
    pub strict: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            leg: LegSelection::Hot,
            tube_od: 0.625,
            margin_x: 1.0,
            margin_y: 1.0,
            channel_half_width: 0.0,
            viewport_style: ViewportStyle::Signed,
            viewport: None,
            guide_lines: false,
            strict: false,
        }
    }
}

impl LayoutConfig {
    pub fn tube_radius(&self) -> f32 {
        self.tube_od / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 1200.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub input: InputConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    tube_stroke: Option<String>,
    tube_stroke_width: Option<f32>,
    number_color: Option<String>,
    label_color: Option<String>,
    guide_color: Option<String>,
    guide_stroke_width: Option<f32>,
    background: Option<String>,
    default_fill: Option<String>,
    plan_colors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    leg: Option<LegSelection>,
    tube_od: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
    channel_half_width: Option<f32>,
    viewport_style: Option<ViewportStyle>,
    viewport: Option<Viewport>,
    guide_lines: Option<bool>,
    strict: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InputConfigFile {
    delimiter: Option<char>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    input: Option<InputConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let prefer_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    parse_config(&contents, prefer_json5)
}

/// Parses a config document and merges it over the defaults.
///
/// Strict JSON is tried first unless `prefer_json5` is set; JSON5 is the
/// fallback either way.
pub fn parse_config(contents: &str, prefer_json5: bool) -> anyhow::Result<Config> {
    let parsed: ConfigFile = if prefer_json5 {
        json5::from_str(contents)?
    } else {
        match serde_json::from_str(contents) {
            Ok(parsed) => parsed,
            Err(json_err) => json5::from_str(contents).map_err(|_| json_err)?,
        }
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme: {other}"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.tube_stroke {
            config.theme.tube_stroke = v;
        }
        if let Some(v) = vars.tube_stroke_width {
            config.theme.tube_stroke_width = v;
        }
        if let Some(v) = vars.number_color {
            config.theme.number_color = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.guide_color {
            config.theme.guide_color = v;
        }
        if let Some(v) = vars.guide_stroke_width {
            config.theme.guide_stroke_width = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = Some(v);
        }
        if let Some(v) = vars.default_fill {
            config.theme.default_fill = v;
        }
        if let Some(v) = vars.plan_colors {
            if v.is_empty() {
                anyhow::bail!("planColors must not be empty");
            }
            config.theme.plan_colors = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.leg {
            config.layout.leg = v;
        }
        if let Some(v) = layout.tube_od {
            config.layout.tube_od = v;
        }
        if let Some(v) = layout.margin_x {
            config.layout.margin_x = v;
        }
        if let Some(v) = layout.margin_y {
            config.layout.margin_y = v;
        }
        if let Some(v) = layout.channel_half_width {
            config.layout.channel_half_width = v;
        }
        if let Some(v) = layout.viewport_style {
            config.layout.viewport_style = v;
        }
        if let Some(v) = layout.viewport {
            config.layout.viewport = Some(v.validated()?);
        }
        if let Some(v) = layout.guide_lines {
            config.layout.guide_lines = v;
        }
        if let Some(v) = layout.strict {
            config.layout.strict = v;
        }
    }

    if let Some(v) = parsed.input.and_then(|input| input.delimiter) {
        config.input.delimiter = v;
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    Ok(config)
}
