use serde::{Deserialize, Serialize};

/// Pastel fills handed out to inspection plans in discovery order.
pub const DEFAULT_PLAN_COLORS: [&str; 9] = [
    "#FFB3BA", "#FFDFBA", "#FFFFBA", "#BAFFC9", "#BAE1FF", "#D7BAFF", "#FFBAF2", "#C9E4DE",
    "#F2E2BA",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub tube_stroke: String,
    pub tube_stroke_width: f32,
    pub number_color: String,
    pub label_color: String,
    pub guide_color: String,
    pub guide_stroke_width: f32,
    pub background: Option<String>,
    pub default_fill: String,
    pub plan_colors: Vec<String>,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 0.25,
            tube_stroke: "black".to_string(),
            tube_stroke_width: 0.02,
            number_color: "black".to_string(),
            label_color: "red".to_string(),
            guide_color: "gray".to_string(),
            guide_stroke_width: 0.02,
            background: None,
            default_fill: crate::ir::DEFAULT_FILL.to_string(),
            plan_colors: DEFAULT_PLAN_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 0.22,
            tube_stroke: "#4A5568".to_string(),
            tube_stroke_width: 0.015,
            number_color: "#1C2430".to_string(),
            label_color: "#C53030".to_string(),
            guide_color: "#A0AEC0".to_string(),
            guide_stroke_width: 0.015,
            background: Some("#FFFFFF".to_string()),
            default_fill: crate::ir::DEFAULT_FILL.to_string(),
            plan_colors: DEFAULT_PLAN_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
