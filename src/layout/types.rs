use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ir::Leg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// One drawable tube (or one leg of a tube when both legs are shown).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEntity {
    pub id: String,
    pub tube_id: String,
    pub leg: Option<Leg>,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub fill_color: String,
    pub plan: String,
    pub x_label: String,
    pub y_label: String,
    pub tooltip: String,
    pub number_text: String,
}

impl RenderEntity {
    pub fn coordinate(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub text: String,
    pub coordinate: f32,
    pub axis: Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Rounds outward to whole units, then grows by the margins on each side.
    pub fn expanded(&self, margin_x: f32, margin_y: f32) -> Bounds {
        Bounds {
            min_x: self.min_x.floor() - margin_x,
            min_y: self.min_y.floor() - margin_y,
            max_x: self.max_x.ceil() + margin_x,
            max_y: self.max_y.ceil() + margin_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// An explicit viewport; rejects non-finite values and empty sizes.
    pub fn new(min_x: f32, min_y: f32, width: f32, height: f32) -> Result<Self> {
        let finite = [min_x, min_y, width, height].iter().all(|v| v.is_finite());
        if !finite || width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidViewport { width, height });
        }
        Ok(Self {
            min_x,
            min_y,
            width,
            height,
        })
    }

    /// Re-checks a viewport that was built field by field, e.g. deserialized.
    pub fn validated(self) -> Result<Self> {
        Self::new(self.min_x, self.min_y, self.width, self.height)
    }

    pub fn from_bounds(bounds: &Bounds) -> Self {
        Self {
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            width: bounds.max_x - bounds.min_x,
            height: bounds.max_y - bounds.min_y,
        }
    }

    pub fn max_x(&self) -> f32 {
        self.min_x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.min_y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuideLine {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanLegendEntry {
    pub name: String,
    pub color: String,
    pub matched: usize,
}

/// Everything the renderer needs to draw one tubesheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramModel {
    pub viewport: Viewport,
    /// Unexpanded entity extents the viewport was sized from: signed min/max,
    /// or the symmetric absolute-max box under [`ViewportStyle::Absolute`].
    ///
    /// [`ViewportStyle::Absolute`]: crate::config::ViewportStyle::Absolute
    pub extent: Bounds,
    pub entities: Vec<RenderEntity>,
    pub x_labels: Vec<AxisLabel>,
    pub y_labels: Vec<AxisLabel>,
    pub guides: Vec<GuideLine>,
    pub plans: Vec<PlanLegendEntry>,
}
