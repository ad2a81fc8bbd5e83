use crate::ir::Leg;
use crate::layout::{AxisLabel, Bounds, DiagramModel, GuideLine, PlanLegendEntry, Viewport};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump<'a> {
    pub viewport: Viewport,
    pub extent: Bounds,
    pub tubes: Vec<TubeDump<'a>>,
    pub x_labels: &'a [AxisLabel],
    pub y_labels: &'a [AxisLabel],
    pub guides: &'a [GuideLine],
    pub plans: &'a [PlanLegendEntry],
}

#[derive(Debug, Serialize)]
pub struct TubeDump<'a> {
    pub id: &'a str,
    pub tube_id: &'a str,
    pub leg: Option<Leg>,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub fill: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<&'a str>,
    pub col: &'a str,
    pub row: &'a str,
}

impl<'a> LayoutDump<'a> {
    pub fn from_model(model: &'a DiagramModel) -> Self {
        let tubes = model
            .entities
            .iter()
            .map(|entity| TubeDump {
                id: &entity.id,
                tube_id: &entity.tube_id,
                leg: entity.leg,
                x: entity.x,
                y: entity.y,
                r: entity.radius,
                fill: &entity.fill_color,
                plan: (!entity.plan.is_empty()).then_some(entity.plan.as_str()),
                col: &entity.x_label,
                row: &entity.y_label,
            })
            .collect();

        LayoutDump {
            viewport: model.viewport,
            extent: model.extent,
            tubes,
            x_labels: &model.x_labels,
            y_labels: &model.y_labels,
            guides: &model.guides,
            plans: &model.plans,
        }
    }
}

pub fn write_layout_dump(path: &Path, model: &DiagramModel) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_model(model);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{DuplicatePolicy, Point, TubeRecord, TubeSheet};
    use crate::layout::compute_layout;
    use crate::theme::Theme;

    #[test]
    fn dump_lists_tubes_and_labels() {
        let sheet = TubeSheet::from_records(
            [TubeRecord::new("4", "C", "9", None, Some(Point::new(2.0, 3.0)))],
            DuplicatePolicy::Reject,
        )
        .unwrap();
        let model =
            compute_layout(&sheet, &[], &Theme::classic(), &LayoutConfig::default()).unwrap();
        let value = serde_json::to_value(LayoutDump::from_model(&model)).unwrap();
        assert_eq!(value["tubes"][0]["id"], "4");
        assert_eq!(value["tubes"][0]["fill"], "white");
        assert!(value["tubes"][0].get("plan").is_none());
        assert_eq!(value["x_labels"][0]["text"], "C");
        assert_eq!(value["y_labels"][0]["axis"], "y");
        assert_eq!(value["viewport"]["minX"], 1.0);
    }
}
