mod bounds;
mod labels;
mod overlay;
pub(crate) mod types;
pub use bounds::*;
pub use labels::LabelIndex;
pub use overlay::{merge_plans, plan_color};
pub use types::*;

use std::borrow::Cow;

use crate::config::{LayoutConfig, ViewportStyle};
use crate::error::{Error, Result};
use crate::ir::{Leg, LegSelection, PlanSource, TubeRecord, TubeSheet};
use crate::theme::Theme;

/// Lays out a tubesheet: plans are painted on first, then every selected leg
/// of every tube becomes a [`RenderEntity`], axis labels are collected and the
/// viewport is sized from the entities.
///
/// Errors from the overlay (strict mode) and from bounding an empty sheet are
/// returned unchanged; there is no partial model.
pub fn compute_layout(
    sheet: &TubeSheet,
    plans: &[PlanSource],
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<DiagramModel> {
    let mut sheet = Cow::Borrowed(sheet);
    let legend = if plans.is_empty() {
        Vec::new()
    } else {
        merge_plans(sheet.to_mut(), plans, &theme.plan_colors, config.strict)?
    };

    let entities = build_entities(&sheet, theme, config)?;

    let mut x_index = LabelIndex::new();
    let mut y_index = LabelIndex::new();
    for entity in &entities {
        x_index.insert(&entity.x_label, entity.x);
        y_index.insert(&entity.y_label, entity.y);
    }
    let x_labels = x_index.to_axis_labels(Axis::X);
    let y_labels = y_index.to_axis_labels(Axis::Y);

    let absolute_x = absolute_max(&entities, Axis::X)?;
    let absolute_y = absolute_max(&entities, Axis::Y)?;
    tracing::debug!(absolute_max_x = absolute_x, absolute_max_y = absolute_y, "tube extents");

    let extent = match config.viewport_style {
        ViewportStyle::Signed => signed_bounds(&entities)?,
        ViewportStyle::Absolute => absolute_bounds(&entities)?,
    };
    let viewport = match config.viewport {
        Some(viewport) => viewport,
        None => Viewport::from_bounds(&extent.expanded(config.margin_x, config.margin_y)),
    };
    let guides = if config.guide_lines {
        datum_guides(&viewport)
    } else {
        Vec::new()
    };

    tracing::info!(
        tubes = sheet.len(),
        entities = entities.len(),
        x_labels = x_labels.len(),
        y_labels = y_labels.len(),
        "computed tubesheet layout"
    );

    Ok(DiagramModel {
        viewport,
        extent,
        entities,
        x_labels,
        y_labels,
        guides,
        plans: legend,
    })
}

fn build_entities(
    sheet: &TubeSheet,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Vec<RenderEntity>> {
    let both = config.leg == LegSelection::Both;
    let radius = config.tube_radius();
    let mut entities = Vec::with_capacity(sheet.len() * config.leg.legs().len());
    for tube in sheet.iter() {
        for &leg in config.leg.legs() {
            let position = tube.position(leg).ok_or_else(|| Error::MissingLeg {
                tube: tube.id.clone(),
                leg,
            })?;
            let (id, y) = if both {
                (
                    format!("{}{}", leg.prefix(), tube.id),
                    paired_offset(leg, position.y, config.channel_half_width),
                )
            } else {
                (tube.id.clone(), position.y)
            };
            let fill_color = if tube.has_plan() {
                tube.color.clone()
            } else {
                theme.default_fill.clone()
            };
            entities.push(RenderEntity {
                id,
                tube_id: tube.id.clone(),
                leg: both.then_some(leg),
                x: position.x,
                y,
                radius,
                fill_color,
                plan: tube.plan.clone(),
                x_label: tube.x_label.clone(),
                y_label: tube.y_label.clone(),
                tooltip: tooltip(tube, both.then_some(leg)),
                number_text: tube.id.clone(),
            });
        }
    }
    Ok(entities)
}

/// Places a leg on the shared axis used when both legs are drawn: the cold
/// leg is mirrored above the datum, the hot leg sits below it, each pushed
/// out by the channel half-width.
pub fn paired_offset(leg: Leg, y: f32, half_width: f32) -> f32 {
    match leg {
        Leg::Cold => -y - half_width,
        Leg::Hot => y + half_width,
    }
}

fn tooltip(tube: &TubeRecord, leg: Option<Leg>) -> String {
    let mut text = format!("Col={} Row={}", tube.x_label, tube.y_label);
    if let Some(leg) = leg {
        text.push_str(&format!(" Leg={leg}"));
    }
    if tube.has_plan() {
        text.push_str(&format!(" Plan={}", tube.plan));
    }
    text
}

fn datum_guides(viewport: &Viewport) -> Vec<GuideLine> {
    let mut guides = Vec::new();
    if viewport.min_y <= 0.0 && viewport.max_y() >= 0.0 {
        guides.push(GuideLine {
            x1: viewport.min_x,
            y1: 0.0,
            x2: viewport.max_x(),
            y2: 0.0,
        });
    }
    if viewport.min_x <= 0.0 && viewport.max_x() >= 0.0 {
        guides.push(GuideLine {
            x1: 0.0,
            y1: viewport.min_y,
            x2: 0.0,
            y2: viewport.max_y(),
        });
    }
    guides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DEFAULT_FILL, DuplicatePolicy, PlanRow, Point};
    use crate::theme::DEFAULT_PLAN_COLORS;
    use std::sync::{Arc, Mutex};

    fn record(id: &str, x_label: &str, y_label: &str, cl: (f32, f32), hl: (f32, f32)) -> TubeRecord {
        TubeRecord::new(
            id,
            x_label,
            y_label,
            Some(Point::new(cl.0, cl.1)),
            Some(Point::new(hl.0, hl.1)),
        )
    }

    fn sheet(records: Vec<TubeRecord>) -> TubeSheet {
        TubeSheet::from_records(records, DuplicatePolicy::Reject).unwrap()
    }

    fn config(leg: LegSelection, half_width: f32) -> LayoutConfig {
        LayoutConfig {
            leg,
            channel_half_width: half_width,
            ..LayoutConfig::default()
        }
    }

    fn three_cold_tubes() -> TubeSheet {
        sheet(vec![
            record("1", "A", "1", (0.0, 0.0), (0.0, 0.0)),
            record("2", "B", "2", (1.0, 1.0), (1.0, 1.0)),
            record("3", "C", "3", (2.0, -5.0), (2.0, -5.0)),
        ])
    }

    #[test]
    fn single_leg_uses_raw_coordinates() {
        let model = compute_layout(
            &three_cold_tubes(),
            &[],
            &Theme::classic(),
            &config(LegSelection::Cold, 0.0),
        )
        .unwrap();
        assert_eq!(model.entities.len(), 3);
        assert_eq!(absolute_max(&model.entities, Axis::Y).unwrap(), -5.0);
        assert_eq!(absolute_max(&model.entities, Axis::X).unwrap(), 2.0);
        assert_eq!(model.entities[2].id, "3");
        assert_eq!(model.entities[2].tooltip, "Col=C Row=3");
        assert_eq!(model.entities[0].fill_color, DEFAULT_FILL);
        assert_eq!(model.entities[0].radius, 0.3125);
    }

    #[test]
    fn signed_viewport_rounds_outward_with_margins() {
        let model = compute_layout(
            &three_cold_tubes(),
            &[],
            &Theme::classic(),
            &config(LegSelection::Cold, 0.0),
        )
        .unwrap();
        assert_eq!(
            model.viewport,
            Viewport {
                min_x: -1.0,
                min_y: -6.0,
                width: 4.0,
                height: 8.0,
            }
        );
        assert_eq!(signed_bounds(&model.entities).unwrap(), model.extent);
    }

    #[test]
    fn absolute_viewport_is_symmetric() {
        let mut cfg = config(LegSelection::Cold, 0.0);
        cfg.viewport_style = ViewportStyle::Absolute;
        let model = compute_layout(&three_cold_tubes(), &[], &Theme::classic(), &cfg).unwrap();
        assert_eq!(model.viewport.min_x, -3.0);
        assert_eq!(model.viewport.width, 6.0);
        assert_eq!(model.viewport.min_y, -6.0);
        assert_eq!(model.viewport.height, 12.0);
    }

    #[test]
    fn absolute_extent_is_what_sized_the_viewport() {
        let tubes = sheet(vec![
            record("1", "A", "1", (0.0, 0.0), (0.0, 0.0)),
            record("2", "B", "2", (2.0, -5.0), (2.0, -5.0)),
        ]);
        let mut cfg = config(LegSelection::Cold, 0.0);
        cfg.viewport_style = ViewportStyle::Absolute;
        let model = compute_layout(&tubes, &[], &Theme::classic(), &cfg).unwrap();
        assert_eq!(model.extent, absolute_bounds(&model.entities).unwrap());
        assert_eq!(
            model.viewport,
            Viewport::from_bounds(&model.extent.expanded(cfg.margin_x, cfg.margin_y))
        );
        assert_eq!(
            model.viewport,
            Viewport {
                min_x: -3.0,
                min_y: -6.0,
                width: 6.0,
                height: 12.0,
            }
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn absolute_extents_are_logged_for_every_style() {
        for style in [ViewportStyle::Signed, ViewportStyle::Absolute] {
            let log = CapturedLog::default();
            let writer = log.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            let mut cfg = config(LegSelection::Cold, 0.0);
            cfg.viewport_style = style;
            tracing::subscriber::with_default(subscriber, || {
                compute_layout(&three_cold_tubes(), &[], &Theme::classic(), &cfg).unwrap();
            });
            let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
            assert_eq!(output.matches("tube extents").count(), 1, "{style:?}: {output}");
            assert!(output.contains("absolute_max_y=-5"), "{style:?}: {output}");
            // one line per distinct label: A B C on X, 1 2 3 on Y
            assert_eq!(output.matches("axis label").count(), 6, "{style:?}: {output}");
        }
    }

    #[test]
    fn both_legs_mirror_about_datum() {
        let tubes = sheet(vec![record("7", "A", "4", (1.0, 3.0), (1.0, 3.0))]);
        let half_width = 2.0;
        let model = compute_layout(
            &tubes,
            &[],
            &Theme::classic(),
            &config(LegSelection::Both, half_width),
        )
        .unwrap();
        assert_eq!(model.entities.len(), 2);
        let cold = &model.entities[0];
        let hot = &model.entities[1];
        assert_eq!(cold.id, "cl7");
        assert_eq!(hot.id, "hl7");
        assert_eq!(cold.y, -5.0);
        assert_eq!(hot.y, 5.0);
        assert_eq!(hot.y - half_width, -(cold.y + half_width));
        assert_eq!(cold.tooltip, "Col=A Row=4 Leg=cold");
        assert_eq!(hot.number_text, "7");
    }

    #[test]
    fn missing_leg_is_reported() {
        let tubes = sheet(vec![TubeRecord::new(
            "5",
            "A",
            "1",
            Some(Point::new(0.0, 0.0)),
            None,
        )]);
        let err = compute_layout(&tubes, &[], &Theme::classic(), &config(LegSelection::Both, 0.0))
            .unwrap_err();
        assert!(matches!(err, Error::MissingLeg { tube, leg: Leg::Hot } if tube == "5"));
    }

    #[test]
    fn empty_sheet_fails() {
        let tubes = TubeSheet::default();
        let err = compute_layout(&tubes, &[], &Theme::classic(), &LayoutConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn labels_are_deduplicated_and_sorted() {
        let tubes = sheet(vec![
            record("1", "B", "2", (0.0, 0.0), (3.0, 1.0)),
            record("2", "A", "2", (0.0, 0.0), (1.0, 2.0)),
            record("3", "B", "1", (0.0, 0.0), (3.0, 0.0)),
        ]);
        let model = compute_layout(&tubes, &[], &Theme::classic(), &LayoutConfig::default())
            .unwrap();
        let xs: Vec<(&str, f32)> = model
            .x_labels
            .iter()
            .map(|l| (l.text.as_str(), l.coordinate))
            .collect();
        assert_eq!(xs, vec![("A", 1.0), ("B", 3.0)]);
        let ys: Vec<(&str, f32)> = model
            .y_labels
            .iter()
            .map(|l| (l.text.as_str(), l.coordinate))
            .collect();
        assert_eq!(ys, vec![("1", 0.0), ("2", 2.0)]);
    }

    #[test]
    fn plans_color_entities_and_tooltips() {
        let tubes = three_cold_tubes();
        let plans = [PlanSource::new(
            "2024-outage",
            vec![PlanRow {
                row_label: "2".to_string(),
                col_label: "B".to_string(),
                tube_reference: "TUBE_0002".to_string(),
            }],
        )];
        let model = compute_layout(&tubes, &plans, &Theme::classic(), &LayoutConfig::default())
            .unwrap();
        let planned = &model.entities[1];
        assert_eq!(planned.fill_color, DEFAULT_PLAN_COLORS[0]);
        assert_eq!(planned.plan, "2024-outage");
        assert_eq!(planned.tooltip, "Col=B Row=2 Plan=2024-outage");
        assert_eq!(model.plans.len(), 1);
        assert!(tubes.get("2").unwrap().plan.is_empty());
    }

    #[test]
    fn viewport_override_and_guides() {
        let mut cfg = LayoutConfig::default();
        cfg.guide_lines = true;
        cfg.viewport = Some(Viewport {
            min_x: -10.0,
            min_y: -10.0,
            width: 20.0,
            height: 20.0,
        });
        let model = compute_layout(&three_cold_tubes(), &[], &Theme::classic(), &cfg).unwrap();
        assert_eq!(model.viewport.width, 20.0);
        assert_eq!(model.guides.len(), 2);
        assert_eq!(model.guides[0].x1, -10.0);
        assert_eq!(model.guides[0].x2, 10.0);
    }
}
