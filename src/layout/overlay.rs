use crate::error::{Error, Result};
use crate::ir::{PlanSource, TubeSheet, decode_tube_reference};
use crate::theme::DEFAULT_PLAN_COLORS;

use super::PlanLegendEntry;

/// Color for the plan at `source_index` in discovery order, cycling the palette.
pub fn plan_color(palette: &[String], source_index: usize) -> String {
    if palette.is_empty() {
        return DEFAULT_PLAN_COLORS[source_index % DEFAULT_PLAN_COLORS.len()].to_string();
    }
    palette[source_index % palette.len()].clone()
}

/// Paints every tube referenced by a plan with that plan's color and name.
///
/// Plans are applied in the given order, so a tube listed by several plans
/// ends up with the last one. References to tubes missing from the sheet, or
/// references that do not decode, are skipped with a warning unless `strict`
/// is set.
pub fn merge_plans(
    sheet: &mut TubeSheet,
    sources: &[PlanSource],
    palette: &[String],
    strict: bool,
) -> Result<Vec<PlanLegendEntry>> {
    let mut legend = Vec::with_capacity(sources.len());
    for (source_index, source) in sources.iter().enumerate() {
        let color = plan_color(palette, source_index);
        let mut matched = 0usize;
        for row in &source.rows {
            let id = match decode_tube_reference(&row.tube_reference) {
                Ok(id) => id,
                Err(err) if strict => return Err(err),
                Err(err) => {
                    tracing::warn!(plan = %source.name, %err, "skipping plan row");
                    continue;
                }
            };
            let Some(tube) = sheet.get_mut(&id) else {
                if strict {
                    return Err(Error::UnknownTubeReference {
                        plan: source.name.clone(),
                        reference: row.tube_reference.clone(),
                    });
                }
                tracing::warn!(
                    plan = %source.name,
                    reference = %row.tube_reference,
                    "plan references a tube that is not on the sheet"
                );
                continue;
            };
            tube.color = color.clone();
            tube.plan = source.name.clone();
            matched += 1;
        }
        tracing::info!(plan = %source.name, %color, matched, "applied inspection plan");
        legend.push(PlanLegendEntry {
            name: source.name.clone(),
            color,
            matched,
        });
    }
    Ok(legend)
}
