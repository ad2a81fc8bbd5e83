use std::collections::HashMap;

use super::{Axis, AxisLabel};

/// Axis label text mapped to the coordinate it is drawn at.
///
/// Re-inserting a text moves it to the newer coordinate.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    entries: HashMap<String, f32>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: &str, coordinate: f32) {
        if let Some(existing) = self.entries.get_mut(text) {
            *existing = coordinate;
        } else {
            self.entries.insert(text.to_string(), coordinate);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by ascending coordinate; equal coordinates fall back to text order.
    pub fn to_sorted_sequence(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        let mut sorted: Vec<(&str, f32)> = self
            .entries
            .iter()
            .map(|(text, coordinate)| (text.as_str(), *coordinate))
            .collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        sorted.into_iter()
    }

    pub fn to_axis_labels(&self, axis: Axis) -> Vec<AxisLabel> {
        self.to_sorted_sequence()
            .map(|(text, coordinate)| {
                tracing::trace!(?axis, text, coordinate, "axis label");
                AxisLabel {
                    text: text.to_string(),
                    coordinate,
                    axis,
                }
            })
            .collect()
    }
}
