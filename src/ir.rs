use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fill used for tubes that no inspection plan covers.
pub const DEFAULT_FILL: &str = "white";

/// Width of the format tag in front of every tube reference.
pub const TUBE_REFERENCE_TAG_LEN: usize = 5;

static TUBE_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^.{{{TUBE_REFERENCE_TAG_LEN}}}\s*(?P<number>[0-9]+)\s*$"
    ))
    .unwrap()
});

/// Decodes a tube reference such as `TUBE_0042` into its numeric id (`42`).
///
/// The first five characters are a format tag and are discarded; whatever
/// follows must be an unsigned integer. Leading zeros are dropped so that
/// `ROW__007` and `TUBE_7` address the same tube.
pub fn decode_tube_reference(reference: &str) -> Result<String> {
    let malformed = || Error::MalformedTubeReference {
        reference: reference.to_string(),
    };
    let caps = TUBE_REFERENCE_RE.captures(reference).ok_or_else(malformed)?;
    let number: u64 = caps["number"].parse().map_err(|_| malformed())?;
    Ok(number.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leg {
    Cold,
    Hot,
}

impl Leg {
    /// Prefix used for synthesized entity ids when both legs are drawn.
    pub fn prefix(self) -> &'static str {
        match self {
            Leg::Cold => "cl",
            Leg::Hot => "hl",
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Cold => f.write_str("cold"),
            Leg::Hot => f.write_str("hot"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LegSelection {
    Cold,
    #[default]
    Hot,
    Both,
}

impl LegSelection {
    pub fn legs(self) -> &'static [Leg] {
        match self {
            LegSelection::Cold => &[Leg::Cold],
            LegSelection::Hot => &[Leg::Hot],
            LegSelection::Both => &[Leg::Cold, Leg::Hot],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TubeRecord {
    pub id: String,
    pub x_label: String,
    pub y_label: String,
    /// Cold-leg position (`cl_x`, `cl_y`).
    pub centerline: Option<Point>,
    /// Hot-leg position (`hl_x`, `hl_y`).
    pub leg: Option<Point>,
    pub color: String,
    pub plan: String,
}

impl TubeRecord {
    pub fn new(
        id: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        centerline: Option<Point>,
        leg: Option<Point>,
    ) -> Self {
        Self {
            id: id.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            centerline,
            leg,
            color: DEFAULT_FILL.to_string(),
            plan: String::new(),
        }
    }

    pub fn position(&self, leg: Leg) -> Option<Point> {
        match leg {
            Leg::Cold => self.centerline,
            Leg::Hot => self.leg,
        }
    }

    pub fn has_plan(&self) -> bool {
        !self.plan.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    /// Later rows replace earlier ones in place, keeping the first position.
    Overwrite,
}

/// Tube records keyed by id, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TubeSheet {
    tubes: Vec<TubeRecord>,
    index: HashMap<String, usize>,
    policy: DuplicatePolicy,
}

impl TubeSheet {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            tubes: Vec::new(),
            index: HashMap::new(),
            policy,
        }
    }

    pub fn from_records(
        records: impl IntoIterator<Item = TubeRecord>,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        let mut sheet = Self::new(policy);
        for record in records {
            sheet.insert(record)?;
        }
        Ok(sheet)
    }

    pub fn insert(&mut self, record: TubeRecord) -> Result<()> {
        if let Some(&idx) = self.index.get(&record.id) {
            return match self.policy {
                DuplicatePolicy::Reject => Err(Error::DuplicateTubeId { id: record.id }),
                DuplicatePolicy::Overwrite => {
                    tracing::warn!(tube = %record.id, "duplicate tube id, keeping the later row");
                    self.tubes[idx] = record;
                    Ok(())
                }
            };
        }
        self.index.insert(record.id.clone(), self.tubes.len());
        self.tubes.push(record);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TubeRecord> {
        self.index.get(id).map(|&idx| &self.tubes[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TubeRecord> {
        self.index.get(id).map(|&idx| &mut self.tubes[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TubeRecord> {
        self.tubes.iter()
    }

    pub fn len(&self) -> usize {
        self.tubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tubes.is_empty()
    }
}

/// One `ROW;COL;TUBE` line of an inspection plan file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    pub row_label: String,
    pub col_label: String,
    pub tube_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSource {
    pub name: String,
    pub rows: Vec<PlanRow>,
}

impl PlanSource {
    pub fn new(name: impl Into<String>, rows: Vec<PlanRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tube(id: &str) -> TubeRecord {
        TubeRecord::new(id, "A", "1", Some(Point::new(0.0, 0.0)), None)
    }

    #[test]
    fn decodes_fixed_width_prefix() {
        assert_eq!(decode_tube_reference("TUBE_0042").unwrap(), "42");
        assert_eq!(decode_tube_reference("T-01-7").unwrap(), "7");
        assert_eq!(decode_tube_reference("ABCDE 12").unwrap(), "12");
        let tag = "X".repeat(TUBE_REFERENCE_TAG_LEN);
        assert_eq!(decode_tube_reference(&format!("{tag}9")).unwrap(), "9");
        assert!(decode_tube_reference(&format!("{}9", &tag[1..])).is_err());
    }

    #[test]
    fn rejects_short_or_non_numeric_references() {
        assert!(matches!(
            decode_tube_reference("TUBE"),
            Err(Error::MalformedTubeReference { .. })
        ));
        assert!(decode_tube_reference("TUBE_").is_err());
        assert!(decode_tube_reference("TUBE_12a").is_err());
        assert!(decode_tube_reference("TUBE_99999999999999999999999").is_err());
    }

    #[test]
    fn store_keeps_insertion_order() {
        let sheet =
            TubeSheet::from_records([tube("3"), tube("1"), tube("2")], DuplicatePolicy::Reject)
                .unwrap();
        let ids: Vec<&str> = sheet.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
        assert_eq!(sheet.len(), 3);
        assert!(sheet.get("1").is_some());
        assert!(sheet.get("4").is_none());
    }

    #[test]
    fn strict_store_rejects_duplicates() {
        let err = TubeSheet::from_records([tube("1"), tube("1")], DuplicatePolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTubeId { id } if id == "1"));
    }

    #[test]
    fn lenient_store_keeps_last_row_in_first_position() {
        let mut later = tube("1");
        later.x_label = "B".to_string();
        let sheet = TubeSheet::from_records(
            [tube("1"), tube("2"), later],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();
        assert_eq!(sheet.len(), 2);
        let first = sheet.iter().next().unwrap();
        assert_eq!(first.id, "1");
        assert_eq!(first.x_label, "B");
    }

    #[test]
    fn new_tubes_start_white_without_plan() {
        let record = tube("9");
        assert_eq!(record.color, DEFAULT_FILL);
        assert!(!record.has_plan());
    }

    #[test]
    fn both_selection_yields_cold_then_hot() {
        assert_eq!(LegSelection::Both.legs(), &[Leg::Cold, Leg::Hot]);
        assert_eq!(Leg::Cold.prefix(), "cl");
        assert_eq!(Leg::Hot.to_string(), "hot");
    }
}
