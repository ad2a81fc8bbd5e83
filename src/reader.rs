use crate::error::{Error, Result};
use crate::ir::{PlanRow, PlanSource, Point, TubeRecord, decode_tube_reference};

pub const DEFAULT_DELIMITER: char = ';';

const TRIM_CHARS: [char; 2] = [' ', '\t'];

struct Table {
    header: Vec<String>,
    /// 1-based source line number and the trimmed fields of that line.
    rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    fn parse(input: &str, delimiter: char) -> Self {
        let mut header = Vec::new();
        let mut rows = Vec::new();
        for (idx, raw_line) in input.lines().enumerate() {
            let line = raw_line.trim_end_matches('\r');
            if line.trim_matches(TRIM_CHARS).is_empty() {
                continue;
            }
            let fields: Vec<String> = line
                .split(delimiter)
                .map(|field| field.trim_matches(TRIM_CHARS).to_string())
                .collect();
            if header.is_empty() {
                header = fields;
            } else {
                rows.push((idx + 1, fields));
            }
        }
        Self { header, rows }
    }

    fn find(&self, names: &[&str]) -> Option<usize> {
        self.header.iter().position(|column| {
            names
                .iter()
                .any(|name| column.eq_ignore_ascii_case(name))
        })
    }

    fn require(&self, names: &[&str]) -> Result<usize> {
        self.find(names).ok_or_else(|| Error::MissingColumn {
            column: names[0].to_string(),
        })
    }
}

fn field(fields: &[String], idx: usize) -> &str {
    fields.get(idx).map(String::as_str).unwrap_or("")
}

/// Coordinates must be finite; `inf` and `NaN` parse as floats but would
/// poison the viewport.
fn parse_coordinate(line: usize, column: &str, value: &str) -> Result<f32> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::MalformedCoordinate {
            line,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Column indices of one coordinate pair, if the header carries it.
struct PairColumns {
    x: (usize, &'static str),
    y: (usize, &'static str),
}

impl PairColumns {
    fn locate(table: &Table, x_name: &'static str, y_name: &'static str) -> Result<Option<Self>> {
        match (table.find(&[x_name]), table.find(&[y_name])) {
            (Some(x), Some(y)) => Ok(Some(Self {
                x: (x, x_name),
                y: (y, y_name),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(Error::MissingColumn {
                column: y_name.to_string(),
            }),
            (None, Some(_)) => Err(Error::MissingColumn {
                column: x_name.to_string(),
            }),
        }
    }

    fn read(&self, line: usize, fields: &[String]) -> Result<Option<Point>> {
        let raw_x = field(fields, self.x.0);
        let raw_y = field(fields, self.y.0);
        if raw_x.is_empty() && raw_y.is_empty() {
            return Ok(None);
        }
        let x = parse_coordinate(line, self.x.1, raw_x)?;
        let y = parse_coordinate(line, self.y.1, raw_y)?;
        Ok(Some(Point::new(x, y)))
    }
}

/// Reads a tubesheet table (`x_label;y_label;cl_x;cl_y;hl_x;hl_y;tube_id`).
///
/// Either coordinate pair may be left out of the header entirely, or left
/// blank on a given row, but every row needs at least one of them.
pub fn read_tubesheet(input: &str, delimiter: char) -> Result<Vec<TubeRecord>> {
    let table = Table::parse(input, delimiter);
    let x_label = table.require(&["x_label", "grid_x"])?;
    let y_label = table.require(&["y_label", "grid_y"])?;
    let tube_id = table.require(&["tube_id", "id14"])?;
    let cold = PairColumns::locate(&table, "cl_x", "cl_y")?;
    let hot = PairColumns::locate(&table, "hl_x", "hl_y")?;
    if cold.is_none() && hot.is_none() {
        return Err(Error::MissingColumn {
            column: "hl_x".to_string(),
        });
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for (line, fields) in &table.rows {
        let id = decode_tube_reference(field(fields, tube_id))?;
        let centerline = match &cold {
            Some(columns) => columns.read(*line, fields)?,
            None => None,
        };
        let leg = match &hot {
            Some(columns) => columns.read(*line, fields)?,
            None => None,
        };
        if centerline.is_none() && leg.is_none() {
            return Err(Error::MissingCoordinates {
                line: *line,
                tube: id,
            });
        }
        records.push(TubeRecord::new(
            id,
            field(fields, x_label),
            field(fields, y_label),
            centerline,
            leg,
        ));
    }
    Ok(records)
}

/// Reads one inspection plan table (`ROW;COL;TUBE`).
pub fn read_plan(name: &str, input: &str, delimiter: char) -> Result<PlanSource> {
    let table = Table::parse(input, delimiter);
    let row = table.require(&["ROW"])?;
    let col = table.require(&["COL"])?;
    let tube = table.require(&["TUBE"])?;
    let rows = table
        .rows
        .iter()
        .map(|(_, fields)| PlanRow {
            row_label: field(fields, row).to_string(),
            col_label: field(fields, col).to_string(),
            tube_reference: field(fields, tube).to_string(),
        })
        .collect();
    Ok(PlanSource::new(name, rows))
}
