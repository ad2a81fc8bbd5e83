use crate::ir::Leg;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no tubes to lay out")]
    EmptyInput,

    #[error("duplicate tube id: {id}")]
    DuplicateTubeId { id: String },

    #[error("plan {plan} references unknown tube {reference}")]
    UnknownTubeReference { plan: String, reference: String },

    #[error("malformed tube reference {reference:?}: expected a 5 character tag followed by a number")]
    MalformedTubeReference { reference: String },

    #[error("line {line}: malformed coordinate in column {column}: {value:?}")]
    MalformedCoordinate {
        line: usize,
        column: String,
        value: String,
    },

    #[error("missing column: {column}")]
    MissingColumn { column: String },

    #[error("line {line}: tube {tube} has no coordinate pair")]
    MissingCoordinates { line: usize, tube: String },

    #[error("invalid viewport: width {width} and height {height} must be finite and positive")]
    InvalidViewport { width: f32, height: f32 },

    #[error("tube {tube} has no {leg} leg coordinates")]
    MissingLeg { tube: String, leg: Leg },
}
