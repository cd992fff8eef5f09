use thiserror::Error;

pub type PfResult<T> = Result<T, PfError>;

/// Crate-independent error, for callers that do not care which layer failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PfError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical state: {what}")]
    NonPhysical { what: &'static str },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Numerical failure: {what}")]
    Numerical { what: String },
}
