//! Error types for solver operations.

use pf_core::error::PfError;
use pf_model::ModelError;
use thiserror::Error;

/// Errors that can occur while solving one time step.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Whether a Newton step that hit this error may be retried with a
    /// smaller time step.
    ///
    /// Model errors arise from non-physical iterates (e.g. a negative
    /// pressure), numeric errors from singular systems; both depend on the
    /// step size. Setup errors do not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SolverError::Model(ModelError::Fluid { .. }) | SolverError::Numeric { .. } => true,
            SolverError::Model(_) | SolverError::InvalidConfig { .. } | SolverError::DimensionMismatch { .. } => {
                false
            }
        }
    }
}

impl From<SolverError> for PfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidConfig { what } => PfError::InvalidArg { what },
            SolverError::DimensionMismatch {
                what,
                expected,
                actual,
            } => PfError::DimensionMismatch { what, expected, actual },
            SolverError::Model(e) => e.into(),
            SolverError::Numeric { what } => PfError::Numerical { what },
        }
    }
}
