//! Error types for residual assembly.

use pf_core::error::PfError;
use pf_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur while setting up or assembling the residual.
///
/// Index contract violations inside an element are not reported here; they
/// panic at the offending access.
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Fluid error at dof {dof}: {source}")]
    Fluid {
        dof: usize,
        #[source]
        source: FluidError,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for PfError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidArg { what } => PfError::InvalidArg { what },
            ModelError::DimensionMismatch {
                what,
                expected,
                actual,
            } => PfError::DimensionMismatch { what, expected, actual },
            ModelError::Fluid { source, .. } => source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::DimensionMismatch {
            what: "solution",
            expected: 8,
            actual: 6,
        };
        let msg = err.to_string();
        assert!(msg.contains("solution"));
        assert!(msg.contains('8'));
    }

    #[test]
    fn fluid_error_keeps_dof() {
        let err = ModelError::Fluid {
            dof: 3,
            source: FluidError::NonPhysical { what: "pressure" },
        };
        assert!(err.to_string().contains("dof 3"));
        let pf: PfError = err.into();
        assert!(matches!(pf, PfError::NonPhysical { .. }));
    }
}
