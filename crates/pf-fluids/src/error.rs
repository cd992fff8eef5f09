//! Fluid property errors.

use pf_core::PfError;
use thiserror::Error;

pub type FluidResult<T> = Result<T, FluidError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// A thermodynamic quantity outside its physical domain, typically from
    /// a Newton iterate overshooting.
    #[error("Non-physical fluid state: {what}")]
    NonPhysical { what: &'static str },

    /// Phase or component layout that does not describe a fluid state.
    #[error("Invalid fluid layout: {what}")]
    InvalidArg { what: &'static str },
}

impl From<FluidError> for PfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => PfError::NonPhysical { what },
            FluidError::InvalidArg { what } => PfError::InvalidArg { what },
        }
    }
}
