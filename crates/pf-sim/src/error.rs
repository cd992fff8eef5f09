//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during a transient simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Time step from t = {t} s failed after {retries} retries (last dt = {dt} s)")]
    StepFailed { t: f64, dt: f64, retries: usize },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<pf_solver::SolverError> for SimError {
    fn from(e: pf_solver::SolverError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<pf_model::ModelError> for SimError {
    fn from(e: pf_model::ModelError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<pf_core::error::PfError> for SimError {
    fn from(e: pf_core::error::PfError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
