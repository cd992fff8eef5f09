//! Nonlinear solver for implicit time steps of the porous-media model.
//!
//! A Newton method whose iteration count, convergence test and time step
//! proposals are delegated to a `NewtonController`. The relative-defect
//! controller converges on the floored relative change of selected unknowns
//! (typically pressure and one fraction) and caps proposed steps.

pub mod controller;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod problem;
pub mod relative_defect;

pub use controller::{BaseNewtonController, NewtonController, NewtonSettings};
pub use error::{SolverError, SolverResult};
pub use newton::{NewtonOutcome, NewtonSystem, newton_solve};
pub use problem::TimeStepProblem;
pub use relative_defect::{RelativeDefectController, RelativeDefectSettings, TrackedVariable};
