//! Transient simulation of porous-media columns.
//!
//! Provides:
//! - adaptive implicit time loop with Newton cutback retries
//! - phase appearance/vanishing tracking and per-phase inventories
//! - `ColumnProblem`, a homogeneous 1D water/air column

pub mod column;
pub mod error;
pub mod sim;

pub use column::ColumnProblem;
pub use error::{SimError, SimResult};
pub use sim::{PhaseChange, SimOptions, SimProgress, SimRecord, run_sim, run_sim_with_progress};
