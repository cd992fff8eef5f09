//! pf-fluids: fluid states and fluid systems for phaseflow.
//!
//! Provides:
//! - `FluidStateAccess`, the read-only view the residual assembly consumes
//! - `FluidState`, an owned per-control-volume fluid state
//! - `FluidSystem` trait for phase/component properties
//! - `ConstantFugacitySystem`, a liquid/gas water/air system with
//!   constant-coefficient phase equilibria
//!
//! # Architecture
//!
//! The rest of phaseflow only sees the `FluidSystem` trait and the
//! `FluidStateAccess` accessor, so property backends can be swapped without
//! touching the residual or the solver.

pub mod constant_fugacity;
pub mod error;
pub mod state;
pub mod system;

pub use constant_fugacity::{AIR_IDX, ConstantFugacitySystem, GAS_IDX, LIQUID_IDX, WATER_IDX};
pub use error::{FluidError, FluidResult};
pub use state::{FluidState, FluidStateAccess};
pub use system::FluidSystem;
