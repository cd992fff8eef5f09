//! pf-model: compositional porous-media model with phase complementarity.
//!
//! Provides:
//! - `Indices`, the equation / primary-variable layout
//! - `VolumeVariables`, secondary variables of one control volume
//! - mass and energy sub-models (`MassModule`, `Isothermal`, `Thermal`)
//! - phase complementarity conditions
//! - `LocalResidual` and the compositional `NcpLocalResidual`
//! - `Assembler`, parallel global residual assembly
//! - `LineGrid`, a 1D vertex-centred grid
//!
//! # Architecture
//!
//! The local residual only reads an element through the `ElementContext`
//! trait, and the problem setup only through the `Problem` trait. The solver
//! crates see the flattened vectors produced by the `Assembler`.

pub mod assembler;
pub mod complementarity;
pub mod context;
pub mod energy;
pub mod error;
pub mod grid;
pub mod indices;
pub mod local_residual;
pub mod mass;
pub mod problem;
pub mod vectors;
pub mod volume_variables;

pub use assembler::{Assembled, Assembler};
pub use complementarity::{NcpBranch, phase_absent_ineq, phase_ncp, phase_present_ineq, select_branch};
pub use context::{BoxElementContext, CURRENT, ElementContext, PREVIOUS};
pub use energy::{EnergyModule, Isothermal, Thermal};
pub use error::{ModelError, ModelResult};
pub use grid::{BoundaryFace, FvElementGeometry, FvGrid, LineGrid, SubControlVolume, SubControlVolumeFace};
pub use indices::Indices;
pub use local_residual::{LocalResidual, NcpLocalResidual};
pub use mass::MassModule;
pub use problem::{BoundaryCondition, Problem, SpatialParams};
pub use vectors::{EqVector, LocalBlockVector, PrimaryVariables, RateVector};
pub use volume_variables::VolumeVariables;
