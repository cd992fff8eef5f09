//! Problem definition consumed by the local residual.

use crate::indices::Indices;
use crate::vectors::{PrimaryVariables, RateVector};
use pf_fluids::FluidSystem;

/// Rock and geometry parameters of one degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialParams {
    /// Porosity [-]
    pub porosity: f64,
    /// Intrinsic permeability [m²]
    pub permeability: f64,
    /// Extrusion factor (cross-section area of a 1D domain) [m²]
    pub extrusion_factor: f64,
    /// Solid density [kg/m³]
    pub solid_density: f64,
    /// Solid specific heat capacity [J/(kg·K)]
    pub solid_heat_capacity: f64,
    /// Solid thermal conductivity [W/(m·K)]
    pub solid_conductivity: f64,
}

impl Default for SpatialParams {
    fn default() -> Self {
        Self {
            porosity: 0.3,
            permeability: 1e-12,
            extrusion_factor: 1.0,
            solid_density: 2650.0,
            solid_heat_capacity: 800.0,
            solid_conductivity: 2.8,
        }
    }
}

/// Condition on one boundary of the domain.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryCondition {
    /// Closed boundary.
    NoFlow,
    /// Prescribed flux per unit face area, positive out of the domain.
    Neumann(RateVector),
    /// Prescribed exterior state; the flux is computed against it.
    Dirichlet(PrimaryVariables),
}

/// A concrete simulation setup: fluids, rock, sources and boundaries.
pub trait Problem: Send + Sync {
    fn fluid_system(&self) -> &dyn FluidSystem;

    fn indices(&self) -> Indices;

    fn spatial_params(&self, dof: usize) -> SpatialParams;

    /// Temperature [K] used when energy is not a primary variable.
    fn temperature(&self, dof: usize) -> f64;

    /// Source per unit volume, positive into the domain.
    fn source(&self, dof: usize) -> RateVector {
        let _ = dof;
        RateVector::zeros(self.indices().num_eq())
    }

    fn boundary_condition(&self, boundary_id: usize) -> BoundaryCondition;
}
