//! Homogeneous 1D water/air column.

use pf_core::units::Temperature;
use pf_fluids::{ConstantFugacitySystem, FluidSystem};
use pf_model::{BoundaryCondition, Indices, LineGrid, ModelResult, PrimaryVariables, Problem, SpatialParams};

/// Uniform column of porous medium filled with the water/air system, with
/// one boundary condition per end.
#[derive(Debug, Clone)]
pub struct ColumnProblem {
    fluid: ConstantFugacitySystem,
    indices: Indices,
    params: SpatialParams,
    temperature: f64,
    boundaries: [BoundaryCondition; 2],
}

impl ColumnProblem {
    pub fn new(
        fluid: ConstantFugacitySystem,
        enable_energy: bool,
        params: SpatialParams,
        temperature: Temperature,
    ) -> ModelResult<Self> {
        let indices = Indices::new(fluid.num_phases(), fluid.num_components(), enable_energy)?;
        Ok(Self {
            fluid,
            indices,
            params,
            temperature: temperature.value,
            boundaries: [BoundaryCondition::NoFlow, BoundaryCondition::NoFlow],
        })
    }

    /// Set the condition at [`LineGrid::LEFT`] or [`LineGrid::RIGHT`].
    pub fn with_boundary(mut self, boundary_id: usize, condition: BoundaryCondition) -> Self {
        self.boundaries[boundary_id] = condition;
        self
    }

    pub fn fluid(&self) -> &ConstantFugacitySystem {
        &self.fluid
    }

    /// Primary variables of a state given by pressure, gas saturation and
    /// fugacities, at the column temperature.
    pub fn state(&self, pressure: f64, gas_saturation: f64, water_fugacity: f64, air_fugacity: f64) -> PrimaryVariables {
        let mut values = vec![pressure, gas_saturation, water_fugacity, air_fugacity];
        if self.indices.enable_energy() {
            values.push(self.temperature);
        }
        PrimaryVariables::from_vec(values)
    }

    /// State at `pressure` in which liquid and gas coexist.
    pub fn coexisting_state(&self, pressure: f64, gas_saturation: f64) -> PrimaryVariables {
        let (f_w, f_a) = self.fluid.coexistence_fugacities(pressure, self.temperature);
        self.state(pressure, gas_saturation, f_w, f_a)
    }
}

impl Problem for ColumnProblem {
    fn fluid_system(&self) -> &dyn FluidSystem {
        &self.fluid
    }

    fn indices(&self) -> Indices {
        self.indices
    }

    fn spatial_params(&self, _dof: usize) -> SpatialParams {
        self.params
    }

    fn temperature(&self, _dof: usize) -> f64 {
        self.temperature
    }

    fn boundary_condition(&self, boundary_id: usize) -> BoundaryCondition {
        match boundary_id {
            LineGrid::LEFT | LineGrid::RIGHT => self.boundaries[boundary_id].clone(),
            _ => BoundaryCondition::NoFlow,
        }
    }
}
