//! Simulation configuration schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub newton: NewtonDef,
    pub time: TimeDef,
    pub domain: DomainDef,
    pub fluid: FluidDef,
    pub initial: InitialStateDef,
    #[serde(default)]
    pub boundaries: BoundariesDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewtonDef {
    #[serde(default = "default_rel_tolerance")]
    pub rel_tolerance: f64,
    #[serde(default = "default_target_steps")]
    pub target_steps: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Ceiling on proposed time steps (seconds)
    #[serde(default = "default_max_time_step_size")]
    pub max_time_step_size: f64,
}

impl Default for NewtonDef {
    fn default() -> Self {
        Self {
            rel_tolerance: default_rel_tolerance(),
            target_steps: default_target_steps(),
            max_steps: default_max_steps(),
            max_time_step_size: default_max_time_step_size(),
        }
    }
}

fn default_rel_tolerance() -> f64 {
    1e-7
}

fn default_target_steps() -> usize {
    9
}

fn default_max_steps() -> usize {
    18
}

fn default_max_time_step_size() -> f64 {
    3600.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeDef {
    /// Final time (seconds)
    pub t_end: f64,
    /// First step attempted (seconds)
    pub dt_initial: f64,
    /// Smallest step a cutback may produce (seconds)
    pub min_dt: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

fn default_max_retries() -> usize {
    10
}

fn default_record_every() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainDef {
    /// Column length (m)
    pub length: f64,
    pub cells: usize,
    /// Cross-section area (m²)
    #[serde(default = "default_area")]
    pub area: f64,
    pub porosity: f64,
    /// Intrinsic permeability (m²)
    pub permeability: f64,
}

fn default_area() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    /// Temperature (K), initial value when energy is enabled
    pub temperature: f64,
    #[serde(default)]
    pub enable_energy: bool,
}

/// Uniform initial state. Fugacities left out are taken at liquid/gas
/// coexistence for the given pressure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitialStateDef {
    /// Pressure (Pa)
    pub pressure: f64,
    pub gas_saturation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_fugacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_fugacity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundariesDef {
    #[serde(default)]
    pub left: BoundaryDef,
    #[serde(default)]
    pub right: BoundaryDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoundaryDef {
    #[default]
    NoFlow,
    /// Rates per unit area, one per equation, positive out of the domain.
    Neumann { rates: Vec<f64> },
    /// Exterior state; fugacities default to coexistence as for the initial state.
    Dirichlet {
        pressure: f64,
        gas_saturation: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        water_fugacity: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        air_fugacity: Option<f64>,
    },
}

impl FluidDef {
    /// Number of equations per degree of freedom of the water/air system.
    pub fn num_eq(&self) -> usize {
        if self.enable_energy { 5 } else { 4 }
    }
}
