//! Liquid/gas water/air system with constant-coefficient phase equilibria.
//!
//! The phase equilibrium is expressed entirely through fugacity
//! coefficients:
//! - water in liquid follows Raoult's law, `φ = p_vap(T) / p`
//! - air in liquid follows Henry's law, `φ = H / p`
//! - both components behave ideally in the gas phase, `φ = 1`
//!
//! The vapour pressure uses a Clausius–Clapeyron fit anchored at the normal
//! boiling point. These are not meant as accurate correlations; they give a
//! well-conditioned system in which the gas phase can appear and vanish.

use crate::system::FluidSystem;
use pf_core::units::constants::{R_GAS, T_REF_K};

pub const LIQUID_IDX: usize = 0;
pub const GAS_IDX: usize = 1;

pub const WATER_IDX: usize = 0;
pub const AIR_IDX: usize = 1;

const PHASE_NAMES: [&str; 2] = ["liquid", "gas"];
const COMPONENT_NAMES: [&str; 2] = ["water", "air"];

#[derive(Debug, Clone)]
pub struct ConstantFugacitySystem {
    /// Henry coefficient of air in water [Pa]
    pub henry_air: f64,
    /// Latent heat of vaporization of water [J/mol]
    pub latent_heat: f64,
    /// Normal boiling point used as vapour pressure anchor [K]
    pub boiling_point: f64,
    /// Liquid molar density [mol/m³]
    pub liquid_molar_density: f64,
    /// Viscosities [Pa·s], indexed by phase
    pub viscosity: [f64; 2],
    /// Molar heat capacities [J/(mol·K)], indexed `[phase][comp]`
    pub heat_capacity: [[f64; 2]; 2],
    /// Diffusion coefficients [m²/s], indexed by phase
    pub diffusion: [f64; 2],
    /// Thermal conductivities [W/(m·K)], indexed by phase
    pub conductivity: [f64; 2],
}

impl Default for ConstantFugacitySystem {
    fn default() -> Self {
        Self {
            henry_air: 6.4e9,
            latent_heat: 40_650.0,
            boiling_point: 373.15,
            liquid_molar_density: 55_400.0,
            viscosity: [1.0e-3, 1.8e-5],
            heat_capacity: [[75.3, 29.1], [33.6, 29.1]],
            diffusion: [2.0e-9, 2.6e-5],
            conductivity: [0.6, 0.026],
        }
    }
}

impl ConstantFugacitySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vapour pressure of water [Pa].
    pub fn vapor_pressure(&self, t: f64) -> f64 {
        const P_ATM: f64 = 101_325.0;
        P_ATM * (-self.latent_heat / R_GAS * (1.0 / t - 1.0 / self.boiling_point)).exp()
    }

    /// Fugacities `(water, air)` at which liquid and gas coexist at `p`, `t`:
    /// the mole fractions of both phases sum to one.
    pub fn coexistence_fugacities(&self, p: f64, t: f64) -> (f64, f64) {
        let p_vap = self.vapor_pressure(t);
        let f_water = (1.0 - p / self.henry_air) / (1.0 / p_vap - 1.0 / self.henry_air);
        (f_water, p - f_water)
    }
}

impl FluidSystem for ConstantFugacitySystem {
    fn name(&self) -> &str {
        "constant-fugacity water/air"
    }

    fn num_phases(&self) -> usize {
        2
    }

    fn num_components(&self) -> usize {
        2
    }

    fn phase_name(&self, phase: usize) -> &'static str {
        PHASE_NAMES[phase]
    }

    fn component_name(&self, comp: usize) -> &'static str {
        COMPONENT_NAMES[comp]
    }

    fn fugacity_coefficient(&self, phase: usize, comp: usize, p: f64, t: f64) -> f64 {
        match (phase, comp) {
            (LIQUID_IDX, WATER_IDX) => self.vapor_pressure(t) / p,
            (LIQUID_IDX, AIR_IDX) => self.henry_air / p,
            (GAS_IDX, WATER_IDX) | (GAS_IDX, AIR_IDX) => 1.0,
            _ => panic!("no fugacity coefficient for phase {phase}, component {comp}"),
        }
    }

    fn molar_density(&self, phase: usize, p: f64, t: f64) -> f64 {
        match phase {
            LIQUID_IDX => self.liquid_molar_density,
            GAS_IDX => p / (R_GAS * t),
            _ => panic!("phase index {phase} out of range"),
        }
    }

    fn viscosity(&self, phase: usize, _p: f64, _t: f64) -> f64 {
        self.viscosity[phase]
    }

    fn component_enthalpy(&self, phase: usize, comp: usize, t: f64) -> f64 {
        let sensible = self.heat_capacity[phase][comp] * (t - T_REF_K);
        if phase == GAS_IDX && comp == WATER_IDX {
            sensible + self.latent_heat
        } else {
            sensible
        }
    }

    fn diffusion_coefficient(&self, phase: usize, _p: f64, _t: f64) -> f64 {
        self.diffusion[phase]
    }

    fn thermal_conductivity(&self, phase: usize) -> f64 {
        self.conductivity[phase]
    }
}
