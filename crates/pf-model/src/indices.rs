//! Equation and primary-variable index convention.
//!
//! Equations, per degree of freedom:
//! - `0 .. N`            component mole balances (`conti0_eq_idx + comp`)
//! - `N .. N + M`        phase complementarity rows (`phase0_ncp_idx + phase`)
//! - `N + M`             energy balance, only when energy is enabled
//!
//! Primary variables, per degree of freedom:
//! - `0`                 pressure (all phases share it)
//! - `1 .. M`            saturations of phases `1 .. M` (phase 0 is the complement)
//! - `M .. M + N`        component fugacities
//! - `M + N`             temperature, only when energy is enabled

use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indices {
    num_phases: usize,
    num_components: usize,
    enable_energy: bool,
}

impl Indices {
    pub fn new(num_phases: usize, num_components: usize, enable_energy: bool) -> ModelResult<Self> {
        if num_phases == 0 {
            return Err(ModelError::InvalidArg {
                what: "at least one phase is required",
            });
        }
        if num_components == 0 {
            return Err(ModelError::InvalidArg {
                what: "at least one component is required",
            });
        }
        Ok(Self {
            num_phases,
            num_components,
            enable_energy,
        })
    }

    pub fn num_phases(&self) -> usize {
        self.num_phases
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn enable_energy(&self) -> bool {
        self.enable_energy
    }

    /// Number of equations (and primary variables) per degree of freedom.
    pub fn num_eq(&self) -> usize {
        self.num_components + self.num_phases + usize::from(self.enable_energy)
    }

    pub fn conti0_eq_idx(&self) -> usize {
        0
    }

    pub fn phase0_ncp_idx(&self) -> usize {
        self.num_components
    }

    pub fn energy_eq_idx(&self) -> Option<usize> {
        self.enable_energy
            .then_some(self.num_components + self.num_phases)
    }

    pub fn pressure0_idx(&self) -> usize {
        0
    }

    /// Primary variable holding the saturation of `phase`; `None` for phase 0.
    pub fn saturation_idx(&self, phase: usize) -> Option<usize> {
        assert!(phase < self.num_phases, "phase index {phase} out of range");
        (phase > 0).then_some(phase)
    }

    pub fn fugacity0_idx(&self) -> usize {
        self.num_phases
    }

    pub fn temperature_idx(&self) -> Option<usize> {
        self.enable_energy
            .then_some(self.num_phases + self.num_components)
    }
}
