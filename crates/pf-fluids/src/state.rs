//! Fluid state definitions.

use crate::error::{FluidError, FluidResult};
use pf_core::units::{Pressure, Temperature};

/// Read-only view of the phase composition inside one control volume.
///
/// Indices are caller contracts: an out-of-range phase or component is a
/// programming error and panics.
pub trait FluidStateAccess {
    fn num_phases(&self) -> usize;

    fn num_components(&self) -> usize;

    /// Saturation of `phase` [-].
    fn saturation(&self, phase: usize) -> f64;

    /// Mole fraction of `comp` in `phase` [-].
    fn mole_fraction(&self, phase: usize, comp: usize) -> f64;

    /// Sum of all component mole fractions of `phase`.
    fn sum_mole_fractions(&self, phase: usize) -> f64 {
        (0..self.num_components())
            .map(|comp| self.mole_fraction(phase, comp))
            .sum()
    }
}

/// Owned fluid state of a single control volume at one time level.
///
/// Saturations are not forced to sum to one and mole fractions are not
/// normalized: both are exactly the quantities the complementarity
/// conditions test, so they are stored as computed.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidState {
    num_phases: usize,
    num_components: usize,
    saturations: Vec<f64>,
    /// Phase-major: `mole_fractions[phase * num_components + comp]`.
    mole_fractions: Vec<f64>,
    /// Molar densities per phase [mol/m³].
    molar_densities: Vec<f64>,
    pressure: Pressure,
    temperature: Temperature,
}

impl FluidState {
    /// Create an empty state (all saturations and fractions zero).
    pub fn new(
        num_phases: usize,
        num_components: usize,
        pressure: Pressure,
        temperature: Temperature,
    ) -> FluidResult<Self> {
        if num_phases == 0 || num_components == 0 {
            return Err(FluidError::InvalidArg {
                what: "fluid state needs at least one phase and one component",
            });
        }
        let p = pressure.value;
        if !p.is_finite() || p <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        let t = temperature.value;
        if !t.is_finite() || t <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }

        Ok(Self {
            num_phases,
            num_components,
            saturations: vec![0.0; num_phases],
            mole_fractions: vec![0.0; num_phases * num_components],
            molar_densities: vec![0.0; num_phases],
            pressure,
            temperature,
        })
    }

    /// Build a state directly from saturations and phase-major mole fractions.
    pub fn from_parts(
        saturations: Vec<f64>,
        mole_fractions: Vec<Vec<f64>>,
        pressure: Pressure,
        temperature: Temperature,
    ) -> FluidResult<Self> {
        let num_phases = saturations.len();
        if mole_fractions.len() != num_phases {
            return Err(FluidError::InvalidArg {
                what: "one mole fraction row per phase required",
            });
        }
        let num_components = mole_fractions.first().map_or(0, Vec::len);
        if mole_fractions.iter().any(|row| row.len() != num_components) {
            return Err(FluidError::InvalidArg {
                what: "mole fraction rows must have equal length",
            });
        }

        let mut state = Self::new(num_phases, num_components, pressure, temperature)?;
        state.saturations = saturations;
        state.mole_fractions = mole_fractions.into_iter().flatten().collect();
        Ok(state)
    }

    pub fn set_saturation(&mut self, phase: usize, value: f64) {
        self.saturations[phase] = value;
    }

    pub fn set_mole_fraction(&mut self, phase: usize, comp: usize, value: f64) {
        let idx = self.flat_idx(phase, comp);
        self.mole_fractions[idx] = value;
    }

    pub fn set_molar_density(&mut self, phase: usize, value: f64) {
        self.molar_densities[phase] = value;
    }

    /// Molar density of `phase` [mol/m³].
    pub fn molar_density(&self, phase: usize) -> f64 {
        self.molar_densities[phase]
    }

    pub fn pressure(&self) -> Pressure {
        self.pressure
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    fn flat_idx(&self, phase: usize, comp: usize) -> usize {
        assert!(
            comp < self.num_components,
            "component index {comp} out of range ({})",
            self.num_components
        );
        phase * self.num_components + comp
    }
}

impl FluidStateAccess for FluidState {
    fn num_phases(&self) -> usize {
        self.num_phases
    }

    fn num_components(&self) -> usize {
        self.num_components
    }

    fn saturation(&self, phase: usize) -> f64 {
        self.saturations[phase]
    }

    fn mole_fraction(&self, phase: usize, comp: usize) -> f64 {
        self.mole_fractions[self.flat_idx(phase, comp)]
    }
}
