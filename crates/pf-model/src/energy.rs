//! Energy sub-models.
//!
//! The local residual is generic over its energy sub-model, so the
//! isothermal case costs nothing: every hook of [`Isothermal`] is empty.
//! Energy transport by mass flux is driven from the mass sub-model, which
//! calls [`EnergyModule::add_advective_flux`] once per phase.

use crate::indices::Indices;
use crate::vectors::{EqVector, RateVector};
use crate::volume_variables::VolumeVariables;
use pf_fluids::FluidStateAccess;

pub trait EnergyModule: Send + Sync + 'static {
    /// Whether this sub-model requires the energy equation and temperature unknown.
    const ENABLED: bool;

    /// Energy stored per unit volume.
    fn add_storage(storage: &mut EqVector, vv: &VolumeVariables, indices: &Indices);

    /// Energy stored per unit volume in one phase.
    fn add_phase_storage(storage: &mut EqVector, vv: &VolumeVariables, phase: usize, indices: &Indices);

    /// Enthalpy carried by a phase's molar flux `phase_molar_flux` [mol/s]
    /// leaving `upstream`.
    fn add_advective_flux(
        flux: &mut RateVector,
        upstream: &VolumeVariables,
        phase: usize,
        phase_molar_flux: f64,
        indices: &Indices,
    );

    /// Heat conduction between two control volumes.
    fn add_conductive_flux(
        flux: &mut RateVector,
        inside: &VolumeVariables,
        outside: &VolumeVariables,
        area: f64,
        distance: f64,
        indices: &Indices,
    );
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Isothermal;

impl EnergyModule for Isothermal {
    const ENABLED: bool = false;

    fn add_storage(_: &mut EqVector, _: &VolumeVariables, _: &Indices) {}

    fn add_phase_storage(_: &mut EqVector, _: &VolumeVariables, _: usize, _: &Indices) {}

    fn add_advective_flux(_: &mut RateVector, _: &VolumeVariables, _: usize, _: f64, _: &Indices) {}

    fn add_conductive_flux(
        _: &mut RateVector,
        _: &VolumeVariables,
        _: &VolumeVariables,
        _: f64,
        _: f64,
        _: &Indices,
    ) {
    }
}

/// Local thermal equilibrium between the fluids and the solid matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thermal;

impl Thermal {
    fn eq_idx(indices: &Indices) -> usize {
        indices
            .energy_eq_idx()
            .unwrap_or_else(|| panic!("thermal energy module used without an energy equation"))
    }
}

impl EnergyModule for Thermal {
    const ENABLED: bool = true;

    fn add_storage(storage: &mut EqVector, vv: &VolumeVariables, indices: &Indices) {
        let e = Self::eq_idx(indices);
        for phase in 0..indices.num_phases() {
            Self::add_phase_storage(storage, vv, phase, indices);
        }
        storage[e] += (1.0 - vv.porosity) * vv.solid_heat_capacity * vv.temperature();
    }

    fn add_phase_storage(storage: &mut EqVector, vv: &VolumeVariables, phase: usize, indices: &Indices) {
        let e = Self::eq_idx(indices);
        let fs = &vv.fluid_state;
        storage[e] += vv.porosity
            * fs.saturation(phase)
            * fs.molar_density(phase)
            * vv.molar_internal_energy[phase];
    }

    fn add_advective_flux(
        flux: &mut RateVector,
        upstream: &VolumeVariables,
        phase: usize,
        phase_molar_flux: f64,
        indices: &Indices,
    ) {
        flux[Self::eq_idx(indices)] += phase_molar_flux * upstream.molar_enthalpy[phase];
    }

    fn add_conductive_flux(
        flux: &mut RateVector,
        inside: &VolumeVariables,
        outside: &VolumeVariables,
        area: f64,
        distance: f64,
        indices: &Indices,
    ) {
        let lambda = 0.5 * (inside.thermal_conductivity + outside.thermal_conductivity);
        let grad_t = (outside.temperature() - inside.temperature()) / distance;
        flux[Self::eq_idx(indices)] -= lambda * grad_t * area;
    }
}
