//! Component mass (mole) balances.

use crate::energy::EnergyModule;
use crate::indices::Indices;
use crate::vectors::{EqVector, RateVector};
use crate::volume_variables::VolumeVariables;
use pf_fluids::FluidStateAccess;

/// Molar storage, advection and diffusion of every component in every phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct MassModule;

impl MassModule {
    /// Moles of each component per unit volume, summed over phases.
    pub fn add_storage(storage: &mut EqVector, vv: &VolumeVariables, indices: &Indices) {
        for phase in 0..indices.num_phases() {
            Self::add_phase_storage(storage, vv, phase, indices);
        }
    }

    /// Moles of each component per unit volume held in `phase`.
    pub fn add_phase_storage(
        storage: &mut EqVector,
        vv: &VolumeVariables,
        phase: usize,
        indices: &Indices,
    ) {
        let fs = &vv.fluid_state;
        let phase_moles = vv.porosity * fs.saturation(phase) * fs.molar_density(phase);
        for comp in 0..indices.num_components() {
            storage[indices.conti0_eq_idx() + comp] += phase_moles * fs.mole_fraction(phase, comp);
        }
    }

    /// Flux over a face from `inside` to `outside` [mol/s], including the
    /// energy carried by it.
    ///
    /// `area` must already include the extrusion factor.
    pub fn compute_flux<E: EnergyModule>(
        flux: &mut RateVector,
        inside: &VolumeVariables,
        outside: &VolumeVariables,
        area: f64,
        distance: f64,
        indices: &Indices,
    ) {
        Self::add_advective_flux::<E>(flux, inside, outside, area, distance, indices);
        Self::add_diffusive_flux(flux, inside, outside, area, distance, indices);
        E::add_conductive_flux(flux, inside, outside, area, distance, indices);
    }

    /// Internal source per unit volume.
    ///
    /// Interphase transfer is expressed by the complementarity rows rather
    /// than as a rate, so there is nothing to add for an equilibrium model.
    pub fn compute_source(_source: &mut RateVector, _vv: &VolumeVariables, _indices: &Indices) {}

    fn add_advective_flux<E: EnergyModule>(
        flux: &mut RateVector,
        inside: &VolumeVariables,
        outside: &VolumeVariables,
        area: f64,
        distance: f64,
        indices: &Indices,
    ) {
        let k = harmonic_mean(inside.permeability, outside.permeability);
        // Phases share one pressure, so one Darcy velocity factor serves all.
        let grad_p = (outside.pressure() - inside.pressure()) / distance;
        let darcy_factor = -k * grad_p * area;

        for phase in 0..indices.num_phases() {
            let upstream = if darcy_factor >= 0.0 { inside } else { outside };
            let fs = &upstream.fluid_state;
            let phase_molar_flux = darcy_factor * upstream.mobility[phase] * fs.molar_density(phase);
            if phase_molar_flux == 0.0 {
                continue;
            }
            for comp in 0..indices.num_components() {
                flux[indices.conti0_eq_idx() + comp] += phase_molar_flux * fs.mole_fraction(phase, comp);
            }
            E::add_advective_flux(flux, upstream, phase, phase_molar_flux, indices);
        }
    }

    fn add_diffusive_flux(
        flux: &mut RateVector,
        inside: &VolumeVariables,
        outside: &VolumeVariables,
        area: f64,
        distance: f64,
        indices: &Indices,
    ) {
        let (fs_in, fs_out) = (&inside.fluid_state, &outside.fluid_state);
        for phase in 0..indices.num_phases() {
            let conductance = |vv: &VolumeVariables| {
                let fs = &vv.fluid_state;
                vv.porosity
                    * fs.saturation(phase).max(0.0)
                    * fs.molar_density(phase)
                    * vv.diffusion_coefficient[phase]
            };
            let d_eff = 0.5 * (conductance(inside) + conductance(outside));
            if d_eff == 0.0 {
                continue;
            }
            for comp in 0..indices.num_components() {
                let grad_x = (fs_out.mole_fraction(phase, comp) - fs_in.mole_fraction(phase, comp)) / distance;
                flux[indices.conti0_eq_idx() + comp] -= d_eff * grad_x * area;
            }
        }
    }
}

fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b == 0.0 {
        0.0
    } else {
        2.0 * a * b / (a + b)
    }
}
