//! Secondary variables of one sub-control volume.

use crate::error::{ModelError, ModelResult};
use crate::indices::Indices;
use crate::problem::Problem;
use crate::vectors::PrimaryVariables;
use pf_core::units::{k, pa};
use pf_fluids::{FluidState, FluidStateAccess};

/// Everything the mass and energy sub-models need about one control volume
/// at one time level, derived from its primary variables.
#[derive(Debug, Clone)]
pub struct VolumeVariables {
    pub primary: PrimaryVariables,
    pub fluid_state: FluidState,
    pub porosity: f64,
    pub permeability: f64,
    pub extrusion_factor: f64,
    /// Relative permeability over viscosity, per phase [1/(Pa·s)]
    pub mobility: Vec<f64>,
    /// Molecular diffusion coefficient, per phase [m²/s]
    pub diffusion_coefficient: Vec<f64>,
    /// Molar enthalpy, per phase [J/mol]
    pub molar_enthalpy: Vec<f64>,
    /// Molar internal energy, per phase [J/mol]
    pub molar_internal_energy: Vec<f64>,
    /// Volumetric heat capacity of the solid matrix [J/(m³·K)]
    pub solid_heat_capacity: f64,
    /// Effective thermal conductivity of the saturated medium [W/(m·K)]
    pub thermal_conductivity: f64,
}

impl VolumeVariables {
    /// Derive the secondary variables of `dof` from its primary variables.
    pub fn update(
        primary: &PrimaryVariables,
        problem: &dyn Problem,
        dof: usize,
    ) -> ModelResult<Self> {
        let indices = problem.indices();
        let fluid = problem.fluid_system();
        if primary.len() != indices.num_eq() {
            return Err(ModelError::DimensionMismatch {
                what: "primary variables",
                expected: indices.num_eq(),
                actual: primary.len(),
            });
        }

        let num_phases = indices.num_phases();
        let num_components = indices.num_components();
        let p = primary[indices.pressure0_idx()];
        let t = match indices.temperature_idx() {
            Some(t_idx) => primary[t_idx],
            None => problem.temperature(dof),
        };

        let mut fs = FluidState::new(num_phases, num_components, pa(p), k(t))
            .map_err(|source| ModelError::Fluid { dof, source })?;

        let mut s0 = 1.0;
        for phase in 1..num_phases {
            let s = saturation_of(primary, &indices, phase);
            fs.set_saturation(phase, s);
            s0 -= s;
        }
        fs.set_saturation(0, s0);

        for phase in 0..num_phases {
            for comp in 0..num_components {
                let f = primary[indices.fugacity0_idx() + comp];
                let phi = fluid.fugacity_coefficient(phase, comp, p, t);
                fs.set_mole_fraction(phase, comp, f / (phi * p));
            }
            fs.set_molar_density(phase, fluid.molar_density(phase, p, t));
        }

        let params = problem.spatial_params(dof);
        let mut mobility = Vec::with_capacity(num_phases);
        let mut diffusion_coefficient = Vec::with_capacity(num_phases);
        let mut molar_enthalpy = Vec::with_capacity(num_phases);
        let mut molar_internal_energy = Vec::with_capacity(num_phases);
        let mut fluid_conductivity = 0.0;

        for phase in 0..num_phases {
            let s = fs.saturation(phase);
            let kr = s.clamp(0.0, 1.0);
            mobility.push(kr / fluid.viscosity(phase, p, t));
            diffusion_coefficient.push(fluid.diffusion_coefficient(phase, p, t));

            // Enthalpy of the phase composition, normalized so an absent phase
            // (fractions summing below one) still carries a sensible value.
            let sum_x = fs.sum_mole_fractions(phase);
            let h = if sum_x > 0.0 {
                (0..num_components)
                    .map(|comp| fs.mole_fraction(phase, comp) * fluid.component_enthalpy(phase, comp, t))
                    .sum::<f64>()
                    / sum_x
            } else {
                0.0
            };
            molar_enthalpy.push(h);
            molar_internal_energy.push(h - p / fs.molar_density(phase));
            fluid_conductivity += kr * fluid.thermal_conductivity(phase);
        }

        let thermal_conductivity = params.porosity * fluid_conductivity
            + (1.0 - params.porosity) * params.solid_conductivity;

        Ok(Self {
            primary: primary.clone(),
            fluid_state: fs,
            porosity: params.porosity,
            permeability: params.permeability,
            extrusion_factor: params.extrusion_factor,
            mobility,
            diffusion_coefficient,
            molar_enthalpy,
            molar_internal_energy,
            solid_heat_capacity: params.solid_density * params.solid_heat_capacity,
            thermal_conductivity,
        })
    }

    pub fn pressure(&self) -> f64 {
        self.fluid_state.pressure().value
    }

    pub fn temperature(&self) -> f64 {
        self.fluid_state.temperature().value
    }
}

fn saturation_of(primary: &PrimaryVariables, indices: &Indices, phase: usize) -> f64 {
    match indices.saturation_idx(phase) {
        Some(idx) => primary[idx],
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{BoundaryCondition, SpatialParams};
    use pf_fluids::{AIR_IDX, ConstantFugacitySystem, FluidSystem, GAS_IDX, LIQUID_IDX, WATER_IDX};

    struct Fixture {
        fluid: ConstantFugacitySystem,
        indices: Indices,
    }

    impl Problem for Fixture {
        fn fluid_system(&self) -> &dyn FluidSystem {
            &self.fluid
        }
        fn indices(&self) -> Indices {
            self.indices
        }
        fn spatial_params(&self, _dof: usize) -> SpatialParams {
            SpatialParams::default()
        }
        fn temperature(&self, _dof: usize) -> f64 {
            293.15
        }
        fn boundary_condition(&self, _boundary_id: usize) -> BoundaryCondition {
            BoundaryCondition::NoFlow
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            fluid: ConstantFugacitySystem::new(),
            indices: Indices::new(2, 2, false).unwrap(),
        }
    }

    #[test]
    fn saturations_and_fractions_follow_primary_variables() {
        let problem = fixture();
        let p = 2e5;
        let f_w = problem.fluid.vapor_pressure(293.15);
        let pv = PrimaryVariables::from_vec(vec![p, 0.25, f_w, p - f_w]);
        let vv = VolumeVariables::update(&pv, &problem, 0).unwrap();
        let fs = &vv.fluid_state;

        assert!((fs.saturation(LIQUID_IDX) - 0.75).abs() < 1e-15);
        assert!((fs.saturation(GAS_IDX) - 0.25).abs() < 1e-15);
        assert!((fs.sum_mole_fractions(GAS_IDX) - 1.0).abs() < 1e-12);
        assert!((fs.mole_fraction(LIQUID_IDX, WATER_IDX) - 1.0).abs() < 1e-12);
        assert!(fs.mole_fraction(LIQUID_IDX, AIR_IDX) > 0.0);
        assert!(vv.mobility[GAS_IDX] > vv.mobility[LIQUID_IDX]);
    }

    #[test]
    fn absent_phase_has_no_mobility() {
        let problem = fixture();
        let pv = PrimaryVariables::from_vec(vec![1e5, 0.0, 2000.0, 1000.0]);
        let vv = VolumeVariables::update(&pv, &problem, 0).unwrap();
        assert_eq!(vv.mobility[GAS_IDX], 0.0);
        assert!(vv.fluid_state.sum_mole_fractions(GAS_IDX) < 1.0);
    }

    #[test]
    fn negative_pressure_reports_dof() {
        let problem = fixture();
        let pv = PrimaryVariables::from_vec(vec![-1.0, 0.0, 2000.0, 1000.0]);
        let err = VolumeVariables::update(&pv, &problem, 7).unwrap_err();
        assert!(matches!(err, ModelError::Fluid { dof: 7, .. }));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let problem = fixture();
        let pv = PrimaryVariables::from_vec(vec![1e5, 0.0, 2000.0]);
        assert!(VolumeVariables::update(&pv, &problem, 0).is_err());
    }
}
