//! Building model objects from a [`SimulationConfig`].

use nalgebra::DVector;
use pf_core::units::{k, m};
use pf_fluids::ConstantFugacitySystem;
use pf_model::{
    Assembler, BoundaryCondition, EnergyModule, LineGrid, ModelResult, NcpLocalResidual, PrimaryVariables,
    RateVector, SpatialParams,
};
use pf_project::{BoundaryDef, SimulationConfig};
use pf_sim::{ColumnProblem, SimOptions, SimRecord, SimResult, run_sim_with_progress};
use pf_solver::{NewtonSettings, RelativeDefectController, RelativeDefectSettings, SolverResult};

/// Index of the pressure unknown in each block.
const PRESSURE_IDX: usize = 0;
/// Index of the gas saturation unknown in each block.
const SATURATION_IDX: usize = 1;

pub fn build_grid(config: &SimulationConfig) -> ModelResult<LineGrid> {
    LineGrid::new(m(config.domain.length), config.domain.cells)
}

pub fn build_problem(config: &SimulationConfig) -> ModelResult<ColumnProblem> {
    let params = SpatialParams {
        porosity: config.domain.porosity,
        permeability: config.domain.permeability,
        extrusion_factor: config.domain.area,
        ..SpatialParams::default()
    };
    let column = ColumnProblem::new(
        ConstantFugacitySystem::new(),
        config.fluid.enable_energy,
        params,
        k(config.fluid.temperature),
    )?;

    let left = boundary_condition(&column, &config.boundaries.left);
    let right = boundary_condition(&column, &config.boundaries.right);
    Ok(column
        .with_boundary(LineGrid::LEFT, left)
        .with_boundary(LineGrid::RIGHT, right))
}

fn boundary_condition(column: &ColumnProblem, def: &BoundaryDef) -> BoundaryCondition {
    match def {
        BoundaryDef::NoFlow => BoundaryCondition::NoFlow,
        BoundaryDef::Neumann { rates } => BoundaryCondition::Neumann(RateVector::from_vec(rates.clone())),
        BoundaryDef::Dirichlet {
            pressure,
            gas_saturation,
            water_fugacity,
            air_fugacity,
        } => BoundaryCondition::Dirichlet(state(
            column,
            *pressure,
            *gas_saturation,
            *water_fugacity,
            *air_fugacity,
        )),
    }
}

/// State at the column temperature; missing fugacities are taken at
/// coexistence.
fn state(
    column: &ColumnProblem,
    pressure: f64,
    gas_saturation: f64,
    water_fugacity: Option<f64>,
    air_fugacity: Option<f64>,
) -> PrimaryVariables {
    let coexisting = column.coexisting_state(pressure, gas_saturation);
    column.state(
        pressure,
        gas_saturation,
        water_fugacity.unwrap_or(coexisting[2]),
        air_fugacity.unwrap_or(coexisting[3]),
    )
}

/// Uniform initial solution over all degrees of freedom.
pub fn initial_solution(column: &ColumnProblem, num_dofs: usize, config: &SimulationConfig) -> Vec<PrimaryVariables> {
    let initial = &config.initial;
    let pv = state(
        column,
        initial.pressure,
        initial.gas_saturation,
        initial.water_fugacity,
        initial.air_fugacity,
    );
    vec![pv; num_dofs]
}

pub fn build_controller(config: &SimulationConfig) -> SolverResult<RelativeDefectController> {
    let mut settings = RelativeDefectSettings::new(
        config.fluid.num_eq(),
        PRESSURE_IDX,
        SATURATION_IDX,
        config.newton.max_time_step_size,
    );
    settings.newton = NewtonSettings {
        rel_tolerance: config.newton.rel_tolerance,
        target_steps: config.newton.target_steps,
        max_steps: config.newton.max_steps,
    };
    RelativeDefectController::new(settings)
}

pub fn sim_options(config: &SimulationConfig) -> SimOptions {
    SimOptions {
        dt_initial: config.time.dt_initial,
        t_end: config.time.t_end,
        record_every: config.time.record_every,
        min_dt: config.time.min_dt,
        max_retries: config.time.max_retries,
        ..SimOptions::default()
    }
}

/// Run the configured column with energy module `E`.
pub fn simulate<E: EnergyModule>(
    config: &SimulationConfig,
    progress: Option<&mut dyn FnMut(pf_sim::SimProgress)>,
) -> SimResult<SimRecord> {
    let grid = build_grid(config)?;
    let column = build_problem(config)?;
    let assembler = Assembler::new(&grid, &column, NcpLocalResidual::<E>::new())?;

    let initial: DVector<f64> = assembler.flatten_solution(&initial_solution(&column, assembler.num_dofs(), config));
    let mut controller = build_controller(config)?;
    run_sim_with_progress(&assembler, &mut controller, initial, &sim_options(config), progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_fluids::FluidSystem;
    use pf_model::{FvGrid, Isothermal, Problem};
    use pf_project::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            version: LATEST_VERSION,
            name: "test".to_string(),
            newton: NewtonDef::default(),
            time: TimeDef {
                t_end: 20.0,
                dt_initial: 10.0,
                min_dt: 0.1,
                max_retries: 5,
                record_every: 1,
            },
            domain: DomainDef {
                length: 1.0,
                cells: 4,
                area: 0.5,
                porosity: 0.3,
                permeability: 1e-12,
            },
            fluid: FluidDef {
                temperature: 293.15,
                enable_energy: false,
            },
            initial: InitialStateDef {
                pressure: 1e5,
                gas_saturation: 0.4,
                water_fugacity: None,
                air_fugacity: None,
            },
            boundaries: BoundariesDef::default(),
        }
    }

    #[test]
    fn domain_maps_to_spatial_params() {
        let column = build_problem(&config()).unwrap();
        let params = column.spatial_params(0);
        assert_eq!(params.porosity, 0.3);
        assert_eq!(params.extrusion_factor, 0.5);
        assert_eq!(build_grid(&config()).unwrap().num_dofs(), 5);
    }

    #[test]
    fn missing_fugacities_default_to_coexistence() {
        let column = build_problem(&config()).unwrap();
        let pv = initial_solution(&column, 3, &config());
        let (f_w, f_a) = column.fluid().coexistence_fugacities(1e5, 293.15);
        assert_eq!(pv.len(), 3);
        assert_eq!(pv[0][2], f_w);
        assert_eq!(pv[0][3], f_a);
    }

    #[test]
    fn boundaries_are_mapped() {
        let mut config = config();
        config.boundaries.left = BoundaryDef::Neumann {
            rates: vec![0.0, -1e-5, 0.0, 0.0],
        };
        config.boundaries.right = BoundaryDef::Dirichlet {
            pressure: 2e5,
            gas_saturation: 0.0,
            water_fugacity: Some(2000.0),
            air_fugacity: None,
        };
        let column = build_problem(&config).unwrap();

        assert_eq!(
            column.boundary_condition(LineGrid::LEFT),
            BoundaryCondition::Neumann(RateVector::from_vec(vec![0.0, -1e-5, 0.0, 0.0]))
        );
        let BoundaryCondition::Dirichlet(pv) = column.boundary_condition(LineGrid::RIGHT) else {
            panic!("expected a Dirichlet condition");
        };
        assert_eq!(pv[0], 2e5);
        assert_eq!(pv[2], 2000.0);
        assert_eq!(pv[3], column.fluid().coexistence_fugacities(2e5, 293.15).1);
    }

    #[test]
    fn controller_uses_configured_settings() {
        let mut config = config();
        config.newton.max_time_step_size = 50.0;
        config.fluid.enable_energy = true;
        let controller = build_controller(&config).unwrap();
        assert_eq!(controller.max_time_step_size(), 50.0);
        assert_eq!(build_problem(&config).unwrap().fluid().num_phases(), 2);
    }

    #[test]
    fn closed_equilibrium_column_runs() {
        let record = simulate::<Isothermal>(&config(), None).unwrap();
        assert_eq!(record.t.last().copied(), Some(20.0));
        assert_eq!(record.cutback_retries, 0);
    }
}
