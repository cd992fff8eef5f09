//! Global assembly over a small closed column.

use pf_core::units::m;
use pf_fluids::{ConstantFugacitySystem, FluidStateAccess, FluidSystem, GAS_IDX, LIQUID_IDX};
use pf_model::{
    Assembler, BoundaryCondition, FvGrid, Indices, Isothermal, LineGrid, ModelError, NcpLocalResidual,
    PrimaryVariables, Problem, SpatialParams, Thermal, phase_ncp,
};

const T: f64 = 293.15;

struct ClosedColumn {
    fluid: ConstantFugacitySystem,
    indices: Indices,
}

impl ClosedColumn {
    fn new() -> Self {
        Self {
            fluid: ConstantFugacitySystem::new(),
            indices: Indices::new(2, 2, false).unwrap(),
        }
    }

    fn state(&self, p: f64, s_gas: f64) -> PrimaryVariables {
        let f_w = self.fluid.vapor_pressure(T);
        PrimaryVariables::from_vec(vec![p, s_gas, f_w, p - f_w])
    }
}

impl Problem for ClosedColumn {
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
        T
    }
    fn boundary_condition(&self, _boundary_id: usize) -> BoundaryCondition {
        BoundaryCondition::NoFlow
    }
}

fn setup() -> (LineGrid, ClosedColumn) {
    (LineGrid::new(m(3.0), 3).unwrap(), ClosedColumn::new())
}

#[test]
fn uniform_state_has_zero_balance_residual() {
    let (grid, problem) = setup();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let solution = vec![problem.state(1e5, 0.3); grid.num_dofs()];
    let vv = assembler.volume_variables(&solution).unwrap();

    let assembled = assembler.assemble(&vv, &vv, &vv, 60.0).unwrap();
    for row in &assembled.residual {
        assert_eq!(row[0], 0.0);
        assert_eq!(row[1], 0.0);
    }
    assert_eq!(assembler.residual(&vv, &vv, &vv, 60.0).unwrap().len(), assembler.system_size());
}

#[test]
fn complementarity_rows_sum_over_adjacent_elements() {
    let (grid, problem) = setup();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let solution = vec![problem.state(1e5, 0.3); grid.num_dofs()];
    let vv = assembler.volume_variables(&solution).unwrap();
    let assembled = assembler.assemble(&vv, &vv, &vv, 60.0).unwrap();

    let ncp0 = problem.indices.phase0_ncp_idx();
    let fs = &vv[0].fluid_state;
    let pointwise = phase_ncp(fs, fs, LIQUID_IDX);
    assert_eq!(assembled.residual[0][ncp0 + LIQUID_IDX], pointwise);
    assert_eq!(assembled.residual[1][ncp0 + LIQUID_IDX], 2.0 * pointwise);
    assert_eq!(assembled.residual[3][ncp0 + LIQUID_IDX], pointwise);
}

#[test]
fn closed_column_conserves_moles() {
    let (grid, problem) = setup();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let previous = vec![problem.state(1e5, 0.3); grid.num_dofs()];
    let current = vec![
        problem.state(1.3e5, 0.2),
        problem.state(1.1e5, 0.3),
        problem.state(1e5, 0.4),
        problem.state(0.9e5, 0.5),
    ];
    let vv_prev = assembler.volume_variables(&previous).unwrap();
    let vv_cur = assembler.volume_variables(&current).unwrap();
    let assembled = assembler.assemble(&vv_cur, &vv_prev, &vv_cur, 60.0).unwrap();

    // Interior fluxes cancel, so the balances sum to the storage change alone.
    for comp in 0..2 {
        let balance: f64 = assembled.residual.iter().map(|r| r[comp]).sum();
        let storage: f64 = assembled.storage_term.iter().map(|s| s[comp]).sum();
        assert!((balance - storage).abs() <= 1e-9 * storage.abs().max(1.0));
    }
}

#[test]
fn gas_inventory_vanishes_without_gas() {
    let (grid, problem) = setup();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let dry = assembler
        .volume_variables(&vec![problem.state(1e5, 0.0); grid.num_dofs()])
        .unwrap();
    let wet = assembler
        .volume_variables(&vec![problem.state(1e5, 0.5); grid.num_dofs()])
        .unwrap();

    let none = assembler.phase_inventory(&dry, GAS_IDX).unwrap();
    let some = assembler.phase_inventory(&wet, GAS_IDX).unwrap();
    assert_eq!(none[1], 0.0);
    assert!(some[1] > 0.0);

    // Liquid and gas together hold the whole pore content: φ · L · (S_l ρ_l x_l + S_g ρ_g x_g).
    let liquid = assembler.phase_inventory(&wet, LIQUID_IDX).unwrap();
    let fs = &wet[0].fluid_state;
    let expected: f64 = [LIQUID_IDX, GAS_IDX]
        .iter()
        .map(|&phase| 0.3 * 3.0 * 0.5 * fs.molar_density(phase) * fs.mole_fraction(phase, 0))
        .sum();
    assert!(((liquid[0] + some[0]) - expected).abs() <= 1e-9 * expected);
}

#[test]
fn reject_mismatched_lengths() {
    let (grid, problem) = setup();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let short = vec![problem.state(1e5, 0.3); 2];
    assert!(matches!(
        assembler.volume_variables(&short),
        Err(ModelError::DimensionMismatch { expected: 4, actual: 2, .. })
    ));

    let vv = assembler
        .volume_variables(&vec![problem.state(1e5, 0.3); grid.num_dofs()])
        .unwrap();
    assert!(assembler.assemble(&vv, &vv[..3], &vv, 1.0).is_err());
    assert!(assembler.assemble(&vv, &vv, &vv, 0.0).is_err());
    assert!(assembler.phase_inventory(&vv, 2).is_err());
}

#[test]
fn branches_follow_evaluation_point() {
    let (grid, problem) = setup();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let mut solution = vec![problem.state(1e5, 0.3); grid.num_dofs()];
    solution[2] = PrimaryVariables::from_vec(vec![1e5, 0.0, 1000.0, 5e4]);
    let vv = assembler.volume_variables(&solution).unwrap();

    let branches = assembler.phase_branches(&vv);
    assert!(!branches[2][GAS_IDX].phase_exists());
    assert!(branches[2][LIQUID_IDX].phase_exists());
}

#[test]
fn thermal_residual_rejects_isothermal_problem() {
    let (grid, problem) = setup();
    let result = Assembler::new(&grid, &problem, NcpLocalResidual::<Thermal>::new());
    assert!(matches!(result, Err(ModelError::InvalidArg { .. })));
}

#[test]
fn isothermal_residual_rejects_energy_equation() {
    let (grid, mut problem) = setup();
    problem.indices = Indices::new(2, 2, true).unwrap();
    let result = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new());
    assert!(matches!(result, Err(ModelError::InvalidArg { .. })));
}
