//! Cutback retry test for the implicit time loop.

use nalgebra::DVector;
use pf_core::units::{k, m};
use pf_fluids::ConstantFugacitySystem;
use pf_model::{Assembler, FvGrid, Isothermal, LineGrid, NcpLocalResidual, SpatialParams};
use pf_sim::{ColumnProblem, SimError, SimOptions, run_sim};
use pf_solver::{NewtonController, NewtonSettings, RelativeDefectController, RelativeDefectSettings};

/// Reports the first `failures_left` solves as unconverged.
struct FailingController {
    inner: RelativeDefectController,
    failures_left: usize,
}

impl NewtonController for FailingController {
    fn settings(&self) -> &NewtonSettings {
        self.inner.settings()
    }
    fn num_steps(&self) -> usize {
        self.inner.num_steps()
    }
    fn error(&self) -> f64 {
        self.inner.error()
    }
    fn newton_begin(&mut self, u: &DVector<f64>) {
        self.inner.newton_begin(u);
    }
    fn newton_end_step(&mut self, u: &DVector<f64>, u_old: &DVector<f64>) {
        self.inner.newton_end_step(u, u_old);
    }
    fn newton_converged(&self) -> bool {
        self.failures_left == 0 && self.inner.newton_converged()
    }
    fn newton_succeed(&mut self) {
        self.inner.newton_succeed();
    }
    fn newton_fail(&mut self) {
        self.failures_left = self.failures_left.saturating_sub(1);
        self.inner.newton_fail();
    }
    fn suggest_time_step_size(&self, old_dt: f64) -> f64 {
        self.inner.suggest_time_step_size(old_dt)
    }
}

fn column() -> (LineGrid, ColumnProblem) {
    let grid = LineGrid::new(m(1.0), 3).unwrap();
    let problem = ColumnProblem::new(ConstantFugacitySystem::new(), false, SpatialParams::default(), k(293.15)).unwrap();
    (grid, problem)
}

fn controller(failures_left: usize) -> FailingController {
    FailingController {
        inner: RelativeDefectController::new(RelativeDefectSettings::new(4, 0, 1, 1e4)).unwrap(),
        failures_left,
    }
}

#[test]
fn transient_cutback_retries_step() {
    let (grid, problem) = column();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let initial = assembler.flatten_solution(&vec![problem.coexisting_state(1e5, 0.3); grid.num_dofs()]);

    let opts = SimOptions {
        dt_initial: 10.0,
        t_end: 20.0,
        max_steps: 10,
        record_every: 1,
        min_dt: 0.1,
        max_retries: 4,
    };
    let mut c = controller(1);
    let record = run_sim(&assembler, &mut c, initial, &opts).expect("cutback retry should succeed");

    assert_eq!(record.cutback_retries, 1);
    assert!(record.t.len() >= 2, "Expected at least one step recorded");
    // A failed solve halves the next proposal.
    assert_eq!(record.dt[1], 5.0);
    assert_eq!(*record.t.last().unwrap(), 20.0);
    assert_eq!(c.failures_left, 0, "Failure should have been consumed by retry");
}

#[test]
fn persistent_failure_is_reported() {
    let (grid, problem) = column();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let initial = assembler.flatten_solution(&vec![problem.coexisting_state(1e5, 0.3); grid.num_dofs()]);

    let opts = SimOptions {
        dt_initial: 10.0,
        t_end: 20.0,
        max_steps: 10,
        record_every: 1,
        min_dt: 0.1,
        max_retries: 2,
    };
    let mut c = controller(usize::MAX);
    let err = run_sim(&assembler, &mut c, initial, &opts).unwrap_err();
    assert!(matches!(err, SimError::StepFailed { retries: 3, .. }), "{err}");
}

#[test]
fn cutback_below_min_dt_is_reported() {
    let (grid, problem) = column();
    let assembler = Assembler::new(&grid, &problem, NcpLocalResidual::<Isothermal>::new()).unwrap();
    let initial = assembler.flatten_solution(&vec![problem.coexisting_state(1e5, 0.3); grid.num_dofs()]);

    let opts = SimOptions {
        dt_initial: 1.0,
        t_end: 20.0,
        max_steps: 10,
        record_every: 1,
        min_dt: 0.6,
        max_retries: 10,
    };
    let mut c = controller(usize::MAX);
    let err = run_sim(&assembler, &mut c, initial, &opts).unwrap_err();
    assert!(matches!(err, SimError::StepFailed { retries: 1, .. }), "{err}");
}
