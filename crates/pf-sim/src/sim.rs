//! Adaptive implicit time loop and result recording.

use crate::error::{SimError, SimResult};
use nalgebra::DVector;
use pf_model::{Assembler, EnergyModule, EqVector, FvGrid, NcpBranch, NcpLocalResidual, VolumeVariables};
use pf_solver::{NewtonController, TimeStepProblem, newton_solve};
use tracing::{info, warn};

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// First time step attempted (seconds)
    pub dt_initial: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of accepted steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Smallest step a cutback may produce (seconds)
    pub min_dt: f64,
    /// Failed attempts allowed per step
    pub max_retries: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt_initial: 1.0,
            t_end: 3600.0,
            max_steps: 100_000,
            record_every: 1,
            min_dt: 1e-6,
            max_retries: 10,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !self.dt_initial.is_finite() || self.dt_initial <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt_initial must be positive",
            });
        }
        if !self.t_end.is_finite() || self.t_end < 0.0 {
            return Err(SimError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        if !self.min_dt.is_finite() || self.min_dt <= 0.0 || self.min_dt > self.dt_initial {
            return Err(SimError::InvalidArg {
                what: "min_dt must be positive and not above dt_initial",
            });
        }
        Ok(())
    }
}

/// A phase appearing or vanishing at one degree of freedom.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseChange {
    /// End time of the step in which the change happened (seconds)
    pub t: f64,
    pub dof: usize,
    pub phase: usize,
    pub appeared: bool,
}

/// Record of simulation results.
#[derive(Clone, Debug, Default)]
pub struct SimRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Size of the step ending at each time point (zero for the initial state)
    pub dt: Vec<f64>,
    /// Newton iterations of the step ending at each time point
    pub iterations: Vec<usize>,
    /// Solution snapshots
    pub x: Vec<DVector<f64>>,
    /// Domain inventory per phase at each time point
    pub phase_inventory: Vec<Vec<EqVector>>,
    pub phase_changes: Vec<PhaseChange>,
    /// Accepted steps
    pub steps: usize,
    /// Failed Newton solves that were retried with a smaller step
    pub cutback_retries: usize,
}

/// Progress snapshot reported after each accepted step.
#[derive(Clone, Debug)]
pub struct SimProgress {
    pub sim_time: f64,
    pub t_end: f64,
    pub fraction_complete: f64,
    pub step: usize,
    pub dt: f64,
    pub cutback_retries: usize,
}

/// Run the implicit time loop from `initial` at `t = 0` to `opts.t_end`.
pub fn run_sim<G, E, C>(
    assembler: &Assembler<'_, G, NcpLocalResidual<E>>,
    controller: &mut C,
    initial: DVector<f64>,
    opts: &SimOptions,
) -> SimResult<SimRecord>
where
    G: FvGrid,
    E: EnergyModule,
    C: NewtonController + ?Sized,
{
    run_sim_with_progress(assembler, controller, initial, opts, None)
}

pub fn run_sim_with_progress<G, E, C>(
    assembler: &Assembler<'_, G, NcpLocalResidual<E>>,
    controller: &mut C,
    initial: DVector<f64>,
    opts: &SimOptions,
    mut progress_cb: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimRecord>
where
    G: FvGrid,
    E: EnergyModule,
    C: NewtonController + ?Sized,
{
    opts.validate()?;

    let mut t = 0.0;
    let mut x = initial;
    let mut dt = opts.dt_initial;
    let mut record = SimRecord::default();

    let vv = assembler.volume_variables(&assembler.split_solution(&x)?)?;
    let mut branches = assembler.phase_branches(&vv);
    push_record(&mut record, assembler, t, 0.0, 0, &x, &vv)?;

    let mut step = 0;
    let mut recorded_last = true;
    let mut last = (0.0, 0);
    while t < opts.t_end && step < opts.max_steps {
        dt = dt.min(opts.t_end - t);

        let mut retries = 0;
        let (x_new, iterations) = loop {
            let mut problem = TimeStepProblem::new(assembler, &x, dt)?;
            let mut u = x.clone();
            let outcome = newton_solve(&mut problem, controller, &mut u)?;
            if outcome.converged {
                break (u, outcome.iterations);
            }

            retries += 1;
            record.cutback_retries += 1;
            let new_dt = controller.suggest_time_step_size(dt);
            if retries > opts.max_retries || new_dt < opts.min_dt {
                return Err(SimError::StepFailed { t, dt, retries });
            }
            warn!(t, dt, new_dt, retries, "newton failed, cutting back time step");
            dt = new_dt;
        };

        x = x_new;
        t = if dt >= opts.t_end - t { opts.t_end } else { t + dt };
        step += 1;
        last = (dt, iterations);
        info!(step, t, dt, iterations, "time step accepted");

        let vv = assembler.volume_variables(&assembler.split_solution(&x)?)?;
        let new_branches = assembler.phase_branches(&vv);
        log_phase_changes(assembler, &branches, &new_branches, t, &mut record.phase_changes);
        branches = new_branches;

        recorded_last = step % opts.record_every == 0;
        if recorded_last {
            push_record(&mut record, assembler, t, dt, iterations, &x, &vv)?;
        }

        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(SimProgress {
                sim_time: t,
                t_end: opts.t_end,
                fraction_complete: if opts.t_end > 0.0 { (t / opts.t_end).min(1.0) } else { 1.0 },
                step,
                dt,
                cutback_retries: record.cutback_retries,
            });
        }

        dt = controller.suggest_time_step_size(dt);
    }

    // Always record final state
    if !recorded_last {
        let vv = assembler.volume_variables(&assembler.split_solution(&x)?)?;
        push_record(&mut record, assembler, t, last.0, last.1, &x, &vv)?;
    }

    record.steps = step;
    Ok(record)
}

fn push_record<G: FvGrid, E: EnergyModule>(
    record: &mut SimRecord,
    assembler: &Assembler<'_, G, NcpLocalResidual<E>>,
    t: f64,
    dt: f64,
    iterations: usize,
    x: &DVector<f64>,
    vv: &[VolumeVariables],
) -> SimResult<()> {
    let num_phases = assembler.problem().indices().num_phases();
    let inventory = (0..num_phases)
        .map(|phase| assembler.phase_inventory(vv, phase))
        .collect::<Result<Vec<_>, _>>()?;

    record.t.push(t);
    record.dt.push(dt);
    record.iterations.push(iterations);
    record.x.push(x.clone());
    record.phase_inventory.push(inventory);
    Ok(())
}

fn log_phase_changes<G: FvGrid, E: EnergyModule>(
    assembler: &Assembler<'_, G, NcpLocalResidual<E>>,
    old: &[Vec<NcpBranch>],
    new: &[Vec<NcpBranch>],
    t: f64,
    changes: &mut Vec<PhaseChange>,
) {
    let fluid = assembler.problem().fluid_system();
    for (dof, (before, after)) in old.iter().zip(new).enumerate() {
        for (phase, (b, a)) in before.iter().zip(after).enumerate() {
            if b.phase_exists() == a.phase_exists() {
                continue;
            }
            let appeared = a.phase_exists();
            info!(
                t,
                dof,
                phase = fluid.phase_name(phase),
                appeared,
                "phase {}",
                if appeared { "appeared" } else { "vanished" }
            );
            changes.push(PhaseChange { t, dof, phase, appeared });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.dt_initial, 1.0);
        assert_eq!(opts.record_every, 1);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn sim_options_invalid() {
        let bad = [
            SimOptions {
                dt_initial: 0.0,
                ..SimOptions::default()
            },
            SimOptions {
                t_end: f64::NAN,
                ..SimOptions::default()
            },
            SimOptions {
                record_every: 0,
                ..SimOptions::default()
            },
            SimOptions {
                min_dt: 2.0,
                ..SimOptions::default()
            },
        ];
        for opts in &bad {
            assert!(opts.validate().is_err(), "{opts:?}");
        }
    }
}
