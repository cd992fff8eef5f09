//! Newton controller: iteration control and time step proposals.
//!
//! A controller owns the convergence bookkeeping of one Newton solve. The
//! driver calls, in order:
//!
//! 1. [`NewtonController::newton_begin`]
//! 2. while [`NewtonController::newton_proceed`]: solve for an update, then
//!    [`NewtonController::newton_end_step`]
//! 3. [`NewtonController::newton_succeed`] or [`NewtonController::newton_fail`]
//!
//! and the time loop then asks [`NewtonController::suggest_time_step_size`]
//! for the next step.

use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;

/// Tolerance and iteration targets of a Newton controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSettings {
    /// Convergence threshold on the controller's error measure.
    pub rel_tolerance: f64,
    /// Iteration count the step size heuristic aims for.
    pub target_steps: usize,
    /// Iterations after which a solve is given up.
    pub max_steps: usize,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            rel_tolerance: 1e-7,
            target_steps: 9,
            max_steps: 18,
        }
    }
}

impl NewtonSettings {
    pub fn validate(&self) -> SolverResult<()> {
        if !self.rel_tolerance.is_finite() || self.rel_tolerance <= 0.0 {
            return Err(SolverError::InvalidConfig {
                what: "relative tolerance must be positive and finite",
            });
        }
        if self.target_steps == 0 {
            return Err(SolverError::InvalidConfig {
                what: "target steps must be at least one",
            });
        }
        if self.max_steps < self.target_steps {
            return Err(SolverError::InvalidConfig {
                what: "max steps must not be below target steps",
            });
        }
        Ok(())
    }
}

pub trait NewtonController {
    fn settings(&self) -> &NewtonSettings;

    /// Iterations completed in the current solve.
    fn num_steps(&self) -> usize;

    /// Error measure after the last iteration, compared against the tolerance.
    fn error(&self) -> f64;

    fn newton_begin(&mut self, u: &DVector<f64>);

    /// Record the update `u_old -> u` of one iteration.
    fn newton_end_step(&mut self, u: &DVector<f64>, u_old: &DVector<f64>);

    fn newton_converged(&self) -> bool;

    /// Whether another iteration should be done.
    ///
    /// At least two iterations are always taken; afterwards iteration stops
    /// once converged or once `max_steps` is reached.
    fn newton_proceed(&self) -> bool {
        if self.num_steps() < 2 {
            true
        } else if self.newton_converged() {
            false
        } else {
            self.num_steps() < self.settings().max_steps
        }
    }

    fn newton_succeed(&mut self) {}

    fn newton_fail(&mut self);

    /// Step size for the next time step given the one just attempted.
    fn suggest_time_step_size(&self, old_dt: f64) -> f64;
}

/// Controller with the default error measure and step size heuristic.
#[derive(Debug, Clone)]
pub struct BaseNewtonController {
    settings: NewtonSettings,
    num_steps: usize,
    error: f64,
}

impl BaseNewtonController {
    pub fn new(settings: NewtonSettings) -> SolverResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            num_steps: 0,
            error: f64::INFINITY,
        })
    }
}

impl NewtonController for BaseNewtonController {
    fn settings(&self) -> &NewtonSettings {
        &self.settings
    }

    fn num_steps(&self) -> usize {
        self.num_steps
    }

    fn error(&self) -> f64 {
        self.error
    }

    fn newton_begin(&mut self, _u: &DVector<f64>) {
        self.num_steps = 0;
        self.error = f64::INFINITY;
    }

    /// Largest change of any entry, relative to the entry's magnitude but
    /// never to less than one.
    fn newton_end_step(&mut self, u: &DVector<f64>, u_old: &DVector<f64>) {
        self.num_steps += 1;
        self.error = u
            .iter()
            .zip(u_old.iter())
            .map(|(&a, &b)| (a - b).abs() / (0.5 * (a + b).abs()).max(1.0))
            .fold(0.0, f64::max);
    }

    fn newton_converged(&self) -> bool {
        self.error <= self.settings.rel_tolerance
    }

    /// Pretend the solve took twice the target so the next proposal halves
    /// the step.
    fn newton_fail(&mut self) {
        self.num_steps = 2 * self.settings.target_steps;
    }

    fn suggest_time_step_size(&self, old_dt: f64) -> f64 {
        let n = self.num_steps as f64;
        let target = self.settings.target_steps as f64;
        if n > target {
            old_dt / (1.0 + (n - target) / target)
        } else {
            old_dt * (1.0 + ((target - n) / target) / 1.2)
        }
    }
}
