//! Newton controller converging on the relative change of selected unknowns.

use crate::controller::{BaseNewtonController, NewtonController, NewtonSettings};
use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;
use pf_core::numeric::HUGE;

/// One unknown per degree of freedom whose change is tracked, with the
/// magnitude below which changes are measured absolutely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedVariable {
    /// Index within a degree of freedom's block of unknowns.
    pub index: usize,
    pub floor: f64,
}

impl TrackedVariable {
    /// Pressure-like unknown in pascal.
    pub const PRESSURE_FLOOR: f64 = 1e3;
    /// Fraction-like unknown of order one or below.
    pub const FRACTION_FLOOR: f64 = 1e-3;

    pub fn pressure(index: usize) -> Self {
        Self {
            index,
            floor: Self::PRESSURE_FLOOR,
        }
    }

    pub fn fraction(index: usize) -> Self {
        Self {
            index,
            floor: Self::FRACTION_FLOOR,
        }
    }
}

/// Settings of a [`RelativeDefectController`], passed in by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeDefectSettings {
    pub newton: NewtonSettings,
    /// Hard ceiling on proposed time steps [s].
    pub max_time_step_size: f64,
    /// Number of unknowns per degree of freedom in the global vector.
    pub block_size: usize,
    pub tracked: Vec<TrackedVariable>,
}

impl RelativeDefectSettings {
    /// Track a pressure-like and a fraction-like unknown with the default
    /// floors.
    pub fn new(block_size: usize, pressure_idx: usize, fraction_idx: usize, max_time_step_size: f64) -> Self {
        Self {
            newton: NewtonSettings::default(),
            max_time_step_size,
            block_size,
            tracked: vec![
                TrackedVariable::pressure(pressure_idx),
                TrackedVariable::fraction(fraction_idx),
            ],
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        self.newton.validate()?;
        if self.max_time_step_size.is_nan() || self.max_time_step_size <= 0.0 {
            return Err(SolverError::InvalidConfig {
                what: "max time step size must be positive",
            });
        }
        if self.block_size == 0 {
            return Err(SolverError::InvalidConfig {
                what: "block size must be at least one",
            });
        }
        if self.tracked.is_empty() {
            return Err(SolverError::InvalidConfig {
                what: "at least one tracked variable is required",
            });
        }
        for var in &self.tracked {
            if var.index >= self.block_size {
                return Err(SolverError::InvalidConfig {
                    what: "tracked variable index outside the block",
                });
            }
            if !var.floor.is_finite() || var.floor <= 0.0 {
                return Err(SolverError::InvalidConfig {
                    what: "tracked variable floor must be positive and finite",
                });
            }
        }
        Ok(())
    }
}

/// Converges when the largest floored relative change of the tracked
/// unknowns drops below the tolerance, and caps proposed time steps.
///
/// Iteration counting, failure handling and the step size heuristic are
/// delegated to the wrapped controller `B`.
#[derive(Debug, Clone)]
pub struct RelativeDefectController<B = BaseNewtonController> {
    base: B,
    settings: RelativeDefectSettings,
    relative_defect: f64,
}

impl RelativeDefectController<BaseNewtonController> {
    pub fn new(settings: RelativeDefectSettings) -> SolverResult<Self> {
        let base = BaseNewtonController::new(settings.newton)?;
        Self::with_base(base, settings)
    }
}

impl<B: NewtonController> RelativeDefectController<B> {
    pub fn with_base(base: B, settings: RelativeDefectSettings) -> SolverResult<Self> {
        settings.validate()?;
        Ok(Self {
            base,
            settings,
            relative_defect: HUGE,
        })
    }

    pub fn relative_defect(&self) -> f64 {
        self.relative_defect
    }

    pub fn max_time_step_size(&self) -> f64 {
        self.settings.max_time_step_size
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    fn compute_relative_defect(&self, u: &DVector<f64>, u_old: &DVector<f64>) -> f64 {
        let block = self.settings.block_size;
        let mut defect: f64 = 0.0;
        for (new, old) in u.as_slice().chunks_exact(block).zip(u_old.as_slice().chunks_exact(block)) {
            for var in &self.settings.tracked {
                let (a, b) = (new[var.index], old[var.index]);
                let norm = var.floor.max(a.abs()).max(b.abs());
                defect = defect.max((a - b).abs() / norm);
            }
        }
        defect
    }
}

impl<B: NewtonController> NewtonController for RelativeDefectController<B> {
    fn settings(&self) -> &NewtonSettings {
        &self.settings.newton
    }

    fn num_steps(&self) -> usize {
        self.base.num_steps()
    }

    fn error(&self) -> f64 {
        self.relative_defect
    }

    fn newton_begin(&mut self, u: &DVector<f64>) {
        self.base.newton_begin(u);
        self.relative_defect = HUGE;
    }

    fn newton_end_step(&mut self, u: &DVector<f64>, u_old: &DVector<f64>) {
        self.base.newton_end_step(u, u_old);
        self.relative_defect = self.compute_relative_defect(u, u_old);
    }

    fn newton_converged(&self) -> bool {
        self.relative_defect <= self.settings.newton.rel_tolerance
    }

    fn newton_succeed(&mut self) {
        self.base.newton_succeed();
    }

    fn newton_fail(&mut self) {
        self.base.newton_fail();
    }

    fn suggest_time_step_size(&self, old_dt: f64) -> f64 {
        self.settings.max_time_step_size.min(self.base.suggest_time_step_size(old_dt))
    }
}
