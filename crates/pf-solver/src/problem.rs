//! Implicit time step of the porous-media model as a Newton system.

use crate::error::{SolverError, SolverResult};
use crate::newton::NewtonSystem;
use nalgebra::DVector;
use pf_model::{Assembler, FvGrid, LocalResidual, VolumeVariables};

/// Backward-Euler step `previous -> u` over `dt`.
///
/// Owns the volume variables of the previous time level and of the
/// evaluation point; only the current iterate is recomputed per residual
/// evaluation.
pub struct TimeStepProblem<'s, 'a, G: FvGrid, R: LocalResidual> {
    assembler: &'s Assembler<'a, G, R>,
    previous: Vec<VolumeVariables>,
    eval_point: Vec<VolumeVariables>,
    dt: f64,
}

impl<'s, 'a, G: FvGrid, R: LocalResidual> TimeStepProblem<'s, 'a, G, R> {
    pub fn new(assembler: &'s Assembler<'a, G, R>, previous: &DVector<f64>, dt: f64) -> SolverResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SolverError::InvalidConfig {
                what: "time step size must be positive and finite",
            });
        }
        let previous = assembler.volume_variables(&assembler.split_solution(previous)?)?;
        Ok(Self {
            assembler,
            eval_point: previous.clone(),
            previous,
            dt,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn eval_point(&self) -> &[VolumeVariables] {
        &self.eval_point
    }

    fn vol_vars(&self, u: &DVector<f64>) -> SolverResult<Vec<VolumeVariables>> {
        Ok(self.assembler.volume_variables(&self.assembler.split_solution(u)?)?)
    }
}

impl<G: FvGrid, R: LocalResidual> NewtonSystem for TimeStepProblem<'_, '_, G, R> {
    fn size(&self) -> usize {
        self.assembler.system_size()
    }

    fn set_evaluation_point(&mut self, u: &DVector<f64>) -> SolverResult<()> {
        self.eval_point = self.vol_vars(u)?;
        Ok(())
    }

    fn residual(&self, u: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let current = self.vol_vars(u)?;
        Ok(self
            .assembler
            .residual(&current, &self.previous, &self.eval_point, self.dt)?)
    }
}
