//! Global residual assembly.
//!
//! Elements are evaluated in parallel into local blocks; the blocks are then
//! scattered into the global vectors sequentially, so the result does not
//! depend on the thread count.
//!
//! Every row of a vertex is the sum of its element contributions. For the
//! complementarity rows that means a vertex shared by `k` elements carries
//! `k` times its pointwise condition, which has the same root.

use crate::complementarity::{NcpBranch, select_branch};
use crate::context::BoxElementContext;
use crate::energy::EnergyModule;
use crate::error::{ModelError, ModelResult};
use crate::grid::FvGrid;
use crate::local_residual::{LocalResidual, NcpLocalResidual};
use crate::problem::Problem;
use crate::vectors::{EqVector, LocalBlockVector, PrimaryVariables};
use crate::volume_variables::VolumeVariables;
use nalgebra::DVector;
use pf_core::ElementId;
use rayon::prelude::*;

/// Global residual and storage rate, one entry per degree of freedom.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub residual: Vec<EqVector>,
    pub storage_term: Vec<EqVector>,
}

pub struct Assembler<'a, G: FvGrid, R: LocalResidual> {
    grid: &'a G,
    problem: &'a dyn Problem,
    local_residual: R,
}

impl<'a, G: FvGrid, R: LocalResidual> Assembler<'a, G, R> {
    /// Fails if `local_residual` cannot fill the equations of `problem`.
    pub fn new(grid: &'a G, problem: &'a dyn Problem, local_residual: R) -> ModelResult<Self> {
        local_residual.check_problem(problem)?;
        Ok(Self {
            grid,
            problem,
            local_residual,
        })
    }

    pub fn grid(&self) -> &G {
        self.grid
    }

    pub fn problem(&self) -> &dyn Problem {
        self.problem
    }

    pub fn num_dofs(&self) -> usize {
        self.grid.num_dofs()
    }

    pub fn num_eq(&self) -> usize {
        self.problem.indices().num_eq()
    }

    /// Length of the flattened global solution and residual vectors.
    pub fn system_size(&self) -> usize {
        self.num_dofs() * self.num_eq()
    }

    /// Split a flattened global vector into per-dof primary variables.
    pub fn split_solution(&self, x: &DVector<f64>) -> ModelResult<Vec<PrimaryVariables>> {
        if x.len() != self.system_size() {
            return Err(ModelError::DimensionMismatch {
                what: "global solution",
                expected: self.system_size(),
                actual: x.len(),
            });
        }
        Ok(x.as_slice()
            .chunks_exact(self.num_eq())
            .map(PrimaryVariables::from_slice)
            .collect())
    }

    /// Flatten per-dof primary variables into a global vector.
    pub fn flatten_solution(&self, solution: &[PrimaryVariables]) -> DVector<f64> {
        DVector::from_iterator(
            solution.len() * self.num_eq(),
            solution.iter().flat_map(|pv| pv.iter().copied()),
        )
    }

    /// Secondary variables of every degree of freedom.
    pub fn volume_variables(&self, solution: &[PrimaryVariables]) -> ModelResult<Vec<VolumeVariables>> {
        self.check_len("solution", solution.len())?;
        solution
            .par_iter()
            .enumerate()
            .map(|(dof, pv)| VolumeVariables::update(pv, self.problem, dof))
            .collect()
    }

    /// Assemble the global residual of the time step `previous -> current`.
    ///
    /// `eval_point` holds the state at which state-dependent branch decisions
    /// are taken; it is usually the last accepted Newton iterate.
    pub fn assemble(
        &self,
        current: &[VolumeVariables],
        previous: &[VolumeVariables],
        eval_point: &[VolumeVariables],
        dt: f64,
    ) -> ModelResult<Assembled> {
        self.check_len("current volume variables", current.len())?;
        self.check_len("previous volume variables", previous.len())?;
        self.check_len("evaluation point", eval_point.len())?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ModelError::InvalidArg {
                what: "time step size must be positive and finite",
            });
        }

        let locals = (0..self.grid.num_elements())
            .into_par_iter()
            .map(|e| {
                let geometry = self.grid.element_geometry(ElementId::from_index(e as u32));
                let dofs: Vec<usize> = geometry.scvs.iter().map(|scv| scv.dof).collect();
                let ctx = BoxElementContext::new(self.problem, geometry, current, previous, eval_point, dt)?;
                let mut residual = LocalBlockVector::new();
                let mut storage_term = LocalBlockVector::new();
                self.local_residual.eval(&ctx, &mut residual, &mut storage_term);
                Ok((dofs, residual, storage_term))
            })
            .collect::<ModelResult<Vec<_>>>()?;

        let num_eq = self.num_eq();
        let mut assembled = Assembled {
            residual: vec![EqVector::zeros(num_eq); self.num_dofs()],
            storage_term: vec![EqVector::zeros(num_eq); self.num_dofs()],
        };
        for (dofs, residual, storage_term) in &locals {
            for (scv, &dof) in dofs.iter().enumerate() {
                assembled.residual[dof] += &residual[scv];
                assembled.storage_term[dof] += &storage_term[scv];
            }
        }

        Ok(assembled)
    }

    /// Flattened global residual.
    pub fn residual(
        &self,
        current: &[VolumeVariables],
        previous: &[VolumeVariables],
        eval_point: &[VolumeVariables],
        dt: f64,
    ) -> ModelResult<DVector<f64>> {
        let assembled = self.assemble(current, previous, eval_point, dt)?;
        let num_eq = self.num_eq();
        Ok(DVector::from_iterator(
            assembled.residual.len() * num_eq,
            assembled.residual.iter().flat_map(|r| r.iter().copied()),
        ))
    }

    /// Branch taken by every phase complementarity row, per dof.
    pub fn phase_branches(&self, eval_point: &[VolumeVariables]) -> Vec<Vec<NcpBranch>> {
        let num_phases = self.problem.indices().num_phases();
        eval_point
            .iter()
            .map(|vv| (0..num_phases).map(|phase| select_branch(&vv.fluid_state, phase)).collect())
            .collect()
    }

    fn check_len(&self, what: &'static str, actual: usize) -> ModelResult<()> {
        if actual != self.num_dofs() {
            return Err(ModelError::DimensionMismatch {
                what,
                expected: self.num_dofs(),
                actual,
            });
        }
        Ok(())
    }
}

impl<G: FvGrid, E: EnergyModule> Assembler<'_, G, NcpLocalResidual<E>> {
    /// Total amount held in `phase` over the whole domain: moles per
    /// component, and energy when enabled.
    pub fn phase_inventory(&self, vol_vars: &[VolumeVariables], phase: usize) -> ModelResult<EqVector> {
        self.check_len("volume variables", vol_vars.len())?;
        if phase >= self.problem.indices().num_phases() {
            return Err(ModelError::InvalidArg {
                what: "phase index out of range",
            });
        }

        let num_eq = self.num_eq();
        let partial = (0..self.grid.num_elements())
            .into_par_iter()
            .map(|e| {
                let geometry = self.grid.element_geometry(ElementId::from_index(e as u32));
                let ctx = BoxElementContext::new(self.problem, geometry, vol_vars, vol_vars, vol_vars, 1.0)?;
                let mut storage = EqVector::zeros(num_eq);
                self.local_residual.add_phase_storage(&mut storage, &ctx, phase);
                Ok(storage)
            })
            .collect::<ModelResult<Vec<_>>>()?;

        let mut total = EqVector::zeros(num_eq);
        for storage in &partial {
            total += storage;
        }
        Ok(total)
    }
}
