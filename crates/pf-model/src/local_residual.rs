//! Local residual of one element.
//!
//! [`LocalResidual`] is the discretization layer: its provided
//! [`LocalResidual::eval_base`] turns storage, flux, source and boundary
//! terms into a backward-Euler balance per sub-control volume. A model only
//! supplies the required terms. [`NcpLocalResidual`] is the compositional
//! model: mole balances per component, an optional energy balance, and one
//! complementarity row per phase.

use crate::complementarity::phase_ncp;
use crate::context::{CURRENT, ElementContext, PREVIOUS};
use crate::energy::EnergyModule;
use crate::mass::MassModule;
use crate::error::{ModelError, ModelResult};
use crate::problem::{BoundaryCondition, Problem};
use crate::vectors::{EqVector, LocalBlockVector, RateVector};
use pf_fluids::FluidSystem;
use std::marker::PhantomData;

pub trait LocalResidual: Send + Sync {
    /// Reject problems whose equation layout this residual cannot fill.
    fn check_problem(&self, _problem: &dyn Problem) -> ModelResult<()> {
        Ok(())
    }

    /// Conserved quantities per unit volume of one sub-control volume.
    fn compute_storage<C: ElementContext>(&self, ctx: &C, scv_idx: usize, time_idx: usize) -> EqVector;

    /// Flux over an interior face, positive from `inside` to `outside`.
    fn compute_flux<C: ElementContext>(&self, ctx: &C, face_idx: usize, time_idx: usize) -> RateVector;

    /// Source per unit volume, positive into the domain.
    fn compute_source<C: ElementContext>(&self, ctx: &C, scv_idx: usize, time_idx: usize) -> RateVector;

    /// Flux over a Dirichlet boundary face against the exterior state.
    fn compute_dirichlet_flux<C: ElementContext>(&self, ctx: &C, bface_idx: usize, time_idx: usize) -> RateVector;

    /// Flux out of the domain over a boundary face.
    fn compute_boundary_flux<C: ElementContext>(&self, ctx: &C, bface_idx: usize, time_idx: usize) -> RateVector {
        let num_eq = ctx.problem().indices().num_eq();
        let bface = ctx.boundary_face(bface_idx);
        match ctx.problem().boundary_condition(bface.boundary_id) {
            BoundaryCondition::NoFlow => RateVector::zeros(num_eq),
            BoundaryCondition::Neumann(mut rates) => {
                rates *= bface.area * ctx.vol_vars(bface.scv, time_idx).extrusion_factor;
                rates
            }
            BoundaryCondition::Dirichlet(_) => self.compute_dirichlet_flux(ctx, bface_idx, time_idx),
        }
    }

    /// Backward-Euler balance of every sub-control volume of the element.
    ///
    /// Fills `storage_term` with the storage rate and `residual` with the
    /// full balance (storage rate + outflow − sources).
    fn eval_base<C: ElementContext>(&self, ctx: &C, residual: &mut LocalBlockVector, storage_term: &mut LocalBlockVector) {
        let num_eq = ctx.problem().indices().num_eq();
        let num_scv = ctx.num_scv();
        let dt = ctx.time_step_size();

        residual.clear();
        residual.resize(num_scv, EqVector::zeros(num_eq));
        storage_term.clear();
        storage_term.resize(num_scv, EqVector::zeros(num_eq));

        for scv in 0..num_scv {
            let volume = ctx.scv_volume(scv) * ctx.vol_vars(scv, CURRENT).extrusion_factor;

            let mut storage = self.compute_storage(ctx, scv, CURRENT);
            storage -= &self.compute_storage(ctx, scv, PREVIOUS);
            storage *= volume / dt;

            residual[scv] += &storage;
            storage_term[scv] = storage;

            let source = self.compute_source(ctx, scv, CURRENT);
            residual[scv].add_rate(&source, -volume);
        }

        for face_idx in 0..ctx.num_scvf() {
            let face = *ctx.face(face_idx);
            let flux = self.compute_flux(ctx, face_idx, CURRENT);
            residual[face.inside].add_rate(&flux, 1.0);
            residual[face.outside].add_rate(&flux, -1.0);
        }

        for bface_idx in 0..ctx.num_boundary_faces() {
            let scv = ctx.boundary_face(bface_idx).scv;
            let flux = self.compute_boundary_flux(ctx, bface_idx, CURRENT);
            residual[scv].add_rate(&flux, 1.0);
        }
    }

    fn eval<C: ElementContext>(&self, ctx: &C, residual: &mut LocalBlockVector, storage_term: &mut LocalBlockVector) {
        self.eval_base(ctx, residual, storage_term);
    }
}

/// Compositional local residual with complementarity rows, generic over its
/// energy sub-model.
#[derive(Debug, Clone, Copy, Default)]
pub struct NcpLocalResidual<E: EnergyModule> {
    _energy: PhantomData<E>,
}

impl<E: EnergyModule> NcpLocalResidual<E> {
    pub fn new() -> Self {
        Self { _energy: PhantomData }
    }

    /// Add the storage held in `phase` by all sub-control volumes of the
    /// element, scaled by their extruded volumes.
    ///
    /// Diagnostics only; does not enter the residual.
    pub fn add_phase_storage<C: ElementContext>(&self, storage: &mut EqVector, ctx: &C, phase: usize) {
        let indices = ctx.problem().indices();
        for scv in 0..ctx.num_scv() {
            let vv = ctx.vol_vars(scv, CURRENT);
            let mut tmp = EqVector::zeros(indices.num_eq());
            MassModule::add_phase_storage(&mut tmp, vv, phase, &indices);
            E::add_phase_storage(&mut tmp, vv, phase, &indices);
            tmp *= vv.extrusion_factor * ctx.scv_volume(scv);
            *storage += &tmp;
        }
    }

    /// Complementarity value of `phase` at one sub-control volume.
    pub fn phase_ncp<C: ElementContext>(&self, ctx: &C, scv_idx: usize, time_idx: usize, phase: usize) -> f64 {
        let fs_eval = &ctx.eval_point_vol_vars(scv_idx, time_idx).fluid_state;
        let fs = &ctx.vol_vars(scv_idx, time_idx).fluid_state;
        phase_ncp(fs_eval, fs, phase)
    }
}

impl<E: EnergyModule> LocalResidual for NcpLocalResidual<E> {
    fn check_problem(&self, problem: &dyn Problem) -> ModelResult<()> {
        let indices = problem.indices();
        if E::ENABLED != indices.enable_energy() {
            return Err(ModelError::InvalidArg {
                what: "energy sub-model does not match the energy equation of the problem",
            });
        }
        if indices.num_phases() != problem.fluid_system().num_phases()
            || indices.num_components() != problem.fluid_system().num_components()
        {
            return Err(ModelError::InvalidArg {
                what: "equation layout does not match the fluid system",
            });
        }
        Ok(())
    }

    fn compute_storage<C: ElementContext>(&self, ctx: &C, scv_idx: usize, time_idx: usize) -> EqVector {
        let indices = ctx.problem().indices();
        let vv = ctx.vol_vars(scv_idx, time_idx);
        let mut storage = EqVector::zeros(indices.num_eq());
        MassModule::add_storage(&mut storage, vv, &indices);
        E::add_storage(&mut storage, vv, &indices);
        storage
    }

    fn compute_flux<C: ElementContext>(&self, ctx: &C, face_idx: usize, time_idx: usize) -> RateVector {
        let indices = ctx.problem().indices();
        let face = ctx.face(face_idx);
        let inside = ctx.vol_vars(face.inside, time_idx);
        let outside = ctx.vol_vars(face.outside, time_idx);
        let area = face.area * 0.5 * (inside.extrusion_factor + outside.extrusion_factor);

        let mut flux = RateVector::zeros(indices.num_eq());
        // Energy transport rides on the mass flux; it is never computed separately.
        MassModule::compute_flux::<E>(&mut flux, inside, outside, area, face.distance, &indices);
        flux
    }

    fn compute_source<C: ElementContext>(&self, ctx: &C, scv_idx: usize, time_idx: usize) -> RateVector {
        let indices = ctx.problem().indices();
        let dof = ctx.geometry().scvs[scv_idx].dof;
        let mut source = ctx.problem().source(dof);

        let mut tmp = RateVector::zeros(indices.num_eq());
        MassModule::compute_source(&mut tmp, ctx.vol_vars(scv_idx, time_idx), &indices);
        source += &tmp;
        // No energy source term is added here.
        source
    }

    fn compute_dirichlet_flux<C: ElementContext>(&self, ctx: &C, bface_idx: usize, time_idx: usize) -> RateVector {
        let indices = ctx.problem().indices();
        let bface = ctx.boundary_face(bface_idx);
        let inside = ctx.vol_vars(bface.scv, time_idx);
        let mut flux = RateVector::zeros(indices.num_eq());
        if let Some(outside) = ctx.boundary_vol_vars(bface_idx) {
            let area = bface.area * inside.extrusion_factor;
            MassModule::compute_flux::<E>(&mut flux, inside, outside, area, bface.distance, &indices);
        }
        flux
    }

    fn eval<C: ElementContext>(&self, ctx: &C, residual: &mut LocalBlockVector, storage_term: &mut LocalBlockVector) {
        self.eval_base(ctx, residual, storage_term);

        let indices = ctx.problem().indices();
        let ncp0 = indices.phase0_ncp_idx();
        for scv in 0..ctx.num_scv() {
            for phase in 0..indices.num_phases() {
                residual[scv][ncp0 + phase] = self.phase_ncp(ctx, scv, CURRENT, phase);
            }
        }
    }
}
