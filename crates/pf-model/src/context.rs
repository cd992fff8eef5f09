//! Element context: everything the local residual may read about one element.
//!
//! Time index 0 is the current time level (the Newton iterate being
//! evaluated), time index 1 the previous time step.

use crate::error::ModelResult;
use crate::grid::{BoundaryFace, FvElementGeometry, SubControlVolumeFace};
use crate::problem::{BoundaryCondition, Problem};
use crate::volume_variables::VolumeVariables;

pub const CURRENT: usize = 0;
pub const PREVIOUS: usize = 1;

pub trait ElementContext {
    fn problem(&self) -> &dyn Problem;

    fn geometry(&self) -> &FvElementGeometry;

    fn num_scv(&self) -> usize {
        self.geometry().scvs.len()
    }

    fn num_scvf(&self) -> usize {
        self.geometry().faces.len()
    }

    fn num_boundary_faces(&self) -> usize {
        self.geometry().boundary_faces.len()
    }

    fn face(&self, face_idx: usize) -> &SubControlVolumeFace {
        &self.geometry().faces[face_idx]
    }

    fn boundary_face(&self, bface_idx: usize) -> &BoundaryFace {
        &self.geometry().boundary_faces[bface_idx]
    }

    /// Volume of a sub-control volume before extrusion.
    fn scv_volume(&self, scv_idx: usize) -> f64 {
        self.geometry().scvs[scv_idx].volume
    }

    fn vol_vars(&self, scv_idx: usize, time_idx: usize) -> &VolumeVariables;

    /// Volume variables at the evaluation point, used for branch decisions.
    fn eval_point_vol_vars(&self, scv_idx: usize, time_idx: usize) -> &VolumeVariables;

    /// Exterior state of a Dirichlet boundary face, `None` for other conditions.
    fn boundary_vol_vars(&self, bface_idx: usize) -> Option<&VolumeVariables>;

    fn time_step_size(&self) -> f64;
}

/// Element context of the vertex-centred scheme, borrowing per-dof volume
/// variables owned by the assembler.
pub struct BoxElementContext<'a> {
    problem: &'a dyn Problem,
    geometry: FvElementGeometry,
    vol_vars: [&'a [VolumeVariables]; 2],
    eval_point: &'a [VolumeVariables],
    boundary_vol_vars: Vec<Option<VolumeVariables>>,
    dt: f64,
}

impl<'a> BoxElementContext<'a> {
    pub fn new(
        problem: &'a dyn Problem,
        geometry: FvElementGeometry,
        current: &'a [VolumeVariables],
        previous: &'a [VolumeVariables],
        eval_point: &'a [VolumeVariables],
        dt: f64,
    ) -> ModelResult<Self> {
        let mut boundary_vol_vars = Vec::with_capacity(geometry.boundary_faces.len());
        for bface in &geometry.boundary_faces {
            let ghost = match problem.boundary_condition(bface.boundary_id) {
                BoundaryCondition::Dirichlet(values) => {
                    let dof = geometry.scvs[bface.scv].dof;
                    Some(VolumeVariables::update(&values, problem, dof)?)
                }
                BoundaryCondition::NoFlow | BoundaryCondition::Neumann(_) => None,
            };
            boundary_vol_vars.push(ghost);
        }

        Ok(Self {
            problem,
            geometry,
            vol_vars: [current, previous],
            eval_point,
            boundary_vol_vars,
            dt,
        })
    }

    fn dof(&self, scv_idx: usize) -> usize {
        self.geometry.scvs[scv_idx].dof
    }
}

impl ElementContext for BoxElementContext<'_> {
    fn problem(&self) -> &dyn Problem {
        self.problem
    }

    fn geometry(&self) -> &FvElementGeometry {
        &self.geometry
    }

    fn vol_vars(&self, scv_idx: usize, time_idx: usize) -> &VolumeVariables {
        &self.vol_vars[time_idx][self.dof(scv_idx)]
    }

    fn eval_point_vol_vars(&self, scv_idx: usize, time_idx: usize) -> &VolumeVariables {
        // The previous time level is never iterated on, so it is its own
        // evaluation point.
        match time_idx {
            CURRENT => &self.eval_point[self.dof(scv_idx)],
            _ => self.vol_vars(scv_idx, time_idx),
        }
    }

    fn boundary_vol_vars(&self, bface_idx: usize) -> Option<&VolumeVariables> {
        self.boundary_vol_vars[bface_idx].as_ref()
    }

    fn time_step_size(&self) -> f64 {
        self.dt
    }
}
