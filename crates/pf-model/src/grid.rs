//! Finite-volume element geometry and a 1D vertex-centred grid.

use crate::error::{ModelError, ModelResult};
use pf_core::ElementId;
use pf_core::units::Length;

/// Sub-control volume of an element, attached to one degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubControlVolume {
    /// Global degree of freedom.
    pub dof: usize,
    /// Volume measure before extrusion.
    pub volume: f64,
}

/// Interior face between two sub-control volumes of the same element.
///
/// Fluxes are positive from `inside` to `outside`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubControlVolumeFace {
    /// Local index of the upstream-by-convention sub-control volume.
    pub inside: usize,
    pub outside: usize,
    /// Face measure before extrusion.
    pub area: f64,
    /// Distance between the two sub-control volume centres.
    pub distance: f64,
}

/// Face on the domain boundary, owned by one sub-control volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryFace {
    pub scv: usize,
    pub area: f64,
    /// Distance from the sub-control volume centre to the boundary.
    pub distance: f64,
    pub boundary_id: usize,
}

/// Geometry of one element as seen by the local residual.
#[derive(Debug, Clone, PartialEq)]
pub struct FvElementGeometry {
    pub element: ElementId,
    pub scvs: Vec<SubControlVolume>,
    pub faces: Vec<SubControlVolumeFace>,
    pub boundary_faces: Vec<BoundaryFace>,
}

/// Grid collaborator consumed by the assembler.
pub trait FvGrid: Send + Sync {
    fn num_dofs(&self) -> usize;

    fn num_elements(&self) -> usize;

    fn element_geometry(&self, element: ElementId) -> FvElementGeometry;
}

/// 1D vertex-centred (box) grid.
///
/// `cells` segments of equal length; each segment is an element with two
/// sub-control volumes (the two half segments) and one interior face at the
/// midpoint. The outermost vertices carry boundary faces
/// [`LineGrid::LEFT`] and [`LineGrid::RIGHT`].
#[derive(Debug, Clone)]
pub struct LineGrid {
    cells: usize,
    dx: f64,
}

impl LineGrid {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;

    pub fn new(length: Length, cells: usize) -> ModelResult<Self> {
        if cells == 0 {
            return Err(ModelError::InvalidArg {
                what: "grid needs at least one cell",
            });
        }
        let l = length.value;
        if !l.is_finite() || l <= 0.0 {
            return Err(ModelError::InvalidArg {
                what: "grid length must be positive and finite",
            });
        }
        Ok(Self {
            cells,
            dx: l / cells as f64,
        })
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Coordinate of a vertex.
    pub fn vertex_position(&self, dof: usize) -> f64 {
        dof as f64 * self.dx
    }
}

impl FvGrid for LineGrid {
    fn num_dofs(&self) -> usize {
        self.cells + 1
    }

    fn num_elements(&self) -> usize {
        self.cells
    }

    fn element_geometry(&self, element: ElementId) -> FvElementGeometry {
        let e = element.idx();
        assert!(e < self.cells, "element {e} out of range ({})", self.cells);

        let half = 0.5 * self.dx;
        let mut boundary_faces = Vec::new();
        if e == 0 {
            boundary_faces.push(BoundaryFace {
                scv: 0,
                area: 1.0,
                distance: half,
                boundary_id: Self::LEFT,
            });
        }
        if e + 1 == self.cells {
            boundary_faces.push(BoundaryFace {
                scv: 1,
                area: 1.0,
                distance: half,
                boundary_id: Self::RIGHT,
            });
        }

        FvElementGeometry {
            element,
            scvs: vec![
                SubControlVolume {
                    dof: e,
                    volume: half,
                },
                SubControlVolume {
                    dof: e + 1,
                    volume: half,
                },
            ],
            faces: vec![SubControlVolumeFace {
                inside: 0,
                outside: 1,
                area: 1.0,
                distance: self.dx,
            }],
            boundary_faces,
        }
    }
}
