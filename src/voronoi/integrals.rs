//! Contains traits used to define custom integrals over cells and faces.

use glam::DVec3;

use crate::geometry::{signed_area_tri, signed_volume_tet};

use super::{cell_constructor::CellConstructor, voronoi_face::FaceNeighbour};

/// Trait to implement new integrators for Voronoi cells.
///
/// Integrators are expected to compute quantities of interest for Voronoi
/// cells iteratively. Every face of the cell is fanned into triangles, each of
/// which forms an oriented tetrahedron with the cell's generator as its top.
/// These tetrahedra are fed one by one to the cell integrators.
///
/// We use the following orientation convention:
/// - If the three vertices are ordered counterclockwise as seen from the top,
///   the tetrahedron contributes positively to the integrals.
/// - If the three vertices are ordered clockwise, the tetrahedron should
///   subtract from the integrals. This happens when the generator lies
///   outside the plane of one of the triangles' fans.
pub trait CellIntegral: Sized {
    /// Initialize a CellIntegral for the given cell.
    fn init(cell: &CellConstructor<'_>) -> Self;

    /// Update the state of the integrator using one oriented tetrahedron (with
    /// the cell's generator `gen` as top), which is part of a cell.
    fn collect(&mut self, v0: DVec3, v1: DVec3, v2: DVec3, gen: DVec3);

    /// Finalize the calculation and return the result
    fn finalize(self) -> Self;
}

#[derive(Default)]
pub(super) struct VolumeCentroidIntegrator {
    pub centroid: DVec3,
    pub volume: f64,
}

impl VolumeCentroidIntegrator {
    pub fn init() -> Self {
        Self::default()
    }
}

impl CellIntegral for VolumeCentroidIntegrator {
    fn init(_cell: &CellConstructor<'_>) -> Self {
        Self::default()
    }

    fn collect(&mut self, v0: DVec3, v1: DVec3, v2: DVec3, gen: DVec3) {
        let volume = signed_volume_tet(v0, v1, v2, gen);
        self.volume += volume;
        self.centroid += volume * (v0 + v1 + v2 + gen);
    }

    fn finalize(mut self) -> Self {
        let normalisation = if self.volume > 0. {
            0.25 / self.volume
        } else {
            0.
        };
        self.centroid *= normalisation;
        self
    }
}

/// Example implementation of a simple cell integrator for computing the
/// volume of a cell.
#[derive(Default)]
pub struct VolumeIntegral {
    pub volume: f64,
}

impl CellIntegral for VolumeIntegral {
    fn init(_cell: &CellConstructor<'_>) -> Self {
        Self::default()
    }

    fn collect(&mut self, v0: DVec3, v1: DVec3, v2: DVec3, gen: DVec3) {
        self.volume += signed_volume_tet(v0, v1, v2, gen);
    }

    fn finalize(self) -> Self {
        self
    }
}

/// Trait to implement new integrators for Voronoi faces.
///
/// The triangles of a single face are fed one by one to the face
/// integrators, using the same orientation convention as [`CellIntegral`].
pub trait FaceIntegral: Clone {
    /// Initialize a FaceIntegral for the face of `cell` shared with
    /// `neighbour`.
    fn init(cell: &CellConstructor<'_>, neighbour: &FaceNeighbour) -> Self;

    /// Update the state of the integrator using one oriented tetrahedron (with
    /// the cell's generator `gen` as top), which is part of a cell.
    fn collect(&mut self, v0: DVec3, v1: DVec3, v2: DVec3, gen: DVec3);

    /// Finalize the calculation and return the result
    fn finalize(self) -> Self;
}

#[derive(Default, Clone)]
pub(super) struct AreaCentroidIntegrator {
    pub centroid: DVec3,
    pub area: f64,
}

impl AreaCentroidIntegrator {
    pub fn init() -> Self {
        Self::default()
    }
}

impl FaceIntegral for AreaCentroidIntegrator {
    fn init(_cell: &CellConstructor<'_>, _neighbour: &FaceNeighbour) -> Self {
        Self::default()
    }

    fn collect(&mut self, v0: DVec3, v1: DVec3, v2: DVec3, gen: DVec3) {
        let area = signed_area_tri(v0, v1, v2, gen);
        self.area += area;
        self.centroid += area * (v0 + v1 + v2);
    }

    fn finalize(mut self) -> Self {
        let normalisation = if self.area > 0. {
            1. / (3. * self.area)
        } else {
            0.
        };
        self.centroid *= normalisation;
        self
    }
}

/// Example implementation of a simple face integrator for computing the area
/// of the faces of a cell.
#[derive(Clone)]
pub struct AreaIntegral {
    pub area: f64,
}

impl FaceIntegral for AreaIntegral {
    fn init(_cell: &CellConstructor<'_>, _neighbour: &FaceNeighbour) -> Self {
        Self { area: 0. }
    }

    fn collect(&mut self, v0: DVec3, v1: DVec3, v2: DVec3, gen: DVec3) {
        self.area += signed_area_tri(v0, v1, v2, gen);
    }

    fn finalize(self) -> Self {
        self
    }
}
