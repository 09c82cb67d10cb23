use glam::DVec3;

use super::voronoi_face::VoronoiFace;

/// A Voronoi cell.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    idx: usize,
    loc: DVec3,
    centroid: DVec3,
    volume: f64,
    max_radius_squared: f64,
    faces: Vec<VoronoiFace>,
}

impl VoronoiCell {
    pub(super) fn new(
        idx: usize,
        loc: DVec3,
        centroid: DVec3,
        volume: f64,
        max_radius_squared: f64,
        faces: Vec<VoronoiFace>,
    ) -> Self {
        Self {
            idx,
            loc,
            centroid,
            volume,
            max_radius_squared,
            faces,
        }
    }

    /// Get the index of the generator of this Voronoi cell.
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Get the position of the generator of this Voronoi cell.
    pub fn loc(&self) -> DVec3 {
        self.loc
    }

    /// Get the position of the centroid of this cell
    pub fn centroid(&self) -> DVec3 {
        self.centroid
    }

    /// Get the volume of this cell
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Get the squared search radius at which the construction of this cell
    /// stopped. No generator further away than its square root can share a
    /// face with this cell.
    pub fn max_radius_squared(&self) -> f64 {
        self.max_radius_squared
    }

    /// Get the faces of this cell.
    pub fn faces(&self) -> &[VoronoiFace] {
        &self.faces
    }

    /// Get the number of faces of this cell.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get an `Iterator` over the indices of the neighbouring generators of
    /// this Voronoi cell, including periodic neighbours.
    pub fn neighbour_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.faces.iter().filter(|face| !face.is_boundary()).filter_map(|face| face.neighbour_id())
    }
}
