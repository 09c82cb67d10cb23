use std::fmt;

use glam::DVec3;

use super::boundary::Wall;

/// What lies on the other side of a Voronoi face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceNeighbour {
    /// Another generator. `shift` is the periodic shift applied to it, if the
    /// face crosses a periodic boundary.
    Generator { idx: usize, shift: Option<DVec3> },
    /// A wall of the simulation box.
    Boundary(Wall),
    /// The mirror image of a generator across a wall (reflective boundaries).
    Reflection { idx: usize, wall: Wall },
}

impl fmt::Display for FaceNeighbour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceNeighbour::Generator { idx, shift: None } => write!(f, "{idx}"),
            FaceNeighbour::Generator { idx, shift: Some(shift) } => write!(f, "{idx}{shift}"),
            FaceNeighbour::Boundary(wall) => write!(f, "{wall:?}"),
            FaceNeighbour::Reflection { idx, wall } => write!(f, "{idx}@{wall:?}"),
        }
    }
}

/// A face of a Voronoi cell.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiFace {
    neighbour: FaceNeighbour,
    area: f64,
    midpoint: DVec3,
    normal: DVec3,
}

impl VoronoiFace {
    pub(super) fn new(neighbour: FaceNeighbour, area: f64, midpoint: DVec3, normal: DVec3) -> Self {
        Self {
            neighbour,
            area,
            midpoint,
            normal,
        }
    }

    /// Get what lies on the other side of this face.
    pub fn neighbour(&self) -> FaceNeighbour {
        self.neighbour
    }

    /// Get the index of the generator on the other side of this face.
    /// Returns `None` for faces against a wall of the simulation box.
    pub fn neighbour_id(&self) -> Option<usize> {
        match self.neighbour {
            FaceNeighbour::Generator { idx, .. } | FaceNeighbour::Reflection { idx, .. } => Some(idx),
            FaceNeighbour::Boundary(_) => None,
        }
    }

    /// Get the area of this face.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Get the position of the centroid of this face.
    pub fn midpoint(&self) -> DVec3 {
        self.midpoint
    }

    /// Get the unit normal of this face, pointing away from the cell's
    /// generator.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Get the shift vector (if any) to apply to the neighbouring generator
    /// to bring it to the reference frame of this face.
    /// Can only be `Some` for periodic boundaries.
    pub fn shift(&self) -> Option<DVec3> {
        match self.neighbour {
            FaceNeighbour::Generator { shift, .. } => shift,
            _ => None,
        }
    }

    /// Whether this face lies on a wall of the simulation box.
    pub fn is_boundary(&self) -> bool {
        !matches!(self.neighbour, FaceNeighbour::Generator { .. })
    }

    /// Whether this is a face between a generator and a periodic image of
    /// another generator.
    pub fn is_periodic(&self) -> bool {
        // Periodically wrapping faces must have shift set
        self.shift().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_kinds() {
        let face = VoronoiFace::new(FaceNeighbour::Boundary(Wall::XLow), 1., DVec3::ZERO, DVec3::NEG_X);
        assert!(face.is_boundary());
        assert!(!face.is_periodic());
        assert_eq!(face.neighbour_id(), None);

        let face = VoronoiFace::new(
            FaceNeighbour::Generator {
                idx: 3,
                shift: Some(DVec3::X),
            },
            1.,
            DVec3::ZERO,
            DVec3::X,
        );
        assert!(!face.is_boundary());
        assert!(face.is_periodic());
        assert_eq!(face.neighbour_id(), Some(3));
        assert_eq!(face.shift(), Some(DVec3::X));

        let face = VoronoiFace::new(
            FaceNeighbour::Reflection { idx: 2, wall: Wall::ZHigh },
            1.,
            DVec3::ZERO,
            DVec3::Z,
        );
        assert!(face.is_boundary());
        assert_eq!(face.neighbour_id(), Some(2));
        assert_eq!(face.neighbour().to_string(), "2@ZHigh");
    }
}
