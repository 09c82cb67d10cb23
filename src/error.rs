//! Error types returned by cell construction.
//!
//! Degenerate geometric configurations (points on a face, on an edge or on a
//! circumsphere) are handled as ordinary control flow and never surface as
//! errors. Everything in here signals either an exhausted capacity or a broken
//! internal invariant, and aborts the construction of the affected cell.

use std::fmt;

use glam::DVec3;
use thiserror::Error;

use crate::voronoi::{TetIdx, VertexIdx};

/// Result alias used throughout the cell construction.
pub type Result<T, E = CellError> = std::result::Result<T, E>;

/// The fixed-capacity resource that ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityKind {
    /// The local vertex table of a cell.
    Vertices,
    /// The tetrahedron arena of a cell.
    Tetrahedra,
    /// The queue of tetrahedra awaiting a Delaunay check.
    CheckQueue,
    /// The number of tetrahedra sharing a single edge.
    EdgeFan,
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapacityKind::Vertices => "vertex",
            CapacityKind::Tetrahedra => "tetrahedron",
            CapacityKind::CheckQueue => "check queue",
            CapacityKind::EdgeFan => "edge fan",
        };
        f.write_str(name)
    }
}

/// Errors that abort the construction of a single Voronoi cell.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CellError {
    /// A fixed-capacity array is full.
    #[error("{kind} capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// Which resource ran out.
        kind: CapacityKind,
        /// Its configured capacity.
        capacity: usize,
    },

    /// Point location visited more tetrahedra than the complex can hold.
    #[error("point location for vertex {vertex:?} did not terminate after {steps} steps")]
    WalkDidNotTerminate {
        /// The vertex being located.
        vertex: VertexIdx,
        /// Number of steps taken.
        steps: usize,
    },

    /// Delaunay repair performed more flips than allowed.
    #[error("Delaunay repair did not terminate after {flips} flips")]
    RepairDidNotTerminate {
        /// Number of flips performed.
        flips: usize,
    },

    /// A tetrahedron index refers to a free or out of range slot.
    #[error("invalid tetrahedron index {tetrahedron:?}")]
    InvalidTetrahedron {
        /// The offending index.
        tetrahedron: TetIdx,
    },

    /// A generator index is out of range of the generator slice.
    #[error("invalid generator index {idx} for {count} generators")]
    InvalidGenerator {
        /// The offending index.
        idx: usize,
        /// Number of generators.
        count: usize,
    },

    /// A vertex index refers to a slot outside the vertex table.
    #[error("invalid vertex index {vertex:?}")]
    InvalidVertex {
        /// The offending index.
        vertex: VertexIdx,
    },

    /// Neighbour links are not reciprocal, or a re-triangulated region does
    /// not close up.
    #[error("inconsistent topology around tetrahedra {tetrahedra:?}: {reason}")]
    InconsistentTopology {
        /// The tetrahedra involved.
        tetrahedra: Vec<TetIdx>,
        /// What went wrong.
        reason: &'static str,
    },

    /// A live tetrahedron is not positively oriented.
    #[error("tetrahedron {tetrahedron:?} is not positively oriented")]
    NegativeOrientation {
        /// The offending tetrahedron.
        tetrahedron: TetIdx,
    },

    /// A tetrahedron incident to the generator is too flat for its
    /// circumcentre to be computed in floating point.
    #[error("tetrahedron {tetrahedron:?} has no finite circumcentre")]
    DegenerateTetrahedron {
        /// The offending tetrahedron.
        tetrahedron: TetIdx,
    },

    /// A vertex lies strictly inside the circumsphere of a tetrahedron.
    #[error("vertex {vertex:?} lies inside the circumsphere of tetrahedron {tetrahedron:?}")]
    DelaunayViolation {
        /// The tetrahedron whose circumsphere is not empty.
        tetrahedron: TetIdx,
        /// The vertex inside it.
        vertex: VertexIdx,
    },

    /// A point coincides with a vertex that is already part of the complex.
    #[error("vertex {vertex:?} coincides with existing vertex {existing:?}")]
    DuplicateVertex {
        /// The vertex being inserted.
        vertex: VertexIdx,
        /// The vertex it coincides with.
        existing: VertexIdx,
    },

    /// Point location walked across the hull of the enclosing simplex.
    #[error("vertex {vertex:?} lies outside the enclosing simplex")]
    PointOutsideComplex {
        /// The vertex being located.
        vertex: VertexIdx,
    },

    /// The generator is still connected to a corner of the enclosing simplex,
    /// so its cell is not closed.
    #[error("cell is unbounded: generator is still connected to simplex corner {corner}")]
    UnboundedCell {
        /// The corner the generator is connected to.
        corner: u8,
    },

    /// The generator does not lie inside the simulation box, or lies too
    /// close to one of its closed walls.
    #[error("generator at {position} does not lie inside the simulation box, clear of its walls")]
    GeneratorOutsideBox {
        /// The generator position.
        position: DVec3,
    },
}

/// Errors returned when building the cells of a whole point set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoronoiError {
    /// Construction of one cell failed.
    #[error("failed to construct the cell of generator {generator}")]
    Cell {
        /// Index of the generator whose cell failed.
        generator: usize,
        /// The underlying failure.
        #[source]
        source: CellError,
    },

    /// The simulation box has a non-positive or non-finite extent.
    #[error("invalid simulation box with anchor {anchor} and width {width}")]
    InvalidBoundary {
        /// Lower corner of the box.
        anchor: DVec3,
        /// Extent of the box.
        width: DVec3,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message() {
        let err = CellError::CapacityExceeded {
            kind: CapacityKind::Tetrahedra,
            capacity: 12,
        };
        assert_eq!(err.to_string(), "tetrahedron capacity of 12 exceeded");
    }

    #[test]
    fn test_cell_error_source() {
        use std::error::Error as _;

        let err = VoronoiError::Cell {
            generator: 3,
            source: CellError::RepairDidNotTerminate { flips: 10 },
        };
        assert!(err.to_string().contains("generator 3"));
        let source = err.source().expect("cell errors carry their cause");
        assert!(source.to_string().contains("10 flips"));
    }
}
