use glam::DVec3;

use crate::error::{CapacityKind, CellError, Result};

use super::boundary::Wall;

/// Index of a vertex in the local vertex table of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexIdx(pub(crate) usize);

impl VertexIdx {
    /// The generator of the cell is always the first vertex.
    pub const GENERATOR: VertexIdx = VertexIdx(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// What a vertex of the local triangulation stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexRef {
    /// A generator, possibly a periodic image of it.
    Generator { idx: usize, shift: Option<DVec3> },
    /// The mirror image of the cell's own generator across a wall.
    Mirror(Wall),
    /// The mirror image of a neighbouring generator across a wall.
    Reflection { idx: usize, wall: Wall },
    /// One of the four corners of the enclosing simplex.
    Corner(u8),
}

/// Local vertex slots of a cell, with cached real and rescaled positions.
///
/// Grows monotonically during the construction of one cell.
#[derive(Debug, Clone)]
pub(crate) struct VertexTable {
    refs: Vec<VertexRef>,
    positions: Vec<DVec3>,
    rescaled: Vec<DVec3>,
    capacity: usize,
}

impl VertexTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            refs: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            rescaled: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, vertex: VertexRef, position: DVec3, rescaled: DVec3) -> Result<VertexIdx> {
        if self.refs.len() == self.capacity {
            return Err(CellError::CapacityExceeded {
                kind: CapacityKind::Vertices,
                capacity: self.capacity,
            });
        }
        self.refs.push(vertex);
        self.positions.push(position);
        self.rescaled.push(rescaled);
        Ok(VertexIdx(self.refs.len() - 1))
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn indices(&self) -> impl Iterator<Item = VertexIdx> {
        (0..self.refs.len()).map(VertexIdx)
    }

    pub fn vertex(&self, idx: VertexIdx) -> Result<VertexRef> {
        self.refs
            .get(idx.0)
            .copied()
            .ok_or(CellError::InvalidVertex { vertex: idx })
    }

    /// Real position of a vertex, periodic shifts and mirroring applied.
    pub fn position(&self, idx: VertexIdx) -> DVec3 {
        self.positions[idx.0]
    }

    /// Position in the `[1, 2)` domain of the exact predicates.
    pub fn rescaled(&self, idx: VertexIdx) -> DVec3 {
        self.rescaled[idx.0]
    }

    pub fn rescaled_4(&self, v: [VertexIdx; 4]) -> [DVec3; 4] {
        v.map(|v| self.rescaled(v))
    }
}
