use crate::error::{CapacityKind, CellError, Result};

use super::tetrahedron::TetIdx;

/// Tetrahedra that still need a Delaunay check after an insertion.
///
/// Each tetrahedron is queued at most once at any time. Entries can go stale
/// when their tetrahedron is removed by an intermediate flip; the caller has
/// to skip those.
#[derive(Debug, Clone)]
pub(crate) struct CheckQueue {
    stack: Vec<TetIdx>,
    queued: Vec<bool>,
    capacity: usize,
}

impl CheckQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Vec::with_capacity(capacity),
            queued: vec![],
            capacity,
        }
    }

    pub fn push(&mut self, t: TetIdx) -> Result<()> {
        if t.0 >= self.queued.len() {
            self.queued.resize(t.0 + 1, false);
        }
        if self.queued[t.0] {
            return Ok(());
        }
        if self.stack.len() == self.capacity {
            return Err(CellError::CapacityExceeded {
                kind: CapacityKind::CheckQueue,
                capacity: self.capacity,
            });
        }
        self.queued[t.0] = true;
        self.stack.push(t);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<TetIdx> {
        let t = self.stack.pop()?;
        self.queued[t.0] = false;
        Some(t)
    }
}
