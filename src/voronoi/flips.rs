//! Flips of the tetrahedron complex.
//!
//! Every flip is expressed as a list of existing tetrahedra in which one
//! vertex is replaced by another, and is carried out by
//! [`TetrahedronComplex::replace`]. Choosing the replaced vertices such that
//! the new tetrahedra are positively oriented is up to the caller.

use tracing::trace;

use crate::error::{CellError, Result};

use super::{complex::TetrahedronComplex, tetrahedron::TetIdx, vertex::VertexIdx};

impl TetrahedronComplex {
    /// Insert `v` strictly inside tetrahedron `t`.
    pub fn one_to_four(&mut self, t: TetIdx, v: VertexIdx) -> Result<Vec<TetIdx>> {
        let tet = self.get(t)?.clone();
        let created: Vec<[VertexIdx; 4]> = (0..4).map(|i| tet.with_vertex(i, v)).collect();
        trace!(?t, ?v, "1-to-4 flip");
        self.replace(&[t], &created)
    }

    /// Insert `v` on the interior of face `face` of tetrahedron `t`.
    pub fn two_to_six(&mut self, t: TetIdx, face: usize, v: VertexIdx) -> Result<Vec<TetIdx>> {
        let tet = self.get(t)?.clone();
        let t1 = tet.neighbours[face].ok_or_else(|| CellError::InconsistentTopology {
            tetrahedra: vec![t],
            reason: "insertion on a hull face",
        })?;
        let face1 = tet.apex_index_in_neighbour(face);
        let tet1 = self.get(t1)?.clone();

        let created: Vec<[VertexIdx; 4]> = (0..4)
            .filter(|&i| i != face)
            .map(|i| tet.with_vertex(i, v))
            .chain((0..4).filter(|&i| i != face1).map(|i| tet1.with_vertex(i, v)))
            .collect();
        trace!(?t, ?t1, ?v, "2-to-6 flip");
        self.replace(&[t, t1], &created)
    }

    /// Insert `v` on the interior of the edge `a`-`b`, shared by the
    /// tetrahedra in `fan`.
    pub fn n_to_2n(&mut self, fan: &[TetIdx], a: VertexIdx, b: VertexIdx, v: VertexIdx) -> Result<Vec<TetIdx>> {
        let mut created = Vec::with_capacity(2 * fan.len());
        for &t in fan {
            let tet = self.get(t)?;
            let (Some(ia), Some(ib)) = (tet.index_of(a), tet.index_of(b)) else {
                return Err(CellError::InconsistentTopology {
                    tetrahedra: fan.to_vec(),
                    reason: "edge fan member does not contain the edge",
                });
            };
            created.push(tet.with_vertex(ia, v));
            created.push(tet.with_vertex(ib, v));
        }
        trace!(n = fan.len(), ?v, "n-to-2n flip");
        self.replace(fan, &created)
    }

    /// Replace `t` and its neighbour `t2` across the face opposite vertex `p`
    /// of `t` by three tetrahedra around the edge from `p` to the apex `d`
    /// of `t2`.
    pub fn two_to_three(&mut self, t: TetIdx, t2: TetIdx, p: usize, d: VertexIdx) -> Result<Vec<TetIdx>> {
        let tet = self.get(t)?.clone();
        let created: Vec<[VertexIdx; 4]> = (0..4)
            .filter(|&j| j != p)
            .map(|j| tet.with_vertex(j, d))
            .collect();
        trace!(?t, ?t2, "2-to-3 flip");
        self.replace(&[t, t2], &created)
    }

    /// Replace the three tetrahedra `t`, `t2` and `t3` around the edge
    /// `a`-`b` by two tetrahedra sharing the triangle opposite that edge.
    ///
    /// `t3` must share the edge with `t` and contain `d`, the apex of `t2`.
    pub fn three_to_two(
        &mut self,
        [t, t2, t3]: [TetIdx; 3],
        [a, b]: [VertexIdx; 2],
        d: VertexIdx,
    ) -> Result<Vec<TetIdx>> {
        let tet = self.get(t)?.clone();
        let created = [
            tet.with_vertex(self.vertex_slot(t, a)?, d),
            tet.with_vertex(self.vertex_slot(t, b)?, d),
        ];
        trace!(?t, ?t2, ?t3, "3-to-2 flip");
        self.replace(&[t, t2, t3], &created)
    }

    /// Replace the four tetrahedra around the edge `a`-`b` by four
    /// tetrahedra around the edge from the apex `p` of `t` to `d`, in the
    /// case where `p`, `d`, `a` and `b` are coplanar.
    ///
    /// `t3` is the neighbour of `t` sharing the edge, `t4` the neighbour of
    /// `t2` sharing the edge, and both share the same fourth vertex.
    pub fn four_to_four(
        &mut self,
        [t, t2, t3, t4]: [TetIdx; 4],
        [a, b]: [VertexIdx; 2],
        d: VertexIdx,
    ) -> Result<Vec<TetIdx>> {
        let tet = self.get(t)?.clone();
        let tet3 = self.get(t3)?.clone();
        let created = [
            tet.with_vertex(self.vertex_slot(t, a)?, d),
            tet.with_vertex(self.vertex_slot(t, b)?, d),
            tet3.with_vertex(self.vertex_slot(t3, a)?, d),
            tet3.with_vertex(self.vertex_slot(t3, b)?, d),
        ];
        trace!(?t, ?t2, ?t3, ?t4, "4-to-4 flip");
        self.replace(&[t, t2, t3, t4], &created)
    }

    fn vertex_slot(&self, t: TetIdx, v: VertexIdx) -> Result<usize> {
        self.get(t)?
            .index_of(v)
            .ok_or_else(|| CellError::InconsistentTopology {
                tetrahedra: vec![t],
                reason: "flip vertex is not part of the tetrahedron",
            })
    }
}
