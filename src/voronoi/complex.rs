use ahash::AHashMap;

use crate::error::{CapacityKind, CellError, Result};

use super::{
    tetrahedron::{face_key, TetIdx, Tetrahedron},
    vertex::VertexIdx,
};

/// Largest `(2 r)²` over the tetrahedra incident to the generator, together
/// with the tetrahedron it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MaxRadius {
    pub r2: f64,
    pub tet: Option<TetIdx>,
    /// Set when the owning tetrahedron is removed, in which case the maximum
    /// has to be recomputed from scratch.
    pub invalidated: bool,
}

impl MaxRadius {
    const UNKNOWN: Self = Self {
        r2: f64::INFINITY,
        tet: None,
        invalidated: true,
    };
}

enum OpenFace {
    /// A face on the boundary of a re-triangulated region, with the
    /// tetrahedron (and its face index) on the outside.
    External(Option<(TetIdx, u8)>),
    /// A face of a new tetrahedron still waiting for its partner.
    New(TetIdx, u8),
}

/// Fixed-capacity arena of tetrahedra with recycling of freed slots.
#[derive(Debug, Clone)]
pub(crate) struct TetrahedronComplex {
    slots: Vec<Option<Tetrahedron>>,
    free: Vec<TetIdx>,
    capacity: usize,
    live: usize,
    max_radius: MaxRadius,
    created: Vec<TetIdx>,
}

impl TetrahedronComplex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: vec![],
            capacity,
            live: 0,
            max_radius: MaxRadius::UNKNOWN,
            created: vec![],
        }
    }

    /// Number of live tetrahedra.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Upper bound (exclusive) of the indices handed out so far.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_live(&self, t: TetIdx) -> bool {
        matches!(self.slots.get(t.0), Some(Some(_)))
    }

    pub fn get(&self, t: TetIdx) -> Result<&Tetrahedron> {
        self.slots
            .get(t.0)
            .and_then(Option::as_ref)
            .ok_or(CellError::InvalidTetrahedron { tetrahedron: t })
    }

    fn get_mut(&mut self, t: TetIdx) -> Result<&mut Tetrahedron> {
        self.slots
            .get_mut(t.0)
            .and_then(Option::as_mut)
            .ok_or(CellError::InvalidTetrahedron { tetrahedron: t })
    }

    /// Iterate over the live tetrahedra in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (TetIdx, &Tetrahedron)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|tet| (TetIdx(i), tet)))
    }

    pub fn max_radius(&self) -> MaxRadius {
        self.max_radius
    }

    pub fn set_max_radius(&mut self, r2: f64, tet: Option<TetIdx>) {
        self.max_radius = MaxRadius {
            r2,
            tet,
            invalidated: false,
        };
    }

    /// Tetrahedra allocated since the last call. Some of them may have been
    /// freed again in the meantime.
    pub fn take_created(&mut self) -> Vec<TetIdx> {
        std::mem::take(&mut self.created)
    }

    fn allocate(&mut self, tet: Tetrahedron) -> Result<TetIdx> {
        let t = match self.free.pop() {
            Some(t) => {
                self.slots[t.0] = Some(tet);
                t
            }
            None => {
                if self.slots.len() == self.capacity {
                    return Err(CellError::CapacityExceeded {
                        kind: CapacityKind::Tetrahedra,
                        capacity: self.capacity,
                    });
                }
                self.slots.push(Some(tet));
                TetIdx(self.slots.len() - 1)
            }
        };
        self.live += 1;
        self.created.push(t);
        Ok(t)
    }

    fn free(&mut self, t: TetIdx) -> Result<()> {
        let slot = self
            .slots
            .get_mut(t.0)
            .ok_or(CellError::InvalidTetrahedron { tetrahedron: t })?;
        if slot.take().is_none() {
            return Err(CellError::InvalidTetrahedron { tetrahedron: t });
        }
        if self.max_radius.tet == Some(t) {
            self.max_radius.invalidated = true;
        }
        self.free.push(t);
        self.live -= 1;
        Ok(())
    }

    fn link(&mut self, t: TetIdx, i: usize, n: TetIdx, j: usize) -> Result<()> {
        let tet = self.get_mut(t)?;
        tet.neighbours[i] = Some(n);
        tet.index_in_neighbour[i] = j as u8;
        let ngb = self.get_mut(n)?;
        ngb.neighbours[j] = Some(t);
        ngb.index_in_neighbour[j] = i as u8;
        Ok(())
    }

    /// Add a tetrahedron without any neighbours. Only used for the enclosing
    /// simplex.
    pub fn insert_isolated(&mut self, vertices: [VertexIdx; 4]) -> Result<TetIdx> {
        self.allocate(Tetrahedron::new(vertices))
    }

    /// Replace the tetrahedra `removed` by new tetrahedra with the given
    /// vertices, which must fill exactly the same region.
    ///
    /// Faces of the new tetrahedra are matched with each other and with the
    /// faces on the boundary of the removed region. Returns the indices of
    /// the new tetrahedra, in the order of `created`.
    pub fn replace(&mut self, removed: &[TetIdx], created: &[[VertexIdx; 4]]) -> Result<Vec<TetIdx>> {
        let mut open: AHashMap<[VertexIdx; 3], OpenFace> = AHashMap::with_capacity(4 * created.len());
        for &t in removed {
            let tet = self.get(t)?;
            for i in 0..4 {
                let link = match tet.neighbours[i] {
                    Some(n) if removed.contains(&n) => continue,
                    Some(n) => Some((n, tet.index_in_neighbour[i])),
                    None => None,
                };
                if open.insert(tet.face_key(i), OpenFace::External(link)).is_some() {
                    return Err(CellError::InconsistentTopology {
                        tetrahedra: removed.to_vec(),
                        reason: "boundary face of replaced region occurs twice",
                    });
                }
            }
        }
        for &t in removed {
            self.free(t)?;
        }

        let mut new = Vec::with_capacity(created.len());
        for vertices in created {
            let t = self.allocate(Tetrahedron::new(*vertices))?;
            new.push(t);
            for i in 0..4 {
                let key = face_key(vertices, i);
                match open.remove(&key) {
                    Some(OpenFace::External(Some((n, j)))) => self.link(t, i, n, j as usize)?,
                    Some(OpenFace::External(None)) => (),
                    Some(OpenFace::New(n, j)) => self.link(t, i, n, j as usize)?,
                    None => {
                        open.insert(key, OpenFace::New(t, i as u8));
                    }
                }
            }
        }

        if !open.is_empty() {
            let mut tetrahedra = removed.to_vec();
            tetrahedra.extend_from_slice(&new);
            return Err(CellError::InconsistentTopology {
                tetrahedra,
                reason: "re-triangulated region does not close up",
            });
        }
        Ok(new)
    }

    /// The tetrahedra around the edge `a`-`b`, in cyclic order, starting
    /// with `start` (which must contain the edge).
    pub fn edge_fan(&self, start: TetIdx, a: VertexIdx, b: VertexIdx, max: usize) -> Result<Vec<TetIdx>> {
        let not_on_edge = |tet: &Tetrahedron, other: Option<VertexIdx>| {
            tet.vertices
                .iter()
                .copied()
                .find(|&v| v != a && v != b && Some(v) != other)
        };
        let tet = self.get(start)?;
        let missing_edge = || CellError::InconsistentTopology {
            tetrahedra: vec![start],
            reason: "tetrahedron does not contain the edge",
        };
        if !tet.contains(a) || !tet.contains(b) || a == b {
            return Err(missing_edge());
        }
        let mut from = not_on_edge(tet, None).ok_or_else(missing_edge)?;

        let mut fan = vec![start];
        let mut current = start;
        loop {
            let tet = self.get(current)?;
            let i = tet.index_of(from).ok_or_else(missing_edge)?;
            let kept = not_on_edge(tet, Some(from)).ok_or_else(missing_edge)?;
            let next = tet.neighbours[i].ok_or_else(|| CellError::InconsistentTopology {
                tetrahedra: fan.clone(),
                reason: "edge lies on the hull of the complex",
            })?;
            if next == start {
                return Ok(fan);
            }
            if fan.len() == max {
                return Err(CellError::CapacityExceeded {
                    kind: CapacityKind::EdgeFan,
                    capacity: max,
                });
            }
            fan.push(next);
            // Continue through the face of `next` that was not shared with
            // `current`.
            from = kept;
            current = next;
        }
    }

    /// Verify that the neighbour links of the given tetrahedra are
    /// reciprocal and that linked faces share their vertices.
    pub fn check_links(&self, tets: &[TetIdx]) -> Result<()> {
        for &t in tets {
            let tet = self.get(t)?;
            for i in 0..4 {
                let Some(n) = tet.neighbours[i] else {
                    continue;
                };
                let ngb = self.get(n)?;
                let j = tet.apex_index_in_neighbour(i);
                if ngb.neighbours[j] != Some(t)
                    || ngb.index_in_neighbour[j] as usize != i
                    || ngb.face_key(j) != tet.face_key(i)
                {
                    return Err(CellError::InconsistentTopology {
                        tetrahedra: vec![t, n],
                        reason: "neighbour links are not reciprocal",
                    });
                }
            }
        }
        Ok(())
    }

    /// Verify the neighbour links of every live tetrahedron.
    pub fn check_connectivity(&self) -> Result<()> {
        let live: Vec<TetIdx> = self.iter().map(|(t, _)| t).collect();
        self.check_links(&live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(vertices: [usize; 4]) -> [VertexIdx; 4] {
        vertices.map(VertexIdx)
    }

    /// A single tetrahedron split into four around vertex 4.
    fn split_complex() -> (TetrahedronComplex, Vec<TetIdx>) {
        let mut complex = TetrahedronComplex::with_capacity(16);
        let t = complex.insert_isolated(v([0, 1, 2, 3])).unwrap();
        let tet = complex.get(t).unwrap().clone();
        let created: Vec<[VertexIdx; 4]> = (0..4).map(|i| tet.with_vertex(i, VertexIdx(4))).collect();
        let new = complex.replace(&[t], &created).unwrap();
        (complex, new)
    }

    #[test]
    fn test_replace_links_new_tetrahedra() {
        let (complex, new) = split_complex();
        assert_eq!(complex.len(), 4);
        complex.check_connectivity().unwrap();
        // every new tetrahedron has three internal neighbours and one hull face
        for &t in &new {
            let tet = complex.get(t).unwrap();
            let i = tet.index_of(VertexIdx(4)).unwrap();
            assert!(tet.neighbours[i].is_none());
            assert_eq!(tet.neighbours.iter().flatten().count(), 3);
        }
    }

    #[test]
    fn test_slots_are_recycled() {
        let (mut complex, new) = split_complex();
        // the slot of the removed tetrahedron is reused
        assert_eq!(complex.slot_count(), 4);
        assert!(new.contains(&TetIdx(0)));

        let created = complex.take_created();
        assert_eq!(created.len(), 5);
        assert!(complex.take_created().is_empty());

        // merge back into one tetrahedron
        let restored = complex.replace(&new, &[v([0, 1, 2, 3])]).unwrap();
        assert_eq!(complex.len(), 1);
        assert_eq!(complex.slot_count(), 4);
        let tet = complex.get(restored[0]).unwrap();
        assert_eq!(tet.neighbours, [None; 4]);
    }

    #[test]
    fn test_replace_rejects_open_region() {
        let (mut complex, new) = split_complex();
        let result = complex.replace(&new[..1], &[v([0, 1, 2, 5])]);
        assert!(matches!(result, Err(CellError::InconsistentTopology { .. })));
    }

    #[test]
    fn test_capacity() {
        let mut complex = TetrahedronComplex::with_capacity(3);
        let t = complex.insert_isolated(v([0, 1, 2, 3])).unwrap();
        let tet = complex.get(t).unwrap().clone();
        let created: Vec<[VertexIdx; 4]> = (0..4).map(|i| tet.with_vertex(i, VertexIdx(4))).collect();
        assert_eq!(
            complex.replace(&[t], &created),
            Err(CellError::CapacityExceeded {
                kind: CapacityKind::Tetrahedra,
                capacity: 3
            })
        );
    }

    #[test]
    fn test_invalid_index() {
        let (complex, _) = split_complex();
        assert!(complex.get(TetIdx(42)).is_err());
        assert!(!complex.is_live(TetIdx(42)));
    }

    #[test]
    fn test_edge_fan() {
        let (complex, new) = split_complex();
        // the edge 0-4 is shared by the three new tetrahedra not opposite 0
        let start = new
            .iter()
            .copied()
            .find(|&t| complex.get(t).unwrap().contains(VertexIdx(0)))
            .unwrap();
        let fan = complex.edge_fan(start, VertexIdx(0), VertexIdx(4), 8).unwrap();
        assert_eq!(fan.len(), 3);
        assert_eq!(fan[0], start);
        for t in &fan {
            let tet = complex.get(*t).unwrap();
            assert!(tet.contains(VertexIdx(0)) && tet.contains(VertexIdx(4)));
        }
        assert!(matches!(
            complex.edge_fan(start, VertexIdx(0), VertexIdx(4), 2),
            Err(CellError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_max_radius_invalidation() {
        let (mut complex, new) = split_complex();
        complex.set_max_radius(2., Some(new[1]));
        assert!(!complex.max_radius().invalidated);
        complex.replace(&new, &[v([0, 1, 2, 3])]).unwrap();
        assert!(complex.max_radius().invalidated);
    }
}
