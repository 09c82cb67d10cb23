use super::vertex::VertexIdx;

/// Index of a tetrahedron slot in the arena of a [`TetrahedronComplex`](super::complex::TetrahedronComplex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TetIdx(pub(crate) usize);

impl TetIdx {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tetrahedron of the local triangulation.
///
/// Face `i` is the face opposite vertex `i`. `neighbours[i]` is the
/// tetrahedron on the other side of that face, and `index_in_neighbour[i]` is
/// the index of the same face in that neighbour.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tetrahedron {
    pub vertices: [VertexIdx; 4],
    pub neighbours: [Option<TetIdx>; 4],
    pub index_in_neighbour: [u8; 4],
}

impl Tetrahedron {
    pub fn new(vertices: [VertexIdx; 4]) -> Self {
        Self {
            vertices,
            neighbours: [None; 4],
            index_in_neighbour: [0; 4],
        }
    }

    pub fn index_of(&self, vertex: VertexIdx) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    pub fn contains(&self, vertex: VertexIdx) -> bool {
        self.vertices.contains(&vertex)
    }

    /// The vertex of the neighbour across face `i` that is not on that face.
    pub fn apex_index_in_neighbour(&self, i: usize) -> usize {
        self.index_in_neighbour[i] as usize
    }

    /// The vertices of this tetrahedron with vertex `i` replaced by `vertex`.
    pub fn with_vertex(&self, i: usize, vertex: VertexIdx) -> [VertexIdx; 4] {
        let mut vertices = self.vertices;
        vertices[i] = vertex;
        vertices
    }

    pub fn face_key(&self, i: usize) -> [VertexIdx; 3] {
        face_key(&self.vertices, i)
    }
}

/// Sorted vertices of face `i` of a tetrahedron with the given vertices.
pub(crate) fn face_key(vertices: &[VertexIdx; 4], i: usize) -> [VertexIdx; 3] {
    let mut key = [vertices[(i + 1) % 4], vertices[(i + 2) % 4], vertices[(i + 3) % 4]];
    key.sort_unstable();
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tet(v: [usize; 4]) -> Tetrahedron {
        Tetrahedron::new(v.map(VertexIdx))
    }

    #[test]
    fn test_faces() {
        let t = tet([4, 1, 7, 2]);
        assert_eq!(t.face_key(0), [1, 2, 7].map(VertexIdx));
        assert_eq!(t.face_key(2), [1, 2, 4].map(VertexIdx));
        assert_eq!(t.index_of(VertexIdx(7)), Some(2));
        assert_eq!(t.index_of(VertexIdx(3)), None);
        assert_eq!(t.with_vertex(1, VertexIdx(9)), [4, 9, 7, 2].map(VertexIdx));
    }
}
