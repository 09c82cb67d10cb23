//! Run-time configuration of the cell constructor.

/// Capacities and behaviour switches shared by every cell constructor of a
/// run.
///
/// The defaults are generous for typical point distributions; a cell that
/// needs more room fails with [`CellError::CapacityExceeded`](crate::CellError)
/// instead of growing without bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorConfig {
    /// Maximum number of vertices (including the four simplex corners and
    /// wall mirrors) in the local triangulation of one cell.
    pub max_vertices: usize,
    /// Maximum number of tetrahedron slots in the arena of one cell.
    pub max_tetrahedra: usize,
    /// Maximum number of tetrahedra waiting for a Delaunay check.
    pub max_queue: usize,
    /// Maximum number of tetrahedra around a single edge.
    pub max_edge_fan: usize,
    /// Maximum number of repair flips after a single insertion.
    pub max_flips: usize,
    /// Additionally insert the mirror images of neighbours across the
    /// non-periodic walls.
    pub reflective_boundaries: bool,
    /// Verify orientation and neighbour reciprocity after every flip. Always
    /// on in debug builds.
    pub check_invariants: bool,
    /// Faces smaller than this fraction of `volume^(2/3)` are dropped.
    pub min_relative_face_area: f64,
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        Self {
            max_vertices: 1000,
            max_tetrahedra: 10000,
            max_queue: 10000,
            max_edge_fan: u8::MAX as usize,
            max_flips: 1_000_000,
            reflective_boundaries: false,
            check_invariants: false,
            min_relative_face_area: 1e-10,
        }
    }
}

impl ConstructorConfig {
    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices;
        self
    }

    pub fn with_max_tetrahedra(mut self, max_tetrahedra: usize) -> Self {
        self.max_tetrahedra = max_tetrahedra;
        self
    }

    pub fn with_max_queue(mut self, max_queue: usize) -> Self {
        self.max_queue = max_queue;
        self
    }

    pub fn with_max_edge_fan(mut self, max_edge_fan: usize) -> Self {
        self.max_edge_fan = max_edge_fan;
        self
    }

    pub fn with_max_flips(mut self, max_flips: usize) -> Self {
        self.max_flips = max_flips;
        self
    }

    pub fn with_reflective_boundaries(mut self, reflective_boundaries: bool) -> Self {
        self.reflective_boundaries = reflective_boundaries;
        self
    }

    pub fn with_check_invariants(mut self, check_invariants: bool) -> Self {
        self.check_invariants = check_invariants;
        self
    }

    pub fn with_min_relative_face_area(mut self, min_relative_face_area: f64) -> Self {
        self.min_relative_face_area = min_relative_face_area;
        self
    }

    /// Whether flip postconditions should be verified.
    pub(crate) fn checks_enabled(&self) -> bool {
        self.check_invariants || cfg!(debug_assertions)
    }
}
