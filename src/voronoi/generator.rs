use glam::DVec3;

/// A Voronoi generator, as stored in the nearest neighbour search tree.
#[derive(Clone, Copy, Debug)]
pub struct Generator {
    loc: DVec3,
    id: usize,
}

impl Generator {
    pub(crate) fn new(id: usize, loc: DVec3) -> Self {
        Self { loc, id }
    }

    /// Get the id of this generator
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get the position of this generator
    pub fn loc(&self) -> DVec3 {
        self.loc
    }
}
