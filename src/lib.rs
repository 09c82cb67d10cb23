//! **Voronoi cells of a point set, one generator at a time.**
//!
//! Every cell is computed independently by incrementally building a local
//! Delaunay tetrahedralization around its generator: the generator is placed
//! in a large enclosing simplex together with its mirror images across the
//! walls of the simulation box, after which its neighbours are inserted by
//! increasing distance. Each insertion splits the tetrahedra containing the
//! new point (1-4, 2-6 or n-2n flips) and restores the Delaunay property with
//! 2-3, 3-2 and 4-4 flips. Insertion stops as soon as the next candidate lies
//! further away than twice the largest circumradius of the tetrahedra around
//! the generator, since such a point can no longer change the cell.
//!
//! The Voronoi cell is then read off the tetrahedra around the generator:
//! their circumcentres are the cell's vertices, and every Delaunay edge from
//! the generator yields one face.
//!
//! All topological decisions use exact predicates. Positions are first
//! rescaled into `[1, 2)`, where every double has the same exponent, so
//! differences of coordinates are exact and a floating point evaluation with
//! a conservative error bound can be backed by an arbitrary precision integer
//! evaluation whenever its sign is uncertain. Highly degenerate inputs, like
//! perfect grids with many co-spherical points, are handled consistently.
//!
//! # Features
//!
//! - Reflective (walled) and periodic simulation boxes, selectable per axis.
//!
//! - Parallel construction of all cells of a point set.
//!
//! - Evaluation of *custom integrals* for cells and faces.
//!
//! - Diagnostics of the local triangulation (empty circumsphere test,
//!   connectivity check and a plain text dump of its edges).
//!
//! # Cargo Features
//!
//! **Note**: the features for choosing an arbitrary precision integer backend
//! are all *mutually exclusive*.
#![doc = document_features::document_features!()]

#[cfg(any(
    all(feature = "malachite", feature = "rug"),
    all(feature = "malachite", feature = "dashu"),
    all(feature = "malachite", feature = "num_bigint"),
    all(feature = "malachite", feature = "ibig"),
    all(feature = "rug", feature = "dashu"),
    all(feature = "rug", feature = "num_bigint"),
    all(feature = "rug", feature = "ibig"),
    all(feature = "dashu", feature = "num_bigint"),
    all(feature = "dashu", feature = "ibig"),
    all(feature = "num_bigint", feature = "ibig"),
))]
compile_error!("Multiple arbitrary precision arithmetic backends enabled!");

#[cfg(not(any(
    feature = "malachite",
    feature = "rug",
    feature = "dashu",
    feature = "num_bigint",
    feature = "ibig",
)))]
compile_error!("No arbitrary precision arithmetic backend enabled!");

mod config;
mod error;
pub mod geometry;
pub mod predicates;
mod rtree_nn;
mod voronoi;

pub use config::ConstructorConfig;
pub use error::{CapacityKind, CellError, VoronoiError};
pub use voronoi::{
    integrals, CellConstructor, FaceNeighbour, Location, SimulationBoundary, TetIdx, VertexIdx, VertexRef, Voronoi,
    VoronoiCell, VoronoiFace, Wall,
};
