use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use glam::DVec3;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    config::ConstructorConfig,
    error::VoronoiError,
    rtree_nn::{build_rtree, nn_iter, wrapping_nn_iter},
};

mod boundary;
mod cell_constructor;
mod check_queue;
mod complex;
mod flips;
mod generator;
pub mod integrals;
mod tetrahedron;
mod vertex;
mod voronoi_cell;
mod voronoi_face;

pub use boundary::{SimulationBoundary, Wall};
pub use cell_constructor::{CellConstructor, Location};
pub(crate) use generator::Generator;
pub use tetrahedron::TetIdx;
pub use vertex::{VertexIdx, VertexRef};
pub use voronoi_cell::VoronoiCell;
pub use voronoi_face::{FaceNeighbour, VoronoiFace};

/// The Voronoi cells of a set of generators inside a (possibly periodic)
/// simulation box.
///
/// Every cell is constructed independently from the generator's nearest
/// neighbours, so the cells can be built in parallel (with the `rayon`
/// feature).
#[derive(Debug, Clone)]
pub struct Voronoi {
    boundary: SimulationBoundary,
    cells: Vec<VoronoiCell>,
}

impl Voronoi {
    /// Construct the Voronoi cells of `generators` in the box with lower
    /// corner `anchor` and extent `width`, using the default
    /// [`ConstructorConfig`].
    ///
    /// * `periodic` - Whether to apply periodic boundary conditions along all
    ///   axes. Otherwise the cells are clipped by the walls of the box.
    pub fn build(generators: &[DVec3], anchor: DVec3, width: DVec3, periodic: bool) -> Result<Self, VoronoiError> {
        let boundary = SimulationBoundary::cuboid(anchor, width, periodic)?;
        Self::build_with(generators, &boundary, &ConstructorConfig::default())
    }

    /// Construct the Voronoi cells of `generators` inside `boundary`.
    ///
    /// Fails if the construction of any of the cells fails.
    pub fn build_with(
        generators: &[DVec3],
        boundary: &SimulationBoundary,
        config: &ConstructorConfig,
    ) -> Result<Self, VoronoiError> {
        let rtree = build_rtree(
            &generators
                .iter()
                .enumerate()
                .map(|(id, &loc)| Generator::new(id, loc))
                .collect::<Vec<_>>(),
        );
        let periodic = boundary.periodic();
        let wrapping = periodic.iter().any(|&p| p);

        let build_cell = |idx: usize| {
            let loc = generators[idx];
            let nearest_neighbours = if wrapping {
                wrapping_nn_iter(&rtree, loc, boundary.width(), periodic)
            } else {
                nn_iter(&rtree, loc)
            };
            CellConstructor::new(idx, generators, boundary, config)
                .and_then(|mut cell| {
                    cell.build(nearest_neighbours)?;
                    cell.cell()
                })
                .map_err(|source| {
                    warn!(generator = idx, %source, "cell construction failed");
                    VoronoiError::Cell { generator: idx, source }
                })
        };

        #[cfg(feature = "rayon")]
        let cells = (0..generators.len())
            .into_par_iter()
            .map(build_cell)
            .collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "rayon"))]
        let cells = (0..generators.len()).map(build_cell).collect::<Result<Vec<_>, _>>()?;

        debug!(cells = cells.len(), "voronoi cells built");

        Ok(Self {
            boundary: boundary.clone(),
            cells,
        })
    }

    /// The lower corner of the simulation box.
    pub fn anchor(&self) -> DVec3 {
        self.boundary.anchor()
    }

    /// The extent of the simulation box.
    pub fn width(&self) -> DVec3 {
        self.boundary.width()
    }

    pub fn boundary(&self) -> &SimulationBoundary {
        &self.boundary
    }

    /// The cells, in the order of their generators.
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<VoronoiCell> {
        self.cells
    }

    /// Write a plain text description of all cells and their faces.
    ///
    /// Every cell is written as a line with its generator index, volume,
    /// generator position and centroid, followed by one indented line per
    /// face with its neighbour, area, midpoint and normal.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for cell in &self.cells {
            let loc = cell.loc();
            let centroid = cell.centroid();
            writeln!(
                writer,
                "{}\t{}\t({}, {}, {})\t({}, {}, {})",
                cell.idx(),
                cell.volume(),
                loc.x,
                loc.y,
                loc.z,
                centroid.x,
                centroid.y,
                centroid.z
            )?;
            for face in cell.faces() {
                let midpoint = face.midpoint();
                let normal = face.normal();
                writeln!(
                    writer,
                    "\t{}\t{}\t({}, {}, {})\t({}, {}, {})",
                    face.neighbour(),
                    face.area(),
                    midpoint.x,
                    midpoint.y,
                    midpoint.z,
                    normal.x,
                    normal.y,
                    normal.z
                )?;
            }
        }

        Ok(())
    }

    /// Save the text description of [`Voronoi::write`] to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()
    }
}
