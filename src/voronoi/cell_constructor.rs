//! Incremental construction of a single Voronoi cell.
//!
//! The cell of a generator is the dual of the tetrahedra incident to it in
//! the Delaunay triangulation of the generator and its neighbours. That
//! triangulation is built from scratch for every cell: it starts from one
//! large tetrahedron containing everything, and grows by inserting the
//! generator, its mirror images across the walls of the simulation box and
//! then its neighbours by increasing distance, each followed by flips that
//! restore the Delaunay property. Insertion stops as soon as the next
//! neighbour lies outside every circumsphere incident to the generator, at
//! which point no further neighbour can change the cell.

use std::{collections::BTreeMap, io::Write};

use ahash::AHashMap;
use glam::DVec3;
use tracing::{debug, trace};

use crate::{
    config::ConstructorConfig,
    error::{CellError, Result},
    geometry::{circumcenter, signed_area_tri, signed_volume_tet},
    predicates::{in_sphere, orient3d},
};

use super::{
    boundary::SimulationBoundary,
    check_queue::CheckQueue,
    complex::TetrahedronComplex,
    integrals::{AreaCentroidIntegrator, CellIntegral, FaceIntegral, VolumeCentroidIntegrator},
    tetrahedron::{TetIdx, Tetrahedron},
    vertex::{VertexIdx, VertexRef, VertexTable},
    voronoi_cell::VoronoiCell,
    voronoi_face::{FaceNeighbour, VoronoiFace},
};

/// Where a point lies with respect to the tetrahedra of a cell under
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Strictly inside a tetrahedron.
    Inside(TetIdx),
    /// On the interior of face `face` of `tetrahedra[0]`, which is shared
    /// with `tetrahedra[1]`.
    Face { tetrahedra: [TetIdx; 2], face: usize },
    /// On the interior of the edge between the vertices `edge`, which is
    /// shared by `tetrahedra` (in cyclic order).
    Edge {
        tetrahedra: Vec<TetIdx>,
        edge: [VertexIdx; 2],
    },
}

/// The polygon dual to the edge between the generator and `vertex`,
/// counterclockwise as seen from the generator.
struct FacePolygon {
    vertex: VertexIdx,
    points: Vec<DVec3>,
}

impl FacePolygon {
    fn new(vertex: VertexIdx, mut points: Vec<DVec3>, gen: DVec3) -> Self {
        let orientation: f64 = fan(&points).map(|(v0, v1, v2)| signed_area_tri(v0, v1, v2, gen)).sum();
        if orientation < 0. {
            points.reverse();
        }
        Self { vertex, points }
    }

    fn triangles(&self) -> impl Iterator<Item = (DVec3, DVec3, DVec3)> + '_ {
        fan(&self.points)
    }
}

/// Triangulate a convex polygon as a fan around its first vertex.
fn fan(points: &[DVec3]) -> impl Iterator<Item = (DVec3, DVec3, DVec3)> + '_ {
    let p0 = points.first().copied().unwrap_or_default();
    points
        .iter()
        .skip(1)
        .zip(points.iter().skip(2))
        .map(move |(&v1, &v2)| (p0, v1, v2))
}

/// The two vertices of `tet` other than those at indices `i` and `j`.
fn edge_without(tet: &Tetrahedron, i: usize, j: usize) -> [VertexIdx; 2] {
    let mut edge = [VertexIdx::GENERATOR; 2];
    let mut n = 0;
    for k in (0..4).filter(|&k| k != i && k != j) {
        edge[n] = tet.vertices[k];
        n += 1;
    }
    edge
}

/// Builds the Voronoi cell of a single generator.
///
/// Owns the complete (local) triangulation of the cell, so constructors of
/// different generators can run fully independently.
#[derive(Debug, Clone)]
pub struct CellConstructor<'a> {
    idx: usize,
    loc: DVec3,
    generators: &'a [DVec3],
    boundary: &'a SimulationBoundary,
    config: &'a ConstructorConfig,
    vertices: VertexTable,
    complex: TetrahedronComplex,
    queue: CheckQueue,
    hint: TetIdx,
}

impl<'a> CellConstructor<'a> {
    /// Set up the construction of the cell of generator `idx`.
    ///
    /// The generator is inserted into an enclosing tetrahedron, followed by
    /// its mirror images across all non-periodic walls of `boundary`, which
    /// bound the cell by the box.
    pub fn new(
        idx: usize,
        generators: &'a [DVec3],
        boundary: &'a SimulationBoundary,
        config: &'a ConstructorConfig,
    ) -> Result<Self> {
        let loc = *generators.get(idx).ok_or(CellError::InvalidGenerator {
            idx,
            count: generators.len(),
        })?;
        if !boundary.contains(loc) {
            return Err(CellError::GeneratorOutsideBox { position: loc });
        }

        let mut vertices = VertexTable::with_capacity(config.max_vertices);
        vertices.push(VertexRef::Generator { idx, shift: None }, loc, boundary.rescale(loc))?;
        let mut corners = [VertexIdx::GENERATOR; 4];
        for (i, (position, rescaled)) in boundary.simplex_corners().into_iter().enumerate() {
            corners[i] = vertices.push(VertexRef::Corner(i as u8), position, rescaled)?;
        }

        let mut complex = TetrahedronComplex::with_capacity(config.max_tetrahedra);
        let simplex = complex.insert_isolated(corners)?;
        let [a, b, c, d] = vertices.rescaled_4(corners);
        if orient3d(a, b, c, d) <= 0. {
            return Err(CellError::NegativeOrientation { tetrahedron: simplex });
        }

        let mut cell = Self {
            idx,
            loc,
            generators,
            boundary,
            config,
            vertices,
            complex,
            queue: CheckQueue::with_capacity(config.max_queue),
            hint: simplex,
        };
        cell.insert(VertexIdx::GENERATOR)?;
        for wall in boundary.closed_walls() {
            cell.add_vertex(VertexRef::Mirror(wall), boundary.mirror(loc, wall))?;
        }
        debug!(
            generator = idx,
            tetrahedra = cell.complex.len(),
            max_radius_squared = cell.max_radius_squared(),
            "cell set up"
        );

        Ok(cell)
    }

    /// Intersect the cell with all the candidates from `nearest_neighbours`,
    /// which must be sorted by increasing distance from the generator.
    ///
    /// Stops as soon as the next candidate is too far away to affect the
    /// cell. The generator itself (without periodic shift) is skipped.
    pub fn build(&mut self, nearest_neighbours: impl Iterator<Item = (usize, Option<DVec3>)>) -> Result<()> {
        let mut count = 0;
        for (idx, shift) in nearest_neighbours {
            if idx == self.idx && shift.is_none() {
                continue;
            }
            let distance_squared = self.loc.distance_squared(self.neighbour_loc(idx, shift)?);
            if distance_squared > self.max_radius_squared() {
                debug!(
                    generator = self.idx,
                    neighbours = count,
                    max_radius_squared = self.max_radius_squared(),
                    "search radius reached"
                );
                return Ok(());
            }
            self.intersect(idx, shift)?;
            count += 1;
        }
        debug!(generator = self.idx, neighbours = count, "candidates exhausted");

        Ok(())
    }

    /// Insert the neighbour `idx`, optionally shifted by a periodic `shift`,
    /// into the cell.
    ///
    /// With reflective boundaries, the mirror images of the neighbour across
    /// the non-periodic walls are inserted as well, as long as they lie
    /// within the current search radius.
    pub fn intersect(&mut self, idx: usize, shift: Option<DVec3>) -> Result<()> {
        let ngb_loc = self.neighbour_loc(idx, shift)?;
        self.add_vertex(VertexRef::Generator { idx, shift }, ngb_loc)?;

        if self.config.reflective_boundaries {
            let boundary = self.boundary;
            for wall in boundary.closed_walls() {
                let mirror = boundary.mirror(ngb_loc, wall);
                if self.loc.distance_squared(mirror) <= self.max_radius_squared() {
                    self.add_vertex(VertexRef::Reflection { idx, wall }, mirror)?;
                }
            }
        }

        Ok(())
    }

    fn neighbour_loc(&self, idx: usize, shift: Option<DVec3>) -> Result<DVec3> {
        let loc = *self.generators.get(idx).ok_or(CellError::InvalidGenerator {
            idx,
            count: self.generators.len(),
        })?;
        Ok(loc + shift.unwrap_or(DVec3::ZERO))
    }

    fn add_vertex(&mut self, vertex: VertexRef, position: DVec3) -> Result<VertexIdx> {
        let rescaled = self
            .boundary
            .try_rescale(position)
            .ok_or(CellError::PointOutsideComplex {
                vertex: VertexIdx(self.vertices.len()),
            })?;
        let v = self.vertices.push(vertex, position, rescaled)?;
        self.insert(v)?;
        Ok(v)
    }

    /// Insert a vertex of the vertex table into the triangulation and restore
    /// the Delaunay property.
    fn insert(&mut self, v: VertexIdx) -> Result<()> {
        let created = match self.find_tetrahedron(v)? {
            Location::Inside(t) => self.complex.one_to_four(t, v)?,
            Location::Face {
                tetrahedra: [t, _],
                face,
            } => self.complex.two_to_six(t, face, v)?,
            Location::Edge {
                tetrahedra,
                edge: [a, b],
            } => self.complex.n_to_2n(&tetrahedra, a, b, v)?,
        };
        self.check_new(&created)?;
        for &t in &created {
            self.queue.push(t)?;
        }
        self.repair(v)?;
        self.update_max_radius()
    }

    /// Find the tetrahedron (or the face or edge) containing vertex `v`.
    pub(crate) fn find_tetrahedron(&self, v: VertexIdx) -> Result<Location> {
        self.walk(self.vertices.rescaled(v), v)
    }

    /// Find the tetrahedron (or the face or edge) containing `position`.
    pub fn locate(&self, position: DVec3) -> Result<Location> {
        let vertex = VertexIdx(self.vertices.len());
        let rescaled = self
            .boundary
            .try_rescale(position)
            .ok_or(CellError::PointOutsideComplex { vertex })?;
        self.walk(rescaled, vertex)
    }

    /// Visibility walk towards the rescaled point `p`.
    ///
    /// The face tested first rotates with every step, which prevents the walk
    /// from cycling.
    fn walk(&self, p: DVec3, vertex: VertexIdx) -> Result<Location> {
        let mut current = self.start_tetrahedron()?;
        let max_steps = 4 * self.complex.slot_count() + 16;
        'walk: for step in 0..max_steps {
            let tet = self.complex.get(current)?;
            let points = self.vertices.rescaled_4(tet.vertices);
            let mut on_face = [false; 4];
            for k in 0..4 {
                let i = (step + k) % 4;
                let mut q = points;
                q[i] = p;
                let orientation = orient3d(q[0], q[1], q[2], q[3]);
                if orientation < 0. {
                    current = tet.neighbours[i].ok_or(CellError::PointOutsideComplex { vertex })?;
                    continue 'walk;
                }
                on_face[i] = orientation == 0.;
            }
            return self.classify(current, tet, on_face, vertex);
        }

        Err(CellError::WalkDidNotTerminate {
            vertex,
            steps: max_steps,
        })
    }

    fn start_tetrahedron(&self) -> Result<TetIdx> {
        if self.complex.is_live(self.hint) {
            return Ok(self.hint);
        }
        self.complex
            .iter()
            .next()
            .map(|(t, _)| t)
            .ok_or(CellError::InvalidTetrahedron { tetrahedron: self.hint })
    }

    /// Classify a point inside the closed tetrahedron `t` by the faces it
    /// lies on.
    fn classify(&self, t: TetIdx, tet: &Tetrahedron, on_face: [bool; 4], vertex: VertexIdx) -> Result<Location> {
        let faces: Vec<usize> = (0..4).filter(|&i| on_face[i]).collect();
        match faces[..] {
            [] => Ok(Location::Inside(t)),
            [face] => {
                let t1 = tet.neighbours[face].ok_or(CellError::PointOutsideComplex { vertex })?;
                Ok(Location::Face {
                    tetrahedra: [t, t1],
                    face,
                })
            }
            [i, j] => {
                let [a, b] = edge_without(tet, i, j);
                let tetrahedra = self.complex.edge_fan(t, a, b, self.config.max_edge_fan)?;
                Ok(Location::Edge {
                    tetrahedra,
                    edge: [a, b],
                })
            }
            [i, j, k] => {
                // On three faces: the point coincides with the remaining vertex
                let existing = (0..4)
                    .find(|&l| l != i && l != j && l != k)
                    .map_or(tet.vertices[0], |l| tet.vertices[l]);
                Err(CellError::DuplicateVertex { vertex, existing })
            }
            _ => Err(CellError::InconsistentTopology {
                tetrahedra: vec![t],
                reason: "tetrahedron is flat",
            }),
        }
    }

    /// Flip until no tetrahedron in the check queue violates the Delaunay
    /// property with respect to the newly inserted vertex `v`.
    fn repair(&mut self, v: VertexIdx) -> Result<()> {
        let mut flips = 0;
        while let Some(t) = self.queue.pop() {
            // Tetrahedra can be removed while waiting in the queue
            if !self.complex.is_live(t) {
                continue;
            }
            let Some(created) = self.check_tetrahedron(t, v)? else {
                continue;
            };
            flips += 1;
            if flips > self.config.max_flips {
                return Err(CellError::RepairDidNotTerminate { flips });
            }
            self.check_new(&created)?;
            for &c in &created {
                self.queue.push(c)?;
            }
        }
        trace!(generator = self.idx, ?v, flips, "Delaunay property restored");

        Ok(())
    }

    /// Test the face of `t` opposite to `v` and flip if the apex on the other
    /// side lies inside the circumsphere of `t`.
    ///
    /// Returns the newly created tetrahedra, or `None` if no flip was done.
    fn check_tetrahedron(&mut self, t: TetIdx, v: VertexIdx) -> Result<Option<Vec<TetIdx>>> {
        let tet = self.complex.get(t)?.clone();
        let Some(p) = tet.index_of(v) else {
            return Ok(None);
        };
        let Some(t2) = tet.neighbours[p] else {
            return Ok(None);
        };
        let d = self.complex.get(t2)?.vertices[tet.apex_index_in_neighbour(p)];

        let points = self.vertices.rescaled_4(tet.vertices);
        let pd = self.vertices.rescaled(d);
        if in_sphere(points[0], points[1], points[2], points[3], pd) >= 0. {
            return Ok(None);
        }

        // Where does the line from `v` to `d` cross the plane of the shared
        // face?
        let mut negative = vec![];
        let mut zero = vec![];
        for j in (0..4).filter(|&j| j != p) {
            let mut q = points;
            q[j] = pd;
            let orientation = orient3d(q[0], q[1], q[2], q[3]);
            if orientation < 0. {
                negative.push(j);
            } else if orientation == 0. {
                zero.push(j);
            }
        }

        match (&negative[..], &zero[..]) {
            // Through the interior of the face: the union is convex
            (&[], &[]) => self.complex.two_to_three(t, t2, p, d).map(Some),
            // Outside of one edge: flippable if exactly three tetrahedra
            // surround that edge
            (&[j], &[]) => {
                let Some(t3) = tet.neighbours[j] else {
                    return Ok(None);
                };
                if self.complex.get(t3)?.vertices[tet.apex_index_in_neighbour(j)] != d {
                    return Ok(None);
                }
                self.complex
                    .three_to_two([t, t2, t3], edge_without(&tet, p, j), d)
                    .map(Some)
            }
            // Through an edge: flippable if exactly four tetrahedra surround
            // that edge
            (&[], &[j]) => {
                let Some(t3) = tet.neighbours[j] else {
                    return Ok(None);
                };
                let tet2 = self.complex.get(t2)?;
                let k = tet2
                    .index_of(tet.vertices[j])
                    .ok_or_else(|| CellError::InconsistentTopology {
                        tetrahedra: vec![t, t2],
                        reason: "neighbours do not share a face",
                    })?;
                let Some(t4) = tet2.neighbours[k] else {
                    return Ok(None);
                };
                let apex3 = self.complex.get(t3)?.vertices[tet.apex_index_in_neighbour(j)];
                let apex4 = self.complex.get(t4)?.vertices[tet2.apex_index_in_neighbour(k)];
                if apex3 != apex4 {
                    return Ok(None);
                }
                self.complex
                    .four_to_four([t, t2, t3, t4], edge_without(&tet, p, j), d)
                    .map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Verify orientation and neighbour links of newly created tetrahedra.
    fn check_new(&self, created: &[TetIdx]) -> Result<()> {
        if !self.config.checks_enabled() {
            return Ok(());
        }
        for &t in created {
            self.check_orientation(t)?;
        }
        self.complex.check_links(created)
    }

    fn check_orientation(&self, t: TetIdx) -> Result<()> {
        let [a, b, c, d] = self.vertices.rescaled_4(self.complex.get(t)?.vertices);
        if orient3d(a, b, c, d) > 0. {
            Ok(())
        } else {
            Err(CellError::NegativeOrientation { tetrahedron: t })
        }
    }

    /// Circumcentre of `tet` in real coordinates.
    ///
    /// Computed from the rescaled positions the predicates decide on, where
    /// all coordinate differences are exact, and mapped back.
    fn circumcenter_of(&self, tet: &Tetrahedron) -> DVec3 {
        let [a, b, c, d] = self.vertices.rescaled_4(tet.vertices);
        self.boundary.unscale(circumcenter(a, b, c, d))
    }

    /// `(2 r)²` for the circumsphere of `tet`, with `r` the distance of its
    /// circumcentre to the generator.
    ///
    /// Infinite for a tetrahedron that is flat in floating point: nothing
    /// bounds the cell on its side until later insertions remove it.
    fn radius_squared(&self, tet: &Tetrahedron) -> f64 {
        let r2 = 4. * self.circumcenter_of(tet).distance_squared(self.loc);
        if r2.is_finite() {
            r2
        } else {
            trace!(generator = self.idx, vertices = ?tet.vertices, "unbounded circumsphere");
            f64::INFINITY
        }
    }

    /// Update the maximum search radius after an insertion.
    fn update_max_radius(&mut self) -> Result<()> {
        let created: Vec<TetIdx> = self
            .complex
            .take_created()
            .into_iter()
            .filter(|&t| self.complex.is_live(t))
            .collect();
        if let Some(&last) = created.last() {
            self.hint = last;
        }

        let current = self.complex.max_radius();
        let (mut r2, mut owner, candidates) = if current.invalidated {
            let all: Vec<TetIdx> = self.complex.iter().map(|(t, _)| t).collect();
            (f64::NEG_INFINITY, None, all)
        } else {
            (current.r2, current.tet, created)
        };
        for t in candidates {
            let tet = self.complex.get(t)?;
            if !tet.contains(VertexIdx::GENERATOR) {
                continue;
            }
            let radius2 = self.radius_squared(tet);
            if owner.is_none() || radius2 > r2 {
                r2 = radius2;
                owner = Some(t);
            }
        }
        if owner.is_none() {
            r2 = f64::INFINITY;
        }
        self.complex.set_max_radius(r2, owner);

        Ok(())
    }

    /// Get the index of the generator of this cell.
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Get the position of the generator of this cell.
    pub fn loc(&self) -> DVec3 {
        self.loc
    }

    /// Get the squared search radius: candidates further away than its
    /// square root cannot affect the cell anymore.
    pub fn max_radius_squared(&self) -> f64 {
        self.complex.max_radius().r2
    }

    /// Get the number of live tetrahedra.
    pub fn tetrahedron_count(&self) -> usize {
        self.complex.len()
    }

    /// Get the number of vertices, including the enclosing tetrahedron and
    /// mirror images.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get what a vertex of the triangulation stands for.
    pub fn vertex(&self, v: VertexIdx) -> Result<VertexRef> {
        self.vertices.vertex(v)
    }

    fn circumcenter(&self, t: TetIdx) -> Result<DVec3> {
        let center = self.circumcenter_of(self.complex.get(t)?);
        if center.is_finite() {
            Ok(center)
        } else {
            Err(CellError::DegenerateTetrahedron { tetrahedron: t })
        }
    }

    /// The face polygons of the cell, in order of the vertex index of the
    /// neighbour.
    fn face_polygons(&self) -> Result<Vec<FacePolygon>> {
        let mut incident = BTreeMap::new();
        for (t, tet) in self.complex.iter() {
            if !tet.contains(VertexIdx::GENERATOR) {
                continue;
            }
            for &v in tet.vertices.iter().filter(|&&v| v != VertexIdx::GENERATOR) {
                incident.entry(v).or_insert(t);
            }
        }

        let mut circumcenters: AHashMap<TetIdx, DVec3> = AHashMap::with_capacity(2 * incident.len());
        let mut polygons = Vec::with_capacity(incident.len());
        for (vertex, start) in incident {
            if let VertexRef::Corner(corner) = self.vertices.vertex(vertex)? {
                return Err(CellError::UnboundedCell { corner });
            }
            let ring = self
                .complex
                .edge_fan(start, VertexIdx::GENERATOR, vertex, self.config.max_edge_fan)?;
            let mut points = Vec::with_capacity(ring.len());
            for t in ring {
                let center = match circumcenters.get(&t) {
                    Some(&center) => center,
                    None => {
                        let center = self.circumcenter(t)?;
                        circumcenters.insert(t, center);
                        center
                    }
                };
                points.push(center);
            }
            polygons.push(FacePolygon::new(vertex, points, self.loc));
        }

        Ok(polygons)
    }

    fn face_neighbour(&self, v: VertexIdx) -> Result<FaceNeighbour> {
        match self.vertices.vertex(v)? {
            VertexRef::Generator { idx, shift } => Ok(FaceNeighbour::Generator { idx, shift }),
            VertexRef::Mirror(wall) => Ok(FaceNeighbour::Boundary(wall)),
            VertexRef::Reflection { idx, wall } => Ok(FaceNeighbour::Reflection { idx, wall }),
            VertexRef::Corner(corner) => Err(CellError::UnboundedCell { corner }),
        }
    }

    /// Extract the Voronoi cell from the current triangulation.
    ///
    /// Faces smaller than `min_relative_face_area * volume^(2/3)` are
    /// dropped; they stem from (nearly) co-spherical neighbours.
    pub fn cell(&self) -> Result<VoronoiCell> {
        let mut volume_centroid = VolumeCentroidIntegrator::init();
        let mut faces = vec![];
        for polygon in self.face_polygons()? {
            let mut area_centroid = AreaCentroidIntegrator::init();
            for (v0, v1, v2) in polygon.triangles() {
                volume_centroid.collect(v0, v1, v2, self.loc);
                area_centroid.collect(v0, v1, v2, self.loc);
            }
            let AreaCentroidIntegrator { area, centroid } = area_centroid.finalize();
            let normal = (self.vertices.position(polygon.vertex) - self.loc).normalize();
            faces.push((polygon.vertex, area, centroid, normal));
        }
        let VolumeCentroidIntegrator { volume, centroid } = volume_centroid.finalize();

        let min_area = self.config.min_relative_face_area * volume.powf(2. / 3.);
        let face_count = faces.len();
        let faces = faces
            .into_iter()
            .filter(|&(_, area, _, _)| area >= min_area)
            .map(|(vertex, area, midpoint, normal)| {
                Ok(VoronoiFace::new(self.face_neighbour(vertex)?, area, midpoint, normal))
            })
            .collect::<Result<Vec<_>>>()?;
        if faces.len() < face_count {
            debug!(generator = self.idx, dropped = face_count - faces.len(), "dropped degenerate faces");
        }

        Ok(VoronoiCell::new(
            self.idx,
            self.loc,
            centroid,
            volume,
            self.max_radius_squared(),
            faces,
        ))
    }

    /// Compute a custom integrated quantity for this cell.
    pub fn compute_cell_integral<T: CellIntegral>(&self) -> Result<T> {
        let mut integral = T::init(self);
        for polygon in self.face_polygons()? {
            for (v0, v1, v2) in polygon.triangles() {
                integral.collect(v0, v1, v2, self.loc);
            }
        }
        Ok(integral.finalize())
    }

    /// Compute a custom integrated quantity for every face of this cell.
    ///
    /// Unlike [`CellConstructor::cell`], this does not drop degenerate faces.
    pub fn compute_face_integrals<T: FaceIntegral>(&self) -> Result<Vec<(FaceNeighbour, T)>> {
        self.face_polygons()?
            .into_iter()
            .map(|polygon| {
                let neighbour = self.face_neighbour(polygon.vertex)?;
                let mut integral = T::init(self, &neighbour);
                for (v0, v1, v2) in polygon.triangles() {
                    integral.collect(v0, v1, v2, self.loc);
                }
                Ok((neighbour, integral.finalize()))
            })
            .collect()
    }

    /// Verify that no vertex lies strictly inside the circumsphere of any
    /// tetrahedron. Quadratic in the size of the triangulation; meant for
    /// testing.
    pub fn check_empty_circumsphere(&self) -> Result<()> {
        for (t, tet) in self.complex.iter() {
            let [a, b, c, d] = self.vertices.rescaled_4(tet.vertices);
            for v in self.vertices.indices().filter(|&v| !tet.contains(v)) {
                if in_sphere(a, b, c, d, self.vertices.rescaled(v)) < 0. {
                    return Err(CellError::DelaunayViolation { tetrahedron: t, vertex: v });
                }
            }
        }
        debug!(generator = self.idx, tetrahedra = self.complex.len(), "empty circumsphere check passed");

        Ok(())
    }

    /// Verify the neighbour links and the orientation of every tetrahedron.
    pub fn check_connectivity(&self) -> Result<()> {
        self.complex.check_connectivity()?;
        for (t, _) in self.complex.iter() {
            self.check_orientation(t)?;
        }

        Ok(())
    }

    /// Dump the edges of all tetrahedra as pairs of tab separated points,
    /// each pair followed by an empty line (as understood by e.g. gnuplot).
    pub fn write_tetrahedra<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (_, tet) in self.complex.iter() {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    for v in [tet.vertices[i], tet.vertices[j]] {
                        let p = self.vertices.position(v);
                        writeln!(writer, "{}\t{}\t{}", p.x, p.y, p.z)?;
                    }
                    writeln!(writer)?;
                }
            }
        }

        Ok(())
    }

    /// Total volume of all tetrahedra. Flips never change it, so it always
    /// equals the volume of the enclosing tetrahedron.
    pub fn total_volume(&self) -> f64 {
        self.complex
            .iter()
            .map(|(_, tet)| {
                let [a, b, c, d] = tet.vertices.map(|v| self.vertices.position(v));
                signed_volume_tet(a, b, c, d)
            })
            .sum()
    }
}
