use float_cmp::assert_approx_eq;
use glam::DVec3 as Vec3;
use incremental_voronoi::{
    integrals::{AreaIntegral, VolumeIntegral},
    CellConstructor, ConstructorConfig, FaceNeighbour, SimulationBoundary, Voronoi,
};
use rand::prelude::*;
use rand::rngs::StdRng;

#[macro_export]
macro_rules! log_time {
    ($msg:expr, $x:expr) => {{
        let t0 = std::time::Instant::now();
        let _result = $x;
        let t1 = std::time::Instant::now();
        let dt = t1 - t0;
        println!("{}: {:?}", $msg, dt);
        _result
    }};
}

fn random_point(anchor: Vec3, size: Vec3, rng: &mut StdRng) -> Vec3 {
    anchor + size * Vec3::new(rng.gen(), rng.gen(), rng.gen())
}

fn random_points(count: usize, anchor: Vec3, size: Vec3, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| random_point(anchor, size, &mut rng))
        // generators must lie strictly inside a walled box
        .filter(|&p| p.cmpgt(anchor).all() && p.cmplt(anchor + size).all())
        .collect()
}

#[test]
fn test_random_points() {
    let size = Vec3::splat(3.);
    let generators = random_points(2000, Vec3::ZERO, size, 2);
    let voronoi = log_time!(
        "Voronoi::build",
        Voronoi::build(&generators, Vec3::ZERO, size, false).unwrap()
    );

    assert_eq!(voronoi.cells().len(), generators.len());
    let total_volume: f64 = voronoi.cells().iter().map(|cell| cell.volume()).sum();
    assert_approx_eq!(f64, total_volume, 27., epsilon = 1e-9);

    for cell in voronoi.cells() {
        assert!(cell.volume() > 0.);
        assert!(cell.face_count() >= 4);
        // The generator lies inside its own cell
        for face in cell.faces() {
            assert!((face.midpoint() - cell.loc()).dot(face.normal()) > 0.);
        }
        // The centroid too, as cells are convex
        for face in cell.faces() {
            assert!((face.midpoint() - cell.centroid()).dot(face.normal()) > 0.);
        }
    }
}

#[test]
fn test_random_points_periodic() {
    let anchor = Vec3::new(-1., 0.5, 2.);
    let size = Vec3::new(2., 1., 1.5);
    let generators = random_points(500, anchor, size, 7);
    let voronoi = Voronoi::build(&generators, anchor, size, true).unwrap();

    let total_volume: f64 = voronoi.cells().iter().map(|cell| cell.volume()).sum();
    assert_approx_eq!(f64, total_volume, 3., epsilon = 1e-9);
    for cell in voronoi.cells() {
        assert!(cell.faces().iter().all(|face| !face.is_boundary()));
    }
}

#[test]
fn test_cell_constructor_matches_build() {
    let size = Vec3::splat(1.);
    let generators = random_points(300, Vec3::ZERO, size, 11);
    let boundary = SimulationBoundary::cuboid(Vec3::ZERO, size, false).unwrap();
    let config = ConstructorConfig::default();
    let voronoi = Voronoi::build_with(&generators, &boundary, &config).unwrap();

    let mut nearest: Vec<usize> = (0..generators.len()).collect();
    for (idx, cell) in voronoi.cells().iter().enumerate().step_by(17) {
        let loc = generators[idx];
        nearest.sort_by(|&a, &b| {
            loc.distance_squared(generators[a])
                .total_cmp(&loc.distance_squared(generators[b]))
        });
        let mut constructor = CellConstructor::new(idx, &generators, &boundary, &config).unwrap();
        constructor.build(nearest.iter().map(|&j| (j, None))).unwrap();
        let rebuilt = constructor.cell().unwrap();

        assert_eq!(rebuilt.idx(), cell.idx());
        assert_approx_eq!(f64, rebuilt.volume(), cell.volume(), epsilon = 1e-12);
        assert_eq!(rebuilt.face_count(), cell.face_count());

        let volume = constructor.compute_cell_integral::<VolumeIntegral>().unwrap();
        assert_approx_eq!(f64, volume.volume, cell.volume(), epsilon = 1e-12);
        let area: f64 = constructor
            .compute_face_integrals::<AreaIntegral>()
            .unwrap()
            .iter()
            .filter(|(neighbour, _)| matches!(neighbour, FaceNeighbour::Boundary(_)))
            .map(|(_, integral)| integral.area)
            .sum();
        let boundary_area: f64 = cell
            .faces()
            .iter()
            .filter(|face| matches!(face.neighbour(), FaceNeighbour::Boundary(_)))
            .map(|face| face.area())
            .sum();
        assert_approx_eq!(f64, area, boundary_area, epsilon = 1e-10);
    }
}

#[test]
fn test_save() {
    let size = Vec3::splat(1.);
    let generators = random_points(20, Vec3::ZERO, size, 3);
    let voronoi = Voronoi::build(&generators, Vec3::ZERO, size, false).unwrap();

    let path = std::env::temp_dir().join("incremental_voronoi_test_save.txt");
    voronoi.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let face_count: usize = voronoi.cells().iter().map(|cell| cell.face_count()).sum();
    assert_eq!(text.lines().count(), voronoi.cells().len() + face_count);
}
