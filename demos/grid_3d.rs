//! Example that builds the Voronoi cells of a (perturbed) grid of n^3 points in 3 dimensions.
//!
//! Run with: `cargo run --release --example grid_3d`
//!
//! The number of points, the size of perturbations and the periodicity can optionally be given as
//! command line arguments: `cargo run --release --example grid_3d -- [n] [p] [periodic]`
//!
//! Their default values are:
//! - `n`: 32
//! - `p`: 0.95
//! - `periodic`: false

use glam::DVec3;
use incremental_voronoi::Voronoi;
use rand::{distributions::Uniform, prelude::*};
use std::env;
use std::time::Instant;

fn perturbed_grid(anchor: DVec3, width: DVec3, count: usize, pert: f64) -> Vec<DVec3> {
    let mut generators = vec![];
    let mut rng = thread_rng();
    let distr = Uniform::new(-0.5, 0.5);
    for n in 0..count.pow(3) {
        let i = n / count.pow(2);
        let j = (n % count.pow(2)) / count;
        let k = n % count;
        generators.push(
            DVec3 {
                x: i as f64 + 0.5 + pert * rng.sample(distr),
                y: j as f64 + 0.5 + pert * rng.sample(distr),
                z: k as f64 + 0.5 + pert * rng.sample(distr),
            } * width
                / count as f64
                + anchor,
        );
    }

    generators
}

fn main() {
    let mut args = env::args().skip(1);
    let count = match args.next() {
        Some(n) => n.parse::<usize>().expect(
            "The first argument should be an integer denoting the grid size along one dimension!",
        ),
        None => 32,
    };
    let pert = match args.next() {
        Some(p) => p.parse::<f64>().expect(
            "The second argument should be a number in [0, 1) denoting the size of the grid perturbations!",
        ),
        None => 0.95,
    };
    let periodic = match args.next() {
        Some(p) => p
            .parse::<bool>()
            .expect("The third argument should be `true` or `false`!"),
        None => false,
    };

    let anchor = DVec3::splat(0.);
    let width = DVec3::splat(1.);
    let generators = perturbed_grid(anchor, width, count, pert);

    let start = Instant::now();
    let voronoi = Voronoi::build(&generators, anchor, width, periodic).expect("Failed to build the Voronoi cells!");
    let elapsed = start.elapsed();

    let total_volume: f64 = voronoi.cells().iter().map(|cell| cell.volume()).sum();
    let face_count: usize = voronoi.cells().iter().map(|cell| cell.face_count()).sum();
    println!(
        "Built {} cells with {} faces in {:?} (total volume: {})",
        voronoi.cells().len(),
        face_count,
        elapsed,
        total_volume
    );
}
