//! Point fixtures and a reference skyline for tests and benchmarks
use crate::dominance::dominates;
use crate::traits::Coordinates;
use rand::prelude::*;
use rand::SeedableRng;

/// Points sampled uniformly from the unit cube.
pub fn points_fixture<const D: usize>(npoints: usize, seed: u64) -> Vec<[f64; D]> {
    let mut range = StdRng::seed_from_u64(seed);
    let between = rand::distributions::Uniform::from(0.0_f64..1.0_f64);

    (0..npoints)
        .map(|_| std::array::from_fn(|_| between.sample(&mut range)))
        .collect()
}

/// Points sampled uniformly from the unit cube, with the dimension chosen at runtime.
pub fn points_fixture_dynamic(npoints: usize, dim: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut range = StdRng::seed_from_u64(seed);
    let between = rand::distributions::Uniform::from(0.0_f64..1.0_f64);

    (0..npoints)
        .map(|_| (0..dim).map(|_| between.sample(&mut range)).collect())
        .collect()
}

/// Points close to the plane through the centre of the unit cube with normal `(1, ..., 1)`.
///
/// A point that is good on one dimension is bad on another, so a large share of the points
/// are in the skyline.
pub fn anticorrelated_fixture<const D: usize>(npoints: usize, seed: u64) -> Vec<[f64; D]> {
    let mut range = StdRng::seed_from_u64(seed);
    let between = rand::distributions::Uniform::from(0.0_f64..1.0_f64);
    let offset = rand::distributions::Uniform::from(-0.05_f64..0.05_f64);

    (0..npoints)
        .map(|_| {
            let v: [f64; D] = std::array::from_fn(|_| between.sample(&mut range));
            let mean = v.iter().sum::<f64>() / D as f64;
            let shift = offset.sample(&mut range);
            v.map(|x| 0.5 + 0.45 * (x - mean) + shift)
        })
        .collect()
}

/// Skyline by comparing every pair of points. Ids are returned in increasing order.
pub fn brute_force_skyline<C: Coordinates>(points: &[C]) -> Vec<usize> {
    (0..points.len())
        .filter(|&i| {
            !points
                .iter()
                .any(|other| dominates(other.values(), points[i].values()))
        })
        .collect()
}
