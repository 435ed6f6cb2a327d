use itertools::Itertools;
use paste::paste;
use rand::prelude::*;
use skyline::domain::DomainBounds;
use skyline::dominance::{dominates, is_equal};
use skyline::helpers::{
    anticorrelated_fixture, brute_force_skyline, points_fixture, points_fixture_dynamic,
};
use skyline::pivot::PivotStrategy;
use skyline::traits::Coordinates;
use skyline::{Algorithm, Error, Skyline, SkylineOptions};

fn sequential() -> SkylineOptions {
    SkylineOptions::default()
}

fn sequential_unpruned() -> SkylineOptions {
    let mut options = SkylineOptions::default();
    options.set_pivot_pruning(false);
    options
}

fn parallel() -> SkylineOptions {
    let mut options = SkylineOptions::default();
    options
        .set_algorithm(Algorithm::Parallel)
        .set_threads(4)
        .set_block_size(64);
    options
}

fn tree() -> SkylineOptions {
    let mut options = SkylineOptions::default();
    options.set_algorithm(Algorithm::Tree);
    options
}

fn tree_flat() -> SkylineOptions {
    let mut options = tree();
    options.set_use_tree(false);
    options
}

fn tree_dnc() -> SkylineOptions {
    let mut options = tree();
    options.set_divide_and_conquer(true);
    options
}

fn tree_dnc_flat() -> SkylineOptions {
    let mut options = tree_dnc();
    options.set_use_tree(false);
    options
}

/// Every engine, with every pivot strategy
fn configurations() -> Vec<SkylineOptions> {
    let mut configurations = vec![];
    for engine in [
        sequential,
        sequential_unpruned,
        parallel,
        tree,
        tree_flat,
        tree_dnc,
        tree_dnc_flat,
    ] {
        for pivot in [
            PivotStrategy::Balanced,
            PivotStrategy::MaxDominance,
            PivotStrategy::Random,
        ] {
            let mut options = engine();
            options.set_pivot(pivot);
            configurations.push(options);
        }
    }
    configurations
}

fn run<C: Coordinates>(points: &[C], options: SkylineOptions) -> Vec<usize> {
    Skyline::new(points, options)
        .unwrap()
        .execute()
        .into_iter()
        .sorted()
        .collect()
}

/// Points on a coarse grid, so that many of them coincide
fn quantized_fixture<const D: usize>(npoints: usize, seed: u64) -> Vec<[f64; D]> {
    points_fixture::<D>(npoints, seed)
        .into_iter()
        .map(|p| p.map(|x| (x * 8.0).floor() / 8.0))
        .collect()
}

macro_rules! test_engine {
    ($($engine:ident),+) => {
        $(
            paste! {
                #[test]
                fn [<test_ $engine _uniform>]() {
                    for seed in 0..2 {
                        let points = points_fixture::<2>(400, seed);
                        assert_eq!(run(&points, $engine()), brute_force_skyline(&points));
                        let points = points_fixture::<3>(1000, seed);
                        assert_eq!(run(&points, $engine()), brute_force_skyline(&points));
                        let points = points_fixture::<6>(600, seed);
                        assert_eq!(run(&points, $engine()), brute_force_skyline(&points));
                    }
                }

                #[test]
                fn [<test_ $engine _anticorrelated>]() {
                    let points = anticorrelated_fixture::<4>(500, 3);
                    assert_eq!(run(&points, $engine()), brute_force_skyline(&points));
                    let points = anticorrelated_fixture::<8>(300, 4);
                    assert_eq!(run(&points, $engine()), brute_force_skyline(&points));
                }

                #[test]
                fn [<test_ $engine _ties>]() {
                    let points = quantized_fixture::<3>(600, 5);
                    let result = run(&points, $engine());
                    assert_eq!(result, brute_force_skyline(&points));

                    // Equal points are either both in the skyline or both outside it
                    for (i, j) in (0..points.len()).tuple_combinations() {
                        if is_equal(&points[i], &points[j]) {
                            assert_eq!(
                                result.binary_search(&i).is_ok(),
                                result.binary_search(&j).is_ok()
                            );
                        }
                    }
                }

                #[test]
                fn [<test_ $engine _dynamic_dimension>]() {
                    let points = points_fixture_dynamic(500, 5, 6);
                    assert_eq!(run(&points, $engine()), brute_force_skyline(&points));
                }
            }
        )*
    };
}

test_engine!(
    sequential,
    sequential_unpruned,
    parallel,
    tree,
    tree_flat,
    tree_dnc,
    tree_dnc_flat
);

#[test]
fn test_single_dominator() {
    let points = vec![[0.0, 0.0], [1.0, 1.0], [0.5, 0.5]];
    for options in configurations() {
        assert_eq!(run(&points, options), vec![0]);
    }
}

#[test]
fn test_incomparable_pair() {
    let points = vec![[0.0, 1.0], [1.0, 0.0]];
    for options in configurations() {
        assert_eq!(run(&points, options), vec![0, 1]);
    }
}

#[test]
fn test_duplicate_skyline_point() {
    let points = vec![[0.0, 0.0], [0.0, 0.0], [1.0, 1.0]];
    for options in configurations() {
        assert_eq!(run(&points, options), vec![0, 1]);
    }
}

#[test]
fn test_empty_and_single_point() {
    let empty: Vec<[f64; 3]> = vec![];
    for options in configurations() {
        assert!(run(&empty, options.clone()).is_empty());
        assert_eq!(run(&[[0.3, 0.2, 0.9]], options), vec![0]);
    }
}

#[test]
fn test_all_incomparable() {
    let points = (0..50)
        .map(|i| {
            let x = i as f64 / 49.0;
            [x, 1.0 - x]
        })
        .collect::<Vec<_>>();
    for options in configurations() {
        assert_eq!(run(&points, options), (0..50).collect::<Vec<_>>());
    }
}

#[test]
fn test_soundness_and_completeness() {
    let points = anticorrelated_fixture::<3>(800, 9);
    for options in configurations() {
        let result = run(&points, options);
        for &i in &result {
            assert!(!points.iter().any(|p| dominates(p, &points[i])));
        }
        for (i, point) in points.iter().enumerate() {
            if result.binary_search(&i).is_err() {
                assert!(points.iter().any(|p| dominates(p, point)));
            }
        }
    }
}

#[test]
fn test_order_invariance() {
    let points = quantized_fixture::<4>(700, 10);
    let mut permutation = (0..points.len()).collect::<Vec<_>>();
    permutation.shuffle(&mut StdRng::seed_from_u64(1));
    let permuted = permutation.iter().map(|&i| points[i]).collect::<Vec<_>>();

    for options in configurations() {
        let expected = run(&points, options.clone());
        let result = run(&permuted, options)
            .into_iter()
            .map(|i| permutation[i])
            .sorted()
            .collect::<Vec<_>>();
        assert_eq!(result, expected);
    }
}

#[test]
fn test_cross_engine_agreement() {
    let points = points_fixture::<5>(1500, 11);
    let results = configurations()
        .into_iter()
        .map(|options| run(&points, options))
        .collect::<Vec<_>>();
    assert!(results.iter().all_equal());
}

#[test]
fn test_fit_to_data() {
    // Points far outside the unit cube
    let points = points_fixture::<3>(800, 12)
        .into_iter()
        .map(|p| [p[0] * 100.0, p[1] * 3.0 - 20.0, p[2]])
        .collect::<Vec<_>>();
    let expected = brute_force_skyline(&points);
    for mut options in configurations() {
        assert_eq!(run(&points, options.clone()), expected);
        options.set_domain(DomainBounds::FitToData);
        assert_eq!(run(&points, options), expected);
    }
}

#[test]
fn test_single_precision() {
    let points = points_fixture::<3>(500, 13)
        .into_iter()
        .map(|p| p.map(|x| x as f32))
        .collect::<Vec<_>>();
    let expected = brute_force_skyline(&points);
    for options in configurations() {
        assert_eq!(run(&points, options), expected);
    }
}

#[test]
fn test_one_dimension() {
    let points = vec![[0.4], [0.2], [0.9], [0.2], [0.3]];
    for options in configurations() {
        assert_eq!(run(&points, options), vec![1, 3]);
    }
}

#[test]
fn test_parallel_block_sizes() {
    let points = anticorrelated_fixture::<4>(1000, 14);
    let expected = brute_force_skyline(&points);
    for (threads, block_size) in [(1, 256), (2, 1), (3, 17), (8, 256), (8, 1000)] {
        let mut options = parallel();
        options.set_threads(threads).set_block_size(block_size);
        assert_eq!(run(&points, options), expected);
    }
}

#[test]
fn test_statistics() {
    let points = points_fixture::<4>(2000, 15);

    let (_, sequential) = Skyline::new(&points, sequential())
        .unwrap()
        .execute_with_statistics();
    assert!(sequential.dominance_tests > 0);
    assert!(sequential.region_skips > 0);
    assert!(sequential.pivot_pruned + sequential.partition_pruned > 0);

    let (result, tree) = Skyline::new(&points, tree())
        .unwrap()
        .execute_with_statistics();
    assert_eq!(tree.tree_nodes, result.len());
    assert_eq!(tree.nodes_per_depth.values().sum::<usize>(), tree.tree_nodes);
    assert_eq!(tree.nodes_per_depth[&0], 1);
}

#[test]
fn test_max_dominance_with_rounded_sums() {
    // The first point has the same coordinate sum as the point dominating it
    let points = vec![[1.0, 1e-16], [1.0, 0.0], [0.2, 0.9]];
    for engine in [sequential_unpruned, parallel, tree, tree_dnc_flat] {
        let mut options = engine();
        options
            .set_pivot(PivotStrategy::MaxDominance)
            .set_pivot_pruning(false);
        assert_eq!(run(&points, options), vec![1, 2]);
    }
}

#[test]
fn test_deep_tree() {
    // Every point lies in the lower right region of the previous one, so the tree is a chain
    let npoints = 20000;
    let points = (0..npoints)
        .map(|i| {
            let x = i as f64 / npoints as f64;
            [x, 1.0 - x / 2.0]
        })
        .collect::<Vec<_>>();
    for engine in [tree, tree_dnc_flat] {
        let mut options = engine();
        options.set_pivot(PivotStrategy::MaxDominance);
        let (result, statistics) = Skyline::new(&points, options)
            .unwrap()
            .execute_with_statistics();
        assert_eq!(result.len(), npoints);
        assert_eq!(statistics.tree_depth, npoints);
        assert_eq!(
            result.into_iter().sorted().collect::<Vec<_>>(),
            (0..npoints).collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_invalid_input() {
    let points = vec![vec![0.5, 0.5], vec![0.1]];
    assert!(matches!(
        Skyline::new(&points, SkylineOptions::default()),
        Err(Error::DimensionMismatch {
            index: 1,
            found: 1,
            expected: 2
        })
    ));

    let points = vec![[0.5, 0.5], [f64::NAN, 0.1]];
    assert!(matches!(
        Skyline::new(&points, SkylineOptions::default()),
        Err(Error::NanCoordinate(1))
    ));

    let mut options = SkylineOptions::default();
    options.set_dimension(2);
    assert!(Skyline::new(&[[0.5, 0.5]], options).is_ok());
}
