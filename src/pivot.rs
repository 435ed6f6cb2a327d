//! Pivot selection
//!
//! A pivot is a skyline point that splits the remaining points into regions. Selection moves the
//! pivot to the front of the working collection. With pruning enabled, points that are found to
//! be dominated while scanning are swap-removed on the way.
use crate::domain::Domain;
use crate::dominance::{dominance_test, dominates};
use crate::traits::{Coordinates, Scalar};
use crate::types::{Dominance, Item, DEFAULT_SEED};
use itertools::{Itertools, MinMaxResult};
use num::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Heuristic used to choose a pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotStrategy {
    /// Minimise the spread of the normalised coordinates
    #[default]
    Balanced,
    /// Minimise the coordinate sum, maximising the dominated volume
    MaxDominance,
    /// Start from a seeded random point and move to anything that dominates it
    Random,
}

/// Spread of the normalised coordinates of a point.
///
/// A point that is equally good on all dimensions has score zero.
pub fn balance_score<T: Scalar>(value: &[T], min: &[T], range: &[T]) -> T {
    match value
        .iter()
        .zip(min.iter().zip(range))
        .map(|(&v, (&lo, &r))| (v - lo) / r)
        .minmax_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    {
        MinMaxResult::NoElements => T::zero(),
        MinMaxResult::OneElement(_) => T::zero(),
        MinMaxResult::MinMax(lo, hi) => hi - lo,
    }
}

/// Sum of coordinates
pub fn manhattan_sum<T: Scalar>(value: &[T]) -> T {
    value.iter().fold(T::zero(), |acc, &v| acc + v)
}

/// Selects a pivot from a working collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotSelector {
    strategy: PivotStrategy,
    pruning: bool,
    seed: u64,
}

impl Default for PivotSelector {
    fn default() -> Self {
        Self::new(PivotStrategy::Balanced, true)
    }
}

impl PivotSelector {
    /// Create a selector
    pub fn new(strategy: PivotStrategy, pruning: bool) -> Self {
        Self {
            strategy,
            pruning,
            seed: DEFAULT_SEED,
        }
    }

    /// Set the seed of the random strategy
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The strategy
    pub fn strategy(&self) -> PivotStrategy {
        self.strategy
    }

    /// Whether dominated points are removed while scanning
    pub fn pruning(&self) -> bool {
        self.pruning
    }

    /// Move a skyline point to `items[0]`.
    ///
    /// Returns the number of points removed from `items`. The domain is only used by the
    /// balanced strategy.
    pub fn select<C: Coordinates>(&self, items: &mut Vec<Item<C>>, domain: &Domain<C::T>) -> usize {
        if items.len() < 2 {
            return 0;
        }
        let n = items.len();
        match (self.strategy, self.pruning) {
            (PivotStrategy::Balanced, true) => {
                let min = domain.min.clone();
                let range = domain.ranges();
                scan_with_pruning(items, true, |v| balance_score(v, &min, &range));
            }
            (PivotStrategy::Balanced, false) => {
                let min = domain.min.clone();
                let range = domain.ranges();
                select_balanced(items, |v| balance_score(v, &min, &range));
            }
            (PivotStrategy::MaxDominance, true) => {
                scan_with_pruning(items, false, manhattan_sum);
            }
            (PivotStrategy::MaxDominance, false) => select_min_sum(items),
            (PivotStrategy::Random, true) => self.select_random_with_pruning(items),
            (PivotStrategy::Random, false) => self.select_random(items),
        }
        n - items.len()
    }

    fn random_start<C: Coordinates>(&self, items: &mut [Item<C>]) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let start = rng.gen_range(0..items.len());
        items.swap(0, start);
    }

    fn select_random_with_pruning<C: Coordinates>(&self, items: &mut Vec<Item<C>>) {
        self.random_start(items);
        let mut cur = 1;
        while cur < items.len() {
            match dominance_test(items[0].values(), items[cur].values()) {
                Dominance::Left => {
                    items.swap_remove(cur);
                }
                Dominance::Right => {
                    items.swap(0, cur);
                    items.swap_remove(cur);
                }
                Dominance::Incomparable => cur += 1,
            }
        }
    }

    fn select_random<C: Coordinates>(&self, items: &mut [Item<C>]) {
        self.random_start(items);
        climb(items);
    }
}

/// Scan all points against the head, keeping the best scoring point that no earlier point
/// dominates.
///
/// When a candidate dominates the head and `restart` is set, the scan restarts at position 1.
/// The restart repeats comparisons but never changes the chosen pivot's skyline membership.
fn scan_with_pruning<C: Coordinates, F: Fn(&[C::T]) -> C::T>(
    items: &mut Vec<Item<C>>,
    restart: bool,
    score: F,
) {
    let mut best = score(items[0].values());
    let mut cur = 1;
    while cur < items.len() {
        match dominance_test(items[0].values(), items[cur].values()) {
            Dominance::Left => {
                items.swap_remove(cur);
            }
            Dominance::Right => {
                items.swap(0, cur);
                items.swap_remove(cur);
                best = score(items[0].values());
                if restart {
                    cur = 1;
                }
            }
            Dominance::Incomparable => {
                let candidate = score(items[cur].values());
                if candidate < best {
                    if undominated_prefix(items, cur) {
                        items.swap(0, cur);
                        best = candidate;
                        cur += 1;
                    } else {
                        items.swap_remove(cur);
                    }
                } else {
                    cur += 1;
                }
            }
        }
    }
}

fn select_balanced<C: Coordinates, F: Fn(&[C::T]) -> C::T>(items: &mut [Item<C>], score: F) {
    let mut best = score(items[0].values());
    for pos in 1..items.len() {
        let candidate = score(items[pos].values());
        if candidate < best && undominated_prefix(items, pos) {
            items.swap(0, pos);
            best = candidate;
        }
    }
    // Later points were never compared against the chosen point
    climb(items);
}

fn select_min_sum<C: Coordinates>(items: &mut [Item<C>]) {
    let (min_pos, _) = items
        .iter()
        .map(|item| manhattan_sum(item.values()))
        .enumerate()
        .fold((0, C::T::infinity()), |(best_pos, best), (pos, sum)| {
            if sum < best {
                (pos, sum)
            } else {
                (best_pos, best)
            }
        });
    items.swap(0, min_pos);
    // Rounding can give a dominated point the same sum as the point dominating it
    climb(items);
}

/// Replace the head by any later point that dominates it
fn climb<C: Coordinates>(items: &mut [Item<C>]) {
    for pos in 1..items.len() {
        if dominates(items[pos].values(), items[0].values()) {
            items.swap(0, pos);
        }
    }
}

/// Returns true if no point before `pos` dominates `items[pos]`
fn undominated_prefix<C: Coordinates>(items: &[Item<C>], pos: usize) -> bool {
    let candidate = items[pos].values();
    !items[..pos]
        .iter()
        .any(|earlier| dominates(earlier.values(), candidate))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::helpers::{anticorrelated_fixture, brute_force_skyline, points_fixture};
    use crate::types::items_from_points;
    use approx::assert_relative_eq;

    const STRATEGIES: [PivotStrategy; 3] = [
        PivotStrategy::Balanced,
        PivotStrategy::MaxDominance,
        PivotStrategy::Random,
    ];

    #[test]
    fn test_balance_score() {
        let min = [0.0, 0.0, 0.0];
        let range = [1.0, 1.0, 1.0];
        assert_relative_eq!(balance_score(&[0.5, 0.5, 0.5], &min, &range), 0.0);
        assert_relative_eq!(balance_score(&[0.1, 0.9, 0.5], &min, &range), 0.8);

        // Normalised against the domain
        let min = [1.0, 0.0];
        let range = [2.0, 4.0];
        assert_relative_eq!(balance_score(&[2.0, 1.0], &min, &range), 0.25);
    }

    #[test]
    fn test_manhattan_sum() {
        assert_relative_eq!(manhattan_sum(&[0.25f32, 0.5, 0.125]), 0.875);
    }

    fn check_pivot(points: &[[f64; 3]], selector: PivotSelector) {
        let skyline = brute_force_skyline(points);
        let mut items = items_from_points(points);
        let removed = selector.select(&mut items, &Domain::unit(3));

        assert_eq!(items.len() + removed, points.len());

        // The pivot is a skyline point
        assert!(skyline.contains(&items[0].pid), "{selector:?}");

        // Only dominated points were removed, and every point is still present once
        let mut kept = items.iter().map(|item| item.pid).collect::<Vec<_>>();
        kept.sort();
        kept.dedup();
        assert_eq!(kept.len(), items.len());
        for pid in &skyline {
            assert!(kept.contains(pid), "{selector:?} removed skyline point {pid}");
        }
    }

    #[test]
    fn test_pivot_is_skyline_point() {
        for seed in 0..5 {
            let uniform = points_fixture::<3>(300, seed);
            let anticorrelated = anticorrelated_fixture::<3>(300, seed);
            for strategy in STRATEGIES {
                for pruning in [true, false] {
                    let selector = PivotSelector::new(strategy, pruning).with_seed(seed);
                    check_pivot(&uniform, selector);
                    check_pivot(&anticorrelated, selector);
                }
            }
        }
    }

    #[test]
    fn test_balanced_prefers_balanced_point() {
        let points = vec![[0.1, 0.9], [0.5, 0.5], [0.9, 0.1], [0.6, 0.6]];
        let mut items = items_from_points(&points);
        let removed = PivotSelector::default().select(&mut items, &Domain::unit(2));

        assert_eq!(items[0].pid, 1);
        assert_eq!(removed, 1);
        assert!(items.iter().all(|item| item.pid != 3));
    }

    #[test]
    fn test_max_dominance_prefers_min_sum() {
        let points = vec![[0.1, 0.9], [0.3, 0.4], [0.9, 0.0], [0.6, 0.6]];
        for pruning in [true, false] {
            let mut items = items_from_points(&points);
            PivotSelector::new(PivotStrategy::MaxDominance, pruning)
                .select(&mut items, &Domain::unit(2));
            assert_eq!(items[0].pid, 1);
        }
    }

    #[test]
    fn test_max_dominance_with_rounded_sums() {
        // 1.0 + 1e-16 rounds to 1.0, so the first point has the same sum as the point dominating it
        let points = vec![[1.0, 1e-16], [1.0, 0.0], [0.2, 0.9]];
        assert_eq!(manhattan_sum(&points[0]), manhattan_sum(&points[1]));
        for pruning in [true, false] {
            let selector = PivotSelector::new(PivotStrategy::MaxDominance, pruning);
            assert_eq!(selector.strategy(), PivotStrategy::MaxDominance);
            assert_eq!(selector.pruning(), pruning);

            let mut items = items_from_points(&points);
            selector.select(&mut items, &Domain::unit(2));
            assert_eq!(items[0].pid, 1);
        }
    }

    #[test]
    fn test_dominating_point_becomes_pivot() {
        let points = vec![[0.5, 0.5], [0.7, 0.8], [0.2, 0.3], [0.9, 0.9]];
        let mut items = items_from_points(&points);
        let removed = PivotSelector::default().select(&mut items, &Domain::unit(2));

        assert_eq!(items.len(), 1);
        assert_eq!(removed, 3);
        assert_eq!(items[0].pid, 2);
    }

    #[test]
    fn test_small_inputs() {
        let mut items = items_from_points::<[f64; 2]>(&[]);
        assert_eq!(PivotSelector::default().select(&mut items, &Domain::unit(2)), 0);

        let mut items = items_from_points(&[[0.3, 0.4]]);
        assert_eq!(PivotSelector::default().select(&mut items, &Domain::unit(2)), 0);
        assert_eq!(items[0].pid, 0);
    }

    #[test]
    fn test_ties_are_kept() {
        let points = vec![[0.5, 0.5], [0.2, 0.8], [0.5, 0.5], [0.8, 0.2]];
        for strategy in STRATEGIES {
            let mut items = items_from_points(&points);
            let removed = PivotSelector::new(strategy, true).select(&mut items, &Domain::unit(2));
            assert_eq!(removed, 0, "{strategy:?}");
        }
    }
}
