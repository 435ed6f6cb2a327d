//! Single threaded sweep
use crate::domain::Domain;
use crate::dominance::{dominance_test, regions_comparable};
use crate::pivot::PivotSelector;
use crate::sweep::{collect_ids, prepare};
use crate::traits::{Coordinates, Scalar, SkylineEngine};
use crate::types::{Dominance, Item, Statistics};
use log::debug;

/// Single threaded BSkyTree-S
#[derive(Debug, Clone)]
pub struct SequentialSweep<T: Scalar> {
    selector: PivotSelector,
    domain: Domain<T>,
}

impl<T: Scalar> SequentialSweep<T> {
    /// Create an engine that scores pivots against `domain`
    pub fn new(selector: PivotSelector, domain: Domain<T>) -> Self {
        Self { selector, domain }
    }
}

impl<C: Coordinates> SkylineEngine<C> for SequentialSweep<C::T> {
    fn compute(&self, items: Vec<Item<C>>, statistics: &mut Statistics) -> Vec<usize> {
        let Some(mut prepared) = prepare(items, &self.selector, &self.domain, statistics) else {
            return vec![];
        };
        let candidates = prepared.remainder.len();
        sweep(&mut prepared.remainder, statistics);

        debug!(
            "Sequential sweep: {} candidates, {} survivors, {} ties, {} dominance tests",
            candidates,
            prepared.remainder.len(),
            prepared.equivalents.len(),
            statistics.dominance_tests
        );
        collect_ids(&prepared.pivot, &prepared.remainder, &prepared.equivalents)
    }
}

/// Remove every dominated point from a collection tagged with region bitmaps.
///
/// The collection is split into confirmed heads `[0, head)`, the active head and the live tail
/// `(head, end)`. The active head is compared with every live tail point; a tail point that
/// dominates it takes its place and the scan restarts. Removed points are swapped past `end`.
pub fn sweep<C: Coordinates>(items: &mut Vec<Item<C>>, statistics: &mut Statistics) {
    let mut end = items.len();
    let mut head = 0;
    while head + 1 < end {
        let mut cur = head + 1;
        while cur < end {
            if !regions_comparable(items[head].lattice, items[cur].lattice) {
                statistics.region_skips += 1;
                cur += 1;
                continue;
            }
            statistics.dominance_tests += 1;
            match dominance_test(items[head].values(), items[cur].values()) {
                Dominance::Left => {
                    end -= 1;
                    items.swap(cur, end);
                }
                Dominance::Right => {
                    items.swap(head, cur);
                    end -= 1;
                    items.swap(cur, end);
                    cur = head + 1;
                }
                Dominance::Incomparable => cur += 1,
            }
        }
        head += 1;
    }
    items.truncate(end);
}
