//! Multithreaded sweep
//!
//! Heads are processed in batches. Within a batch every task owns a disjoint segment of temporal
//! heads and its own mask of tail points it has eliminated, so the tail is only read while the
//! batch runs. The masks are merged once all tasks have finished. Afterwards the heads of the
//! batch are compared among themselves and the tail is compacted on a single thread.
use crate::domain::Domain;
use crate::dominance::{dominance_test, regions_comparable};
use crate::pivot::PivotSelector;
use crate::sweep::{collect_ids, prepare};
use crate::traits::{Coordinates, Scalar, SkylineEngine};
use crate::types::{Dominance, Item, Statistics, DEFAULT_BLOCK_SIZE};
use log::debug;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Multithreaded BSkyTree-S
#[derive(Debug)]
pub struct ParallelSweep<'a, T: Scalar> {
    selector: PivotSelector,
    domain: Domain<T>,
    pool: &'a ThreadPool,
    block_size: usize,
}

impl<'a, T: Scalar> ParallelSweep<'a, T> {
    /// Create an engine running on `pool`
    pub fn new(selector: PivotSelector, domain: Domain<T>, pool: &'a ThreadPool) -> Self {
        Self {
            selector,
            domain,
            pool,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Set the maximum number of temporal heads in one batch
    ///
    /// # Panics
    /// Panics if `block_size` is zero.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        assert!(block_size > 0, "Block size must be positive");
        self.block_size = block_size;
        self
    }
}

impl<C: Coordinates> SkylineEngine<C> for ParallelSweep<'_, C::T> {
    fn compute(&self, items: Vec<Item<C>>, statistics: &mut Statistics) -> Vec<usize> {
        let Some(mut prepared) = prepare(items, &self.selector, &self.domain, statistics) else {
            return vec![];
        };
        let candidates = prepared.remainder.len();
        self.pool.install(|| {
            parallel_sweep(
                &mut prepared.remainder,
                self.block_size,
                self.pool.current_num_threads(),
                statistics,
            )
        });

        debug!(
            "Parallel sweep: {} candidates, {} survivors, {} ties, {} batches, {} dominance tests",
            candidates,
            prepared.remainder.len(),
            prepared.equivalents.len(),
            statistics.batches,
            statistics.dominance_tests
        );
        collect_ids(&prepared.pivot, &prepared.remainder, &prepared.equivalents)
    }
}

/// Counters and eliminated tail points of one task
struct Scan {
    dead: Vec<bool>,
    dominance_tests: u64,
    region_skips: u64,
}

impl Scan {
    fn new(tail_len: usize) -> Self {
        Self {
            dead: vec![false; tail_len],
            dominance_tests: 0,
            region_skips: 0,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (d, o) in self.dead.iter_mut().zip(other.dead) {
            *d |= o;
        }
        self.dominance_tests += other.dominance_tests;
        self.region_skips += other.region_skips;
        self
    }
}

/// Compare one temporal head against the whole tail.
///
/// A tail point that dominates the head replaces it, and the scan starts over.
fn scan_tail<C: Coordinates>(head: &mut Item<C>, tail: &[Item<C>], scan: &mut Scan) {
    let mut cur = 0;
    while cur < tail.len() {
        if scan.dead[cur] {
            cur += 1;
            continue;
        }
        if !regions_comparable(head.lattice, tail[cur].lattice) {
            scan.region_skips += 1;
            cur += 1;
            continue;
        }
        scan.dominance_tests += 1;
        match dominance_test(head.values(), tail[cur].values()) {
            Dominance::Left => {
                scan.dead[cur] = true;
                cur += 1;
            }
            Dominance::Right => {
                scan.dead[cur] = true;
                *head = tail[cur].clone();
                cur = 0;
            }
            Dominance::Incomparable => cur += 1,
        }
    }
}

/// Remove every dominated point from a collection tagged with region bitmaps, comparing up to
/// `block_size` heads at a time on the current thread pool.
pub fn parallel_sweep<C: Coordinates>(
    items: &mut Vec<Item<C>>,
    block_size: usize,
    num_threads: usize,
    statistics: &mut Statistics,
) {
    let mut dead = vec![false; items.len()];
    let mut head = 0;
    let mut end = items.len();
    while head + 1 < end {
        let heads_end = std::cmp::min(head + block_size, end);
        let segment = (heads_end - head).div_ceil(num_threads.max(1));
        statistics.batches += 1;

        // Concurrent phase: tasks own disjoint heads and only read the tail
        let (front, back) = items.split_at_mut(heads_end);
        let tail = &back[..end - heads_end];
        let scan = front[head..]
            .par_chunks_mut(segment)
            .map(|heads| {
                let mut scan = Scan::new(tail.len());
                for h in heads.iter_mut() {
                    scan_tail(h, tail, &mut scan);
                }
                scan
            })
            .reduce(|| Scan::new(tail.len()), Scan::merge);

        statistics.dominance_tests += scan.dominance_tests;
        statistics.region_skips += scan.region_skips;
        for (flag, eliminated) in dead[heads_end..end].iter_mut().zip(scan.dead) {
            *flag |= eliminated;
        }

        head = resolve_heads(items, &mut dead, head, heads_end, statistics);
        end = compact(items, &mut dead, head, end);
    }
    items.truncate(end);
}

/// Compare the heads `[head, heads_end)` of one batch with each other.
///
/// Two heads may hold copies of the same tail point. Eliminated heads are swapped to the end of
/// the range and flagged dead. Returns the end of the surviving heads.
fn resolve_heads<C: Coordinates>(
    items: &mut [Item<C>],
    dead: &mut [bool],
    head: usize,
    heads_end: usize,
    statistics: &mut Statistics,
) -> usize {
    let mut heads_end = heads_end;
    let mut th = head;
    while th < heads_end {
        let mut c = th + 1;
        while c < heads_end {
            let outcome = if items[th].pid == items[c].pid {
                Dominance::Left
            } else {
                statistics.dominance_tests += 1;
                dominance_test(items[th].values(), items[c].values())
            };
            match outcome {
                Dominance::Left => {
                    heads_end -= 1;
                    items.swap(c, heads_end);
                    dead[heads_end] = true;
                }
                Dominance::Right => {
                    items.swap(th, c);
                    heads_end -= 1;
                    items.swap(c, heads_end);
                    dead[heads_end] = true;
                    c = th + 1;
                }
                Dominance::Incomparable => c += 1,
            }
        }
        th += 1;
    }
    heads_end
}

/// Move live points of `[start, end)` to the front of the range. Returns the new end.
fn compact<C: Coordinates>(
    items: &mut [Item<C>],
    dead: &mut [bool],
    start: usize,
    end: usize,
) -> usize {
    let mut lo = start;
    let mut hi = end;
    while lo < hi {
        if !dead[lo] {
            lo += 1;
        } else if dead[hi - 1] {
            hi -= 1;
        } else {
            items.swap(lo, hi - 1);
            dead[lo] = false;
            dead[hi - 1] = true;
            lo += 1;
            hi -= 1;
        }
    }
    lo
}
