//! Types used throughout the skyline engines
use crate::traits::Coordinates;
use std::collections::BTreeMap;

/// Region bitmap: bit `i` is set when the reference point is no worse on dimension `i`
pub type Lattice = u32;

/// Largest dimension that fits in a [`Lattice`]
pub const MAX_DIMENSION: usize = Lattice::BITS as usize;

/// Default number of temporal heads handled by one parallel batch
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Seed used by the random pivot strategy unless configured otherwise
pub const DEFAULT_SEED: u64 = 13;

/// Errors raised when a query is set up
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Points without coordinates
    #[error("Points must have at least one dimension")]
    ZeroDimension,
    /// More dimensions than bits in a region bitmap
    #[error("Dimension {0} exceeds the supported maximum of {max}", max = MAX_DIMENSION)]
    TooManyDimensions(usize),
    /// Dimension of a point differs from the dimension of the query
    #[error("Point {index} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        /// Index of the offending point
        index: usize,
        /// Its dimension
        found: usize,
        /// The dimension of the query
        expected: usize,
    },
    /// NaN coordinates cannot be ordered
    #[error("Point {0} has a NaN coordinate")]
    NanCoordinate(usize),
    /// Thread count of zero
    #[error("Number of threads must be positive")]
    ZeroThreads,
    /// Block size of zero
    #[error("Block size must be positive")]
    ZeroBlockSize,
    /// The thread pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a two-way dominance test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// The left point dominates the right point
    Left,
    /// The right point dominates the left point
    Right,
    /// Neither point dominates the other, including exact ties
    Incomparable,
}

/// A point owned by a running query, tagged with its region relative to the active pivot.
#[derive(Debug, Clone)]
pub struct Item<C: Coordinates> {
    /// Position of the point in the caller's input.
    pub pid: usize,
    /// Coordinates.
    pub coords: C,
    /// Region bitmap relative to the current pivot. Only meaningful after partitioning.
    pub lattice: Lattice,
}

impl<C: Coordinates> Item<C> {
    /// Create an untagged item
    pub fn new(pid: usize, coords: C) -> Self {
        Self {
            pid,
            coords,
            lattice: 0,
        }
    }

    /// The coordinate values
    #[inline]
    pub fn values(&self) -> &[C::T] {
        self.coords.values()
    }

    /// Number of set bits in the region bitmap
    pub fn level(&self) -> u32 {
        self.lattice.count_ones()
    }
}

/// Wrap caller points into working items with ids `0..n`.
pub fn items_from_points<C: Coordinates>(points: &[C]) -> Vec<Item<C>> {
    points
        .iter()
        .enumerate()
        .map(|(pid, coords)| Item::new(pid, coords.clone()))
        .collect()
}

/// Counters collected while a skyline is computed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Point-to-point dominance tests run by the sweep or the tree filter
    pub dominance_tests: u64,
    /// Pairs skipped because their regions cannot dominate one another
    pub region_skips: u64,
    /// Points discarded during pivot selection
    pub pivot_pruned: usize,
    /// Points discarded during partitioning because the pivot dominates them
    pub partition_pruned: usize,
    /// Points exactly equal to a pivot
    pub ties: usize,
    /// Number of parallel batches
    pub batches: usize,
    /// Number of nodes in the sky tree
    pub tree_nodes: usize,
    /// Depth of the sky tree
    pub tree_depth: usize,
    /// Number of tree nodes at each depth
    pub nodes_per_depth: BTreeMap<usize, usize>,
    /// Points marked dominated by the divide-and-conquer filter
    pub marked_dominated: usize,
}
