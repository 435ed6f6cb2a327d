//! Skyline queries
//!
//! A [`Skyline`] owns the points of one query. It is configured with [`SkylineOptions`] and
//! consumed by [`Skyline::execute`], which returns the ids of the skyline points. Ids are the
//! positions of the points in the slice passed to [`Skyline::new`].
use crate::domain::{Domain, DomainBounds};
use crate::pivot::{PivotSelector, PivotStrategy};
use crate::sweep::{ParallelSweep, SequentialSweep};
use crate::threads::create_pool;
use crate::traits::{Coordinates, SkylineEngine};
use crate::tree::{SkyTree, TreeOptions};
use crate::types::{
    items_from_points, Error, Item, Result, Statistics, DEFAULT_BLOCK_SIZE, DEFAULT_SEED,
    MAX_DIMENSION,
};
use log::warn;
use num::Float;
use rayon::ThreadPool;

/// Engine used to compute a skyline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Single threaded sweep over the regions of one pivot
    #[default]
    Sequential,
    /// Sweep with batches of heads compared on a thread pool
    Parallel,
    /// Recursive sky tree
    Tree,
}

/// Options for a skyline query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkylineOptions {
    /// Engine
    algorithm: Algorithm,
    /// Pivot heuristic
    pivot: PivotStrategy,
    /// Discard dominated points while the sweep engines select their pivot
    pivot_pruning: bool,
    /// Seed for random pivots
    seed: u64,
    /// Bounds used to score balanced pivots
    domain: DomainBounds,
    /// Thread count of the parallel engine. `None` uses the size of the global rayon pool.
    threads: Option<usize>,
    /// Maximum number of heads in one parallel batch
    block_size: usize,
    /// Restrict the tree filter to nested regions
    use_tree: bool,
    /// Build child trees before filtering them
    divide_and_conquer: bool,
    /// Expected dimension of the points
    dimension: Option<usize>,
}

impl Default for SkylineOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sequential,
            pivot: PivotStrategy::Balanced,
            pivot_pruning: true,
            seed: DEFAULT_SEED,
            domain: DomainBounds::Unit,
            threads: None,
            block_size: DEFAULT_BLOCK_SIZE,
            use_tree: true,
            divide_and_conquer: false,
            dimension: None,
        }
    }
}

impl SkylineOptions {
    /// Engine
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
    /// Set the engine
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> &mut Self {
        self.algorithm = algorithm;
        self
    }

    /// Pivot heuristic
    pub fn pivot(&self) -> PivotStrategy {
        self.pivot
    }
    /// Set the pivot heuristic
    pub fn set_pivot(&mut self, pivot: PivotStrategy) -> &mut Self {
        self.pivot = pivot;
        self
    }

    /// Whether the sweep engines prune while selecting a pivot
    pub fn pivot_pruning(&self) -> bool {
        self.pivot_pruning
    }
    /// Enable or disable pruning during pivot selection.
    ///
    /// The tree engine always prunes.
    pub fn set_pivot_pruning(&mut self, pivot_pruning: bool) -> &mut Self {
        self.pivot_pruning = pivot_pruning;
        self
    }

    /// Seed for random pivots
    pub fn seed(&self) -> u64 {
        self.seed
    }
    /// Set the seed for random pivots
    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Bounds used to score balanced pivots
    pub fn domain(&self) -> DomainBounds {
        self.domain
    }
    /// Set the bounds used to score balanced pivots
    pub fn set_domain(&mut self, domain: DomainBounds) -> &mut Self {
        self.domain = domain;
        self
    }

    /// Thread count of the parallel engine
    pub fn threads(&self) -> usize {
        self.threads.unwrap_or_else(rayon::current_num_threads)
    }
    /// Set the thread count of the parallel engine
    pub fn set_threads(&mut self, threads: usize) -> &mut Self {
        self.threads = Some(threads);
        self
    }

    /// Maximum number of heads in one parallel batch
    pub fn block_size(&self) -> usize {
        self.block_size
    }
    /// Set the maximum number of heads in one parallel batch
    pub fn set_block_size(&mut self, block_size: usize) -> &mut Self {
        self.block_size = block_size;
        self
    }

    /// Whether the tree filter only descends into nested regions
    pub fn use_tree(&self) -> bool {
        self.use_tree
    }
    /// Set whether the tree filter only descends into nested regions
    pub fn set_use_tree(&mut self, use_tree: bool) -> &mut Self {
        self.use_tree = use_tree;
        self
    }

    /// Whether the tree engine builds child trees before filtering them
    pub fn divide_and_conquer(&self) -> bool {
        self.divide_and_conquer
    }
    /// Set whether the tree engine builds child trees before filtering them
    pub fn set_divide_and_conquer(&mut self, divide_and_conquer: bool) -> &mut Self {
        self.divide_and_conquer = divide_and_conquer;
        self
    }

    /// Expected dimension of the points
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
    /// Require the points to have this dimension
    pub fn set_dimension(&mut self, dimension: usize) -> &mut Self {
        self.dimension = Some(dimension);
        self
    }

    fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            use_tree: self.use_tree,
            divide_and_conquer: self.divide_and_conquer,
        }
    }
}

/// A skyline query over a fixed set of points
#[derive(Debug)]
pub struct Skyline<C: Coordinates> {
    items: Vec<Item<C>>,
    dim: Option<usize>,
    options: SkylineOptions,
    domain: Domain<C::T>,
    pool: Option<ThreadPool>,
}

impl<C: Coordinates> Skyline<C> {
    /// Create a query.
    ///
    /// # Arguments
    /// * `points` - The points. The id of a point is its position in this slice.
    /// * `options` - Engine and its parameters.
    pub fn new(points: &[C], options: SkylineOptions) -> Result<Self> {
        let dim = options
            .dimension
            .or(C::DIM)
            .or_else(|| points.first().map(Coordinates::dim));

        if let Some(dim) = dim {
            if dim == 0 {
                return Err(Error::ZeroDimension);
            }
            if dim > MAX_DIMENSION {
                return Err(Error::TooManyDimensions(dim));
            }
        }
        for (index, point) in points.iter().enumerate() {
            if let Some(expected) = dim {
                if point.dim() != expected {
                    return Err(Error::DimensionMismatch {
                        index,
                        found: point.dim(),
                        expected,
                    });
                }
            }
            if point.values().iter().any(|v| v.is_nan()) {
                return Err(Error::NanCoordinate(index));
            }
        }

        if options.threads == Some(0) {
            return Err(Error::ZeroThreads);
        }
        if options.block_size == 0 {
            return Err(Error::ZeroBlockSize);
        }

        let pool = match options.algorithm {
            Algorithm::Parallel => {
                let threads = options.threads();
                if threads == 1 {
                    warn!("Running the parallel engine on one thread. Using the sequential engine would be faster.");
                }
                Some(create_pool(threads)?)
            }
            Algorithm::Sequential | Algorithm::Tree => {
                if options.threads.is_some() {
                    warn!(
                        "Thread count is ignored by the {:?} engine.",
                        options.algorithm
                    );
                }
                None
            }
        };

        let domain = Domain::with_bounds(options.domain, points, dim.unwrap_or(0));

        Ok(Self {
            items: items_from_points(points),
            dim,
            options,
            domain,
            pool,
        })
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the query has no points
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Dimension of the points, if it is known
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    /// Options
    pub fn options(&self) -> &SkylineOptions {
        &self.options
    }

    /// Compute the ids of the skyline points, in no particular order
    pub fn execute(self) -> Vec<usize> {
        self.execute_with_statistics().0
    }

    /// Compute the ids of the skyline points along with counters describing the work done
    pub fn execute_with_statistics(self) -> (Vec<usize>, Statistics) {
        let Self {
            items,
            options,
            domain,
            pool,
            ..
        } = self;
        let mut statistics = Statistics::default();
        let selector =
            PivotSelector::new(options.pivot, options.pivot_pruning).with_seed(options.seed);

        let skyline = match (options.algorithm, &pool) {
            (Algorithm::Parallel, Some(pool)) => ParallelSweep::new(selector, domain, pool)
                .with_block_size(options.block_size)
                .compute(items, &mut statistics),
            (Algorithm::Tree, _) => {
                SkyTree::new(options.pivot, options.seed, domain, options.tree_options())
                    .compute(items, &mut statistics)
            }
            _ => SequentialSweep::new(selector, domain).compute(items, &mut statistics),
        };
        (skyline, statistics)
    }
}

/// Compute the skyline of a set of points with the default options
pub fn skyline<C: Coordinates>(points: &[C]) -> Result<Vec<usize>> {
    Ok(Skyline::new(points, SkylineOptions::default())?.execute())
}
