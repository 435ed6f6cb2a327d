//! Sweep engines (BSkyTree-S)
//!
//! Both engines select one balanced pivot, partition the rest of the points into its regions and
//! then eliminate dominated points with a head/tail sweep. Pairs of points in regions that are not
//! nested are never compared.
//!
//! ## References
//! \[1\] Lee, Jongwuk, and Seung-won Hwang. "BSkyTree: scalable skyline computation using a
//! balanced pivot selection." Proceedings of the 13th International Conference on Extending
//! Database Technology (2010).
pub mod parallel;
pub mod sequential;

pub use parallel::ParallelSweep;
pub use sequential::SequentialSweep;

use crate::domain::Domain;
use crate::partition::{partition, EquivalenceSet};
use crate::pivot::PivotSelector;
use crate::traits::Coordinates;
use crate::types::{Item, Statistics};

/// Points left to sweep once the pivot has been removed
pub(crate) struct Prepared<C: Coordinates> {
    pub(crate) pivot: Item<C>,
    pub(crate) remainder: Vec<Item<C>>,
    pub(crate) equivalents: EquivalenceSet,
}

/// Select a pivot and partition the remaining points around it
pub(crate) fn prepare<C: Coordinates>(
    mut items: Vec<Item<C>>,
    selector: &PivotSelector,
    domain: &Domain<C::T>,
    statistics: &mut Statistics,
) -> Option<Prepared<C>> {
    statistics.pivot_pruned += selector.select(&mut items, domain);

    let mut equivalents = EquivalenceSet::new();
    let partitioned = partition(items, &mut equivalents)?;
    statistics.partition_pruned += partitioned.pruned;
    statistics.ties += equivalents.len();

    Some(Prepared {
        pivot: partitioned.pivot,
        remainder: partitioned.remainder,
        equivalents,
    })
}

/// The pivot, the surviving points and the ties, in that order
pub(crate) fn collect_ids<C: Coordinates>(
    pivot: &Item<C>,
    survivors: &[Item<C>],
    equivalents: &EquivalenceSet,
) -> Vec<usize> {
    let mut skyline = Vec::with_capacity(1 + survivors.len() + equivalents.len());
    skyline.push(pivot.pid);
    skyline.extend(survivors.iter().map(|item| item.pid));
    skyline.extend_from_slice(equivalents.ids());
    skyline
}
