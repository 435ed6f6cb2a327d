//! Assignment of points to the regions of a pivot
use crate::dominance::{dominates, full_lattice, is_equal, lattice};
use crate::traits::Coordinates;
use crate::types::{Item, Lattice};
use std::collections::BTreeMap;

/// Ids of points exactly equal to a pivot.
///
/// A point equal to a skyline point is itself a skyline point, so these ids skip all further
/// comparisons. Each id is stored together with the pivot it is equal to.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceSet {
    ids: Vec<usize>,
    anchors: Vec<usize>,
}

impl EquivalenceSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that point `pid` is equal to the pivot `anchor`
    pub fn push(&mut self, pid: usize, anchor: usize) {
        self.ids.push(pid);
        self.anchors.push(anchor);
    }

    /// Number of ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no ties have been recorded
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The ids, in insertion order
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Iterate over `(pid, anchor)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ids.iter().copied().zip(self.anchors.iter().copied())
    }
}

/// Result of partitioning a working collection around its pivot
#[derive(Debug)]
pub struct Partition<C: Coordinates> {
    /// The pivot
    pub pivot: Item<C>,
    /// The points that are neither dominated by nor equal to the pivot, tagged with their region
    pub remainder: Vec<Item<C>>,
    /// Number of points discarded because the pivot dominates them
    pub pruned: usize,
}

/// Split `items` around the pivot at `items[0]`.
///
/// Points in the full region are dominated by or equal to the pivot. Equal points are moved to
/// `equivalents`, dominated points are discarded. All other points keep their region bitmap in
/// [`Item::lattice`]. Returns `None` for an empty collection.
pub fn partition<C: Coordinates>(
    mut items: Vec<Item<C>>,
    equivalents: &mut EquivalenceSet,
) -> Option<Partition<C>> {
    if items.is_empty() {
        return None;
    }
    let pivot = items.swap_remove(0);
    let full = full_lattice(pivot.coords.dim());
    let mut pruned = 0;

    let mut pos = 0;
    while pos < items.len() {
        match classify(&pivot, &items[pos], full) {
            Region::Equal => {
                let item = items.swap_remove(pos);
                equivalents.push(item.pid, pivot.pid);
            }
            Region::Dominated => {
                items.swap_remove(pos);
                pruned += 1;
            }
            Region::Inside(lattice) => {
                items[pos].lattice = lattice;
                pos += 1;
            }
        }
    }

    Some(Partition {
        pivot,
        remainder: items,
        pruned,
    })
}

/// Split `items` around the pivot at `items[0]` and group the remainder by region.
///
/// Groups are ordered by increasing bitmap, so a group is always visited after every group whose
/// bitmap is a proper submask of its own.
pub fn group_by_region<C: Coordinates>(
    items: Vec<Item<C>>,
    equivalents: &mut EquivalenceSet,
) -> Option<(Item<C>, BTreeMap<Lattice, Vec<Item<C>>>, usize)> {
    let Partition {
        pivot,
        remainder,
        pruned,
    } = partition(items, equivalents)?;

    let mut regions = BTreeMap::<Lattice, Vec<Item<C>>>::new();
    for item in remainder {
        regions.entry(item.lattice).or_default().push(item);
    }
    Some((pivot, regions, pruned))
}

enum Region {
    Equal,
    Dominated,
    Inside(Lattice),
}

#[inline]
fn classify<C: Coordinates>(pivot: &Item<C>, item: &Item<C>, full: Lattice) -> Region {
    let region = lattice(pivot.values(), item.values());
    if region == full {
        if is_equal(pivot.values(), item.values()) {
            Region::Equal
        } else {
            debug_assert!(
                dominates(pivot.values(), item.values()),
                "Point {} in the dominated region is not dominated",
                item.pid
            );
            Region::Dominated
        }
    } else {
        debug_assert_ne!(region, 0, "Pivot {} is dominated by point {}", pivot.pid, item.pid);
        Region::Inside(region)
    }
}
