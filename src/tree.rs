//! Sky tree (SkyTree)
//!
//! Every node holds a pivot. The points in each region of the pivot are processed into a child
//! node, with the domain clipped at the pivot. Only regions whose bitmaps are nested can hold
//! points that dominate one another, so points of a new region are only compared with earlier
//! siblings whose bitmap is a submask of the new one.
//!
//! Nodes are stored in an arena and refer to their children by index. Building, filtering and
//! traversal all run on explicit work stacks, so the depth of a tree is only bounded by memory.
//!
//! ## References
//! \[1\] Lee, Jongwuk, and Seung-won Hwang. "Scalable skyline computation using a balanced pivot
//! selection technique." Information Systems 39 (2014): 1-21.
use crate::domain::Domain;
use crate::dominance::{dominates, full_lattice, is_equal, is_submask, lattice};
use crate::partition::{group_by_region, EquivalenceSet};
use crate::pivot::{PivotSelector, PivotStrategy};
use crate::traits::{Coordinates, Scalar, SkylineEngine};
use crate::types::{Item, Lattice, Statistics};
use log::debug;
use std::collections::{btree_map, BTreeMap, HashSet};

/// When and how points are compared with earlier sibling regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Descend only into nested regions of a sibling tree. Otherwise every node of the sibling
    /// tree is tested.
    pub use_tree: bool,
    /// Build each child first and mark its dominated nodes afterwards, instead of filtering the
    /// points of a region before building it.
    pub divide_and_conquer: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            use_tree: true,
            divide_and_conquer: false,
        }
    }
}

/// A node of a sky tree
#[derive(Debug, Clone)]
pub struct Node<C: Coordinates> {
    /// Region of this node relative to the pivot of its parent. Zero for the root.
    pub lattice: Lattice,
    /// The pivot of this node
    pub point: Item<C>,
    /// Indices of the child nodes, ordered by increasing bitmap
    pub children: Vec<usize>,
}

impl<C: Coordinates> Node<C> {
    fn new(lattice: Lattice, point: Item<C>) -> Self {
        Self {
            lattice,
            point,
            children: vec![],
        }
    }

    /// Number of set bits in the region bitmap
    pub fn level(&self) -> u32 {
        self.lattice.count_ones()
    }
}

/// A sky tree together with the ties and dominated points found while building it
#[derive(Debug)]
pub struct RegionTree<C: Coordinates> {
    nodes: Vec<Node<C>>,
    equivalents: EquivalenceSet,
    dominated: Vec<bool>,
}

impl<C: Coordinates> RegionTree<C> {
    /// The root node, if there are any points
    pub fn root(&self) -> Option<&Node<C>> {
        self.nodes.first()
    }

    /// The node stored at `index`
    pub fn node(&self, index: usize) -> &Node<C> {
        &self.nodes[index]
    }

    /// The children of a node
    pub fn children<'a>(&'a self, node: &'a Node<C>) -> impl Iterator<Item = &'a Node<C>> + 'a {
        node.children.iter().map(|&child| &self.nodes[child])
    }

    /// The nodes reachable from the root in pre-order, each with its depth
    pub fn iter(&self) -> impl Iterator<Item = (&Node<C>, usize)> + '_ {
        self.preorder()
            .into_iter()
            .map(|(index, depth)| (&self.nodes[index], depth))
    }

    /// Number of nodes reachable from the root
    pub fn len(&self) -> usize {
        self.preorder().len()
    }

    /// Returns true if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of levels
    pub fn depth(&self) -> usize {
        self.preorder()
            .into_iter()
            .map(|(_, depth)| depth + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes at each depth
    pub fn nodes_per_depth(&self) -> BTreeMap<usize, usize> {
        let mut nodes_per_depth = BTreeMap::new();
        for (_, depth) in self.preorder() {
            *nodes_per_depth.entry(depth).or_default() += 1;
        }
        nodes_per_depth
    }

    /// Points equal to a pivot of the tree
    pub fn equivalents(&self) -> &EquivalenceSet {
        &self.equivalents
    }

    /// Returns true if the point was marked dominated after it had been placed in the tree
    pub fn is_dominated(&self, pid: usize) -> bool {
        self.dominated.get(pid).copied().unwrap_or(false)
    }

    /// Ids of the unmarked nodes in pre-order, followed by the ties of unmarked pivots
    pub fn skyline(&self) -> Vec<usize> {
        // Descendants of a marked node are still visited
        let mut skyline = self
            .preorder()
            .into_iter()
            .map(|(index, _)| self.nodes[index].point.pid)
            .filter(|&pid| !self.dominated[pid])
            .collect::<Vec<_>>();
        skyline.extend(
            self.equivalents
                .iter()
                .filter(|&(_, anchor)| !self.dominated[anchor])
                .map(|(pid, _)| pid),
        );
        skyline
    }

    fn preorder(&self) -> Vec<(usize, usize)> {
        let mut order = vec![];
        let mut stack = if self.nodes.is_empty() {
            vec![]
        } else {
            vec![(0, 0)]
        };
        while let Some((index, depth)) = stack.pop() {
            order.push((index, depth));
            stack.extend(
                self.nodes[index]
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1)),
            );
        }
        order
    }
}

/// SkyTree engine
#[derive(Debug, Clone)]
pub struct SkyTree<T: Scalar> {
    selector: PivotSelector,
    domain: Domain<T>,
    options: TreeOptions,
}

impl<T: Scalar> SkyTree<T> {
    /// Create an engine.
    ///
    /// Pivots are always selected with pruning enabled.
    pub fn new(strategy: PivotStrategy, seed: u64, domain: Domain<T>, options: TreeOptions) -> Self {
        Self {
            selector: PivotSelector::new(strategy, true).with_seed(seed),
            domain,
            options,
        }
    }

    /// Tree options
    pub fn options(&self) -> TreeOptions {
        self.options
    }

    /// Build the sky tree of a set of points
    pub fn build<C: Coordinates<T = T>>(
        &self,
        items: Vec<Item<C>>,
        statistics: &mut Statistics,
    ) -> RegionTree<C> {
        let npoints = items.iter().map(|item| item.pid + 1).max().unwrap_or(0);
        let full = items
            .first()
            .map(|item| full_lattice(item.coords.dim()))
            .unwrap_or(0);
        let mut builder = Builder {
            selector: &self.selector,
            options: self.options,
            full,
            nodes: vec![],
            equivalents: EquivalenceSet::new(),
            dominated: vec![false; npoints],
            statistics,
        };
        builder.build(self.domain.clone(), items);
        let Builder {
            nodes,
            equivalents,
            dominated,
            statistics,
            ..
        } = builder;

        let tree = RegionTree {
            nodes,
            equivalents,
            dominated,
        };
        statistics.ties += tree.equivalents.len();
        for (depth, count) in tree.nodes_per_depth() {
            statistics.tree_nodes += count;
            statistics.tree_depth = statistics.tree_depth.max(depth + 1);
            *statistics.nodes_per_depth.entry(depth).or_default() += count;
        }
        tree
    }
}

impl<C: Coordinates> SkylineEngine<C> for SkyTree<C::T> {
    fn compute(&self, items: Vec<Item<C>>, statistics: &mut Statistics) -> Vec<usize> {
        let tree = self.build(items, statistics);
        let skyline = tree.skyline();
        debug!(
            "Sky tree: {} nodes, depth {}, {} ties, {} marked dominated, {} dominance tests",
            statistics.tree_nodes,
            statistics.tree_depth,
            tree.equivalents.len(),
            statistics.marked_dominated,
            statistics.dominance_tests
        );
        skyline
    }
}

/// A node whose regions are still being built
struct Frame<C: Coordinates> {
    node: usize,
    domain: Domain<C::T>,
    regions: btree_map::IntoIter<Lattice, Vec<Item<C>>>,
}

/// State of one build
struct Builder<'a, C: Coordinates> {
    selector: &'a PivotSelector,
    options: TreeOptions,
    full: Lattice,
    nodes: Vec<Node<C>>,
    equivalents: EquivalenceSet,
    dominated: Vec<bool>,
    statistics: &'a mut Statistics,
}

impl<C: Coordinates> Builder<'_, C> {
    /// Build the tree depth first. The top of the stack is the node whose next region is built.
    /// A node is attached to its parent once all its regions are done.
    fn build(&mut self, domain: Domain<C::T>, items: Vec<Item<C>>) {
        let Some((root, regions)) = self.open(&domain, items, 0) else {
            return;
        };
        let mut stack = vec![Frame {
            node: root,
            domain,
            regions,
        }];

        while let Some(frame) = stack.last_mut() {
            let parent = frame.node;
            let Some((region, mut group)) = frame.regions.next() else {
                stack.pop();
                if let Some(frame) = stack.last() {
                    self.attach(frame.node, parent);
                }
                continue;
            };

            if !self.options.divide_and_conquer {
                self.filter_group(region, &mut group, parent);
            }
            if group.is_empty() {
                continue;
            }
            let domain = frame.domain.split(region, self.nodes[parent].point.values());
            if let Some((node, regions)) = self.open(&domain, group, region) {
                stack.push(Frame {
                    node,
                    domain,
                    regions,
                });
            }
        }
    }

    /// Select a pivot, store its node and group the remaining points by region
    fn open(
        &mut self,
        domain: &Domain<C::T>,
        mut items: Vec<Item<C>>,
        region: Lattice,
    ) -> Option<(usize, btree_map::IntoIter<Lattice, Vec<Item<C>>>)> {
        self.statistics.pivot_pruned += self.selector.select(&mut items, domain);
        let (pivot, regions, pruned) = group_by_region(items, &mut self.equivalents)?;
        self.statistics.partition_pruned += pruned;

        self.nodes.push(Node::new(region, pivot));
        Some((self.nodes.len() - 1, regions.into_iter()))
    }

    fn attach(&mut self, parent: usize, child: usize) {
        if self.options.divide_and_conquer && !self.nodes[parent].children.is_empty() {
            self.mark_dominated(parent, child);
        }
        self.nodes[parent].children.push(child);
    }

    /// Remove the points of a new region that are dominated by an earlier sibling
    fn filter_group(&mut self, region: Lattice, group: &mut Vec<Item<C>>, parent: usize) {
        let filter = Filter {
            nodes: &self.nodes,
            use_tree: self.options.use_tree,
            full: self.full,
        };
        for &sibling in &self.nodes[parent].children {
            let sibling_lattice = self.nodes[sibling].lattice;
            if sibling_lattice > region {
                break;
            }
            if !is_submask(sibling_lattice, region) {
                self.statistics.region_skips += 1;
                continue;
            }
            let mut pos = 0;
            while pos < group.len() {
                if filter.dominated(group[pos].values(), sibling, self.statistics) {
                    group.swap_remove(pos);
                } else {
                    pos += 1;
                }
            }
            if group.is_empty() {
                break;
            }
        }
    }

    /// Mark the nodes of a new child tree that are dominated by an earlier sibling of it.
    ///
    /// Nodes are visited children first. Leaves marked in this pass are removed from their parent.
    fn mark_dominated(&mut self, parent: usize, subtree: usize) {
        let region = self.nodes[subtree].lattice;
        let mut order = vec![];
        let mut stack = vec![subtree];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.nodes[index].children.iter().copied());
        }

        let mut marked = HashSet::new();
        for &index in order.iter().rev() {
            let kept = self.nodes[index]
                .children
                .iter()
                .copied()
                .filter(|child| {
                    !(marked.contains(child) && self.nodes[*child].children.is_empty())
                })
                .collect::<Vec<_>>();
            self.nodes[index].children = kept;

            let filter = Filter {
                nodes: &self.nodes,
                use_tree: self.options.use_tree,
                full: self.full,
            };
            let value = self.nodes[index].point.values();
            let mut hit = false;
            for &sibling in &self.nodes[parent].children {
                let sibling_lattice = self.nodes[sibling].lattice;
                if sibling_lattice > region {
                    break;
                }
                if is_submask(sibling_lattice, region)
                    && filter.dominated(value, sibling, self.statistics)
                {
                    hit = true;
                    break;
                }
            }

            if hit {
                marked.insert(index);
                let pid = self.nodes[index].point.pid;
                if !self.dominated[pid] {
                    self.dominated[pid] = true;
                    self.statistics.marked_dominated += 1;
                }
            }
        }
    }
}

/// Dominance search in a built subtree
struct Filter<'a, C: Coordinates> {
    nodes: &'a [Node<C>],
    use_tree: bool,
    full: Lattice,
}

impl<C: Coordinates> Filter<'_, C> {
    /// Returns true if a node of the subtree rooted at `root` dominates `value`
    fn dominated(&self, value: &[C::T], root: usize, statistics: &mut Statistics) -> bool {
        if self.use_tree {
            self.dominated_nested(value, root, statistics)
        } else {
            self.dominated_any(value, root, statistics)
        }
    }

    /// Only descend into children whose region is a submask of the region of `value`
    fn dominated_nested(&self, value: &[C::T], root: usize, statistics: &mut Statistics) -> bool {
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            statistics.dominance_tests += 1;
            let region = lattice(node.point.values(), value);
            if region == self.full {
                debug_assert!(
                    !is_equal(node.point.values(), value),
                    "Tie with pivot {} outside its region",
                    node.point.pid
                );
                return true;
            }
            for &child in &node.children {
                let child_lattice = self.nodes[child].lattice;
                if child_lattice > region {
                    break;
                }
                if is_submask(child_lattice, region) {
                    stack.push(child);
                } else {
                    statistics.region_skips += 1;
                }
            }
        }
        false
    }

    fn dominated_any(&self, value: &[C::T], root: usize, statistics: &mut Statistics) -> bool {
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            statistics.dominance_tests += 1;
            if dominates(node.point.values(), value) {
                return true;
            }
            stack.extend(node.children.iter().copied());
        }
        false
    }
}
