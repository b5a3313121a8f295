//! Generalization cuts.
//!
//! A cut assigns every leaf the node it currently resolves to. Assignments
//! always form a covering of the hierarchy: if a leaf resolves to `v`, every
//! leaf below `v` resolves to `v` as well.
//!
//! The assignment table is shared between clones and copied on the first
//! mutation, so cloning a cut to branch a search costs one `Arc` bump.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::hierarchy::Hierarchy;
use crate::{Database, ItemId, NodeId, Transaction};

/// A generalization state over a [`Hierarchy`].
#[derive(Clone)]
pub struct Cut<'h> {
    hierarchy: &'h Hierarchy,
    assigned: Arc<Vec<NodeId>>,
}

impl<'h> Cut<'h> {
    /// The identity cut: every leaf resolves to itself.
    #[must_use]
    pub fn new(hierarchy: &'h Hierarchy) -> Self {
        Self {
            hierarchy,
            assigned: Arc::new(hierarchy.domain_items().collect()),
        }
    }

    /// Every leaf generalized to its ancestor at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= hierarchy.height()`.
    #[must_use]
    pub fn at_level(hierarchy: &'h Hierarchy, level: usize) -> Self {
        Self {
            hierarchy,
            assigned: Arc::new(
                hierarchy
                    .domain_items()
                    .map(|leaf| hierarchy.ancestor(leaf, level))
                    .collect(),
            ),
        }
    }

    /// Full suppression: every leaf resolves to the root.
    #[must_use]
    pub fn root(hierarchy: &'h Hierarchy) -> Self {
        Self::at_level(hierarchy, hierarchy.height() - 1)
    }

    /// The hierarchy this cut generalizes over.
    #[must_use]
    pub const fn hierarchy(&self) -> &'h Hierarchy {
        self.hierarchy
    }

    /// Generalizes the group of `node` up to `level`.
    ///
    /// Every leaf whose ancestor at `level` equals `node`'s ancestor at
    /// `level` is moved there, unless it is already generalized further.
    /// Returns `true` if any leaf moved.
    ///
    /// # Panics
    ///
    /// Panics if `level` is below `node`'s level or not below the height.
    pub fn generalize_to_level(&mut self, node: NodeId, level: usize) -> bool {
        let hierarchy = self.hierarchy;
        let target = hierarchy.ancestor_of(node, level);
        // Covering: either the whole group is already at or above `target`,
        // or every leaf below it sits strictly lower.
        let probe = hierarchy.first_leaf(target);
        if hierarchy.level(self.assigned[probe as usize]) >= level {
            return false;
        }
        let assigned = Arc::make_mut(&mut self.assigned);
        for leaf in hierarchy.leaves(target) {
            assigned[leaf as usize] = target;
        }
        true
    }

    /// Node currently assigned to `leaf`.
    #[must_use]
    pub fn generalization(&self, leaf: ItemId) -> NodeId {
        self.assigned[leaf as usize]
    }

    /// Returns `true` if `leaf` resolves to a node other than itself.
    #[must_use]
    pub fn is_generalized(&self, leaf: ItemId) -> bool {
        self.assigned[leaf as usize] != leaf
    }

    /// Generalization level of `leaf`.
    #[must_use]
    pub fn level_of(&self, leaf: ItemId) -> usize {
        self.hierarchy.level(self.assigned[leaf as usize])
    }

    /// Current generalization of an arbitrary node: its assigned ancestor if
    /// the group was generalized past it, otherwise the node itself.
    #[must_use]
    pub fn resolve(&self, node: NodeId) -> NodeId {
        let assigned = self.assigned[self.hierarchy.first_leaf(node) as usize];
        if self.hierarchy.level(assigned) >= self.hierarchy.level(node) {
            assigned
        } else {
            node
        }
    }

    /// Per-leaf lookup table of assigned nodes, indexed by leaf id.
    #[must_use]
    pub fn ancestors(&self) -> &[NodeId] {
        &self.assigned
    }

    /// Per-leaf generalization levels, indexed by leaf id.
    #[must_use]
    pub fn levels(&self) -> Vec<usize> {
        self.assigned
            .iter()
            .map(|&node| self.hierarchy.level(node))
            .collect()
    }

    /// Distinct nodes of the cut, ascending.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = self.assigned.to_vec();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Applies the cut to one transaction; output is sorted and deduplicated.
    #[must_use]
    pub fn generalize_transaction(&self, transaction: &[ItemId]) -> Transaction {
        let mut out: Transaction = transaction
            .iter()
            .map(|&leaf| self.assigned[leaf as usize])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Applies the cut to a whole database, preserving transaction order.
    #[must_use]
    pub fn generalize(&self, database: &Database) -> Database {
        database
            .iter()
            .map(|transaction| self.generalize_transaction(transaction))
            .collect()
    }

    /// Number of transactions of the source `database` whose generalization
    /// contains every node of `itemset`.
    #[must_use]
    pub fn support(&self, database: &Database, itemset: &[NodeId]) -> usize {
        database
            .iter()
            .filter(|transaction| {
                itemset.iter().all(|&node| {
                    transaction
                        .iter()
                        .any(|&leaf| self.assigned[leaf as usize] == node)
                })
            })
            .count()
    }

    /// Exact numerator of [`information_loss`](Self::information_loss):
    /// the sum, over generalized leaves, of the leaf count of their node.
    #[must_use]
    pub fn loss_units(&self) -> u64 {
        self.assigned
            .iter()
            .enumerate()
            .filter(|&(leaf, &node)| leaf != node as usize)
            .map(|(_, &node)| self.hierarchy.leaf_count(node) as u64)
            .sum()
    }

    /// Information loss in `[0, 1]`.
    ///
    /// Each generalized leaf costs `|leaves(node)| / n`; the total is
    /// averaged over the `n` leaves. The identity cut costs 0, the root
    /// cut 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn information_loss(&self) -> f64 {
        let n = self.assigned.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        self.loss_units() as f64 / (n * n)
    }

    /// Information loss weighted by how often each leaf occurs in `database`.
    ///
    /// Ids outside the leaf domain are not counted. Returns 0 for a
    /// database without leaf items.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn weighted_information_loss(&self, database: &Database) -> f64 {
        let n = self.assigned.len() as f64;
        let mut support = vec![0_u64; self.assigned.len()];
        for &leaf in database.iter().flatten() {
            if let Some(count) = support.get_mut(leaf as usize) {
                *count += 1;
            }
        }
        let total: u64 = support.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .assigned
            .iter()
            .enumerate()
            .filter(|&(leaf, &node)| leaf != node as usize)
            .map(|(leaf, &node)| support[leaf] as f64 * self.hierarchy.leaf_count(node) as f64 / n)
            .sum();
        weighted / total as f64
    }

    /// Returns `true` if every leaf's node under `self` is an
    /// ancestor-or-equal of its node under `other`.
    #[must_use]
    pub fn is_generalization_of(&self, other: &Self) -> bool {
        self.assigned
            .iter()
            .zip(other.assigned.iter())
            .all(|(&mine, &theirs)| self.hierarchy.level(mine) >= self.hierarchy.level(theirs))
    }

    /// Ranking key: exact loss, then the per-leaf level vector.
    pub(crate) fn rank(&self) -> (u64, Vec<usize>) {
        (self.loss_units(), self.levels())
    }
}

impl PartialEq for Cut<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.assigned == other.assigned
    }
}

impl Eq for Cut<'_> {}

/// Specialization order: `a <= b` iff `a` is at least as general as `b`.
impl PartialOrd for Cut<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (
            self.is_generalization_of(other),
            other.is_generalization_of(self),
        ) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl fmt::Debug for Cut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cut")
            .field("nodes", &self.nodes())
            .field("loss_units", &self.loss_units())
            .finish()
    }
}
