//! Prefix tree of itemset supports.
//!
//! Every node stands for one sorted itemset of size ≤ `m` and records how many
//! transactions contain it. Nodes live in a single-threaded arena; the tree is
//! private to the candidate cut it verifies and is dropped after the check.
//!
//! Supports never grow along a root-to-node path: a superset cannot occur in
//! more transactions than any of its subsets.

use std::collections::HashMap;
use std::fmt;

use safe_bump::{Arena, Idx};

use crate::error::{KmError, Result};
use crate::hierarchy::Hierarchy;
use crate::subset::{SubsetIterator, binomial};
use crate::{Database, NodeId};

/// One itemset node: the last item of the itemset and a link to its prefix.
struct CountNode {
    item: NodeId,
    size: usize,
    parent: Option<Idx<CountNode>>,
}

/// Support counts of every itemset of size ≤ `m` observed in a database.
pub struct CountTree {
    m: usize,
    nodes: Arena<CountNode>,
    /// `(parent raw index, item)` to child.
    edges: HashMap<(usize, NodeId), Idx<CountNode>>,
    /// Support per node, indexed by raw arena index.
    counts: Vec<usize>,
    root: Idx<CountNode>,
}

impl CountTree {
    /// Counts every itemset of size `1..=m` of every transaction.
    ///
    /// Transactions are read as sets: item order and repeats are ignored.
    ///
    /// # Errors
    ///
    /// [`KmError::InvalidArgument`] if `m == 0`.
    pub fn build(m: usize, database: &Database, hierarchy: &Hierarchy) -> Result<Self> {
        if m == 0 {
            return Err(KmError::invalid("m", "must be at least 1"));
        }
        let mut nodes = Arena::new();
        let root = nodes.alloc(CountNode {
            item: hierarchy.root(),
            size: 0,
            parent: None,
        });
        let mut tree = Self {
            m,
            nodes,
            edges: HashMap::with_capacity(hierarchy.node_count()),
            counts: vec![database.len()],
            root,
        };

        let mut work = 0_u64;
        let mut items: Vec<NodeId> = Vec::new();
        for transaction in database {
            items.clear();
            items.extend_from_slice(transaction);
            items.sort_unstable();
            items.dedup();
            for size in 1..=m.min(items.len()) {
                work = work.saturating_add(binomial(items.len() as u64, size as u64));
                for itemset in SubsetIterator::new(&items, size)? {
                    let node = tree.insert_path(&itemset);
                    tree.counts[node.into_raw()] += 1;
                }
            }
        }
        tracing::trace!(
            m,
            transactions = database.len(),
            itemsets = tree.len(),
            work,
            "built count tree"
        );
        Ok(tree)
    }

    /// Walks `itemset` from the root, creating missing nodes.
    fn insert_path(&mut self, itemset: &[NodeId]) -> Idx<CountNode> {
        let mut current = self.root;
        for (depth, &item) in itemset.iter().enumerate() {
            let key = (current.into_raw(), item);
            current = match self.edges.get(&key) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.alloc(CountNode {
                        item,
                        size: depth + 1,
                        parent: Some(current),
                    });
                    self.counts.push(0);
                    self.edges.insert(key, child);
                    child
                }
            };
        }
        current
    }

    /// Returns `true` if every stored itemset is contained in at least `k`
    /// transactions.
    #[must_use]
    pub fn is_km_anonymous(&self, k: usize) -> bool {
        self.counts[1..].iter().all(|&count| count >= k)
    }

    /// Number of transactions containing `itemset`.
    ///
    /// The empty itemset is contained in every transaction. Itemsets larger
    /// than `m` or never observed count as 0.
    #[must_use]
    pub fn count(&self, itemset: &[NodeId]) -> usize {
        let mut sorted = itemset.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut current = self.root;
        for item in sorted {
            match self.edges.get(&(current.into_raw(), item)) {
                Some(&child) => current = child,
                None => return 0,
            }
        }
        self.counts[current.into_raw()]
    }

    /// Itemsets with support below `k`, ordered by size then items.
    #[must_use]
    pub fn violations(&self, k: usize) -> Vec<(Vec<NodeId>, usize)> {
        let mut found: Vec<(Vec<NodeId>, usize)> = (1..self.counts.len())
            .filter(|&raw| self.counts[raw] < k)
            .map(|raw| (self.itemset(Idx::from_raw(raw)), self.counts[raw]))
            .collect();
        found.sort_unstable_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| a.0.cmp(&b.0)));
        found
    }

    /// Every stored itemset with its support, in arena order.
    pub fn itemsets(&self) -> impl Iterator<Item = (Vec<NodeId>, usize)> + '_ {
        (1..self.counts.len()).map(|raw| (self.itemset(Idx::from_raw(raw)), self.counts[raw]))
    }

    /// Reconstructs the itemset of a node from its prefix links.
    fn itemset(&self, idx: Idx<CountNode>) -> Vec<NodeId> {
        let mut node = self.nodes.get(idx);
        let mut items = vec![0; node.size];
        while let Some(parent) = node.parent {
            items[node.size - 1] = node.item;
            node = self.nodes.get(parent);
        }
        items
    }

    /// Number of stored itemsets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len() - 1
    }

    /// Returns `true` if no itemset was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest itemset size counted.
    #[must_use]
    pub const fn max_itemset_size(&self) -> usize {
        self.m
    }

    /// Number of transactions the tree was built from.
    #[must_use]
    pub fn transactions(&self) -> usize {
        self.counts[self.root.into_raw()]
    }
}

impl fmt::Debug for CountTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountTree")
            .field("m", &self.m)
            .field("itemsets", &self.len())
            .field("transactions", &self.transactions())
            .finish_non_exhaustive()
    }
}
