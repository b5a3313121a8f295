//! Generalization hierarchy stored in shared arenas.
//!
//! Nodes are numbered densely by level: leaves take `0..n` (a leaf's node id
//! is its item id), followed by every level-1 node, and so on up to the root,
//! which always carries the largest id. Parent links are plain ids; child and
//! leaf lists are contiguous runs in a second arena, addressed by `Idx`
//! offsets.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use safe_bump::{Idx, SharedArena};

use crate::dictionary::Dictionary;
use crate::error::{KmError, Result};
use crate::{ItemId, NodeId};

/// Label given to the root synthesized above a multi-node top level.
pub const ROOT_LABEL: &str = "*";

/// Contiguous run of node ids in the links arena.
#[derive(Clone, Copy)]
struct Span {
    start: Option<Idx<NodeId>>,
    len: usize,
}

/// One generalization node.
pub struct HierarchyNode {
    label: String,
    level: usize,
    parent: Option<NodeId>,
    children: Span,
    leaves: Span,
}

impl HierarchyNode {
    /// Node label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Level of the node, 0 for leaves.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Parent id, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl fmt::Debug for HierarchyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyNode")
            .field("label", &self.label)
            .field("level", &self.level)
            .field("parent", &self.parent)
            .field("children", &self.children.len)
            .field("leaves", &self.leaves.len)
            .finish()
    }
}

/// Offsets a base index by `n` positions.
#[inline]
fn offset<T>(base: Idx<T>, n: usize) -> Idx<T> {
    Idx::from_raw(base.into_raw() + n)
}

/// Immutable generalization tree, safe to share across search workers.
pub struct Hierarchy {
    nodes: SharedArena<HierarchyNode>,
    links: SharedArena<NodeId>,
    /// `level_starts[l]..level_starts[l + 1]` are the ids at level `l`.
    level_starts: Vec<NodeId>,
    /// Row-major `leaf * height + level` ancestor table.
    ancestors: Vec<NodeId>,
    height: usize,
}

/// Per-level label interning used while the tree is assembled.
#[derive(Default)]
struct LevelBuilder<'a> {
    ids: HashMap<&'a str, usize>,
    labels: Vec<&'a str>,
    parents: Vec<Option<usize>>,
}

impl<'a> LevelBuilder<'a> {
    fn intern(&mut self, label: &'a str) -> usize {
        *self.ids.entry(label).or_insert_with(|| {
            self.labels.push(label);
            self.parents.push(None);
            self.labels.len() - 1
        })
    }

    fn link(&mut self, local: usize, parent: usize, level: usize) -> Result<()> {
        match self.parents[local] {
            Some(existing) if existing != parent => Err(KmError::malformed(format!(
                "`{}` at level {level} generalizes to two different parents",
                self.labels[local]
            ))),
            _ => {
                self.parents[local] = Some(parent);
                Ok(())
            }
        }
    }
}

impl Hierarchy {
    /// Builds the hierarchy from the chains recorded in `dictionary`.
    ///
    /// # Errors
    ///
    /// [`KmError::MalformedHierarchy`] if the dictionary is empty, if chains
    /// differ in length, or if one ancestor label is reached from two
    /// different parents.
    pub fn new(dictionary: &Dictionary) -> Result<Self> {
        let leaf_count = dictionary.len();
        let chains: Vec<&[String]> = (0..leaf_count)
            .map(|i| dictionary.chain(leaf_id(i)).unwrap_or_default())
            .collect();
        let Some(first) = chains.first() else {
            return Err(KmError::malformed("hierarchy has no leaves"));
        };
        let depth = first.len() + 1;
        if let Some(i) = chains.iter().position(|c| c.len() + 1 != depth) {
            return Err(KmError::malformed(format!(
                "leaf `{}` has {} levels, expected {depth}",
                dictionary.label(leaf_id(i)).unwrap_or_default(),
                chains[i].len() + 1
            )));
        }

        // levels[0] stays empty: leaves are already interned by the dictionary.
        let mut levels: Vec<LevelBuilder<'_>> = (0..depth).map(|_| LevelBuilder::default()).collect();
        let mut leaf_parents: Vec<Option<usize>> = vec![None; leaf_count];
        for (leaf, chain) in chains.iter().enumerate() {
            let mut below: Option<usize> = None;
            for (i, label) in chain.iter().enumerate() {
                let level = i + 1;
                let local = levels[level].intern(label);
                match below {
                    None => leaf_parents[leaf] = Some(local),
                    Some(child) => levels[level - 1].link(child, local, level - 1)?,
                }
                below = Some(local);
            }
        }

        let mut sizes: Vec<usize> = levels.iter().map(|l| l.labels.len()).collect();
        sizes[0] = leaf_count;
        let synthesize_root = sizes[depth - 1] > 1;
        let height = depth + usize::from(synthesize_root);
        if synthesize_root {
            sizes.push(1);
        }

        let mut level_starts = Vec::with_capacity(height + 1);
        let mut next = 0_usize;
        for &size in &sizes {
            level_starts.push(next);
            next += size;
        }
        level_starts.push(next);
        let node_count = next;
        let global = |level: usize, local: usize| level_starts[level] + local;

        let mut labels: Vec<&str> = Vec::with_capacity(node_count);
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(node_count);
        for leaf in 0..leaf_count {
            labels.push(dictionary.label(leaf_id(leaf)).unwrap_or_default());
            parents.push(leaf_parents[leaf].map(|p| global(1, p)));
        }
        for (level, builder) in levels.iter().enumerate().skip(1) {
            for (local, &label) in builder.labels.iter().enumerate() {
                labels.push(label);
                let parent = match builder.parents[local] {
                    Some(p) => Some(global(level + 1, p)),
                    None if synthesize_root => Some(global(depth, 0)),
                    None => None,
                };
                parents.push(parent);
            }
        }
        if synthesize_root {
            labels.push(ROOT_LABEL);
            parents.push(None);
        }
        if synthesize_root && depth == 1 {
            for parent in &mut parents[..leaf_count] {
                *parent = Some(global(1, 0));
            }
        }

        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
        for (id, parent) in parents.iter().enumerate() {
            if let Some(p) = *parent {
                children[p].push(node_id(id)?);
            }
        }

        let mut leaves: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
        let mut ancestors = Vec::with_capacity(leaf_count * height);
        for leaf in 0..leaf_count {
            let mut current = Some(leaf);
            while let Some(node) = current {
                leaves[node].push(node_id(leaf)?);
                ancestors.push(node_id(node)?);
                current = parents[node];
            }
        }

        let mut nodes = SharedArena::new();
        let mut links = SharedArena::new();
        for id in 0..node_count {
            let level = level_starts.partition_point(|&start| start <= id) - 1;
            let children = Span {
                len: children[id].len(),
                start: links.alloc_extend(children[id].iter().copied()),
            };
            let leaves = Span {
                len: leaves[id].len(),
                start: links.alloc_extend(leaves[id].iter().copied()),
            };
            let parent = parents[id].map(node_id).transpose()?;
            let idx = nodes.alloc(HierarchyNode {
                label: labels[id].to_owned(),
                level,
                parent,
                children,
                leaves,
            });
            debug_assert_eq!(idx.into_raw(), id);
        }

        let level_starts = level_starts
            .into_iter()
            .map(node_id)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(leaves = leaf_count, nodes = node_count, height, "built hierarchy");
        Ok(Self {
            nodes,
            links,
            level_starts,
            ancestors,
            height,
        })
    }

    /// Builds a dictionary and its hierarchy from rows in one step.
    ///
    /// # Errors
    ///
    /// See [`Dictionary::build`] and [`Hierarchy::new`].
    pub fn from_rows<I, R, S>(rows: I) -> Result<(Dictionary, Self)>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dictionary = Dictionary::build(rows)?;
        let hierarchy = Self::new(&dictionary)?;
        Ok((dictionary, hierarchy))
    }

    /// Number of levels, including leaves and the root.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of nodes across all levels.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids at `level`; empty for levels at or above the height.
    #[must_use]
    pub fn nodes_at(&self, level: usize) -> Range<NodeId> {
        if level >= self.height {
            return 0..0;
        }
        self.level_starts[level]..self.level_starts[level + 1]
    }

    /// Number of distinct nodes at `level`.
    #[must_use]
    pub fn domain_size(&self, level: usize) -> usize {
        self.nodes_at(level).len()
    }

    /// All leaf (item) ids.
    #[must_use]
    pub fn domain_items(&self) -> Range<ItemId> {
        self.nodes_at(0)
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_total(&self) -> usize {
        self.domain_size(0)
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.level_starts[self.height] - 1
    }

    /// Node record.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this hierarchy.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        self.nodes.get(Idx::from_raw(id as usize))
    }

    /// Level of `id`.
    #[must_use]
    pub fn level(&self, id: NodeId) -> usize {
        self.node(id).level
    }

    /// Parent of `id`, `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Label of `id`.
    #[must_use]
    pub fn label(&self, id: NodeId) -> &str {
        &self.node(id).label
    }

    /// Direct children of `id`, in ascending id order.
    pub fn children(&self, id: NodeId) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.span(self.node(id).children)
    }

    /// Leaves covered by `id`, in ascending id order. A leaf covers itself.
    pub fn leaves(&self, id: NodeId) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.span(self.node(id).leaves)
    }

    /// Number of leaves covered by `id`.
    #[must_use]
    pub fn leaf_count(&self, id: NodeId) -> usize {
        self.node(id).leaves.len
    }

    /// The node `leaf` maps to at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `leaf` is not a leaf or `level >= height()`.
    #[must_use]
    pub fn ancestor(&self, leaf: ItemId, level: usize) -> NodeId {
        assert!(
            (leaf as usize) < self.leaf_total() && level < self.height,
            "ancestor({leaf}, {level}) outside the hierarchy"
        );
        self.ancestors[leaf as usize * self.height + level]
    }

    /// The ancestor-or-self of an arbitrary node at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level` is below the node's own level or not below `height()`.
    #[must_use]
    pub fn ancestor_of(&self, id: NodeId, level: usize) -> NodeId {
        let node = self.node(id);
        assert!(
            node.level <= level,
            "node {id} at level {} has no ancestor at level {level}",
            node.level
        );
        let leaf = self.first_leaf(id);
        self.ancestor(leaf, level)
    }

    /// Smallest leaf covered by `id`.
    pub(crate) fn first_leaf(&self, id: NodeId) -> NodeId {
        self.leaves(id).next().unwrap_or(id)
    }

    fn span(&self, span: Span) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        (0..span.len).map(move |i| match span.start {
            Some(start) => *self.links.get(offset(start, i)),
            None => unreachable!("non-empty span without a start"),
        })
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hierarchy")
            .field("height", &self.height)
            .field("leaves", &self.leaf_total())
            .field("nodes", &self.node_count())
            .finish_non_exhaustive()
    }
}

fn leaf_id(i: usize) -> ItemId {
    ItemId::try_from(i).unwrap_or(ItemId::MAX)
}

fn node_id(i: usize) -> Result<NodeId> {
    NodeId::try_from(i).map_err(|_| KmError::malformed("too many hierarchy nodes"))
}
