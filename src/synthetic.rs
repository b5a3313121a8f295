//! Reproducible synthetic hierarchies and transaction databases.
//!
//! Every generator takes its random source explicitly; seed a
//! `rand_chacha::ChaCha20Rng` for runs that repeat bit for bit.

use rand::Rng;
use rand::seq::index;

use crate::hierarchy::Hierarchy;
use crate::{Database, Transaction};

/// Rows of a balanced hierarchy with the given fan-out per level, leaves
/// first.
///
/// `fanouts = [2, 3]` yields 6 leaves `i0..i5` under 3 level-1 nodes
/// `g1_0..g1_2`, grouped under one root `*` by the hierarchy builder.
#[must_use]
pub fn balanced_rows(fanouts: &[usize]) -> Vec<Vec<String>> {
    let leaves: usize = fanouts.iter().product();
    (0..leaves)
        .map(|leaf| {
            let mut row = vec![format!("i{leaf}")];
            let mut group = leaf;
            for (level, &fanout) in fanouts.iter().enumerate().take(fanouts.len().saturating_sub(1)) {
                group /= fanout.max(1);
                row.push(format!("g{}_{group}", level + 1));
            }
            row
        })
        .collect()
}

/// A database of `transactions` records over the leaves of `hierarchy`.
///
/// Each record draws a size uniformly from `1..=max_len` (capped by the
/// domain size) and that many distinct leaves.
pub fn random_database<R: Rng>(
    rng: &mut R,
    hierarchy: &Hierarchy,
    transactions: usize,
    max_len: usize,
) -> Database {
    let domain = hierarchy.leaf_total();
    let max_len = max_len.min(domain);
    if max_len == 0 {
        return vec![Vec::new(); transactions];
    }
    (0..transactions)
        .map(|_| {
            let len = rng.gen_range(1..=max_len);
            let mut transaction: Transaction = index::sample(rng, domain, len)
                .into_iter()
                .filter_map(|leaf| u32::try_from(leaf).ok())
                .collect();
            transaction.sort_unstable();
            transaction
        })
        .collect()
}
