//! Cut search strategies.
//!
//! Candidates of one step are evaluated independently, optionally in
//! parallel, and the winner is always picked by [`best`], never by
//! completion order.

use rayon::prelude::*;

use crate::config::Parallelism;
use crate::cut::Cut;

pub mod apriori;
pub mod direct;
pub mod optimal;

/// Maps `f` over `items`, preserving order under both policies.
pub fn evaluate<T, R, F>(parallelism: Parallelism, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    match parallelism {
        Parallelism::Sequential => items.iter().map(f).collect(),
        Parallelism::Rayon => items.par_iter().map(f).collect(),
    }
}

/// Lowest-ranked cut: least information loss, then the lexicographically
/// smallest per-leaf level vector.
pub fn best<'h>(cuts: impl IntoIterator<Item = Cut<'h>>) -> Option<Cut<'h>> {
    cuts.into_iter().min_by_key(Cut::rank)
}
