//! km-anonymity for set-valued data.
//!
//! A database of transactions (sets of items) is km-anonymous when every
//! itemset of at most `m` items that occurs in it is shared by at least `k`
//! transactions: an adversary who knows up to `m` items of a victim can never
//! narrow the victim down to fewer than `k` records.
//!
//! Items are leaves of a generalization [`Hierarchy`]. A [`Cut`] replaces
//! each leaf by one of its ancestors; [`KmAnonymity`] searches the space of
//! cuts for one that makes the database km-anonymous while losing as little
//! information as possible.
//!
//! # Components
//!
//! - [`Dictionary`]: labels to dense leaf ids, with ancestor chains
//! - [`Hierarchy`]: arena-backed generalization tree
//! - [`Cut`]: copy-on-write generalization state
//! - [`SubsetIterator`]: lazy k-subset enumeration
//! - [`CountTree`]: itemset supports and the km-anonymity check
//! - [`KmAnonymity`]: direct, apriori and optimal cut search
//!
//! # References
//!
//! - Terrovitis, Mamoulis & Kalnis, 2008: "Privacy-preserving Anonymization
//!   of Set-valued Data", VLDB 2008
//! - Agrawal & Srikant, 1994: "Fast Algorithms for Mining Association
//!   Rules", VLDB 1994

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod count_tree;
pub mod cut;
pub mod dictionary;
pub mod error;
pub mod hierarchy;
pub mod subset;
pub mod synthetic;

mod anonymity;
mod search;

#[cfg(test)]
mod tests;

pub use anonymity::{Anonymization, KmAnonymity, Strategy};
pub use config::{KmConfig, Parallelism};
pub use count_tree::CountTree;
pub use cut::Cut;
pub use dictionary::Dictionary;
pub use error::{KmError, Result};
pub use hierarchy::Hierarchy;
pub use subset::SubsetIterator;

/// Dense hierarchy node id. Leaves take `0..n`, so a leaf's node id is its
/// item id.
pub type NodeId = u32;

/// Leaf item id.
pub type ItemId = NodeId;

/// Sorted, duplicate-free set of ids.
pub type Transaction = Vec<NodeId>;

/// Ordered sequence of transactions.
pub type Database = Vec<Transaction>;
