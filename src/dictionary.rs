//! Label dictionary: raw item labels to dense leaf identifiers.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::{KmError, Result};
use crate::hierarchy::Hierarchy;
use crate::{Database, ItemId, Transaction};

/// Dense encoding of leaf labels together with their ancestor chains.
///
/// Identifiers are assigned in first-seen order, so the same rows always
/// produce the same encoding.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    ids: HashMap<String, ItemId>,
    labels: Vec<String>,
    chains: Vec<Vec<String>>,
}

impl Dictionary {
    /// Builds a dictionary from hierarchy rows.
    ///
    /// Each row is a leaf label followed by its ancestors, nearest first.
    ///
    /// # Errors
    ///
    /// [`KmError::MalformedHierarchy`] if a row is empty, if a label repeats
    /// within a row, or if one leaf is given two different ancestor chains.
    pub fn build<I, R, S>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dict = Self::default();
        for row in rows {
            let mut row = row.into_iter().map(Into::into);
            let Some(leaf) = row.next() else {
                return Err(KmError::malformed("empty hierarchy row"));
            };
            let chain: Vec<String> = row.collect();

            if chain.contains(&leaf)
                || chain
                    .iter()
                    .enumerate()
                    .any(|(i, label)| chain[i + 1..].contains(label))
            {
                return Err(KmError::malformed(format!(
                    "cyclic ancestor chain for `{leaf}`"
                )));
            }

            match dict.ids.entry(leaf) {
                Entry::Occupied(slot) => {
                    let id = *slot.get() as usize;
                    if dict.chains[id] != chain {
                        return Err(KmError::malformed(format!(
                            "leaf `{}` has two different ancestor chains",
                            slot.key()
                        )));
                    }
                }
                Entry::Vacant(slot) => {
                    let id = ItemId::try_from(dict.labels.len())
                        .map_err(|_| KmError::malformed("too many leaves"))?;
                    dict.labels.push(slot.key().clone());
                    dict.chains.push(chain);
                    slot.insert(id);
                }
            }
        }
        Ok(dict)
    }

    /// Number of registered leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if no leaf is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Identifier of a leaf label.
    #[must_use]
    pub fn id(&self, label: &str) -> Option<ItemId> {
        self.ids.get(label).copied()
    }

    /// Label of a leaf identifier.
    #[must_use]
    pub fn label(&self, id: ItemId) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    /// Ancestor chain recorded for a leaf, nearest ancestor first.
    #[must_use]
    pub fn chain(&self, id: ItemId) -> Option<&[String]> {
        self.chains.get(id as usize).map(Vec::as_slice)
    }

    /// Encodes transactions of raw labels.
    ///
    /// Every transaction comes back sorted with duplicates collapsed.
    ///
    /// # Errors
    ///
    /// [`KmError::UnknownItem`] for the first label that was never registered.
    pub fn encode<I, T, S>(&self, transactions: I) -> Result<Database>
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        transactions
            .into_iter()
            .map(|labels| {
                let mut transaction = labels
                    .into_iter()
                    .map(|label| {
                        let label = label.as_ref();
                        self.id(label)
                            .ok_or_else(|| KmError::UnknownItem(label.to_owned()))
                    })
                    .collect::<Result<Transaction>>()?;
                transaction.sort_unstable();
                transaction.dedup();
                Ok(transaction)
            })
            .collect()
    }

    /// Renders a (possibly generalized) database back to labels.
    ///
    /// Generalized nodes are labelled from the hierarchy.
    #[must_use]
    pub fn decode(&self, database: &Database, hierarchy: &Hierarchy) -> Vec<Vec<String>> {
        database
            .iter()
            .map(|transaction| {
                transaction
                    .iter()
                    .map(|&node| hierarchy.label(node).to_owned())
                    .collect()
            })
            .collect()
    }
}
