//! Lazy k-subset enumeration.

use crate::error::{KmError, Result};

/// Enumerates every `k`-element subset of a slice without materializing them.
///
/// Subsets are produced in lexicographic order of index positions, so a
/// sorted input yields sorted subsets in lexicographic order. State between
/// steps is the `k` current positions.
#[derive(Debug, Clone)]
pub struct SubsetIterator<'a, T> {
    items: &'a [T],
    positions: Vec<usize>,
    exhausted: bool,
}

impl<'a, T: Copy> SubsetIterator<'a, T> {
    /// Creates an iterator over the `k`-subsets of `items`.
    ///
    /// When `items.len() < k` the sequence is empty.
    ///
    /// # Errors
    ///
    /// [`KmError::InvalidArgument`] if `k == 0`.
    pub fn new(items: &'a [T], k: usize) -> Result<Self> {
        if k == 0 {
            return Err(KmError::invalid("k", "subset size must be at least 1"));
        }
        let exhausted = items.len() < k;
        let positions = if exhausted { Vec::new() } else { (0..k).collect() };
        Ok(Self {
            items,
            positions,
            exhausted,
        })
    }

    /// Returns `true` if another subset is available.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        !self.exhausted
    }

    /// Returns the next subset.
    ///
    /// # Errors
    ///
    /// [`KmError::ExhaustedIterator`] once every subset has been produced.
    pub fn try_next(&mut self) -> Result<Vec<T>> {
        if self.exhausted {
            return Err(KmError::ExhaustedIterator);
        }
        let subset = self.positions.iter().map(|&p| self.items[p]).collect();
        self.advance();
        Ok(subset)
    }

    /// Moves to the next combination of positions.
    fn advance(&mut self) {
        let n = self.items.len();
        let k = self.positions.len();
        // Rightmost position that can still move right.
        let Some(i) = (0..k).rev().find(|&i| self.positions[i] < n - k + i) else {
            self.exhausted = true;
            return;
        };
        self.positions[i] += 1;
        for j in i + 1..k {
            self.positions[j] = self.positions[j - 1] + 1;
        }
    }
}

impl<T: Copy> Iterator for SubsetIterator<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        self.try_next().ok()
    }
}

/// `C(n, k)`, saturating at `u64::MAX`.
#[must_use]
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * u128::from(n - i) / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    u64::try_from(acc).unwrap_or(u64::MAX)
}
