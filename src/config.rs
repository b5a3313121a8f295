//! Search parameters.

use crate::error::{KmError, Result};

/// How candidate cuts of one search step are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// One candidate after another on the calling thread.
    Sequential,
    /// Candidates fanned out over the rayon global pool.
    #[default]
    Rayon,
}

/// Validated km-anonymity parameters.
///
/// `k` is the minimum number of transactions every observed itemset must be
/// shared by; `m` bounds the adversary's background knowledge in items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmConfig {
    k: usize,
    m: usize,
    parallelism: Parallelism,
}

impl KmConfig {
    /// Creates a configuration with the default parallelism.
    ///
    /// # Errors
    ///
    /// [`KmError::InvalidArgument`] if `k < 1` or `m < 1`.
    pub fn new(k: usize, m: usize) -> Result<Self> {
        if k == 0 {
            return Err(KmError::invalid("k", "must be at least 1"));
        }
        if m == 0 {
            return Err(KmError::invalid("m", "must be at least 1"));
        }
        Ok(Self {
            k,
            m,
            parallelism: Parallelism::default(),
        })
    }

    /// Replaces the parallelism policy.
    #[must_use]
    pub const fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Minimum support of every itemset.
    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Maximum adversary knowledge, in items.
    #[must_use]
    pub const fn m(&self) -> usize {
        self.m
    }

    /// Candidate evaluation policy.
    #[must_use]
    pub const fn parallelism(&self) -> Parallelism {
        self.parallelism
    }
}
