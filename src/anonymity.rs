//! km-anonymity engine.

use std::fmt;

use crate::config::KmConfig;
use crate::count_tree::CountTree;
use crate::cut::Cut;
use crate::error::{KmError, Result};
use crate::hierarchy::Hierarchy;
use crate::search;
use crate::Database;

/// Cut search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Uniform level-wise generalization, no search.
    Direct,
    /// Level-wise repair of violating itemsets, sizes `1..=m`.
    Apriori,
    /// Exhaustive lattice exploration with monotonicity pruning.
    Optimal,
}

/// Outcome of one search: the chosen cut and its information loss.
#[derive(Clone)]
pub struct Anonymization<'h> {
    cut: Cut<'h>,
    loss: f64,
    strategy: Strategy,
    examined: usize,
}

impl<'h> Anonymization<'h> {
    pub(crate) fn new(cut: Cut<'h>, strategy: Strategy, examined: usize) -> Self {
        Self {
            loss: cut.information_loss(),
            cut,
            strategy,
            examined,
        }
    }

    /// The chosen cut.
    #[must_use]
    pub const fn cut(&self) -> &Cut<'h> {
        &self.cut
    }

    /// Consumes the result, returning the cut.
    #[must_use]
    pub fn into_cut(self) -> Cut<'h> {
        self.cut
    }

    /// Information loss of the chosen cut.
    #[must_use]
    pub const fn information_loss(&self) -> f64 {
        self.loss
    }

    /// Strategy that produced the cut.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Number of candidate cuts the strategy verified.
    #[must_use]
    pub const fn examined(&self) -> usize {
        self.examined
    }
}

impl fmt::Debug for Anonymization<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anonymization")
            .field("strategy", &self.strategy)
            .field("loss", &self.loss)
            .field("examined", &self.examined)
            .field("cut", &self.cut)
            .finish()
    }
}

/// Searches the cuts of a hierarchy for one that makes a database
/// km-anonymous.
///
/// The hierarchy and database are borrowed read-only; every strategy works
/// on private cut copies, so one engine can serve any number of searches.
pub struct KmAnonymity<'a> {
    config: KmConfig,
    hierarchy: &'a Hierarchy,
    database: &'a Database,
}

impl<'a> KmAnonymity<'a> {
    /// Creates an engine with default parallelism.
    ///
    /// # Errors
    ///
    /// [`KmError::InvalidArgument`] if `k < 1` or `m < 1`;
    /// [`KmError::UnknownItem`] if a transaction holds a non-leaf id.
    pub fn new(k: usize, m: usize, hierarchy: &'a Hierarchy, database: &'a Database) -> Result<Self> {
        Self::with_config(KmConfig::new(k, m)?, hierarchy, database)
    }

    /// Creates an engine from a prepared configuration.
    ///
    /// # Errors
    ///
    /// [`KmError::UnknownItem`] if a transaction holds a non-leaf id.
    pub fn with_config(
        config: KmConfig,
        hierarchy: &'a Hierarchy,
        database: &'a Database,
    ) -> Result<Self> {
        let leaves = hierarchy.domain_items();
        if let Some(item) = database
            .iter()
            .flatten()
            .copied()
            .find(|item| !leaves.contains(item))
        {
            return Err(KmError::UnknownItem(format!("#{item}")));
        }
        Ok(Self {
            config,
            hierarchy,
            database,
        })
    }

    /// Search parameters.
    #[must_use]
    pub const fn config(&self) -> &KmConfig {
        &self.config
    }

    /// Minimum itemset support.
    #[must_use]
    pub const fn k(&self) -> usize {
        self.config.k()
    }

    /// Maximum adversary knowledge, in items.
    #[must_use]
    pub const fn m(&self) -> usize {
        self.config.m()
    }

    /// The generalization hierarchy.
    #[must_use]
    pub const fn hierarchy(&self) -> &'a Hierarchy {
        self.hierarchy
    }

    /// The source database.
    #[must_use]
    pub const fn database(&self) -> &'a Database {
        self.database
    }

    /// Returns `true` if `cut` makes the database km-anonymous.
    #[must_use]
    pub fn is_km_anonymous(&self, cut: &Cut<'_>) -> bool {
        let generalized = cut.generalize(self.database);
        CountTree::build(self.m(), &generalized, self.hierarchy)
            .is_ok_and(|tree| tree.is_km_anonymous(self.k()))
    }

    /// Generalizes every level uniformly, lowest passing level first.
    #[must_use]
    pub fn direct(&self) -> Anonymization<'a> {
        search::direct::run(self)
    }

    /// Repairs violating itemsets pass by pass, sizes `1..=m`.
    #[must_use]
    pub fn apriori(&self) -> Anonymization<'a> {
        search::apriori::run(self)
    }

    /// Finds the km-anonymous cut with minimum information loss.
    #[must_use]
    pub fn optimal(&self) -> Anonymization<'a> {
        search::optimal::run(self)
    }

    /// Runs `strategy`.
    #[must_use]
    pub fn anonymize(&self, strategy: Strategy) -> Anonymization<'a> {
        match strategy {
            Strategy::Direct => self.direct(),
            Strategy::Apriori => self.apriori(),
            Strategy::Optimal => self.optimal(),
        }
    }

    /// The root cut, returned when nothing finer qualifies.
    pub(crate) fn fallback(&self, strategy: Strategy, examined: usize) -> Anonymization<'a> {
        let root = Cut::root(self.hierarchy);
        if !self.is_km_anonymous(&root) {
            tracing::warn!(
                ?strategy,
                k = self.k(),
                transactions = self.database.len(),
                "not even full suppression is km-anonymous, returning the root cut"
            );
        }
        Anonymization::new(root, strategy, examined)
    }
}

impl fmt::Debug for KmAnonymity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmAnonymity")
            .field("config", &self.config)
            .field("transactions", &self.database.len())
            .field("hierarchy", self.hierarchy)
            .finish()
    }
}
