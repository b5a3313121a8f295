//! Apriori anonymization: level-wise repair of violating itemsets.
//!
//! Pass `i` counts itemsets of size ≤ `i` under the current cut and repairs
//! each one with support below `k`. Generalizing never lowers a support, so
//! everything fixed in earlier passes stays fixed; only the nodes found
//! failing in pass `i` are generalized in pass `i`.

use std::collections::HashSet;

use tracing::{debug, instrument, trace, warn};

use crate::anonymity::{Anonymization, KmAnonymity, Strategy};
use crate::count_tree::CountTree;
use crate::cut::Cut;
use crate::search::{best, evaluate};
use crate::NodeId;

/// Runs passes `1..=m` and verifies the final cut.
#[instrument(skip_all, fields(k = engine.k(), m = engine.m()))]
pub fn run<'a>(engine: &KmAnonymity<'a>) -> Anonymization<'a> {
    let hierarchy = engine.hierarchy();
    let database = engine.database();
    let k = engine.k();
    let parallelism = engine.config().parallelism();

    let mut cut = Cut::new(hierarchy);
    let mut examined = 0;
    for pass in 1..=engine.m() {
        let generalized = cut.generalize(database);
        let Ok(tree) = CountTree::build(pass, &generalized, hierarchy) else {
            break;
        };
        let violations = tree.violations(k);
        debug!(pass, itemsets = tree.len(), violations = violations.len(), "counted");

        for (itemset, _) in violations {
            let current = resolve_itemset(&cut, &itemset);
            if cut.support(database, &current) >= k {
                continue;
            }
            let candidates = repairs(&cut, &current);
            examined += candidates.len();
            let admissible = evaluate(parallelism, &candidates, |candidate| {
                candidate.support(database, &resolve_itemset(candidate, &current)) >= k
            });
            let chosen = best(
                candidates
                    .into_iter()
                    .zip(admissible)
                    .filter_map(|(candidate, ok)| ok.then_some(candidate)),
            );
            let Some(next) = chosen else {
                warn!(?current, "no generalization repairs itemset");
                return engine.fallback(Strategy::Apriori, examined);
            };
            trace!(?current, loss = next.information_loss(), "repaired");
            cut = next;
        }
    }

    examined += 1;
    if engine.is_km_anonymous(&cut) {
        Anonymization::new(cut, Strategy::Apriori, examined)
    } else {
        warn!("repaired cut failed final verification");
        engine.fallback(Strategy::Apriori, examined)
    }
}

/// Maps every node of `itemset` to its current generalization.
fn resolve_itemset(cut: &Cut<'_>, itemset: &[NodeId]) -> Vec<NodeId> {
    let mut resolved: Vec<NodeId> = itemset.iter().map(|&node| cut.resolve(node)).collect();
    resolved.sort_unstable();
    resolved.dedup();
    resolved
}

/// Every cut obtained by lifting each node of `itemset` to one of its
/// ancestors-or-self, except the unchanged cut. Duplicates are dropped.
fn repairs<'h>(cut: &Cut<'h>, itemset: &[NodeId]) -> Vec<Cut<'h>> {
    let hierarchy = cut.hierarchy();
    let height = hierarchy.height();
    let bases: Vec<usize> = itemset.iter().map(|&node| hierarchy.level(node)).collect();

    let mut seen = HashSet::from([cut.levels()]);
    let mut out = Vec::new();
    // Odometer over per-item target levels.
    let mut targets = bases.clone();
    loop {
        let Some(i) = (0..targets.len()).rev().find(|&i| targets[i] + 1 < height) else {
            break;
        };
        targets[i] += 1;
        for j in i + 1..targets.len() {
            targets[j] = bases[j];
        }

        let mut candidate = cut.clone();
        for (&node, &level) in itemset.iter().zip(&targets) {
            candidate.generalize_to_level(node, level);
        }
        if seen.insert(candidate.levels()) {
            out.push(candidate);
        }
    }
    out
}
