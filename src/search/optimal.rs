//! Optimal anonymization: breadth-first walk of the cut lattice.
//!
//! Lattice level `d` holds the cuts reachable from the identity cut by `d`
//! single-node generalizations. A km-anonymous cut is recorded and not
//! expanded, since every coarser cut costs at least as much. A failing cut is
//! expanded, since some coarser cut may pass. Cuts costing more than the best
//! solution so far are dropped before verification.

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::anonymity::{Anonymization, KmAnonymity, Strategy};
use crate::cut::Cut;
use crate::search::{best, evaluate};

/// Returns the global minimum-loss km-anonymous cut.
#[instrument(skip_all, fields(k = engine.k(), m = engine.m()))]
pub fn run<'a>(engine: &KmAnonymity<'a>) -> Anonymization<'a> {
    let hierarchy = engine.hierarchy();
    let parallelism = engine.config().parallelism();

    // If full suppression fails, every finer cut fails too.
    let mut examined = 1;
    if !engine.is_km_anonymous(&Cut::root(hierarchy)) {
        return engine.fallback(Strategy::Optimal, examined);
    }

    let identity = Cut::new(hierarchy);
    let mut seen = HashSet::from([identity.levels()]);
    let mut frontier = vec![identity];
    let mut incumbent: Option<Cut<'a>> = None;
    let mut depth = 0_usize;

    while !frontier.is_empty() {
        if let Some(bound) = incumbent.as_ref().map(Cut::loss_units) {
            frontier.retain(|cut| cut.loss_units() <= bound);
        }
        examined += frontier.len();
        let verdicts = evaluate(parallelism, &frontier, |cut| engine.is_km_anonymous(cut));

        let mut next = Vec::new();
        let mut solutions = Vec::new();
        for (cut, anonymous) in frontier.into_iter().zip(verdicts) {
            if anonymous {
                solutions.push(cut);
                continue;
            }
            for step in steps(&cut) {
                if seen.insert(step.levels()) {
                    next.push(step);
                }
            }
        }
        if !solutions.is_empty() {
            incumbent = best(incumbent.into_iter().chain(solutions));
        }
        trace!(depth, expanded = next.len(), "lattice level done");
        frontier = next;
        depth += 1;
    }

    match incumbent {
        Some(cut) => {
            debug!(depth, examined, loss = cut.information_loss(), "optimum found");
            Anonymization::new(cut, Strategy::Optimal, examined)
        }
        None => engine.fallback(Strategy::Optimal, examined),
    }
}

/// Cuts one minimal generalization above `cut`: each lifts a node all of
/// whose children are currently nodes of the cut.
fn steps<'h>(cut: &Cut<'h>) -> Vec<Cut<'h>> {
    let hierarchy = cut.hierarchy();
    let in_cut = |node| cut.generalization(hierarchy.first_leaf(node)) == node;
    (1..hierarchy.height())
        .flat_map(|level| hierarchy.nodes_at(level))
        .filter(|&parent| hierarchy.children(parent).all(in_cut))
        .map(|parent| {
            let mut next = cut.clone();
            next.generalize_to_level(parent, hierarchy.level(parent));
            next
        })
        .collect()
}
