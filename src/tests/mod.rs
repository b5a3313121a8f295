mod cut;
mod strategies;

use crate::{Cut, Database, Hierarchy, NodeId};

/// Hierarchy of the worked example: `a1, a2 → A`, `b1, b2 → B`, both under `*`.
///
/// Ids: a1=0, a2=1, b1=2, b2=3, A=4, B=5, *=6.
fn paper_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["a1", "A", "*"],
        vec!["a2", "A", "*"],
        vec!["b1", "B", "*"],
        vec!["b2", "B", "*"],
    ]
}

fn paper_hierarchy() -> Hierarchy {
    Hierarchy::from_rows(paper_rows()).expect("paper rows").1
}

/// `{a1,b1,b2}, {a2,b1}, {a2,b1,b2}, {a1,a2,b2}`.
fn paper_database() -> Database {
    vec![vec![0, 2, 3], vec![1, 2], vec![1, 2, 3], vec![0, 1, 3]]
}

/// Number of transactions containing every item of `itemset`, by brute force.
fn brute_support(database: &Database, itemset: &[NodeId]) -> usize {
    database
        .iter()
        .filter(|t| itemset.iter().all(|item| t.contains(item)))
        .count()
}

/// Every cut of `hierarchy`, built from all coverings of the root.
fn all_cuts(hierarchy: &Hierarchy) -> Vec<Cut<'_>> {
    fn coverings(hierarchy: &Hierarchy, node: NodeId) -> Vec<Vec<NodeId>> {
        let mut out = vec![vec![node]];
        if hierarchy.level(node) > 0 {
            let mut combined: Vec<Vec<NodeId>> = vec![Vec::new()];
            for child in hierarchy.children(node) {
                let below = coverings(hierarchy, child);
                combined = combined
                    .iter()
                    .flat_map(|prefix| {
                        below.iter().map(move |tail| {
                            let mut nodes = prefix.clone();
                            nodes.extend(tail);
                            nodes
                        })
                    })
                    .collect();
            }
            out.extend(combined);
        }
        out
    }

    coverings(hierarchy, hierarchy.root())
        .into_iter()
        .map(|nodes| {
            let mut cut = Cut::new(hierarchy);
            for node in nodes {
                cut.generalize_to_level(node, hierarchy.level(node));
            }
            cut
        })
        .collect()
}
