use std::cmp::Ordering;

use super::{paper_database, paper_hierarchy};
use crate::Cut;

#[test]
fn identity_cut() {
    let h = paper_hierarchy();
    let cut = Cut::new(&h);
    for leaf in h.domain_items() {
        assert_eq!(cut.generalization(leaf), leaf);
        assert!(!cut.is_generalized(leaf));
        assert_eq!(cut.level_of(leaf), 0);
    }
    assert_eq!(cut.ancestors(), [0, 1, 2, 3]);
    assert_eq!(cut.information_loss(), 0.0);
    assert_eq!(cut.generalize(&paper_database()), paper_database());
}

#[test]
fn generalize_moves_exactly_the_group() {
    let h = paper_hierarchy();
    let mut cut = Cut::new(&h);
    assert!(cut.generalize_to_level(1, 1));
    assert_eq!(cut.generalization(0), 4);
    assert_eq!(cut.generalization(1), 4);
    assert_eq!(cut.generalization(2), 2);
    assert_eq!(cut.generalization(3), 3);
    assert!(cut.is_generalized(0));
    assert!(!cut.is_generalized(3));
    assert_eq!(cut.levels(), [1, 1, 0, 0]);
}

#[test]
fn generalize_is_idempotent() {
    let h = paper_hierarchy();
    let mut cut = Cut::new(&h);
    cut.generalize_to_level(0, 1);
    let before = cut.clone();
    assert!(!cut.generalize_to_level(0, 1));
    assert!(!cut.generalize_to_level(1, 1));
    assert!(!cut.generalize_to_level(4, 1));
    assert_eq!(cut, before);

    assert!(cut.generalize_to_level(4, 2));
    assert!(!cut.generalize_to_level(2, 1), "already past level 1");
    assert_eq!(cut.generalization(2), 6);
    assert_eq!(cut, Cut::root(&h));
}

#[test]
#[should_panic(expected = "no ancestor")]
fn generalize_below_node_level_panics() {
    let h = paper_hierarchy();
    let mut cut = Cut::new(&h);
    cut.generalize_to_level(4, 0);
}

#[test]
fn resolve_follows_the_cut() {
    let h = paper_hierarchy();
    let mut cut = Cut::new(&h);
    assert_eq!(cut.resolve(4), 4);
    assert_eq!(cut.resolve(0), 0);
    cut.generalize_to_level(0, 1);
    assert_eq!(cut.resolve(0), 4);
    assert_eq!(cut.resolve(4), 4);
    assert_eq!(cut.resolve(5), 5);
    cut.generalize_to_level(0, 2);
    assert_eq!(cut.resolve(4), 6);
    assert_eq!(cut.resolve(3), 6);
}

#[test]
fn generalize_database_collapses_merged_items() {
    let h = paper_hierarchy();
    let mut cut = Cut::new(&h);
    cut.generalize_to_level(0, 1);
    let generalized = cut.generalize(&paper_database());
    assert_eq!(
        generalized,
        vec![vec![2, 3, 4], vec![2, 4], vec![2, 3, 4], vec![3, 4]]
    );
    assert_eq!(cut.support(&paper_database(), &[2, 4]), 3);
    assert_eq!(cut.support(&paper_database(), &[4]), 4);
}

#[test]
fn information_loss_levels() {
    let h = paper_hierarchy();
    let mut a = Cut::new(&h);
    a.generalize_to_level(0, 1);
    assert_eq!(a.loss_units(), 4);
    assert!((a.information_loss() - 0.25).abs() < 1e-12);
    assert!((Cut::at_level(&h, 1).information_loss() - 0.5).abs() < 1e-12);
    assert!((Cut::root(&h).information_loss() - 1.0).abs() < 1e-12);
}

#[test]
fn weighted_information_loss() {
    let h = paper_hierarchy();
    let mut a = Cut::new(&h);
    a.generalize_to_level(0, 1);
    // a1 occurs twice, a2 three times, out of 11 item occurrences.
    let expected = (2.0 * 0.5 + 3.0 * 0.5) / 11.0;
    assert!((a.weighted_information_loss(&paper_database()) - expected).abs() < 1e-12);
    assert_eq!(a.weighted_information_loss(&Vec::new()), 0.0);
}

#[test]
fn weighted_loss_skips_non_leaf_ids() {
    let h = paper_hierarchy();
    let mut a = Cut::new(&h);
    a.generalize_to_level(0, 1);
    // Node 4 is `A`, not a leaf; only a1 is counted.
    let db = vec![vec![0, 4], vec![6]];
    assert!((a.weighted_information_loss(&db) - 0.5).abs() < 1e-12);
    assert_eq!(a.weighted_information_loss(&vec![vec![5]]), 0.0);
}

#[test]
fn clones_do_not_share_mutations() {
    let h = paper_hierarchy();
    let original = Cut::new(&h);
    let mut branch = original.clone();
    branch.generalize_to_level(2, 1);
    assert_eq!(original.generalization(2), 2);
    assert_eq!(branch.generalization(2), 5);
    assert_ne!(original, branch);
}

#[test]
fn specialization_order() {
    let h = paper_hierarchy();
    let identity = Cut::new(&h);
    let mut a = Cut::new(&h);
    a.generalize_to_level(0, 1);
    let mut b = Cut::new(&h);
    b.generalize_to_level(2, 1);
    let root = Cut::root(&h);

    assert!(root <= a);
    assert!(a <= identity);
    assert!(root < identity);
    assert!(a.is_generalization_of(&identity));
    assert!(!identity.is_generalization_of(&a));
    assert_eq!(a.partial_cmp(&b), None);
    assert_eq!(a.partial_cmp(&a.clone()), Some(Ordering::Equal));
}

#[test]
fn uniform_levels() {
    let h = paper_hierarchy();
    assert_eq!(Cut::at_level(&h, 0), Cut::new(&h));
    assert_eq!(Cut::at_level(&h, 1).nodes(), [4, 5]);
    assert_eq!(Cut::root(&h).nodes(), [6]);
}
