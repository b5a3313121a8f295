use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::{paper_database, paper_hierarchy};
use crate::synthetic::{balanced_rows, random_database};
use crate::{Cut, Hierarchy, KmAnonymity, KmConfig, KmError, Parallelism, Strategy};

const STRATEGIES: [Strategy; 3] = [Strategy::Direct, Strategy::Apriori, Strategy::Optimal];

#[test]
fn k_and_m_must_be_positive() {
    let h = paper_hierarchy();
    let db = paper_database();
    assert!(matches!(
        KmAnonymity::new(0, 2, &h, &db),
        Err(KmError::InvalidArgument { name: "k", .. })
    ));
    assert!(matches!(
        KmAnonymity::new(2, 0, &h, &db),
        Err(KmError::InvalidArgument { name: "m", .. })
    ));
}

#[test]
fn non_leaf_items_are_rejected() {
    let h = paper_hierarchy();
    let db = vec![vec![0, 1], vec![4]];
    let err = KmAnonymity::new(2, 2, &h, &db).unwrap_err();
    assert_eq!(err, KmError::UnknownItem("#4".to_owned()));
}

#[test]
fn already_anonymous_database_is_left_alone() {
    let h = paper_hierarchy();
    let db = paper_database();
    let engine = KmAnonymity::new(1, 2, &h, &db).unwrap();
    assert_eq!(engine.optimal().cut(), &Cut::new(&h));
    assert_eq!(engine.apriori().cut(), &Cut::new(&h));
    assert_eq!(engine.optimal().information_loss(), 0.0);
    // Direct never keeps the leaves.
    assert_eq!(engine.direct().cut(), &Cut::at_level(&h, 1));
}

#[test]
fn infeasible_k_falls_back_to_root() {
    let h = paper_hierarchy();
    let db = paper_database();
    let engine = KmAnonymity::new(5, 2, &h, &db).unwrap();
    for strategy in STRATEGIES {
        let result = engine.anonymize(strategy);
        assert_eq!(result.cut(), &Cut::root(&h), "{strategy:?}");
        assert!((result.information_loss() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn m_one_only_needs_frequent_items() {
    let h = paper_hierarchy();
    let db = paper_database();
    let engine = KmAnonymity::new(2, 1, &h, &db).unwrap();
    // Every single item already occurs at least twice.
    assert_eq!(engine.optimal().cut(), &Cut::new(&h));
    assert_eq!(engine.apriori().cut(), &Cut::new(&h));
}

fn balanced_fixture(seed: u64) -> (Hierarchy, crate::Database) {
    let (_, h) = Hierarchy::from_rows(balanced_rows(&[2, 2, 2])).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let db = random_database(&mut rng, &h, 80, 4);
    (h, db)
}

#[test]
fn parallelism_does_not_change_results() {
    let (h, db) = balanced_fixture(21);
    let config = KmConfig::new(4, 2).unwrap();
    let sequential =
        KmAnonymity::with_config(config.with_parallelism(Parallelism::Sequential), &h, &db).unwrap();
    let parallel =
        KmAnonymity::with_config(config.with_parallelism(Parallelism::Rayon), &h, &db).unwrap();
    for strategy in STRATEGIES {
        let a = sequential.anonymize(strategy);
        let b = parallel.anonymize(strategy);
        assert_eq!(a.cut(), b.cut(), "{strategy:?}");
        assert_eq!(a.examined(), b.examined(), "{strategy:?}");
    }
}

#[test]
fn results_are_km_anonymous_on_random_data() {
    for seed in 30..36 {
        let (h, db) = balanced_fixture(seed);
        let engine = KmAnonymity::new(5, 2, &h, &db).unwrap();
        let optimal = engine.optimal();
        for strategy in STRATEGIES {
            let result = engine.anonymize(strategy);
            assert!(engine.is_km_anonymous(result.cut()), "seed={seed} {strategy:?}");
            assert!(optimal.information_loss() <= result.information_loss());
        }
    }
}

#[test]
fn direct_examines_at_most_one_cut_per_level() {
    let (h, db) = balanced_fixture(40);
    let engine = KmAnonymity::new(10, 3, &h, &db).unwrap();
    assert!(engine.direct().examined() < h.height());
}

#[test]
fn config_accessors() {
    let config = KmConfig::new(3, 2).unwrap();
    assert_eq!(config.k(), 3);
    assert_eq!(config.m(), 2);
    assert_eq!(config.parallelism(), Parallelism::Rayon);
    let h = paper_hierarchy();
    let db = paper_database();
    let engine = KmAnonymity::with_config(config, &h, &db).unwrap();
    assert_eq!(engine.k(), 3);
    assert_eq!(engine.m(), 2);
    assert_eq!(engine.database().len(), 4);
    assert_eq!(engine.hierarchy().height(), 3);
}
