use flexclock::clock::{CladeAssigner, CladeDeclaration, ClockError, FlexibleLocalClockBuilder, RegimeId, StrictClock};
use flexclock::model::{NodeId, RootedTree, TaxonSet, TimeTree};
use flexclock::newick::parse_str;

const FOUR_TAXA: &str = "((A:1,B:1):1,(C:1,D:1):1);";
const FIVE_TAXA: &str = "(((A:1,B:1):1,C:2):1,(D:1,E:1):2);";

/// Returns regime ids `1..=n` by registering `n` strict regimes on a throwaway builder.
fn regime_ids(n: usize) -> Vec<RegimeId> {
    let mut builder = FlexibleLocalClockBuilder::new(StrictClock::with_rate("background", 1.0).unwrap());
    (1..=n)
        .map(|i| builder.add_regime(StrictClock::with_rate(format!("clade {i}"), 1.0).unwrap()))
        .collect()
}

fn clade(labels: &[&str], include_stem: bool, regime: RegimeId) -> CladeDeclaration {
    CladeDeclaration::new(TaxonSet::new(labels.join(""), labels.iter().copied()), include_stem, regime)
}

fn node(tree: &TimeTree, label: &str) -> NodeId {
    tree.leaf_by_label(label).unwrap()
}

fn mrca(tree: &TimeTree, a: &str, b: &str) -> NodeId {
    tree.parent(node(tree, a)).filter(|&p| Some(p) == tree.parent(node(tree, b))).unwrap()
}

// --- STEM SEMANTICS ---
#[test]
fn test_include_stem() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(1);
    let assigner = CladeAssigner::new(vec![clade(&["A", "B"], true, ids[0])]);
    let assignment = assigner.assign(&tree, 2).unwrap();

    for n in [node(&tree, "A"), node(&tree, "B"), mrca(&tree, "A", "B")] {
        assert_eq!(assignment.regime_of(n), Some(ids[0]));
    }
    for n in [node(&tree, "C"), node(&tree, "D"), mrca(&tree, "C", "D")] {
        assert_eq!(assignment.regime_of(n), Some(RegimeId::BACKGROUND));
    }
}

#[test]
fn test_exclude_stem() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(1);
    let assigner = CladeAssigner::new(vec![clade(&["A", "B"], false, ids[0])]);
    let assignment = assigner.assign(&tree, 2).unwrap();

    assert_eq!(assignment.regime_of(mrca(&tree, "A", "B")), Some(RegimeId::BACKGROUND));
    assert_eq!(assignment.regime_of(node(&tree, "A")), Some(ids[0]));
    assert_eq!(assignment.regime_of(node(&tree, "B")), Some(ids[0]));
    assert_eq!(assignment.governed_count(ids[0]), 2);
    assert_eq!(assignment.governed_count(RegimeId::BACKGROUND), 4);
}

#[test]
fn test_exclude_stem_deep_clade() {
    let tree = parse_str(FIVE_TAXA).unwrap();
    let ids = regime_ids(1);
    let assigner = CladeAssigner::new(vec![clade(&["A", "B", "C"], false, ids[0])]);
    let assignment = assigner.assign(&tree, 2).unwrap();

    let abc = tree.parent(node(&tree, "C")).unwrap();
    assert_eq!(assignment.regime_of(abc), Some(RegimeId::BACKGROUND));
    // Children of the MRCA and everything below them
    for n in [node(&tree, "A"), node(&tree, "B"), node(&tree, "C"), mrca(&tree, "A", "B")] {
        assert_eq!(assignment.regime_of(n), Some(ids[0]));
    }
}

// --- SINGLE LEAF CLADES ---
#[test]
fn test_single_leaf_include_stem() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(1);
    let assigner = CladeAssigner::new(vec![clade(&["C"], true, ids[0])]);
    let assignment = assigner.assign(&tree, 2).unwrap();

    assert_eq!(assignment.governed(ids[0]), &[node(&tree, "C")]);
    assert_eq!(assignment.governed_count(RegimeId::BACKGROUND), 5);
}

#[test]
fn test_single_leaf_exclude_stem_governs_nothing() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(1);
    let assigner = CladeAssigner::new(vec![clade(&["C"], false, ids[0])]);
    let assignment = assigner.assign(&tree, 2).unwrap();

    assert_eq!(assignment.governed_count(ids[0]), 0);
    assert_eq!(assignment.regime_of(node(&tree, "C")), Some(RegimeId::BACKGROUND));
}

// --- CONFLICTS AND NESTING ---
#[test]
fn test_first_declaration_wins() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(2);
    let assigner = CladeAssigner::new(vec![clade(&["A", "B"], true, ids[0]), clade(&["B", "A"], true, ids[1])]);
    let assignment = assigner.assign(&tree, 3).unwrap();

    assert_eq!(assignment.governed_count(ids[0]), 3);
    assert_eq!(assignment.governed_count(ids[1]), 0);
}

#[test]
fn test_nested_clades() {
    let tree = parse_str(FIVE_TAXA).unwrap();
    let ids = regime_ids(2);
    let assigner = CladeAssigner::new(vec![
        clade(&["A", "B", "C"], true, ids[0]),
        clade(&["A", "B"], true, ids[1]),
    ]);
    let assignment = assigner.assign(&tree, 3).unwrap();

    let abc = tree.parent(node(&tree, "C")).unwrap();
    assert_eq!(assignment.regime_of(abc), Some(ids[0]));
    assert_eq!(assignment.regime_of(node(&tree, "C")), Some(ids[0]));
    for n in [node(&tree, "A"), node(&tree, "B"), mrca(&tree, "A", "B")] {
        assert_eq!(assignment.regime_of(n), Some(ids[1]));
    }
    for n in [node(&tree, "D"), node(&tree, "E"), mrca(&tree, "D", "E")] {
        assert_eq!(assignment.regime_of(n), Some(RegimeId::BACKGROUND));
    }
}

#[test]
fn test_outer_exclude_stem_overrides_inner_clade_root() {
    let tree = parse_str(FIVE_TAXA).unwrap();
    let ids = regime_ids(2);
    let assigner = CladeAssigner::new(vec![
        clade(&["A", "B", "C"], false, ids[0]),
        clade(&["A", "B"], true, ids[1]),
    ]);
    let assignment = assigner.assign(&tree, 3).unwrap();

    // The outer clade claims the MRCA of A and B after the inner clade did
    assert_eq!(assignment.regime_of(mrca(&tree, "A", "B")), Some(ids[0]));
    assert_eq!(assignment.regime_of(node(&tree, "A")), Some(ids[0]));
    assert_eq!(assignment.governed_count(ids[1]), 0);
}

#[test]
fn test_unmatched_clade_has_no_effect() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(2);
    let assigner = CladeAssigner::new(vec![clade(&["A", "C"], true, ids[0]), clade(&["X"], true, ids[1])]);
    let assignment = assigner.assign(&tree, 3).unwrap();

    assert_eq!(assignment.governed_count(RegimeId::BACKGROUND), 6);
    assert_eq!(assignment.governed_count(ids[0]), 0);
    assert_eq!(assignment.governed_count(ids[1]), 0);
}

#[test]
fn test_clade_on_all_taxa_is_not_matched_at_root() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(1);
    let assigner = CladeAssigner::new(vec![clade(&["A", "B", "C", "D"], false, ids[0])]);
    let assignment = assigner.assign(&tree, 2).unwrap();

    assert_eq!(assignment.governed_count(ids[0]), 0);
}

#[test]
fn test_several_clades_share_one_regime() {
    let tree = parse_str(FIVE_TAXA).unwrap();
    let ids = regime_ids(1);
    let assigner = CladeAssigner::new(vec![clade(&["A", "B"], true, ids[0]), clade(&["D", "E"], false, ids[0])]);
    let assignment = assigner.assign(&tree, 2).unwrap();

    let governed = assignment.governed(ids[0]);
    assert_eq!(governed.len(), 5);
    assert!(!governed.contains(&mrca(&tree, "D", "E")));
    assert_eq!(assignment.governed_count(RegimeId::BACKGROUND), 3);
}

// --- ROOT AND COVERAGE ---
#[test]
fn test_root_has_no_entry() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(1);
    let assignment = CladeAssigner::new(vec![clade(&["A", "B"], true, ids[0])]).assign(&tree, 2).unwrap();

    assert_eq!(assignment.get(tree.root()), None);
    assert_eq!(assignment.iter().count(), tree.node_count() - 1);
    assert_eq!(assignment.node_count(), tree.node_count());
    assert_eq!(assignment.num_regimes(), 2);
}

#[test]
fn test_unknown_regime_is_an_error() {
    let tree = parse_str(FOUR_TAXA).unwrap();
    let ids = regime_ids(2);
    let assigner = CladeAssigner::new(vec![clade(&["A", "B"], true, ids[0]), clade(&["C", "D"], true, ids[1])]);

    assert_eq!(assigner.assign(&tree, 2), Err(ClockError::UnknownRegime(ids[1])));
    assert!(assigner.assign(&tree, 3).is_ok());
}
