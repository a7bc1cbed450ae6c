use flexclock::model::{Height, LeafLabelMap, RootedTree, TimeTree, post_order, pre_order};

/// Builds `((A:1,B:1):1.5,C:2.5);`
fn three_leaf_tree() -> TimeTree {
    let mut tree = TimeTree::new(3);
    let a = tree.add_leaf(Height::ZERO, "A");
    let b = tree.add_leaf(Height::ZERO, "B");
    let c = tree.add_leaf(Height::ZERO, "C");
    let ab = tree.add_internal_vertex([a, b], Height::new(1.0));
    tree.add_root([ab, c], Height::new(2.5));
    tree
}

#[test]
fn test_building_tree() {
    let mut tree = TimeTree::new(3);
    let index_l1 = tree.add_leaf(Height::ZERO, "Kea");
    let index_l2 = tree.add_leaf(Height::ZERO, "Kaka");
    let index_l3 = tree.add_leaf(Height::new(0.5), "Kakapo");
    let index_i1 = tree.add_internal_vertex([index_l1, index_l2], Height::new(1.0));
    let index_root = tree.add_root([index_l3, index_i1], Height::new(2.5));

    assert!(tree.is_valid());

    // Counts
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 1);
    assert_eq!(tree.num_vertices(), 5);
    assert_eq!(tree.node_count(), 5);

    // Root
    assert_eq!(tree.root(), index_root);
    assert!(tree.root_vertex().is_root());
    assert_eq!(tree.parent(index_root), None);
    assert_eq!(tree.branch_length(index_root), 0.0);

    // Leaf
    let l2 = &tree[index_l2];
    assert!(l2.is_leaf());
    assert_eq!(l2.index(), index_l2);
    assert_eq!(l2.label_index(), Some(1));
    assert_eq!(tree.label(index_l2), Some("Kaka"));
    assert_eq!(tree.branch_length(index_l2), 1.0);
    assert_eq!(tree.branch_length(index_l3), 2.0);

    // Internal
    assert!(tree[index_i1].is_internal());
    assert_eq!(tree.children(index_i1), &[index_l1, index_l2]);
    assert_eq!(tree.label(index_i1), None);
    assert_eq!(tree.branch_length(index_i1), 1.5);
    assert_eq!(tree.total_branch_length(), 1.0 + 1.0 + 2.0 + 1.5);
}

#[test]
fn test_invalid_when_child_above_parent() {
    let mut tree = TimeTree::new(2);
    let a = tree.add_leaf(Height::new(3.0), "A");
    let b = tree.add_leaf(Height::ZERO, "B");
    tree.add_root([a, b], Height::new(1.0));
    assert!(!tree.is_valid());
}

#[test]
fn test_invalid_without_root() {
    let mut tree = TimeTree::new(2);
    tree.add_leaf(Height::ZERO, "A");
    tree.add_leaf(Height::ZERO, "B");
    assert!(!tree.is_root_set());
    assert!(!tree.is_valid());
}

#[test]
#[should_panic]
fn test_get_root_panics_on_empty_tree() {
    let tree = TimeTree::new(2);
    tree.root_vertex(); // Should panic
}

#[test]
#[should_panic]
fn test_get_vertex_out_of_bounds() {
    let tree = TimeTree::new(2);
    let _ = &tree[55];
}

#[test]
fn test_leaf_by_label() {
    let tree = three_leaf_tree();
    assert_eq!(tree.leaf_by_label("B"), Some(1));
    assert_eq!(tree.leaf_by_label("Moa"), None);
}

// ============= Traversals =============

#[test]
fn test_post_order_visits_children_first() {
    let tree = three_leaf_tree();
    let order: Vec<_> = post_order(&tree).collect();
    assert_eq!(order, vec![0, 1, 3, 2, 4]);
    assert_eq!(tree.post_order_iter().collect::<Vec<_>>(), order);
}

#[test]
fn test_pre_order_visits_parents_first() {
    let tree = three_leaf_tree();
    let order: Vec<_> = pre_order(&tree).collect();
    assert_eq!(order, vec![4, 3, 0, 1, 2]);
    assert_eq!(tree.pre_order_iter().collect::<Vec<_>>(), order);
}

// ============= Perturbations =============

#[test]
fn test_set_height_changes_branch_lengths() {
    let mut tree = three_leaf_tree();
    tree.set_height(3, Height::new(2.0));
    assert_eq!(tree.branch_length(0), 2.0);
    assert_eq!(tree.branch_length(3), 0.5);
    assert!(tree.is_valid());
}

#[test]
#[should_panic]
fn test_set_height_above_parent() {
    let mut tree = three_leaf_tree();
    tree.set_height(3, Height::new(3.0));
}

#[test]
fn test_exchange_subtrees() {
    // ((A:1,B:1):1,(C:0.5,D:0.5):1.5);
    let mut tree = TimeTree::new(4);
    let a = tree.add_leaf(Height::ZERO, "A");
    let b = tree.add_leaf(Height::ZERO, "B");
    let ab = tree.add_internal_vertex([a, b], Height::new(1.0));
    let c = tree.add_leaf(Height::ZERO, "C");
    let d = tree.add_leaf(Height::ZERO, "D");
    let cd = tree.add_internal_vertex([c, d], Height::new(0.5));
    let root = tree.add_root([ab, cd], Height::new(2.0));

    tree.exchange_subtrees(b, c);

    assert!(tree.is_valid());
    assert_eq!(tree.parent(b), Some(cd));
    assert_eq!(tree.parent(c), Some(ab));
    assert_eq!(tree.children(ab), &[a, c]);
    assert_eq!(tree.children(cd), &[b, d]);
    assert!(tree.is_ancestor(root, b));
    assert!(!tree.is_ancestor(ab, b));
    assert_eq!(tree.node_count(), 7);
}

#[test]
#[should_panic]
fn test_exchange_siblings_panics() {
    let mut tree = three_leaf_tree();
    tree.exchange_subtrees(0, 1);
}

// ============= LeafLabelMap Tests =============

#[test]
fn test_get_or_insert_new_label() {
    let mut map = LeafLabelMap::new(5);
    let index_wrybill = map.get_or_insert("Anarhynchus frontalis");
    assert_eq!(index_wrybill, 0);
    assert!(map.contains_label("Anarhynchus frontalis"));
}

#[test]
fn test_get_or_insert_returns_same_index_for_duplicate() {
    let mut map = LeafLabelMap::new(5);
    let index_kakapo = map.get_or_insert("Strigops habroptilus");
    let index_kea = map.get_or_insert("Nestor notabilis");
    let index_kaka = map.get_or_insert("Nestor meridionalis");
    let index_popoka = map.get_or_insert("Strigops habroptilus");

    assert_eq!(index_kakapo, index_popoka);
    assert_ne!(index_kakapo, index_kea);
    assert_ne!(index_kakapo, index_kaka);
    assert_eq!(map.num_labels(), 3);
}

#[test]
fn test_get_label_returns_none_for_invalid_index() {
    let map = LeafLabelMap::new(5);
    assert_eq!(map.get_label(0), None);
}
