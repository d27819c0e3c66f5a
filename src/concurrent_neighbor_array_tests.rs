use super::*;

#[test]
fn duplicate_pair_is_rejected() {
    let mut arr = ConcurrentNeighborArray::new(4, true);
    assert!(arr.insert_sorted(10, 0.9));
    assert!(!arr.insert_sorted(10, 0.9));
    assert_eq!(arr.size(), 1);
}

#[test]
fn same_node_different_score_both_kept() {
    // Not expected in practice (a node has one score per base), but the
    // duplicate rule is keyed on the full pair, not the node id alone.
    let mut arr = ConcurrentNeighborArray::new(4, true);
    assert!(arr.insert_sorted(10, 0.9));
    assert!(arr.insert_sorted(10, 0.5));
    assert_eq!(arr.size(), 2);
}

#[test]
fn different_nodes_equal_score_coexist() {
    let mut arr = ConcurrentNeighborArray::new(4, true);
    assert!(arr.insert_sorted(10, 0.8));
    assert!(arr.insert_sorted(20, 0.8));
    assert_eq!(arr.size(), 2);
    assert!(arr.contains_node(10));
    assert!(arr.contains_node(20));
}

#[test]
fn copy_is_independent() {
    let mut arr = ConcurrentNeighborArray::new(4, true);
    arr.insert_sorted(10, 0.9);
    let mut copy = arr.copy();
    copy.insert_sorted(20, 0.8);
    assert_eq!(arr.size(), 1);
    assert_eq!(copy.size(), 2);
}

#[test]
fn remove_then_reinsert_same_pair_succeeds() {
    let mut arr = ConcurrentNeighborArray::new(4, true);
    arr.insert_sorted(10, 0.9);
    arr.remove_index(0);
    assert!(arr.insert_sorted(10, 0.9));
    assert_eq!(arr.size(), 1);
}
