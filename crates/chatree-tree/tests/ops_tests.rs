use chatree_tree::ops::{ancestors, find_path, insert_at, node_at, remove_at, replace_at, walk};
use chatree_tree::{LabelNode, NodeId, TreeError};

fn label(node: &LabelNode) -> &str {
    &node.payload.label
}

fn sample() -> LabelNode {
    LabelNode::labelled("")
        .with_child(LabelNode::labelled("a").with_child(LabelNode::labelled("c")))
        .with_child(
            LabelNode::labelled("b")
                .with_child(LabelNode::labelled("d").with_child(LabelNode::labelled("i")))
                .with_child(
                    LabelNode::labelled("e")
                        .with_child(LabelNode::labelled("g"))
                        .with_child(LabelNode::labelled("h")),
                )
                .with_child(LabelNode::labelled("f")),
        )
}

// ─── Addressing ──────────────────────────────────────────────────────────────

#[test]
fn test_walk_paths_rederive_same_nodes() {
    let tree = sample();
    let mut seen = 0;
    walk(&tree, |path, node| {
        let again = node_at(&tree, path).expect("walked path must resolve");
        assert_eq!(label(again), label(node));
        assert!(std::ptr::eq(again, node));
        seen += 1;
    });
    assert_eq!(seen, 10);
}

#[test]
fn test_find_path_is_preorder() {
    let tree = sample();
    assert_eq!(
        find_path(&tree, |n| label(n) == "h"),
        Some(NodeId::from_positions(&[1, 1, 1]))
    );
    assert_eq!(find_path(&tree, |n| label(n) == "zzz"), None);
}

#[test]
fn test_ancestors_chain() {
    let tree = sample();
    let chain = ancestors(&tree, &NodeId::from_positions(&[1, 0, 0])).unwrap();
    let labels: Vec<_> = chain.into_iter().map(label).collect();
    assert_eq!(labels, vec!["", "b", "d", "i"]);
    assert!(ancestors(&tree, &NodeId::from_positions(&[7])).is_none());
}

// ─── Copy-on-write insertion ─────────────────────────────────────────────────

#[test]
fn test_insert_shifts_later_siblings_only() {
    let tree = sample();
    let at = NodeId::from_positions(&[1, 1]);
    let next = insert_at(&tree, &at, LabelNode::labelled("new")).unwrap();

    assert_eq!(label(node_at(&next, &at).unwrap()), "new");
    assert_eq!(label(node_at(&next, &NodeId::from_positions(&[1, 0])).unwrap()), "d");
    assert_eq!(label(node_at(&next, &NodeId::from_positions(&[1, 2])).unwrap()), "e");
    assert_eq!(label(node_at(&next, &NodeId::from_positions(&[1, 3])).unwrap()), "f");
    assert_eq!(label(node_at(&next, &NodeId::from_positions(&[1, 2, 1])).unwrap()), "h");
    // Elsewhere untouched.
    assert_eq!(label(node_at(&next, &NodeId::from_positions(&[0, 0])).unwrap()), "c");
    // Old snapshot untouched.
    assert_eq!(label(node_at(&tree, &at).unwrap()), "e");
}

#[test]
fn test_insert_at_end_appends() {
    let tree = sample();
    let next = insert_at(&tree, &NodeId::from_positions(&[0, 1]), LabelNode::labelled("z")).unwrap();
    assert_eq!(next.children[0].children.len(), 2);
    assert_eq!(label(&next.children[0].children[1]), "z");
}

#[test]
fn test_insert_into_leaf() {
    let tree = sample();
    let next = insert_at(&tree, &NodeId::from_positions(&[1, 2, 0]), LabelNode::labelled("leafchild")).unwrap();
    assert_eq!(label(node_at(&next, &NodeId::from_positions(&[1, 2, 0])).unwrap()), "leafchild");
}

#[test]
fn test_insert_past_end_is_rejected() {
    let tree = sample();
    let err = insert_at(&tree, &NodeId::from_positions(&[0, 3]), LabelNode::labelled("x")).unwrap_err();
    assert_eq!(
        err,
        TreeError::PositionOutOfRange {
            path: NodeId::from_positions(&[0, 3]),
            position: 3,
            len: 1,
        }
    );
}

#[test]
fn test_replace_and_remove() {
    let tree = sample();
    let at = NodeId::from_positions(&[1, 0]);
    let replaced = replace_at(&tree, &at, LabelNode::labelled("D")).unwrap();
    assert_eq!(label(node_at(&replaced, &at).unwrap()), "D");
    assert!(node_at(&replaced, &NodeId::from_positions(&[1, 0, 0])).is_none());

    let (removed_tree, removed) = remove_at(&tree, &at).unwrap();
    assert_eq!(label(&removed), "d");
    assert_eq!(label(node_at(&removed_tree, &at).unwrap()), "e");
    assert!(replace_at(&tree, &NodeId::from_positions(&[9]), LabelNode::labelled("x")).is_err());
}
