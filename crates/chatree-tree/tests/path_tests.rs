use chatree_tree::{is_descendant_or_self, is_exact, NodeId};

fn all_paths(max_depth: usize, width: usize) -> Vec<NodeId> {
    let mut out = vec![NodeId::root()];
    let mut frontier = vec![NodeId::root()];
    for _ in 0..max_depth {
        let mut next = Vec::new();
        for path in &frontier {
            for i in 0..width {
                next.push(path.child(i));
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

#[test]
fn test_exact_implies_prefix() {
    let paths = all_paths(3, 3);
    for a in &paths {
        for b in &paths {
            if is_exact(a, b) {
                assert!(is_descendant_or_self(a, b), "{a} exact {b} but not prefix");
            }
        }
    }
}

#[test]
fn test_prefix_implies_exact_only_at_equal_length() {
    let paths = all_paths(3, 3);
    for a in &paths {
        for b in &paths {
            if is_descendant_or_self(a, b) {
                assert_eq!(is_exact(a, b), a.depth() == b.depth(), "{a} vs {b}");
            }
        }
    }
}

#[test]
fn test_structural_equality() {
    let a = NodeId::root().child(1).child(0);
    let b = NodeId::from_positions(&[1, 0]);
    assert_eq!(a, b);
    assert!(is_exact(&a, &b));
}

#[test]
fn test_divergent_paths() {
    let a = NodeId::from_positions(&[0, 2]);
    let b = NodeId::from_positions(&[0, 1, 4]);
    assert!(!is_descendant_or_self(&a, &b));
    assert!(!is_descendant_or_self(&b, &a));
}
