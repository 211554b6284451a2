use chatree_tree::class::{LAST_NODE, MANY_CHILDREN, NODE_ACTIVATED, NODE_EXACT};
use chatree_tree::{
    dispatch, Activation, LabelNode, NodeId, NodeRenderer, NodeView, PlainRenderer, Tree, TreeEvent,
    TreeHandler,
};

struct Labels {
    hide: Option<&'static str>,
}

impl NodeRenderer<LabelNode> for Labels {
    fn render(&self, _: &NodeId, node: &LabelNode, _: Activation) -> NodeView {
        if Some(node.payload.label.as_str()) == self.hide {
            return NodeView::Hidden;
        }
        NodeView::line(node.payload.label.clone())
    }

    fn class_name(&self, path: &NodeId, _: &LabelNode) -> String {
        format!("depth-{}", path.depth())
    }
}

/// Records activations the way a page would: the clicked path becomes the
/// activated path.
#[derive(Default)]
struct Selection {
    activated: Option<NodeId>,
    labels: Vec<String>,
    adds: Vec<NodeId>,
}

impl TreeHandler<LabelNode> for Selection {
    fn on_activate(&mut self, path: &NodeId, node: &LabelNode) {
        self.activated = Some(path.clone());
        self.labels.push(node.payload.label.clone());
    }

    fn on_add(&mut self, path: &NodeId) {
        self.adds.push(path.clone());
    }
}

fn two_leaves() -> LabelNode {
    LabelNode::default()
        .with_child(LabelNode::labelled("a"))
        .with_child(LabelNode::labelled("b"))
}

#[test]
fn test_click_sets_activation_states() {
    let root = two_leaves();
    let mut selection = Selection::default();

    let layout = Tree::new(&root, &Labels { hide: None }).layout(40);
    // Row 0 is the root, row 2 is "b".
    let event = layout.click(2).expect("row 2 exists");
    assert_eq!(event, TreeEvent::Activate(NodeId::from_positions(&[1])));
    assert!(dispatch(&root, &event, &mut selection));
    assert_eq!(selection.labels, vec!["b"]);

    let layout = Tree::new(&root, &Labels { hide: None })
        .activated(selection.activated.as_ref())
        .layout(40);
    let b = layout.row(&NodeId::from_positions(&[1])).unwrap();
    let a = layout.row(&NodeId::from_positions(&[0])).unwrap();
    assert_eq!(b.activation, Activation { partial: true, exact: true });
    assert_eq!(a.activation, Activation { partial: false, exact: false });
    assert!(b.classes.contains(NODE_EXACT));
    assert!(b.classes.contains(NODE_ACTIVATED));
    assert!(!a.classes.contains(NODE_ACTIVATED));
    // The root is on the route to every node.
    let root_row = layout.row(&NodeId::root()).unwrap();
    assert_eq!(root_row.activation, Activation { partial: true, exact: false });
}

#[test]
fn test_hidden_node_skips_subtree_and_fixes_guides() {
    let root = LabelNode::default()
        .with_child(LabelNode::labelled("a"))
        .with_child(LabelNode::labelled("skip").with_child(LabelNode::labelled("under")));
    let layout = Tree::new(&root, &Labels { hide: Some("skip") })
        .show_root(false)
        .layout(40);
    let text: Vec<String> = layout
        .lines()
        .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
        .collect();
    assert_eq!(text, vec!["└── a"]);
    let a = &layout.rows()[0];
    assert!(a.decor.last_child);
    assert!(a.classes.contains(LAST_NODE));
}

#[test]
fn test_decor_and_caller_classes() {
    let root = two_leaves();
    let layout = Tree::new(&root, &Labels { hide: None }).layout(40);
    let root_row = &layout.rows()[0];
    assert!(root_row.decor.many_children);
    assert!(root_row.classes.contains(MANY_CHILDREN));
    assert!(root_row.classes.contains("depth-0"));
    assert!(layout.rows()[1].decor.first_child);
    assert!(layout.rows()[2].classes.contains("depth-1"));
}

#[test]
fn test_plain_renderer_draws_empty_rows() {
    let root = two_leaves();
    let layout = Tree::new(&root, &PlainRenderer).layout(40);
    assert_eq!(layout.len(), 3);
    assert_eq!(layout.height(), 3);
}

#[test]
fn test_keyboard_traversal_order() {
    let root = LabelNode::default()
        .with_child(LabelNode::labelled("a").with_child(LabelNode::labelled("c")))
        .with_child(LabelNode::labelled("b"));
    let layout = Tree::new(&root, &Labels { hide: None }).show_root(false).layout(40);
    let first = layout.next_path(None).unwrap();
    assert_eq!(first, NodeId::from_positions(&[0]));
    let second = layout.next_path(Some(&first)).unwrap();
    assert_eq!(second, NodeId::from_positions(&[0, 0]));
    let third = layout.next_path(Some(&second)).unwrap();
    assert_eq!(third, NodeId::from_positions(&[1]));
    assert_eq!(layout.next_path(Some(&third)), Some(third.clone()));
    assert_eq!(layout.prev_path(Some(&second)), Some(first));
}

#[test]
fn test_add_event_is_forwarded() {
    let root = two_leaves();
    let mut selection = Selection::default();
    let add = TreeEvent::Add(NodeId::from_positions(&[1]));
    assert!(dispatch(&root, &add, &mut selection));
    assert_eq!(selection.adds, vec![NodeId::from_positions(&[1])]);
    assert!(!dispatch(&root, &TreeEvent::Activate(NodeId::from_positions(&[4])), &mut selection));
}
