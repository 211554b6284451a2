//! Insertion-affordance normalization for chat trees.

use crate::message::MessageTreeNode;

/// Ensure every expandable node carries exactly one add-sentinel, as its
/// last child.
///
/// A missing root becomes an empty root. A root carrying an exchange is
/// wrapped as the only child of an empty root, so the exchange is drawn like
/// any other turn. Existing sentinels are dropped and a fresh one appended,
/// so running this on a normalized tree yields the same structure. Open
/// forms and sentinels are not expandable and are left as they are.
pub fn normalize(root: Option<MessageTreeNode>) -> MessageTreeNode {
    let mut root = match root {
        Some(root) if root.message.is_some() => MessageTreeNode::default().with_child(root),
        root => root.unwrap_or_default(),
    };
    sweep(&mut root);
    root
}

pub(crate) fn sweep(node: &mut MessageTreeNode) {
    if !node.is_expandable() {
        return;
    }
    node.children.retain(|child| !child.is_add());
    for child in &mut node.children {
        sweep(child);
    }
    node.children.push(MessageTreeNode::add_sentinel());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Exchange;

    #[test]
    fn test_empty_root_gets_one_sentinel() {
        let root = normalize(None);
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].is_add());
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn test_duplicate_sentinels_collapse() {
        let root = MessageTreeNode::default()
            .with_child(MessageTreeNode::add_sentinel())
            .with_child(MessageTreeNode::with_message(Exchange::new("q", "a")))
            .with_child(MessageTreeNode::add_sentinel());
        let root = normalize(Some(root));
        assert_eq!(root.children.len(), 2);
        assert!(root.children[0].message.is_some());
        assert!(root.children[1].is_add());
        assert!(root.children[0].children[0].is_add());
    }

    #[test]
    fn test_root_with_exchange_is_wrapped() {
        let root = normalize(Some(MessageTreeNode::with_message(Exchange::new("q", "a"))));
        assert!(root.message.is_none());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].message, Some(Exchange::new("q", "a")));
        assert!(root.children[0].children[0].is_add());
        assert!(root.children[1].is_add());
        assert_eq!(normalize(Some(root.clone())), root);
    }

    #[test]
    fn test_open_form_gets_no_sentinel() {
        let root = MessageTreeNode::default().with_child(MessageTreeNode::open_chat());
        let root = normalize(Some(root));
        assert!(root.children[0].children.is_empty());
        assert!(root.children[1].is_add());
    }
}
