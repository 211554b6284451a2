use crate::path::{is_descendant_or_self, is_exact, NodeId};

/// Activation of a single node relative to the currently activated path.
///
/// Derived on every render; never stored on nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activation {
    /// The node lies on the route from the root to the activated node.
    pub partial: bool,
    /// The node is the activated node.
    pub exact: bool,
}

impl Activation {
    pub fn of(node: &NodeId, activated: Option<&NodeId>) -> Self {
        match activated {
            Some(activated) => Self {
                partial: is_descendant_or_self(node, activated),
                exact: is_exact(node, activated),
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_activated_path() {
        let a = Activation::of(&NodeId::from_positions(&[0]), None);
        assert_eq!(a, Activation::default());
    }

    #[test]
    fn test_ancestor_is_partial_only() {
        let activated = NodeId::from_positions(&[1, 0]);
        let a = Activation::of(&NodeId::from_positions(&[1]), Some(&activated));
        assert!(a.partial);
        assert!(!a.exact);
    }
}
