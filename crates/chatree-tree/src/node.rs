use serde::{Deserialize, Serialize};

/// A recursive node shape.
///
/// The tree core is generic over anything that can expose its ordered
/// children; domain payload lives on the implementor. The order of
/// `children()` defines positional addressing.
pub trait TreeNode: Sized {
    fn children(&self) -> &[Self];

    fn children_mut(&mut self) -> &mut Vec<Self>;

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// A plain node carrying an arbitrary payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<P> {
    #[serde(flatten)]
    pub payload: P,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node<P>>,
}

impl<P> Node<P> {
    pub fn new(payload: P) -> Self {
        Self {
            payload,
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Node<P>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node<P>>) -> Self {
        self.children.extend(children);
        self
    }
}

impl<P> TreeNode for Node<P> {
    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

/// Payload of a labelled node, as used by simple tree views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub label: String,
}

pub type LabelNode = Node<Label>;

impl LabelNode {
    pub fn labelled(label: impl Into<String>) -> Self {
        Node::new(Label {
            label: label.into(),
        })
    }
}
