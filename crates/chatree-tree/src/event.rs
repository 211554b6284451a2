use crate::node::TreeNode;
use crate::ops::node_at;
use crate::path::NodeId;

/// Interaction forwarded by the tree core to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeEvent {
    /// The node at this path was clicked or selected.
    Activate(NodeId),
    /// The caller is asked to insert a node at this path.
    Add(NodeId),
}

impl TreeEvent {
    pub fn path(&self) -> &NodeId {
        match self {
            TreeEvent::Activate(path) | TreeEvent::Add(path) => path,
        }
    }
}

/// Caller-side reactions to tree interaction. Both methods are optional.
///
/// The core never mutates the tree: `on_add` is where a caller builds a new
/// root and feeds it back in.
pub trait TreeHandler<N> {
    fn on_activate(&mut self, path: &NodeId, node: &N) {
        let _ = (path, node);
    }

    fn on_add(&mut self, path: &NodeId) {
        let _ = path;
    }
}

/// Resolve `event` against `root` and forward it to `handler`.
///
/// Returns `false` when an activation names a path that is not in `root`.
pub fn dispatch<N, H>(root: &N, event: &TreeEvent, handler: &mut H) -> bool
where
    N: TreeNode,
    H: TreeHandler<N> + ?Sized,
{
    match event {
        TreeEvent::Activate(path) => match node_at(root, path) {
            Some(node) => {
                handler.on_activate(path, node);
                true
            }
            None => {
                tracing::warn!(path = %path, "activation for a path outside the tree");
                false
            }
        },
        TreeEvent::Add(path) => {
            handler.on_add(path);
            true
        }
    }
}
