//! Structural operations over any [`TreeNode`].
//!
//! Lookups borrow the tree. Mutations are copy-on-write: they return a new
//! root and leave the input untouched, so paths computed against the old
//! snapshot can never dangle into the new one.

use crate::error::{TreeError, TreeResult};
use crate::node::TreeNode;
use crate::path::NodeId;

/// The node at `path`, if it exists.
pub fn node_at<'a, N: TreeNode>(root: &'a N, path: &NodeId) -> Option<&'a N> {
    path.positions()
        .try_fold(root, |node, position| node.children().get(position))
}

pub fn node_at_mut<'a, N: TreeNode>(root: &'a mut N, path: &NodeId) -> Option<&'a mut N> {
    let mut node = root;
    for position in path.positions() {
        node = node.children_mut().get_mut(position)?;
    }
    Some(node)
}

/// Root-to-node chain, both ends included.
pub fn ancestors<'a, N: TreeNode>(root: &'a N, path: &NodeId) -> Option<Vec<&'a N>> {
    let mut chain = Vec::with_capacity(path.depth() + 1);
    let mut node = root;
    chain.push(node);
    for position in path.positions() {
        node = node.children().get(position)?;
        chain.push(node);
    }
    Some(chain)
}

/// Depth-first pre-order traversal, handing each node its freshly derived path.
pub fn walk<N: TreeNode>(root: &N, mut visit: impl FnMut(&NodeId, &N)) {
    fn go<N: TreeNode>(node: &N, path: NodeId, visit: &mut impl FnMut(&NodeId, &N)) {
        visit(&path, node);
        for (i, child) in node.children().iter().enumerate() {
            go(child, path.child(i), visit);
        }
    }
    go(root, NodeId::root(), &mut visit);
}

/// Path of the first node, in pre-order, matching `predicate`.
pub fn find_path<N: TreeNode>(root: &N, mut predicate: impl FnMut(&N) -> bool) -> Option<NodeId> {
    fn go<N: TreeNode>(
        node: &N,
        path: NodeId,
        predicate: &mut impl FnMut(&N) -> bool,
    ) -> Option<NodeId> {
        if predicate(node) {
            return Some(path);
        }
        node.children()
            .iter()
            .enumerate()
            .find_map(|(i, child)| go(child, path.child(i), predicate))
    }
    go(root, NodeId::root(), &mut predicate)
}

/// Number of nodes in the tree, root included.
pub fn count<N: TreeNode>(root: &N) -> usize {
    1 + root.children().iter().map(count).sum::<usize>()
}

/// Copy of `root` with `node` inserted at `path`.
///
/// The new node takes `path.position()`; former siblings at or after that
/// position move one to the right. A position equal to the sibling count
/// appends.
pub fn insert_at<N: TreeNode + Clone>(root: &N, path: &NodeId, node: N) -> TreeResult<N> {
    let (parent_path, position) = split(path)?;
    let mut next = root.clone();
    let parent = parent_mut(&mut next, &parent_path, path)?;
    let len = parent.children().len();
    if position > len {
        return Err(TreeError::PositionOutOfRange {
            path: path.clone(),
            position,
            len,
        });
    }
    parent.children_mut().insert(position, node);
    Ok(next)
}

/// Copy of `root` with the node at `path` replaced.
pub fn replace_at<N: TreeNode + Clone>(root: &N, path: &NodeId, node: N) -> TreeResult<N> {
    update_at(root, path, |slot| *slot = node)
}

/// Copy of `root` with `f` applied to the node at `path`.
pub fn update_at<N: TreeNode + Clone>(
    root: &N,
    path: &NodeId,
    f: impl FnOnce(&mut N),
) -> TreeResult<N> {
    let mut next = root.clone();
    let slot = existing_mut(&mut next, path)?;
    f(slot);
    Ok(next)
}

/// Copy of `root` without the node at `path`, plus the removed node.
pub fn remove_at<N: TreeNode + Clone>(root: &N, path: &NodeId) -> TreeResult<(N, N)> {
    let (parent_path, position) = split(path)?;
    let mut next = root.clone();
    let parent = parent_mut(&mut next, &parent_path, path)?;
    let len = parent.children().len();
    if position >= len {
        return Err(TreeError::PositionOutOfRange {
            path: path.clone(),
            position,
            len,
        });
    }
    let removed = parent.children_mut().remove(position);
    Ok((next, removed))
}

fn split(path: &NodeId) -> TreeResult<(NodeId, usize)> {
    match (path.parent(), path.position()) {
        (Some(parent), Some(position)) => Ok((parent, position)),
        _ => Err(TreeError::RootNotAddressable),
    }
}

fn parent_mut<'a, N: TreeNode>(
    root: &'a mut N,
    parent_path: &NodeId,
    path: &NodeId,
) -> TreeResult<&'a mut N> {
    let depth = depth_reached(root, parent_path);
    node_at_mut(root, parent_path).ok_or(TreeError::StalePath {
        path: path.clone(),
        depth,
    })
}

fn existing_mut<'a, N: TreeNode>(root: &'a mut N, path: &NodeId) -> TreeResult<&'a mut N> {
    let depth = depth_reached(root, path);
    node_at_mut(root, path).ok_or(TreeError::StalePath {
        path: path.clone(),
        depth,
    })
}

/// First depth at which `path` falls off the tree.
fn depth_reached<N: TreeNode>(root: &N, path: &NodeId) -> usize {
    let mut node = root;
    for (depth, position) in path.positions().enumerate() {
        match node.children().get(position) {
            Some(child) => node = child,
            None => return depth + 1,
        }
    }
    path.depth()
}
