//! Positional node addressing.
//!
//! A [`NodeId`] is the ordered list of child positions leading from the root
//! to a node. The empty path is the root itself; `[0]` is the root's first
//! child. Paths are only meaningful against the tree snapshot they were
//! computed from: inserting a sibling before a node shifts its position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step down the tree: an index into the parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Step {
    pub position: usize,
}

/// Location of a node, as the sequence of steps from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Vec<Step>);

impl NodeId {
    /// The root path (no steps).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_positions(positions: &[usize]) -> Self {
        Self(positions.iter().map(|&position| Step { position }).collect())
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().map(|step| step.position)
    }

    /// Number of steps; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the child at `position` below this node.
    pub fn child(&self, position: usize) -> Self {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(Step { position });
        Self(steps)
    }

    /// Path of the parent, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Position of this node among its siblings, or `None` for the root.
    pub fn position(&self) -> Option<usize> {
        self.0.last().map(|step| step.position)
    }

    /// Same parent, different position.
    pub fn sibling(&self, position: usize) -> Option<Self> {
        self.parent().map(|parent| parent.child(position))
    }

    /// True when this node lies on the route from the root to `reference`.
    pub fn is_descendant_or_self(&self, reference: &NodeId) -> bool {
        is_descendant_or_self(self, reference)
    }

    /// True when this path and `reference` address the same node.
    pub fn is_exact(&self, reference: &NodeId) -> bool {
        is_exact(self, reference)
    }
}

impl From<Vec<Step>> for NodeId {
    fn from(steps: Vec<Step>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for step in &self.0 {
            write!(f, "/{}", step.position)?;
        }
        Ok(())
    }
}

/// True iff `candidate` is a prefix of `reference`.
///
/// Every step of `candidate` must equal the step at the same index of
/// `reference`; a candidate longer than the reference never matches. The
/// root (empty path) is a prefix of every path. Despite the name, this asks
/// whether `candidate` is on the way down to `reference`: it is what makes a
/// node *partially* activated.
pub fn is_descendant_or_self(candidate: &NodeId, reference: &NodeId) -> bool {
    candidate.0.len() <= reference.0.len()
        && candidate
            .0
            .iter()
            .zip(&reference.0)
            .all(|(a, b)| a.position == b.position)
}

/// True iff both paths address the same node.
pub fn is_exact(candidate: &NodeId, reference: &NodeId) -> bool {
    candidate.0.len() == reference.0.len() && is_descendant_or_self(candidate, reference)
}
