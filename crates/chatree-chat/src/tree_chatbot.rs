//! Branching conversation over the tree core.
//!
//! The chatbot owns a normalized [`MessageTreeNode`] root. Structural changes
//! (opening a form, inserting a branch, completing a send) go through the
//! copy-on-write helpers of `chatree_tree::ops` and are followed by a
//! normalization sweep; typing into a form edits it in place. Sends are
//! tracked by [`SubmissionId`], so a completion finds its node by a fresh
//! traversal even if sibling paths shifted while it was in flight.

use chatree_llm::ChatMessage;
use chatree_tree::ops::{ancestors, find_path, insert_at, node_at, node_at_mut, replace_at, update_at};
use chatree_tree::{NodeId, TreeEvent};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::form::{ChatForm, PendingSend, SubmissionId};
use crate::message::{Exchange, MessageTreeNode, NodeState};
use crate::normalize::{normalize, sweep};

/// What happens to a form whose send failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep the form open with the query back in its input.
    #[default]
    KeepForm,
    /// Turn the node back into an add-sentinel.
    RevertToSentinel,
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub failure_policy: FailurePolicy,
}

/// Outcome of activating a node that the caller may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    /// A sentinel turned into an open form at this path.
    OpenedForm(NodeId),
    /// A completed exchange was activated.
    Expand(Exchange),
}

/// A send started from a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    /// Where the form was when the send started.
    pub path: NodeId,
    /// Completed turns from the root down to the form's parent.
    pub history: Vec<Exchange>,
    pub query: String,
}

impl Submission {
    /// Linear message history for the completion request.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.history
            .iter()
            .flat_map(Exchange::to_messages)
            .chain(std::iter::once(ChatMessage::user(self.query.clone())))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TreeChatbot {
    root: MessageTreeNode,
    activated: Option<NodeId>,
    options: ChatOptions,
}

impl TreeChatbot {
    pub fn new(root: Option<MessageTreeNode>, options: ChatOptions) -> Self {
        Self {
            root: normalize(root),
            activated: None,
            options,
        }
    }

    /// Replace the conversation. Paths into the old root are dropped.
    pub fn set_root(&mut self, root: Option<MessageTreeNode>) {
        self.root = normalize(root);
        self.activated = None;
    }

    pub fn root(&self) -> &MessageTreeNode {
        &self.root
    }

    pub fn activated(&self) -> Option<&NodeId> {
        self.activated.as_ref()
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Highlight `path` without triggering its activation behaviour.
    pub fn select(&mut self, path: NodeId) {
        if node_at(&self.root, &path).is_some() {
            self.activated = Some(path);
        }
    }

    /// Activate the node at `path`: a sentinel opens a form, a message is
    /// reported for expansion.
    pub fn activate(&mut self, path: &NodeId) -> Result<Option<ChatAction>, ChatError> {
        let node = node_at(&self.root, path).ok_or_else(|| stale(path))?;
        self.activated = Some(path.clone());

        match &node.state {
            Some(NodeState::Add) => {
                self.root = update_at(&self.root, path, |node| {
                    node.state = Some(NodeState::OpenChat(ChatForm::new()));
                })?;
                sweep(&mut self.root);
                tracing::debug!(path = %path, "opened chat form");
                Ok(Some(ChatAction::OpenedForm(path.clone())))
            }
            Some(NodeState::OpenChat(_)) => Ok(None),
            None => Ok(node.message.clone().map(ChatAction::Expand)),
        }
    }

    /// Apply a click or keyboard event coming from the tree layout.
    pub fn handle(&mut self, event: &TreeEvent) -> Result<Option<ChatAction>, ChatError> {
        match event {
            TreeEvent::Activate(path) => self.activate(path),
            TreeEvent::Add(path) => {
                self.add_node(path)?;
                Ok(Some(ChatAction::OpenedForm(path.clone())))
            }
        }
    }

    /// Insert a fresh open form at `path`, shifting later siblings.
    ///
    /// The parent must be expandable: forms and sentinels take no children.
    pub fn add_node(&mut self, path: &NodeId) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            let node = node_at(&self.root, &parent).ok_or_else(|| stale(path))?;
            if !node.is_expandable() {
                return Err(ChatError::NotExpandable(parent));
            }
        }
        self.root = insert_at(&self.root, path, MessageTreeNode::open_chat())?;
        sweep(&mut self.root);
        self.activated = Some(path.clone());
        tracing::debug!(path = %path, "inserted chat form");
        Ok(())
    }

    pub fn form(&self, path: &NodeId) -> Option<&ChatForm> {
        node_at(&self.root, path).and_then(MessageTreeNode::form)
    }

    /// The open form at `path`, for typing.
    pub fn form_mut(&mut self, path: &NodeId) -> Option<&mut ChatForm> {
        node_at_mut(&mut self.root, path).and_then(MessageTreeNode::form_mut)
    }

    /// Close the form at `path`, turning it back into a sentinel.
    ///
    /// Returns the id of the send that was in flight from this form, which
    /// the caller should abort.
    pub fn cancel(&mut self, path: &NodeId) -> Result<Option<SubmissionId>, ChatError> {
        let form = self.form(path).ok_or_else(|| ChatError::NotAForm(path.clone()))?;
        let in_flight = form.pending().map(|p| p.id);
        self.root = update_at(&self.root, path, |node| node.state = Some(NodeState::Add))?;
        sweep(&mut self.root);
        if self.activated.as_ref().is_some_and(|a| path.is_descendant_or_self(a)) {
            self.activated = None;
        }
        tracing::debug!(path = %path, in_flight = in_flight.is_some(), "closed chat form");
        Ok(in_flight)
    }

    /// Latch the form at `path` and describe the send to start.
    pub fn submit(&mut self, path: &NodeId) -> Result<Submission, ChatError> {
        let form = self.form(path).ok_or_else(|| ChatError::NotAForm(path.clone()))?;
        if form.is_submitting() {
            return Err(ChatError::AlreadySubmitting(path.clone()));
        }
        let history = self.history(path)?;

        let pending = self
            .form_mut(path)
            .and_then(|form| form.begin(true))
            .ok_or(ChatError::EmptyInput)?;
        tracing::info!(path = %path, id = %pending.id, turns = history.len(), "submitting");
        Ok(Submission {
            id: pending.id,
            path: path.clone(),
            history,
            query: pending.query,
        })
    }

    /// Completed exchanges above `path`, root first.
    pub fn history(&self, path: &NodeId) -> Result<Vec<Exchange>, ChatError> {
        let chain = ancestors(&self.root, path).ok_or_else(|| stale(path))?;
        Ok(chain
            .iter()
            .take(chain.len().saturating_sub(1))
            .filter_map(|node| node.message.clone())
            .collect())
    }

    /// Current path of the form holding send `id`.
    pub fn find_submission(&self, id: SubmissionId) -> Option<NodeId> {
        find_path(&self.root, |node| {
            node.form()
                .and_then(ChatForm::pending)
                .is_some_and(|pending| pending.id == id)
        })
    }

    pub fn pending(&self, id: SubmissionId) -> Option<&PendingSend> {
        let path = self.find_submission(id)?;
        self.form(&path).and_then(ChatForm::pending)
    }

    /// Fold a streamed increment into the pending answer.
    pub fn apply_delta(&mut self, id: SubmissionId, delta: &str) -> bool {
        let Some(path) = self.find_submission(id) else {
            tracing::debug!(id = %id, "delta for a send that is no longer pending");
            return false;
        };
        match self.form_mut(&path).and_then(|form| form.pending_mut(id)) {
            Some(pending) => {
                pending.answer.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Replace the form holding send `id` with the completed exchange.
    pub fn complete(&mut self, id: SubmissionId, answer: String) -> Result<NodeId, ChatError> {
        let path = self
            .find_submission(id)
            .ok_or(ChatError::UnknownSubmission(id))?;
        let pending = self
            .form_mut(&path)
            .and_then(|form| form.release())
            .ok_or(ChatError::UnknownSubmission(id))?;

        let node = MessageTreeNode::with_message(Exchange {
            query: pending.query,
            answer,
        });
        let next = replace_at(&self.root, &path, node);
        debug_assert!(next.is_ok(), "path {path} came from a fresh traversal");
        self.root = next?;
        sweep(&mut self.root);
        tracing::info!(path = %path, id = %id, "send completed");
        Ok(path)
    }

    /// Release the latch of a failed send according to the failure policy.
    pub fn fail(&mut self, id: SubmissionId) -> Result<NodeId, ChatError> {
        let path = self
            .find_submission(id)
            .ok_or(ChatError::UnknownSubmission(id))?;
        match self.options.failure_policy {
            FailurePolicy::KeepForm => {
                if let Some(form) = self.form_mut(&path) {
                    form.restore();
                }
            }
            FailurePolicy::RevertToSentinel => {
                let next = update_at(&self.root, &path, |node| node.state = Some(NodeState::Add));
                debug_assert!(next.is_ok(), "path {path} came from a fresh traversal");
                self.root = next?;
                sweep(&mut self.root);
            }
        }
        tracing::warn!(path = %path, id = %id, policy = ?self.options.failure_policy, "send failed");
        Ok(path)
    }
}

fn stale(path: &NodeId) -> ChatError {
    ChatError::Tree(chatree_tree::TreeError::StalePath {
        path: path.clone(),
        depth: path.depth(),
    })
}
