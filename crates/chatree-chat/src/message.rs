use chatree_llm::ChatMessage;
use chatree_tree::TreeNode;
use serde::{Deserialize, Serialize};

use crate::form::ChatForm;

/// One completed conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub query: String,
    pub answer: String,
}

impl Exchange {
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
        }
    }

    /// The turn as a user message followed by an assistant message.
    pub fn to_messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage::user(self.query.clone()),
            ChatMessage::assistant(self.answer.clone()),
        ]
    }
}

/// Internal tag of a chat tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// Insertion affordance.
    Add,
    /// Inline input form in place of content.
    OpenChat(ChatForm),
}

/// A node of a branching conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTreeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Exchange>,

    /// Internal only.
    #[serde(skip)]
    pub state: Option<NodeState>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MessageTreeNode>,
}

impl MessageTreeNode {
    pub fn add_sentinel() -> Self {
        Self {
            state: Some(NodeState::Add),
            ..Default::default()
        }
    }

    pub fn open_chat() -> Self {
        Self {
            state: Some(NodeState::OpenChat(ChatForm::new())),
            ..Default::default()
        }
    }

    pub fn with_message(exchange: Exchange) -> Self {
        Self {
            message: Some(exchange),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: MessageTreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_add(&self) -> bool {
        matches!(self.state, Some(NodeState::Add))
    }

    pub fn form(&self) -> Option<&ChatForm> {
        match &self.state {
            Some(NodeState::OpenChat(form)) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut ChatForm> {
        match &mut self.state {
            Some(NodeState::OpenChat(form)) => Some(form),
            _ => None,
        }
    }

    /// Nodes that can be branched from: everything but sentinels and open
    /// forms.
    pub fn is_expandable(&self) -> bool {
        self.state.is_none()
    }
}

impl TreeNode for MessageTreeNode {
    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_not_serialized() {
        let node = MessageTreeNode::with_message(Exchange::new("q", "a"))
            .with_child(MessageTreeNode::add_sentinel());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["message"]["query"], "q");
        assert_eq!(json["children"][0], serde_json::json!({}));
    }

    #[test]
    fn test_deserialize_plain_tree() {
        let node: MessageTreeNode = serde_json::from_str(
            r#"{"children":[{"message":{"query":"hi","answer":"hello"}}]}"#,
        )
        .unwrap();
        assert!(node.message.is_none());
        assert_eq!(node.children[0].message, Some(Exchange::new("hi", "hello")));
        assert!(node.children[0].state.is_none());
    }
}
