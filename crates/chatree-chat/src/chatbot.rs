//! Linear chat: a flat message log with one input form.

use chatree_llm::ChatMessage;
use chatree_tree::NodeId;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::form::{ChatForm, PendingSend, SubmissionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Ai,
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotMessage {
    pub speaker: Speaker,
    pub content: String,
}

impl ChatbotMessage {
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Human,
            content: content.into(),
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        match self.speaker {
            Speaker::Ai => ChatMessage::assistant(self.content.clone()),
            Speaker::Human => ChatMessage::user(self.content.clone()),
        }
    }
}

/// A send started from a linear chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub id: SubmissionId,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Default)]
pub struct Chatbot {
    messages: Vec<ChatbotMessage>,
    form: ChatForm,
}

impl Chatbot {
    pub fn new(messages: Vec<ChatbotMessage>) -> Self {
        Self {
            messages,
            form: ChatForm::new(),
        }
    }

    pub fn messages(&self) -> &[ChatbotMessage] {
        &self.messages
    }

    pub fn form(&self) -> &ChatForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ChatForm {
        &mut self.form
    }

    /// Post the input as a human message and latch the form.
    pub fn submit(&mut self) -> Result<Outgoing, ChatError> {
        if self.form.is_submitting() {
            return Err(ChatError::AlreadySubmitting(NodeId::root()));
        }
        let pending = self.form.begin(true).ok_or(ChatError::EmptyInput)?;
        self.messages.push(ChatbotMessage::human(pending.query));
        tracing::info!(id = %pending.id, turns = self.messages.len(), "submitting");
        Ok(Outgoing {
            id: pending.id,
            messages: self.messages.iter().map(ChatbotMessage::to_message).collect(),
        })
    }

    /// Reply streamed so far for the send in flight.
    pub fn pending_answer(&self) -> Option<&PendingSend> {
        self.form.pending()
    }

    pub fn apply_delta(&mut self, id: SubmissionId, delta: &str) -> bool {
        match self.form.pending_mut(id) {
            Some(pending) => {
                pending.answer.push_str(delta);
                true
            }
            None => false,
        }
    }

    pub fn complete(&mut self, id: SubmissionId, answer: String) -> Result<(), ChatError> {
        self.take(id)?;
        self.messages.push(ChatbotMessage::ai(answer));
        Ok(())
    }

    /// Withdraw the human message and put it back into the input.
    pub fn fail(&mut self, id: SubmissionId) -> Result<(), ChatError> {
        self.take(id)?;
        if self.messages.last().is_some_and(|m| m.speaker == Speaker::Human) {
            if let Some(message) = self.messages.pop() {
                self.form = ChatForm::with_input(message.content);
            }
        }
        tracing::warn!(id = %id, "send failed");
        Ok(())
    }

    fn take(&mut self, id: SubmissionId) -> Result<PendingSend, ChatError> {
        if self.form.pending().map(|pending| pending.id) != Some(id) {
            return Err(ChatError::UnknownSubmission(id));
        }
        self.form.release().ok_or(ChatError::UnknownSubmission(id))
    }
}
