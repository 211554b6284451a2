//! Runs sends against a [`CompletionClient`] and reports back over a channel.
//!
//! Each submission gets its own tokio task. The UI loop owns the receiving
//! end and folds [`SendEvent`]s into whichever chat started the send, looked
//! up by [`SubmissionId`].

use std::collections::HashMap;
use std::sync::Arc;

use chatree_llm::{ChatMessage, CompletionClient};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::form::SubmissionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendEvent {
    Delta { id: SubmissionId, text: String },
    Finished { id: SubmissionId, answer: String },
    Failed { id: SubmissionId, error: String },
}

impl SendEvent {
    pub fn id(&self) -> SubmissionId {
        match self {
            SendEvent::Delta { id, .. } | SendEvent::Finished { id, .. } | SendEvent::Failed { id, .. } => *id,
        }
    }

    /// Whether this is the last event of its send.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SendEvent::Delta { .. })
    }
}

pub struct Dispatcher {
    client: Arc<dyn CompletionClient>,
    model: String,
    events: mpsc::UnboundedSender<SendEvent>,
    in_flight: HashMap<SubmissionId, AbortHandle>,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<SendEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            client,
            model: model.into(),
            events,
            in_flight: HashMap::new(),
        };
        (dispatcher, rx)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Start a send. Must be called from within a tokio runtime.
    pub fn send(&mut self, id: SubmissionId, messages: Vec<ChatMessage>) {
        let client = Arc::clone(&self.client);
        let model = self.model.clone();
        let tx = self.events.clone();
        let turns = messages.len();

        let task = tokio::spawn(async move {
            let result = match client.create_completion(messages, &model).await {
                Ok(completion) => {
                    completion
                        .fold(|delta| {
                            let _ = tx.send(SendEvent::Delta {
                                id,
                                text: delta.to_string(),
                            });
                        })
                        .await
                }
                Err(e) => Err(e),
            };
            let event = match result {
                Ok(answer) => SendEvent::Finished { id, answer },
                Err(e) => {
                    tracing::warn!(error = %e, id = %id, "completion failed");
                    SendEvent::Failed {
                        id,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(event);
        });

        tracing::debug!(id = %id, turns, model = %self.model, "send started");
        self.in_flight.insert(id, task.abort_handle());
    }

    /// Abort a send. Events it queued before the abort may still be
    /// received; the chats ignore them once the id is no longer pending.
    pub fn cancel(&mut self, id: SubmissionId) -> bool {
        match self.in_flight.remove(&id) {
            Some(handle) => {
                handle.abort();
                tracing::info!(id = %id, "send cancelled");
                true
            }
            None => false,
        }
    }

    /// Forget a send whose terminal event was received.
    pub fn settle(&mut self, id: SubmissionId) {
        self.in_flight.remove(&id);
    }

    pub fn is_in_flight(&self, id: SubmissionId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
