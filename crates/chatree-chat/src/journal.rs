//! Paginated journal: one chat per dated entry.

use chatree_llm::ChatMessage;
use chatree_tree::NodeId;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::chatbot::{ChatbotMessage, Speaker};
use crate::error::ChatError;
use crate::form::{ChatForm, PendingSend, SubmissionId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub messages: Vec<ChatbotMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl JournalEntry {
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            messages: Vec::new(),
            date: Some(date),
        }
    }

    /// `MM/DD/YYYY`, when the entry is dated.
    pub fn date_label(&self) -> Option<String> {
        self.date.map(|date| date.format("%m/%d/%Y").to_string())
    }
}

/// A send started from a journal page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSubmission {
    pub id: SubmissionId,
    pub entry_index: usize,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct JournalChatbot {
    entries: Vec<JournalEntry>,
    current: usize,
    form: ChatForm,
    today: NaiveDate,
    /// Entry the in-flight send belongs to.
    target: Option<usize>,
}

impl JournalChatbot {
    pub fn new(entries: Vec<JournalEntry>) -> Self {
        Self::with_today(entries, Local::now().date_naive())
    }

    /// Like [`JournalChatbot::new`] with a fixed date for blank pages.
    pub fn with_today(entries: Vec<JournalEntry>, today: NaiveDate) -> Self {
        let mut journal = Self {
            entries,
            current: 0,
            form: ChatForm::new(),
            today,
            target: None,
        };
        journal.ensure_blank_page();
        journal.current = journal.entries.len() - 1;
        journal
    }

    /// Append a blank page unless the last entry already is one.
    fn ensure_blank_page(&mut self) {
        if !self.entries.last().is_some_and(|entry| entry.messages.is_empty()) {
            self.entries.push(JournalEntry::blank(self.today));
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &JournalEntry {
        &self.entries[self.current]
    }

    /// Replace the entries, keeping the page index where possible.
    pub fn set_entries(&mut self, entries: Vec<JournalEntry>) {
        self.entries = entries;
        self.ensure_blank_page();
        self.current = self.current.min(self.entries.len() - 1);
        if self.target.is_some_and(|target| target >= self.entries.len()) {
            self.target = None;
        }
    }

    pub fn next_page(&mut self) {
        self.current = if self.current + 1 >= self.entries.len() {
            0
        } else {
            self.current + 1
        };
    }

    pub fn previous_page(&mut self) {
        self.current = match self.current {
            0 => self.entries.len() - 1,
            n => n - 1,
        };
    }

    pub fn form(&self) -> &ChatForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ChatForm {
        &mut self.form
    }

    /// The streaming reply, if it belongs to entry `index`.
    pub fn pending_for(&self, index: usize) -> Option<&PendingSend> {
        self.form.pending().filter(|_| self.target == Some(index))
    }

    /// Post the input to the current page and latch the form.
    pub fn submit(&mut self) -> Result<JournalSubmission, ChatError> {
        if self.form.is_submitting() {
            return Err(ChatError::AlreadySubmitting(NodeId::root()));
        }
        let pending = self.form.begin(true).ok_or(ChatError::EmptyInput)?;
        let entry_index = self.current;
        let entry = &mut self.entries[entry_index];
        entry.messages.push(ChatbotMessage::human(pending.query));
        let messages = entry.messages.iter().map(ChatbotMessage::to_message).collect();
        self.target = Some(entry_index);
        self.ensure_blank_page();
        tracing::info!(id = %pending.id, entry = entry_index, "journal submit");
        Ok(JournalSubmission {
            id: pending.id,
            entry_index,
            messages,
        })
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

    /// Append the reply to the entry the send started from.
    pub fn complete(&mut self, id: SubmissionId, answer: String) -> Result<usize, ChatError> {
        let index = self.take(id)?;
        self.entries[index].messages.push(ChatbotMessage::ai(answer));
        self.ensure_blank_page();
        Ok(index)
    }

    pub fn fail(&mut self, id: SubmissionId) -> Result<usize, ChatError> {
        let index = self.take(id)?;
        let messages = &mut self.entries[index].messages;
        if messages.last().is_some_and(|m| m.speaker == Speaker::Human) {
            if let Some(message) = messages.pop() {
                self.form = ChatForm::with_input(message.content);
            }
        }
        // A page emptied by the failure makes the trailing blank page redundant.
        if self.entries[index].messages.is_empty() && index + 2 == self.entries.len() {
            self.entries.pop();
            self.current = self.current.min(index);
        }
        tracing::warn!(id = %id, entry = index, "journal send failed");
        Ok(index)
    }

    fn take(&mut self, id: SubmissionId) -> Result<usize, ChatError> {
        if self.form.pending().map(|pending| pending.id) != Some(id) {
            return Err(ChatError::UnknownSubmission(id));
        }
        self.form.release();
        self.target.take().ok_or(ChatError::UnknownSubmission(id))
    }
}
