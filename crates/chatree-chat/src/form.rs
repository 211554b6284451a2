//! Inline chat input: an editable line plus the per-form submitting latch.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one send operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A send in flight: the query as submitted and the answer streamed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub id: SubmissionId,
    pub query: String,
    pub answer: String,
}

/// Editable input with a char-indexed cursor.
///
/// While `pending` is set the form is latched: edits and further submits
/// are refused until the send completes, fails or is cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatForm {
    input: String,
    cursor: usize,
    pending: Option<PendingSend>,
}

impl ChatForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: impl Into<String>) -> Self {
        let input = input.into();
        let cursor = input.chars().count();
        Self {
            input,
            cursor,
            pending: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pending(&self) -> Option<&PendingSend> {
        self.pending.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert(&mut self, c: char) {
        if self.is_submitting() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.is_submitting() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.input.remove(at);
    }

    pub fn delete(&mut self) {
        if self.is_submitting() || self.cursor >= self.input.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.input.remove(at);
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    /// Latch the form with the current (trimmed) input as the query.
    /// Returns `None` when already latched or the input is blank.
    pub(crate) fn begin(&mut self, clear_input: bool) -> Option<PendingSend> {
        if self.is_submitting() {
            return None;
        }
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return None;
        }
        if clear_input {
            self.clear();
        }
        let pending = PendingSend {
            id: SubmissionId::new(),
            query,
            answer: String::new(),
        };
        self.pending = Some(pending.clone());
        Some(pending)
    }

    pub(crate) fn pending_mut(&mut self, id: SubmissionId) -> Option<&mut PendingSend> {
        self.pending.as_mut().filter(|p| p.id == id)
    }

    /// Release the latch, returning the send it held.
    pub(crate) fn release(&mut self) -> Option<PendingSend> {
        self.pending.take()
    }

    /// Release the latch and put the query back into the input.
    pub(crate) fn restore(&mut self) -> Option<PendingSend> {
        let pending = self.pending.take()?;
        *self = Self::with_input(pending.query.clone());
        Some(pending)
    }
}
