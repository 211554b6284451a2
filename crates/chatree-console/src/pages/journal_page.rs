use chatree_chat::{JournalChatbot, JournalEntry, SendEvent};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::chat_page::message_lines;
use super::{edit_form, input_line, Page, PageContext};

/// Dated chat pages, one conversation per page.
pub struct JournalPage {
    journal: JournalChatbot,
}

impl JournalPage {
    pub fn new(entries: Vec<JournalEntry>) -> Self {
        Self {
            journal: JournalChatbot::new(entries),
        }
    }

    pub fn from_journal(journal: JournalChatbot) -> Self {
        Self { journal }
    }

    pub fn journal(&self) -> &JournalChatbot {
        &self.journal
    }

    fn header(&self) -> Line<'static> {
        let index = self.journal.current_index();
        let date = self
            .journal
            .current()
            .date_label()
            .unwrap_or_else(|| "undated".to_string());
        Line::from(vec![
            Span::styled(date, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  page {}/{}", index + 1, self.journal.entries().len()),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

impl Default for JournalPage {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Page for JournalPage {
    fn title(&self) -> &'static str {
        "journal"
    }

    fn hints(&self) -> &'static str {
        "Enter send  PgUp/PgDn page"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [header, body, input] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .areas(area);
        frame.render_widget(Paragraph::new(self.header()), header);

        let block = Block::default().borders(Borders::ALL).title(" Entry ");
        let inner = block.inner(body);
        let index = self.journal.current_index();
        let streaming = self
            .journal
            .pending_for(index)
            .map(|pending| pending.answer.as_str());
        let lines = message_lines(&self.journal.current().messages, streaming, inner.width);
        let top = lines.len().saturating_sub(usize::from(inner.height));
        let top = u16::try_from(top).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).scroll((top, 0)).block(block), body);

        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(input);
        let (line, column) = input_line("> ", self.journal.form());
        frame.render_widget(Paragraph::new(line).block(block), input);
        if !self.journal.form().is_submitting() {
            frame.set_cursor_position(Position::new(
                inner.x + column.min(inner.width.saturating_sub(1)),
                inner.y,
            ));
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) {
        let idle = self.journal.form().input().is_empty();
        match key.code {
            KeyCode::Enter => match self.journal.submit() {
                Ok(submission) => ctx.dispatcher.send(submission.id, submission.messages),
                Err(e) => *ctx.status = e.to_string(),
            },
            KeyCode::PageUp => self.journal.previous_page(),
            KeyCode::PageDown => self.journal.next_page(),
            KeyCode::Left if idle => self.journal.previous_page(),
            KeyCode::Right if idle => self.journal.next_page(),
            _ => {
                edit_form(self.journal.form_mut(), &key);
            }
        }
    }

    fn on_send_event(&mut self, event: &SendEvent, ctx: &mut PageContext<'_>) -> bool {
        match event {
            SendEvent::Delta { id, text } => self.journal.apply_delta(*id, text),
            SendEvent::Finished { id, answer } => match self.journal.complete(*id, answer.clone()) {
                Ok(index) => {
                    *ctx.status = format!("reply added to page {}", index + 1);
                    true
                }
                Err(_) => false,
            },
            SendEvent::Failed { id, error } => match self.journal.fail(*id) {
                Ok(_) => {
                    *ctx.status = format!("send failed: {error}");
                    true
                }
                Err(_) => false,
            },
        }
    }
}
