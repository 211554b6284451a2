use chatree_chat::{wrap_text, Chatbot, ChatbotMessage, SendEvent, Speaker};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::{edit_form, input_line, speaker_style, Page, PageContext};

const GREETING: &str = "Hi! Ask me anything.";

/// Lines for a message list, with a speaker heading per message.
pub(crate) fn message_lines<'m>(
    messages: impl IntoIterator<Item = &'m ChatbotMessage>,
    streaming: Option<&str>,
    width: u16,
) -> Vec<Line<'static>> {
    let width = usize::from(width.saturating_sub(2)).max(1);
    let mut lines = Vec::new();
    let mut push = |human: bool, text: &str| {
        let who = if human { "You" } else { "Assistant" };
        lines.push(Line::from(Span::styled(who, speaker_style(human))));
        for line in wrap_text(text, width) {
            lines.push(Line::from(format!("  {line}")));
        }
        lines.push(Line::default());
    };
    for message in messages {
        push(message.speaker == Speaker::Human, &message.content);
    }
    if let Some(answer) = streaming {
        push(false, if answer.is_empty() { "…" } else { answer });
    }
    lines
}

pub struct ChatPage {
    bot: Chatbot,
    /// Lines scrolled up from the bottom.
    scroll_back: usize,
}

impl ChatPage {
    pub fn new() -> Self {
        Self::with_messages(vec![ChatbotMessage::ai(GREETING)])
    }

    pub fn with_messages(messages: Vec<ChatbotMessage>) -> Self {
        Self {
            bot: Chatbot::new(messages),
            scroll_back: 0,
        }
    }

    pub fn bot(&self) -> &Chatbot {
        &self.bot
    }
}

impl Default for ChatPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for ChatPage {
    fn title(&self) -> &'static str {
        "chat"
    }

    fn hints(&self) -> &'static str {
        "Enter send  PgUp/PgDn scroll"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [history, input] = Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

        let block = Block::default().borders(Borders::ALL).title(" Chat ");
        let inner = block.inner(history);
        let streaming = self.bot.pending_answer().map(|pending| pending.answer.as_str());
        let lines = message_lines(self.bot.messages(), streaming, inner.width);
        let overflow = lines.len().saturating_sub(usize::from(inner.height));
        self.scroll_back = self.scroll_back.min(overflow);
        let top = u16::try_from(overflow - self.scroll_back).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).scroll((top, 0)).block(block), history);

        let title = if self.bot.form().is_submitting() {
            " Waiting for reply "
        } else {
            " Message "
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(input);
        let (line, column) = input_line("> ", self.bot.form());
        frame.render_widget(Paragraph::new(line).block(block), input);
        if !self.bot.form().is_submitting() {
            frame.set_cursor_position(Position::new(
                inner.x + column.min(inner.width.saturating_sub(1)),
                inner.y,
            ));
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) {
        match key.code {
            KeyCode::Enter => match self.bot.submit() {
                Ok(outgoing) => {
                    ctx.dispatcher.send(outgoing.id, outgoing.messages);
                    self.scroll_back = 0;
                }
                Err(e) => *ctx.status = e.to_string(),
            },
            KeyCode::PageUp => self.scroll_back += 5,
            KeyCode::PageDown => self.scroll_back = self.scroll_back.saturating_sub(5),
            _ => {
                edit_form(self.bot.form_mut(), &key);
            }
        }
    }

    fn on_send_event(&mut self, event: &SendEvent, ctx: &mut PageContext<'_>) -> bool {
        match event {
            SendEvent::Delta { id, text } => self.bot.apply_delta(*id, text),
            SendEvent::Finished { id, answer } => self.bot.complete(*id, answer.clone()).is_ok(),
            SendEvent::Failed { id, error } => {
                let failed = self.bot.fail(*id).is_ok();
                if failed {
                    *ctx.status = format!("send failed: {error}");
                }
                failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_lines_wrap_under_headings() {
        let messages = [
            ChatbotMessage::human("hello"),
            ChatbotMessage::ai("one two three four"),
        ];
        let lines = message_lines(&messages, Some(""), 12);
        let text: Vec<String> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            [
                "You",
                "  hello",
                "",
                "Assistant",
                "  one two",
                "  three four",
                "",
                "Assistant",
                "  …",
                "",
            ]
        );
        assert!(lines[0].spans[0]
            .style
            .add_modifier
            .contains(ratatui::style::Modifier::BOLD));
    }
}
