use chatree_chat::{
    ChatError, ChatForm, Chatbot, FieldConfig, FieldInput, PromptForm, PromptTemplate, SendEvent,
    Speaker, Transform,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::chat_page::message_lines;
use super::{edit_form, input_line, Page, PageContext};

const FITNESS: &str = "You are a fitness and nutrition coach.\n\
I want to lose weight ${endingDate:by when?}.\n\
${healthCircumstances}\n\
${dietaryRestrictions}\n\
Please give me a dietary and exercise plan.";

/// The demo template: a text field and two bulleted list fields.
pub fn fitness_template() -> PromptTemplate {
    PromptTemplate::parse(FITNESS)
        .with_field("endingDate", FieldConfig::text())
        .with_field(
            "healthCircumstances",
            FieldConfig::list(Transform::bulleted("I have the following health circumstances:")),
        )
        .with_field(
            "dietaryRestrictions",
            FieldConfig::list(Transform::bulleted("I have the following dietary restrictions:")),
        )
}

/// A prompt template form whose generated prompt is sent to a chat.
pub struct FormPage {
    form: PromptForm,
    reply: Chatbot,
}

impl FormPage {
    pub fn new(template: PromptTemplate) -> Self {
        Self {
            form: PromptForm::new(template),
            reply: Chatbot::default(),
        }
    }

    pub fn form(&self) -> &PromptForm {
        &self.form
    }

    pub fn reply(&self) -> &Chatbot {
        &self.reply
    }

    fn send(&mut self, ctx: &mut PageContext<'_>) -> Result<(), ChatError> {
        if self.reply.form().is_submitting() {
            return Err(ChatError::AlreadySubmitting(chatree_tree::NodeId::root()));
        }
        *self.reply.form_mut() = ChatForm::with_input(self.form.prompt());
        let outgoing = self.reply.submit()?;
        ctx.dispatcher.send(outgoing.id, outgoing.messages);
        Ok(())
    }

    fn field_lines(&self) -> Vec<Line<'static>> {
        let focus = self.form.focus();
        let label_style = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();
        for (index, (field, input)) in self
            .form
            .template()
            .fields()
            .iter()
            .zip(self.form.inputs())
            .enumerate()
        {
            let mut label = vec![Span::styled(field.label(), label_style)];
            if let Some(hint) = &field.hint {
                label.push(Span::styled(format!("  {hint}"), Style::default().fg(Color::DarkGray)));
            }
            lines.push(Line::from(label));

            let items: Vec<&ChatForm> = match input {
                FieldInput::Text(form) => vec![form],
                FieldInput::List(list) => list.iter().collect(),
            };
            for (item, form) in items.into_iter().enumerate() {
                let focused = focus.field == index && focus.item == item;
                let prompt = match (input, focused) {
                    (_, true) => "▸ ",
                    (FieldInput::List(_), false) => "• ",
                    (FieldInput::Text(_), false) => "  ",
                };
                let (line, _) = input_line(prompt, form);
                lines.push(line);
            }
            lines.push(Line::default());
        }
        lines
    }
}

impl Page for FormPage {
    fn title(&self) -> &'static str {
        "form"
    }

    fn hints(&self) -> &'static str {
        "Tab next  ^N add item  ^D delete item  ^S send"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);
        let [prompt_area, reply_area] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(right);

        let fields = Paragraph::new(self.field_lines())
            .block(Block::default().borders(Borders::ALL).title(" Fields "));
        frame.render_widget(fields, left);

        let prompt = Paragraph::new(self.form.prompt())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Prompt "));
        frame.render_widget(prompt, prompt_area);

        let block = Block::default().borders(Borders::ALL).title(" Reply ");
        let inner = block.inner(reply_area);
        let streaming = self.reply.pending_answer().map(|pending| pending.answer.as_str());
        // Sent prompts are already on screen.
        let answers = self
            .reply
            .messages()
            .iter()
            .filter(|message| message.speaker == Speaker::Ai);
        let lines = message_lines(answers, streaming, inner.width);
        frame.render_widget(Paragraph::new(lines).block(block), reply_area);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Char('n') if ctrl => {
                if !self.form.add_item() {
                    *ctx.status = "focused field is not a list".to_string();
                }
            }
            KeyCode::Char('d') if ctrl => {
                self.form.delete_item();
            }
            KeyCode::Char('s') if ctrl => {
                if let Err(e) = self.send(ctx) {
                    *ctx.status = e.to_string();
                }
            }
            _ => {
                if let Some(form) = self.form.focused_mut() {
                    edit_form(form, &key);
                }
            }
        }
    }

    fn on_send_event(&mut self, event: &SendEvent, ctx: &mut PageContext<'_>) -> bool {
        match event {
            SendEvent::Delta { id, text } => self.reply.apply_delta(*id, text),
            SendEvent::Finished { id, answer } => self.reply.complete(*id, answer.clone()).is_ok(),
            SendEvent::Failed { id, error } => {
                let failed = self.reply.fail(*id).is_ok();
                if failed {
                    *self.reply.form_mut() = ChatForm::new();
                    *ctx.status = format!("send failed: {error}");
                }
                failed
            }
        }
    }
}
