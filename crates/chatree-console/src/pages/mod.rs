//! Console pages. Each page owns one component and maps terminal input onto
//! it; the app routes send events to whichever page started the send.

mod chat_page;
mod chat_tree_page;
mod form_page;
mod journal_page;
mod tree_page;

pub use chat_page::ChatPage;
pub use chat_tree_page::ChatTreePage;
pub use form_page::{fitness_template, FormPage};
pub use journal_page::JournalPage;
pub use tree_page::{demo_tree, TreePage};

use chatree_chat::{ChatForm, Dispatcher, SendEvent};
use chatree_tree::{Guides, StyleSheet, TreeLayout};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::Frame;

/// What a page may touch besides itself.
pub struct PageContext<'a> {
    pub dispatcher: &'a mut Dispatcher,
    /// One-line message shown in the status bar.
    pub status: &'a mut String,
}

pub trait Page {
    fn title(&self) -> &'static str;

    /// Key hints for the status bar.
    fn hints(&self) -> &'static str {
        ""
    }

    fn render(&mut self, frame: &mut Frame, area: Rect);

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>);

    fn handle_mouse(&mut self, mouse: MouseEvent, ctx: &mut PageContext<'_>) {
        let _ = (mouse, ctx);
    }

    /// Fold a send event into the page. Returns `false` when the send does
    /// not belong to this page.
    fn on_send_event(&mut self, event: &SendEvent, ctx: &mut PageContext<'_>) -> bool {
        let _ = (event, ctx);
        false
    }
}

/// Tree drawing settings shared by the tree pages.
#[derive(Debug, Clone)]
pub struct TreeSettings {
    pub styles: StyleSheet,
    pub guides: Guides,
    pub compact_below: Option<u16>,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            styles: chatree_chat::chat_styles(),
            guides: Guides::default(),
            compact_below: Some(60),
        }
    }
}

/// The last drawn tree, kept for hit testing and keyboard navigation.
#[derive(Debug, Clone, Default)]
pub(crate) struct TreeViewport {
    pub layout: TreeLayout,
    pub area: Rect,
    pub scroll: usize,
}

impl TreeViewport {
    /// Layout line under a left click, if the click landed on the tree.
    pub fn clicked_line(&self, mouse: &MouseEvent) -> Option<usize> {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return None;
        }
        let at = Position::new(mouse.column, mouse.row);
        self.area
            .contains(at)
            .then(|| usize::from(mouse.row - self.area.y) + self.scroll)
    }
}

/// Apply an editing key to `form`. Returns whether the key was consumed.
pub(crate) fn edit_form(form: &mut ChatForm, key: &KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key.code {
        KeyCode::Char(c) => form.insert(c),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Delete => form.delete(),
        KeyCode::Left => form.left(),
        KeyCode::Right => form.right(),
        KeyCode::Home => form.home(),
        KeyCode::End => form.end(),
        _ => return false,
    }
    true
}

/// `prompt` followed by the form's input. Returns the line and the column
/// of the cursor relative to the line start.
pub(crate) fn input_line(prompt: &'static str, form: &ChatForm) -> (Line<'static>, u16) {
    let style = if form.is_submitting() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let before: String = form.input().chars().take(form.cursor()).collect();
    let prompt = Span::styled(prompt, Style::default().fg(Color::Cyan));
    let column = prompt.width() + Span::raw(before.as_str()).width();
    let line = Line::from(vec![prompt, Span::styled(form.input().to_string(), style)]);
    (line, u16::try_from(column).unwrap_or(u16::MAX))
}

pub(crate) fn speaker_style(human: bool) -> Style {
    if human {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    }
}
