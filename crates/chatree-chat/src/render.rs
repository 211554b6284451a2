//! Chat-tree content for the tree core.

use chatree_tree::{Activation, NodeId, NodeRenderer, NodeView, StyleSheet};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde::{Deserialize, Serialize};

use crate::form::ChatForm;
use crate::message::{MessageTreeNode, NodeState};
use crate::wrap::wrap_text;

pub const CHAT_NODE: &str = "chat-node";
pub const CHAT_FORM: &str = "chat-form-node";
pub const ADD_NODE: &str = "add-node";
pub const DISABLED: &str = "disabled";
pub const QUERY_ONLY: &str = "query-only";

const QUERY_MARK: &str = "› ";
const ANSWER_INDENT: &str = "  ";
const GUIDE_WIDTH: usize = 4;

/// How much of a completed exchange a node shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Appearance {
    #[default]
    Full,
    /// Only the query; the answer is shown on expansion.
    QueryOnly,
}

/// [`NodeRenderer`] for [`MessageTreeNode`] trees.
#[derive(Debug, Clone)]
pub struct ChatTreeRenderer {
    pub appearance: Appearance,
    /// Hide sentinels whose parent is off the activated route.
    pub collapse_sentinels: bool,
    pub activated: Option<NodeId>,
    /// Viewport width used for wrapping answers.
    pub width: u16,
}

impl Default for ChatTreeRenderer {
    fn default() -> Self {
        Self {
            appearance: Appearance::default(),
            collapse_sentinels: false,
            activated: None,
            width: 80,
        }
    }
}

impl ChatTreeRenderer {
    pub fn new(appearance: Appearance) -> Self {
        Self {
            appearance,
            ..Self::default()
        }
    }

    fn text_width(&self, path: &NodeId) -> usize {
        usize::from(self.width)
            .saturating_sub(path.depth() * GUIDE_WIDTH + ANSWER_INDENT.len())
            .max(8)
    }

    fn sentinel_visible(&self, path: &NodeId) -> bool {
        if !self.collapse_sentinels {
            return true;
        }
        match path.parent() {
            Some(parent) if parent.is_root() => true,
            Some(parent) => self
                .activated
                .as_ref()
                .is_some_and(|activated| parent.is_descendant_or_self(activated)),
            None => true,
        }
    }

    fn answer_lines(&self, path: &NodeId, answer: &str, lines: &mut Vec<Line<'static>>) {
        let style = Style::default().add_modifier(Modifier::DIM);
        for line in wrap_text(answer, self.text_width(path)) {
            lines.push(Line::from(vec![
                Span::raw(ANSWER_INDENT),
                Span::styled(line, style),
            ]));
        }
    }

    fn form_lines(&self, path: &NodeId, form: &ChatForm) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        match form.pending() {
            Some(pending) => {
                lines.push(Line::from(vec![
                    Span::raw(QUERY_MARK),
                    Span::styled(pending.query.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]));
                if pending.answer.is_empty() {
                    lines.push(Line::from(format!("{ANSWER_INDENT}…")));
                } else {
                    self.answer_lines(path, &pending.answer, &mut lines);
                }
            }
            None => lines.push(input_line(form)),
        }
        lines
    }
}

/// The form's input with the cursor cell reversed.
fn input_line(form: &ChatForm) -> Line<'static> {
    let cursor = Style::default().add_modifier(Modifier::REVERSED);
    let before: String = form.input().chars().take(form.cursor()).collect();
    let mut rest = form.input().chars().skip(form.cursor());
    let at = rest.next().map(String::from).unwrap_or_else(|| " ".into());
    let after: String = rest.collect();
    Line::from(vec![
        Span::raw(QUERY_MARK),
        Span::raw(before),
        Span::styled(at, cursor),
        Span::raw(after),
    ])
}

impl NodeRenderer<MessageTreeNode> for ChatTreeRenderer {
    fn render(&self, path: &NodeId, node: &MessageTreeNode, _: Activation) -> NodeView {
        match &node.state {
            Some(NodeState::Add) if !self.sentinel_visible(path) => NodeView::Hidden,
            Some(NodeState::Add) => NodeView::line("+"),
            Some(NodeState::OpenChat(form)) => NodeView::lines(self.form_lines(path, form)),
            None => {
                let Some(exchange) = &node.message else {
                    return NodeView::line("conversation");
                };
                let mut lines = vec![Line::from(vec![
                    Span::raw(QUERY_MARK),
                    Span::styled(exchange.query.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ])];
                if self.appearance == Appearance::Full {
                    self.answer_lines(path, &exchange.answer, &mut lines);
                }
                NodeView::lines(lines)
            }
        }
    }

    fn class_name(&self, _: &NodeId, node: &MessageTreeNode) -> String {
        match &node.state {
            Some(NodeState::Add) => ADD_NODE.to_string(),
            Some(NodeState::OpenChat(form)) => chatree_tree::classes([
                (CHAT_FORM, true),
                (DISABLED, form.is_submitting()),
            ]),
            None => chatree_tree::classes([
                (CHAT_NODE, node.message.is_some()),
                (QUERY_ONLY, self.appearance == Appearance::QueryOnly),
            ]),
        }
    }
}

/// Tree defaults followed by rules for the chat classes.
pub fn chat_styles() -> StyleSheet {
    let mut sheet = StyleSheet::tree_defaults();
    sheet
        .set(ADD_NODE, Style::default().fg(Color::Green))
        .set(CHAT_FORM, Style::default().fg(Color::Cyan))
        .set(DISABLED, Style::default().fg(Color::DarkGray))
        .set(CHAT_NODE, Style::default().fg(Color::White));
    sheet
}
