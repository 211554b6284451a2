use chatree_tree::{
    dispatch, Activation, LabelNode, NodeId, NodeRenderer, NodeView, Tree, TreeEvent, TreeHandler,
    TreeView,
};
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::{Page, PageContext, TreeSettings, TreeViewport};

/// A small labelled tree to click around in.
pub fn demo_tree() -> LabelNode {
    let leaf = LabelNode::labelled;
    LabelNode::labelled("chatree")
        .with_child(
            leaf("crates")
                .with_child(leaf("tree").with_children([leaf("path"), leaf("render")]))
                .with_child(leaf("chat").with_children([
                    leaf("tree chatbot"),
                    leaf("journal"),
                    leaf("prompt form"),
                ]))
                .with_child(leaf("llm")),
        )
        .with_child(leaf("README"))
        .with_child(leaf("config.toml"))
}

struct Labels;

impl NodeRenderer<LabelNode> for Labels {
    fn render(&self, _: &NodeId, node: &LabelNode, _: Activation) -> NodeView {
        NodeView::line(node.payload.label.clone())
    }
}

/// Activation handler: the activated node becomes the reported one.
struct Activated<'a> {
    path: &'a mut Option<NodeId>,
    label: &'a mut Option<String>,
}

impl TreeHandler<LabelNode> for Activated<'_> {
    fn on_activate(&mut self, path: &NodeId, node: &LabelNode) {
        *self.path = Some(path.clone());
        *self.label = Some(node.payload.label.clone());
    }
}

pub struct TreePage {
    root: LabelNode,
    activated: Option<NodeId>,
    label: Option<String>,
    settings: TreeSettings,
    view: TreeViewport,
}

impl TreePage {
    pub fn new(root: LabelNode, settings: TreeSettings) -> Self {
        Self {
            root,
            activated: None,
            label: None,
            settings,
            view: TreeViewport::default(),
        }
    }

    pub fn activated(&self) -> Option<&NodeId> {
        self.activated.as_ref()
    }

    /// Route `event` to the activation handler. An event for a path that no
    /// longer resolves clears the activation.
    pub fn apply(&mut self, event: TreeEvent) -> bool {
        let mut handler = Activated {
            path: &mut self.activated,
            label: &mut self.label,
        };
        let handled = dispatch(&self.root, &event, &mut handler);
        if !handled {
            tracing::debug!(path = %event.path(), "cleared activation after a stale tree event");
            self.activated = None;
            self.label = None;
        }
        handled
    }
}

impl Page for TreePage {
    fn title(&self) -> &'static str {
        "tree"
    }

    fn hints(&self) -> &'static str {
        "↑/↓ move  Enter/click activate"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [tree_area, footer] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let block = Block::default().borders(Borders::ALL).title(" Tree ");
        let inner = block.inner(tree_area);

        let layout = Tree::new(&self.root, &Labels)
            .activated(self.activated.as_ref())
            .styles(&self.settings.styles)
            .guides(self.settings.guides)
            .compact_below(self.settings.compact_below)
            .layout(inner.width);
        let scroll = match &self.activated {
            Some(path) => layout.scroll_for(path, usize::from(inner.height), self.view.scroll),
            None => 0,
        };
        frame.render_widget(TreeView::new(&layout).scroll(scroll).block(block), tree_area);
        self.view = TreeViewport {
            layout,
            area: inner,
            scroll,
        };

        let path = self
            .activated
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        let footer_line = Line::from(vec![
            Span::styled("activated: ", Style::default().fg(Color::DarkGray)),
            Span::raw(path),
            Span::raw(
                self.label
                    .as_ref()
                    .map(|label| format!("  ({label})"))
                    .unwrap_or_default(),
            ),
        ]);
        frame.render_widget(Paragraph::new(footer_line), footer);
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut PageContext<'_>) {
        let next = match key.code {
            KeyCode::Down => self.view.layout.next_path(self.activated.as_ref()),
            KeyCode::Up => self.view.layout.prev_path(self.activated.as_ref()),
            KeyCode::Enter => self.activated.clone(),
            _ => None,
        };
        if let Some(path) = next {
            self.apply(TreeEvent::Activate(path));
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, _ctx: &mut PageContext<'_>) {
        if let Some(event) = self
            .view
            .clicked_line(&mouse)
            .and_then(|line| self.view.layout.click(line))
        {
            self.apply(event);
        }
    }
}
