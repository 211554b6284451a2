use chatree_chat::{
    Appearance, ChatAction, ChatOptions, ChatTreeRenderer, Exchange, MessageTreeNode, SendEvent,
    TreeChatbot,
};
use chatree_tree::{NodeId, Tree, TreeEvent, TreeView};
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::{edit_form, speaker_style, Page, PageContext, TreeSettings, TreeViewport};

pub struct ChatTreePage {
    bot: TreeChatbot,
    renderer: ChatTreeRenderer,
    settings: TreeSettings,
    expanded: Option<Exchange>,
    view: TreeViewport,
}

impl ChatTreePage {
    pub fn new(
        root: Option<MessageTreeNode>,
        options: ChatOptions,
        appearance: Appearance,
        collapse_sentinels: bool,
        settings: TreeSettings,
    ) -> Self {
        let mut renderer = ChatTreeRenderer::new(appearance);
        renderer.collapse_sentinels = collapse_sentinels;
        Self {
            bot: TreeChatbot::new(root, options),
            renderer,
            settings,
            expanded: None,
            view: TreeViewport::default(),
        }
    }

    pub fn bot(&self) -> &TreeChatbot {
        &self.bot
    }

    pub fn expanded(&self) -> Option<&Exchange> {
        self.expanded.as_ref()
    }

    fn selected(&self) -> Option<NodeId> {
        self.bot.activated().cloned()
    }

    fn is_form(&self, path: &NodeId) -> bool {
        self.bot.form(path).is_some()
    }

    fn activate(&mut self, event: TreeEvent, ctx: &mut PageContext<'_>) {
        match self.bot.handle(&event) {
            Ok(Some(ChatAction::Expand(exchange))) => self.expanded = Some(exchange),
            Ok(Some(ChatAction::OpenedForm(path))) => {
                tracing::debug!(path = %path, "form opened");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "tree event rejected");
                *ctx.status = e.to_string();
            }
        }
    }

    fn submit(&mut self, path: &NodeId, ctx: &mut PageContext<'_>) {
        match self.bot.submit(path) {
            Ok(submission) => {
                ctx.dispatcher.send(submission.id, submission.messages());
                *ctx.status = format!("sending from {path}");
            }
            Err(e) => *ctx.status = e.to_string(),
        }
    }

    fn close(&mut self, path: &NodeId, ctx: &mut PageContext<'_>) {
        match self.bot.cancel(path) {
            Ok(Some(id)) => {
                ctx.dispatcher.cancel(id);
                *ctx.status = "send cancelled".to_string();
            }
            Ok(None) => {}
            Err(e) => *ctx.status = e.to_string(),
        }
    }

    fn render_expanded(&self, frame: &mut Frame, area: Rect, exchange: &Exchange) {
        let mut lines = vec![Line::from(Span::styled("You", speaker_style(true)))];
        lines.extend(exchange.query.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Assistant", speaker_style(false))));
        lines.extend(exchange.answer.lines().map(|l| Line::from(l.to_string())));
        let panel = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Exchange (Esc closes) "));
        frame.render_widget(panel, area);
    }
}

impl Page for ChatTreePage {
    fn title(&self) -> &'static str {
        "chat tree"
    }

    fn hints(&self) -> &'static str {
        "↑/↓ select  Enter open/send  a insert  Esc close"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (tree_area, panel_area) = match &self.expanded {
            Some(_) => {
                let [tree, panel] =
                    Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
                (tree, Some(panel))
            }
            None => (area, None),
        };

        let block = Block::default().borders(Borders::ALL).title(" Conversation ");
        let inner = block.inner(tree_area);
        self.renderer.activated = self.bot.activated().cloned();
        self.renderer.width = inner.width;

        let layout = Tree::new(self.bot.root(), &self.renderer)
            .show_root(false)
            .activated(self.bot.activated())
            .styles(&self.settings.styles)
            .guides(self.settings.guides)
            .compact_below(self.settings.compact_below)
            .layout(inner.width);
        let scroll = match self.bot.activated() {
            Some(path) => layout.scroll_for(path, usize::from(inner.height), self.view.scroll),
            None => self.view.scroll.min(layout.height().saturating_sub(usize::from(inner.height))),
        };
        frame.render_widget(TreeView::new(&layout).scroll(scroll).block(block), tree_area);
        self.view = TreeViewport {
            layout,
            area: inner,
            scroll,
        };

        if let (Some(panel), Some(exchange)) = (panel_area, &self.expanded) {
            self.render_expanded(frame, panel, exchange);
        }

        if self.view.layout.is_empty() {
            let hint = Paragraph::new(Line::from(Span::styled(
                "empty conversation",
                Style::default().add_modifier(Modifier::DIM),
            )));
            frame.render_widget(hint, inner);
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) {
        let selected = self.selected();
        let on_form = selected.as_ref().is_some_and(|path| self.is_form(path));

        match (key.code, selected) {
            (KeyCode::Down, current) => {
                if let Some(next) = self.view.layout.next_path(current.as_ref()) {
                    self.bot.select(next);
                }
            }
            (KeyCode::Up, current) => {
                if let Some(prev) = self.view.layout.prev_path(current.as_ref()) {
                    self.bot.select(prev);
                }
            }
            (KeyCode::Enter, Some(path)) if on_form => self.submit(&path, ctx),
            (KeyCode::Enter, Some(path)) => self.activate(TreeEvent::Activate(path), ctx),
            (KeyCode::Esc, Some(path)) if on_form => self.close(&path, ctx),
            (KeyCode::Esc, _) => self.expanded = None,
            (_, Some(path)) if on_form => {
                if let Some(form) = self.bot.form_mut(&path) {
                    edit_form(form, &key);
                }
            }
            (KeyCode::Char('a'), Some(path)) => self.activate(TreeEvent::Add(path), ctx),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, ctx: &mut PageContext<'_>) {
        let Some(path) = self
            .view
            .clicked_line(&mouse)
            .and_then(|line| self.view.layout.row_at(line))
            .map(|row| row.path.clone())
        else {
            return;
        };
        if self.is_form(&path) {
            self.bot.select(path);
        } else {
            self.activate(TreeEvent::Activate(path), ctx);
        }
    }

    fn on_send_event(&mut self, event: &SendEvent, ctx: &mut PageContext<'_>) -> bool {
        match event {
            SendEvent::Delta { id, text } => self.bot.apply_delta(*id, text),
            SendEvent::Finished { id, answer } => match self.bot.complete(*id, answer.clone()) {
                Ok(path) => {
                    *ctx.status = format!("answer received at {path}");
                    true
                }
                Err(_) => false,
            },
            SendEvent::Failed { id, error } => match self.bot.fail(*id) {
                Ok(path) => {
                    *ctx.status = format!("send from {path} failed: {error}");
                    true
                }
                Err(_) => false,
            },
        }
    }
}
