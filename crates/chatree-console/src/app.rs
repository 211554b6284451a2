//! Console application: page switching, event routing and the terminal
//! lifecycle.

use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chatree_chat::{Dispatcher, MessageTreeNode, SendEvent};
use chatree_llm::{CompletionClient, EchoClient, LlmConfig, OpenAiClient};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::cli::{Cli, PageKind};
use crate::config::ConsoleConfig;
use crate::pages::{
    demo_tree, fitness_template, ChatPage, ChatTreePage, FormPage, JournalPage, Page,
    PageContext, TreePage, TreeSettings,
};
use crate::theme;

#[derive(Debug)]
pub enum AppEvent {
    Terminal(Event),
    Send(SendEvent),
}

pub struct App {
    pages: Vec<Box<dyn Page>>,
    current: usize,
    dispatcher: Dispatcher,
    status: String,
    quit: bool,
}

impl App {
    pub fn new(pages: Vec<Box<dyn Page>>, current: usize, dispatcher: Dispatcher) -> Self {
        let current = current.min(pages.len().saturating_sub(1));
        Self {
            pages,
            current,
            dispatcher,
            status: String::new(),
            quit: false,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let [tabs_area, body, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let titles = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| format!("F{} {}", i + 1, page.title()));
        let tabs = Tabs::new(titles)
            .select(self.current)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, tabs_area);

        if let Some(page) = self.pages.get_mut(self.current) {
            page.render(frame, body);
        }

        let left = if self.status.is_empty() {
            Span::styled(
                self.pages
                    .get(self.current)
                    .map(|page| page.hints())
                    .unwrap_or_default(),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::styled(self.status.clone(), Style::default().fg(Color::Yellow))
        };
        let in_flight = self.dispatcher.in_flight();
        let right = format!(
            "{}{}  ^Q quit",
            self.dispatcher.model(),
            if in_flight > 0 {
                format!("  {in_flight} sending")
            } else {
                String::new()
            }
        );
        let [left_area, right_area] = Layout::horizontal([
            Constraint::Min(1),
            Constraint::Length(u16::try_from(right.chars().count()).unwrap_or(u16::MAX)),
        ])
        .areas(status_area);
        frame.render_widget(Paragraph::new(Line::from(left)), left_area);
        frame.render_widget(
            Paragraph::new(Span::styled(right, Style::default().fg(Color::DarkGray))),
            right_area,
        );
    }

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Terminal(event) => self.handle_event(event),
            AppEvent::Send(event) => self.handle_send(event),
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                let mut ctx = PageContext {
                    dispatcher: &mut self.dispatcher,
                    status: &mut self.status,
                };
                if let Some(page) = self.pages.get_mut(self.current) {
                    page.handle_mouse(mouse, &mut ctx);
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.quit = true;
            }
            (KeyCode::F(n), _) if (1..=self.pages.len()).contains(&usize::from(n)) => {
                self.current = usize::from(n) - 1;
                self.status.clear();
            }
            _ => {
                self.status.clear();
                let mut ctx = PageContext {
                    dispatcher: &mut self.dispatcher,
                    status: &mut self.status,
                };
                if let Some(page) = self.pages.get_mut(self.current) {
                    page.handle_key(key, &mut ctx);
                }
            }
        }
    }

    /// Route a send event to the page that started the send.
    pub fn handle_send(&mut self, event: SendEvent) {
        let mut ctx = PageContext {
            dispatcher: &mut self.dispatcher,
            status: &mut self.status,
        };
        let claimed = self
            .pages
            .iter_mut()
            .any(|page| page.on_send_event(&event, &mut ctx));
        if !claimed {
            tracing::debug!(id = %event.id(), "send event for a closed form, dropped");
        }
        if event.is_terminal() {
            self.dispatcher.settle(event.id());
        }
    }
}

/// The completions client, or the echo client when offline or when no API
/// key is configured.
pub fn build_client(offline: bool, config: &LlmConfig) -> Arc<dyn CompletionClient> {
    if offline {
        return Arc::new(EchoClient::default());
    }
    match OpenAiClient::from_env(config.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to the echo client");
            Arc::new(EchoClient::default())
        }
    }
}

/// Read a chat tree from a JSON file.
pub fn load_root(path: &Path) -> anyhow::Result<MessageTreeNode> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading chat tree {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing chat tree {}", path.display()))
}

/// One page per [`PageKind`], in [`PageKind::ALL`] order.
pub fn build_pages(
    config: &ConsoleConfig,
    root: Option<MessageTreeNode>,
) -> anyhow::Result<Vec<Box<dyn Page>>> {
    let settings = TreeSettings {
        styles: theme::stylesheet(&config.theme)?,
        guides: config.tree.guides,
        compact_below: config.tree.compact_below,
    };
    let mut root = root;
    let pages = PageKind::ALL
        .iter()
        .map(|kind| -> Box<dyn Page> {
            match kind {
                PageKind::Tree => Box::new(TreePage::new(demo_tree(), settings.clone())),
                PageKind::ChatTree => Box::new(ChatTreePage::new(
                    root.take(),
                    config.chat.options(),
                    config.chat.appearance,
                    config.chat.collapse_sentinels,
                    settings.clone(),
                )),
                PageKind::Chat => Box::new(ChatPage::new()),
                PageKind::Journal => Box::new(JournalPage::default()),
                PageKind::Form => Box::new(FormPage::new(fitness_template())),
            }
        })
        .collect();
    Ok(pages)
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Terminal events, read on a plain thread since crossterm blocks.
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || loop {
        match event::poll(Duration::from_millis(250)) {
            Ok(true) => match event::read() {
                Ok(event) => {
                    if tx.send(AppEvent::Terminal(event)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "terminal read failed");
                    break;
                }
            },
            Ok(false) if tx.is_closed() => break,
            Ok(false) => {}
            Err(e) => {
                tracing::error!(error = %e, "terminal poll failed");
                break;
            }
        }
    });
}

/// Run the console until the user quits.
pub async fn run(cli: Cli, config: ConsoleConfig) -> anyhow::Result<()> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("chatree requires a terminal (TTY)."));
    }

    let root = cli.root.as_deref().map(load_root).transpose()?;
    let pages = build_pages(&config, root)?;

    let mut llm = config.llm.clone();
    if let Some(model) = cli.model {
        llm.model = model;
    }
    let client = build_client(cli.offline, &llm);
    let (dispatcher, mut sends) = Dispatcher::new(client, llm.model.clone());
    let mut app = App::new(pages, cli.page.index(), dispatcher);

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = unbounded_channel();
    spawn_input_reader(tx.clone());
    tokio::spawn(async move {
        while let Some(event) = sends.recv().await {
            if tx.send(AppEvent::Send(event)).is_err() {
                break;
            }
        }
    });
    tracing::info!(model = %llm.model, page = ?cli.page, "console started");

    while !app.should_quit() {
        terminal.draw(|frame| app.render(frame))?;
        let Some(event) = rx.recv().await else {
            break;
        };
        app.handle(event);
        // Fold whatever else is queued before the next redraw.
        while let Ok(event) = rx.try_recv() {
            app.handle(event);
        }
    }

    app.dispatcher.cancel_all();
    restore_terminal(&mut terminal)?;
    tracing::info!("console stopped");
    Ok(())
}
