use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Terminal console for branching chat trees.
#[derive(Debug, Parser)]
#[command(name = "chatree", version, about)]
pub struct Cli {
    /// Config file (defaults to <config dir>/chatree/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Page shown at startup
    #[arg(long, value_enum, default_value_t = PageKind::ChatTree)]
    pub page: PageKind,

    /// Model name, overriding [llm].model
    #[arg(long)]
    pub model: Option<String>,

    /// Answer with the local echo client instead of the completions API
    #[arg(long)]
    pub offline: bool,

    /// JSON file with the initial chat tree
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageKind {
    Tree,
    ChatTree,
    Chat,
    Journal,
    Form,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::Tree,
        PageKind::ChatTree,
        PageKind::Chat,
        PageKind::Journal,
        PageKind::Form,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0)
    }
}
