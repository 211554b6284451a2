//! Terminal console for the chatree components.
//!
//! Five pages, switched with F1 to F5: a plain labelled tree, the branching
//! chat tree, a linear chat, a dated journal and a prompt template form.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod pages;
pub mod theme;

pub use app::{App, AppEvent};
pub use cli::{Cli, PageKind};
pub use config::{ConfigError, ConsoleConfig};
