//! Console configuration, loaded from TOML.
//!
//! Every section and field is optional; anything left out takes its default.
//!
//! ```toml
//! [llm]
//! model = "gpt-4o-mini"
//! stream = true
//!
//! [chat]
//! appearance = "query-only"
//! on_send_failure = "revert-to-sentinel"
//! collapse_sentinels = true
//!
//! [tree]
//! compact_below = 60
//! guides = "rounded"
//!
//! [theme.add-node]
//! fg = "lightgreen"
//! bold = true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chatree_chat::{Appearance, ChatOptions, FailurePolicy};
use chatree_llm::LlmConfig;
use chatree_tree::Guides;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::StyleSpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("theme class `{class}`: unknown color `{color}`")]
    Color { class: String, color: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub llm: LlmConfig,
    pub chat: ChatSection,
    pub tree: TreeSection,
    /// Style overrides keyed by class name.
    pub theme: BTreeMap<String, StyleSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    pub appearance: Appearance,
    pub on_send_failure: FailurePolicy,
    /// Only show add-sentinels along the activated route.
    pub collapse_sentinels: bool,
}

impl ChatSection {
    pub fn options(&self) -> ChatOptions {
        ChatOptions {
            failure_policy: self.on_send_failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSection {
    /// Viewport width under which tree guides are drawn compact.
    pub compact_below: Option<u16>,
    pub guides: Guides,
}

impl Default for TreeSection {
    fn default() -> Self {
        Self {
            compact_below: Some(60),
            guides: Guides::default(),
        }
    }
}

impl ConsoleConfig {
    /// `<config dir>/chatree/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatree").join("config.toml"))
    }

    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                let config = Self::from_toml(&path, &text)?;
                tracing::info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ConsoleConfig::from_toml(Path::new("empty.toml"), "").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.tree.compact_below, Some(60));
        assert_eq!(config.llm.model, "gpt-4");
    }

    #[test]
    fn test_load_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[llm]
model = "local-model"
api_base = "http://localhost:8080/v1"
stream = false

[chat]
appearance = "query-only"
on_send_failure = "revert-to-sentinel"
collapse_sentinels = true

[tree]
compact_below = 40
guides = "ascii"

[theme.add-node]
fg = "lightgreen"
bold = true
"#
        )
        .unwrap();

        let config = ConsoleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.llm.model, "local-model");
        assert!(!config.llm.stream);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.chat.appearance, Appearance::QueryOnly);
        assert_eq!(config.chat.options().failure_policy, FailurePolicy::RevertToSentinel);
        assert!(config.chat.collapse_sentinels);
        assert_eq!(config.tree.compact_below, Some(40));
        assert_eq!(config.tree.guides, Guides::Ascii);
        let spec = &config.theme["add-node"];
        assert_eq!(spec.fg.as_deref(), Some("lightgreen"));
        assert!(spec.bold);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConsoleConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_bad_toml_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[chat]\nappearance = 3\n").unwrap();
        let err = ConsoleConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
