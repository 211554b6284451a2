use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    pub model: String,
    /// Request incremental deltas instead of a whole answer.
    pub stream: bool,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            stream: true,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_trims_slash() {
        let cfg = LlmConfig {
            api_base: "http://localhost:8080/v1/".into(),
            ..Default::default()
        };
        assert_eq!(cfg.completions_url(), "http://localhost:8080/v1/chat/completions");
    }
}
