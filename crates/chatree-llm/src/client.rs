use futures::future::BoxFuture;
use futures::stream::{BoxStream, StreamExt};

use crate::error::LlmError;
use crate::types::ChatMessage;

/// Incremental answer fragments, in arrival order.
pub type DeltaStream = BoxStream<'static, Result<String, LlmError>>;

/// Result of a completion request.
pub enum Completion {
    /// The whole answer at once.
    Whole(String),
    /// A lazy sequence of answer fragments.
    Deltas(DeltaStream),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Whole(answer) => f.debug_tuple("Whole").field(answer).finish(),
            Completion::Deltas(_) => f.write_str("Deltas(..)"),
        }
    }
}

impl Completion {
    /// Fold the completion into one answer, reporting each increment to
    /// `on_delta` as it arrives. A whole answer is reported as one increment.
    pub async fn fold(self, mut on_delta: impl FnMut(&str)) -> Result<String, LlmError> {
        match self {
            Completion::Whole(answer) => {
                on_delta(&answer);
                Ok(answer)
            }
            Completion::Deltas(mut deltas) => {
                let mut answer = String::new();
                while let Some(delta) = deltas.next().await {
                    let delta = delta?;
                    if delta.is_empty() {
                        continue;
                    }
                    on_delta(&delta);
                    answer.push_str(&delta);
                }
                Ok(answer)
            }
        }
    }
}

/// A chat-completion backend.
pub trait CompletionClient: Send + Sync {
    fn create_completion<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        model: &'a str,
    ) -> BoxFuture<'a, Result<Completion, LlmError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn test_fold_accumulates_deltas() {
        let deltas = stream::iter(vec![Ok("Hel".to_string()), Ok(String::new()), Ok("lo".to_string())]);
        let mut seen = Vec::new();
        let answer = Completion::Deltas(deltas.boxed())
            .fold(|d| seen.push(d.to_string()))
            .await
            .unwrap();
        assert_eq!(answer, "Hello");
        assert_eq!(seen, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_fold_stops_on_error() {
        let deltas = stream::iter(vec![Ok("partial".to_string()), Err(LlmError::EmptyCompletion)]);
        let result = Completion::Deltas(deltas.boxed()).fold(|_| {}).await;
        assert!(matches!(result, Err(LlmError::EmptyCompletion)));
    }
}
