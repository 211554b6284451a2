//! Offline client that answers by echoing the last user message.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};

use crate::client::{Completion, CompletionClient};
use crate::error::LlmError;
use crate::types::{ChatMessage, Role};

#[derive(Debug, Clone)]
pub struct EchoClient {
    /// Pause before each streamed word; zero streams without pausing.
    pub delay: Duration,
    pub stream: bool,
}

impl Default for EchoClient {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(60),
            stream: true,
        }
    }
}

impl EchoClient {
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            stream: true,
        }
    }

    fn answer(messages: &[ChatMessage]) -> String {
        let turns = messages.iter().filter(|m| m.role == Role::User).count();
        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        format!("(turn {turns}) you said: {last}")
    }
}

impl CompletionClient for EchoClient {
    fn create_completion<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        model: &'a str,
    ) -> BoxFuture<'a, Result<Completion, LlmError>> {
        let answer = Self::answer(&messages);
        tracing::debug!(model, chars = answer.len(), "echo completion");
        if !self.stream {
            return futures::future::ready(Ok(Completion::Whole(answer))).boxed();
        }

        // Split after each space so the deltas concatenate back to `answer`.
        let words: Vec<String> = answer.split_inclusive(' ').map(str::to_string).collect();
        let delay = self.delay;
        let deltas = stream::iter(words)
            .then(move |word| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok::<_, LlmError>(word)
            })
            .boxed();
        futures::future::ready(Ok(Completion::Deltas(deltas))).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_streams_last_user_message() {
        let client = EchoClient::instant();
        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("ok"),
            ChatMessage::user("second question"),
        ];
        let completion = client.create_completion(messages, "echo").await.unwrap();
        let mut deltas = 0;
        let answer = completion.fold(|_| deltas += 1).await.unwrap();
        assert_eq!(answer, "(turn 2) you said: second question");
        assert!(deltas > 1);
    }

    #[tokio::test]
    async fn test_echo_whole() {
        let client = EchoClient {
            delay: Duration::ZERO,
            stream: false,
        };
        let completion = client
            .create_completion(vec![ChatMessage::user("hi")], "echo")
            .await
            .unwrap();
        assert!(matches!(completion, Completion::Whole(ref a) if a == "(turn 1) you said: hi"));
    }
}
