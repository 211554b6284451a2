//! chatree LLM collaborator.
//!
//! Consumed by the chat components as
//! `create_completion(messages, model) -> Completion`, where a completion is
//! either a whole answer or a lazy stream of deltas that [`Completion::fold`]
//! accumulates into one string.

pub mod client;
pub mod config;
pub mod echo;
pub mod error;
pub mod openai;
pub mod sse;
pub mod types;

pub use client::{Completion, CompletionClient, DeltaStream};
pub use config::LlmConfig;
pub use echo::EchoClient;
pub use error::*;
pub use openai::OpenAiClient;
pub use types::*;
