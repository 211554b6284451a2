//! chatree chat components.
//!
//! Every component here is a consumer of the tree core or a flat log:
//! the branching [`TreeChatbot`], the linear [`Chatbot`], the paginated
//! [`JournalChatbot`] and the [`PromptForm`] over a [`PromptTemplate`], plus the
//! [`Dispatcher`] that runs their sends against a completion client.

pub mod chatbot;
pub mod dispatch;
pub mod dynamic_list;
pub mod error;
pub mod form;
pub mod journal;
pub mod message;
pub mod normalize;
pub mod prompt;
pub mod prompt_form;
pub mod render;
pub mod tree_chatbot;
pub mod wrap;

pub use chatbot::{Chatbot, ChatbotMessage, Outgoing, Speaker};
pub use dispatch::{Dispatcher, SendEvent};
pub use dynamic_list::DynamicList;
pub use error::*;
pub use form::{ChatForm, PendingSend, SubmissionId};
pub use journal::{JournalChatbot, JournalEntry, JournalSubmission};
pub use message::*;
pub use normalize::normalize;
pub use prompt::{collect_fields, Field, FieldConfig, FieldKind, FieldValue, PromptTemplate, Transform};
pub use prompt_form::{FieldInput, Focus, PromptForm};
pub use render::{chat_styles, Appearance, ChatTreeRenderer};
pub use tree_chatbot::{ChatAction, ChatOptions, FailurePolicy, Submission, TreeChatbot};
pub use wrap::wrap_text;
