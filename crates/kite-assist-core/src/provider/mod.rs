//! OpenAI-compatible chat completions client and streaming types.

mod client;
mod sse;
mod types;

pub use client::{ChatClient, ChatClientConfig, CHAT_COMPLETIONS_PATH, MODELS_PATH};
pub use types::{
    AssistError, AssistErrorKind, AssistResult, AssistStream, ChatMessage, ChatTurn, Role,
    StreamEvent,
};
