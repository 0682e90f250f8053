//! Core engine for the kite-assist chat assistant.
//!
//! Provides the streaming chat client, message assembly, session state,
//! settings persistence, offline fallback replies, and the lightweight
//! markdown block renderer consumed by frontends.

pub mod assembler;
pub mod fallback;
pub mod markdown;
pub mod provider;
pub mod session;
pub mod settings;

pub use assembler::MessageAssembler;
pub use provider::{
    AssistError, AssistErrorKind, AssistResult, AssistStream, ChatClient, ChatClientConfig,
    ChatMessage, ChatTurn, Role, StreamEvent,
};
pub use session::ChatSession;
pub use settings::{AssistSettings, SettingsStore};
