//! Chat session state and turn orchestration.

use anyhow::Result;
use futures_util::StreamExt;

use crate::assembler::MessageAssembler;
use crate::fallback::{WELCOME_MESSAGE, fallback_reply};
use crate::provider::{
    AssistResult, ChatClient, ChatClientConfig, ChatMessage, ChatTurn, StreamEvent,
};
use crate::settings::AssistSettings;

/// A single chat session: owns its message list and at most one active
/// stream.
///
/// Exclusivity is structural: `send` takes `&mut self` and rejects a new
/// submission while the tail message is still streaming. There is no
/// queue and no locking; cancellation is best-effort by dropping the
/// in-flight future.
pub struct ChatSession {
    client: ChatClient,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Creates a session seeded with the welcome message.
    ///
    /// # Errors
    /// Returns a `Configuration` error when the settings are incomplete,
    /// before any request is attempted.
    pub fn new(settings: &AssistSettings) -> AssistResult<Self> {
        let config = ChatClientConfig::from_settings(settings)?;
        Ok(Self {
            client: ChatClient::new(config),
            messages: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// True while an assistant reply is still being streamed.
    pub fn is_streaming(&self) -> bool {
        self.messages.last().is_some_and(|m| m.is_streaming)
    }

    /// Drops all history and re-seeds the welcome message.
    pub fn reset(&mut self) {
        self.messages = vec![ChatMessage::assistant(WELCOME_MESSAGE)];
    }

    /// Submits a user turn and streams the assistant reply.
    ///
    /// `on_event` fires for every delta, for incremental display. On
    /// request or transport failure the in-progress placeholder is
    /// discarded and a synthesized offline reply is pushed instead, so
    /// the caller never sees a stuck streaming message; the underlying
    /// error is logged, not returned.
    ///
    /// # Errors
    /// Returns an error for empty input or while a prior turn is still
    /// in flight.
    pub async fn send(
        &mut self,
        input: &str,
        mut on_event: impl FnMut(&StreamEvent),
    ) -> Result<&ChatMessage> {
        let input = input.trim();
        if input.is_empty() {
            anyhow::bail!("Nothing to send");
        }
        if self.is_streaming() {
            anyhow::bail!("A reply is still streaming; wait for it to finish");
        }

        let mut turns: Vec<ChatTurn> = self.messages.iter().map(ChatTurn::from).collect();
        turns.push(ChatTurn {
            role: crate::provider::Role::User,
            content: input.to_string(),
        });

        self.messages.push(ChatMessage::user(input));

        let mut assembler = MessageAssembler::new();
        // Placeholder goes into the list up front so `is_streaming` holds
        // while the stream is in flight.
        self.messages.push(assembler.message().clone());

        let mut stream = match self.client.send_stream(&turns).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(kind = %err.kind, error = %err, "chat request failed, falling back");
                return Ok(self.replace_placeholder_with_fallback(input));
            }
        };

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    assembler.apply(&event);
                    on_event(&event);
                    if event == StreamEvent::Completed {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(kind = %err.kind, error = %err, "chat stream failed, falling back");
                    return Ok(self.replace_placeholder_with_fallback(input));
                }
            }
        }

        let mut message = assembler.finish();
        // The parser always terminates with Completed, but never leave a
        // finished turn marked as streaming.
        message.is_streaming = false;

        let last = self.messages.last_mut().expect("placeholder present");
        *last = message;
        Ok(self.messages.last().expect("message just stored"))
    }

    fn replace_placeholder_with_fallback(&mut self, input: &str) -> &ChatMessage {
        self.messages.pop();
        self.messages.push(ChatMessage::assistant(fallback_reply(input)));
        self.messages.last().expect("fallback just stored")
    }
}
