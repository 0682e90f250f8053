//! Folds stream events into a growing assistant message.

use crate::provider::{ChatMessage, StreamEvent};

/// Builder that owns the streaming assistant placeholder and applies
/// deltas to it.
///
/// The `content` and `thinking` accumulators are independent: a frame may
/// feed either or both, and neither ever overwrites the other.
#[derive(Debug, Clone)]
pub struct MessageAssembler {
    message: ChatMessage,
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self {
            message: ChatMessage::streaming_placeholder(),
        }
    }

    /// Applies a single stream event.
    pub fn apply(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::ContentDelta(text) => self.message.content.push_str(text),
            StreamEvent::ThinkingDelta(text) => {
                self.message
                    .thinking
                    .get_or_insert_with(String::new)
                    .push_str(text);
            }
            StreamEvent::Completed => self.message.is_streaming = false,
        }
    }

    /// Current state of the message being assembled.
    pub fn message(&self) -> &ChatMessage {
        &self.message
    }

    /// Consumes the assembler, returning the message as-is.
    pub fn finish(self) -> ChatMessage {
        self.message
    }
}
