//! SSE frame parser for OpenAI-compatible chat completions.

use std::collections::VecDeque;
use std::pin::Pin;

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;
use serde_json::Value;

use super::types::{AssistError, AssistErrorKind, AssistResult, StreamEvent};

/// Appends a blank line when the inner byte stream ends so the SSE decoder
/// flushes a final event that arrived without a trailing separator.
struct SseTerminatedStream<S> {
    inner: S,
    emitted_terminator: bool,
}

impl<S> SseTerminatedStream<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            emitted_terminator: false,
        }
    }
}

impl<S, E> Stream for SseTerminatedStream<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
{
    type Item = std::result::Result<bytes::Bytes, E>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        if self.emitted_terminator {
            return Poll::Ready(None);
        }

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(item)) => Poll::Ready(Some(item)),
            Poll::Ready(None) => {
                self.emitted_terminator = true;
                Poll::Ready(Some(Ok(bytes::Bytes::from_static(b"\n\n"))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Streaming parser that folds `data:` frames into delta events.
///
/// Byte chunks are accumulated by the SSE decoder, so splits inside
/// multi-byte UTF-8 sequences or inside a `data: ` prefix do not change
/// the decoded output. A malformed frame is logged and skipped; it never
/// aborts the stream.
pub(crate) struct DeltaSseParser<S> {
    inner: EventStream<SseTerminatedStream<S>>,
    pending: VecDeque<StreamEvent>,
    emitted_completed: bool,
}

impl<S> DeltaSseParser<S> {
    pub(crate) fn new<E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    {
        Self {
            inner: SseTerminatedStream::new(stream).eventsource(),
            pending: VecDeque::new(),
            emitted_completed: false,
        }
    }

    fn handle_event_data(&mut self, data: &str) {
        let trimmed = data.trim();
        if trimmed.is_empty() || trimmed == "[DONE]" {
            return;
        }

        let value = match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => value,
            Err(err) => {
                // Malformed-frame tolerance: one bad frame must not take
                // down the rest of the stream.
                tracing::warn!(error = %err, "skipping malformed SSE frame");
                return;
            }
        };

        let Some(delta) = value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("delta"))
        else {
            return;
        };

        // A single frame may carry content, thinking, or both. The two
        // accumulators are independent; content is emitted first.
        if let Some(text) = delta.get("content").and_then(|v| v.as_str())
            && !text.is_empty()
        {
            self.pending
                .push_back(StreamEvent::ContentDelta(text.to_string()));
        }

        // `thinking` per the kite contract; `reasoning_content`/`reasoning`
        // are aliases used by other OpenAI-compatible backends.
        if let Some(thinking) = delta
            .get("thinking")
            .or_else(|| delta.get("reasoning_content"))
            .or_else(|| delta.get("reasoning"))
            .and_then(|v| v.as_str())
            && !thinking.is_empty()
        {
            self.pending
                .push_back(StreamEvent::ThinkingDelta(thinking.to_string()));
        }
    }
}

impl<S, E> Stream for DeltaSseParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = AssistResult<StreamEvent>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            if self.emitted_completed {
                return Poll::Ready(None);
            }

            let inner = Pin::new(&mut self.inner);
            match inner.poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    self.handle_event_data(&event.data);
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(AssistError::new(
                        AssistErrorKind::Parse,
                        format!("SSE stream error: {e}"),
                    ))));
                }
                Poll::Ready(None) => {
                    self.emitted_completed = true;
                    return Poll::Ready(Some(Ok(StreamEvent::Completed)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
