//! Streaming relay from a completion provider to an HTTP response body
//!
//! A [`Relay`] is single-use: [`Relay::open`] consumes it and, once the
//! upstream accepted the request, hands back a [`RelayStream`] of body
//! chunks. Text is forwarded in arrival order, empty deltas are skipped,
//! and an upstream failure surfaces as an `Err` item so the server aborts
//! the response instead of closing it cleanly.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use axum::body::Bytes;
use futures::Stream;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::llm::{CompletionProvider, CompletionRequest, EventStream, LlmError, StreamEvent};

/// Lifecycle of one relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

#[derive(Error, Debug)]
pub enum RelayError {
    /// The upstream never started streaming
    #[error("Failed to open completion stream: {0}")]
    Open(#[from] LlmError),

    /// The upstream failed after streaming began
    #[error("Completion stream failed: {reason}")]
    Upstream { reason: String },
}

pub struct Relay {
    provider: Arc<dyn CompletionProvider>,
    state: RelayState,
}

impl Relay {
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            state: RelayState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Start the upstream completion; no byte is produced before this succeeds
    pub async fn open(mut self, request: CompletionRequest) -> Result<RelayStream, RelayError> {
        self.state = RelayState::Requesting;
        debug!("Requesting completion from {}", self.provider.name());

        match self.provider.stream(request).await {
            Ok(events) => {
                info!("Completion stream opened via {}", self.provider.name());
                Ok(RelayStream::new(events))
            }
            Err(e) => {
                self.state = RelayState::Failed;
                error!("Completion stream could not be opened: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Body chunks of an open relay
pub struct RelayStream {
    events: EventStream,
    state: RelayState,
    chunks_sent: usize,
    bytes_sent: usize,
}

impl RelayStream {
    fn new(events: EventStream) -> Self {
        Self {
            events,
            state: RelayState::Streaming,
            chunks_sent: 0,
            bytes_sent: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> RelayState {
        self.state
    }

    fn complete(&mut self) {
        self.state = RelayState::Completed;
        info!(
            "Completion stream finished: {} chunks, {} bytes",
            self.chunks_sent, self.bytes_sent
        );
    }
}

impl Stream for RelayStream {
    type Item = Result<Bytes, RelayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.state != RelayState::Streaming {
                return Poll::Ready(None);
            }

            match ready!(this.events.as_mut().poll_next(cx)) {
                Some(StreamEvent::TextDelta(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    this.chunks_sent += 1;
                    this.bytes_sent += text.len();
                    return Poll::Ready(Some(Ok(Bytes::from(text))));
                }
                Some(StreamEvent::StreamEnd) | None => {
                    this.complete();
                    return Poll::Ready(None);
                }
                Some(StreamEvent::StreamError(reason)) => {
                    this.state = RelayState::Failed;
                    error!(
                        "Completion stream failed after {} chunks: {}",
                        this.chunks_sent, reason
                    );
                    return Poll::Ready(Some(Err(RelayError::Upstream { reason })));
                }
            }
        }
    }
}

impl Drop for RelayStream {
    fn drop(&mut self) {
        if self.state == RelayState::Streaming {
            warn!(
                "Client disconnected after {} chunks, closing completion stream",
                self.chunks_sent
            );
        }
    }
}
