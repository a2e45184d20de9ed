//! Streaming chat-completion providers
//!
//! A provider turns a prompt pair into a stream of [`StreamEvent`]s. The
//! relay only ever sees this trait, so tests can drive it with scripted
//! event sequences instead of a live API.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::prompt::PromptPair;

pub mod groq;

pub use groq::GroqClient;

/// One upstream event of a streamed completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of generated text, possibly empty
    TextDelta(String),
    /// The provider finished the completion
    StreamEnd,
    /// The provider or the connection failed mid-stream
    StreamError(String),
}

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Everything needed to start one streamed completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompts: PromptPair, config: &LlmConfig) -> Self {
        Self {
            system: prompts.system,
            user: prompts.user,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Errors raised before any text has been streamed
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Failed to reach completion API: {message}")]
    Connect { message: String },

    #[error("Completion API returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to build completion client: {message}")]
    Client { message: String },
}

/// A chat-completion backend that streams its output
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Start a streamed completion.
    ///
    /// Returns once the upstream accepted the request; generation errors
    /// after that point arrive as [`StreamEvent::StreamError`].
    async fn stream(&self, request: CompletionRequest) -> Result<EventStream, LlmError>;
}
