//! Groq chat completions over the OpenAI-compatible SSE protocol

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{CompletionProvider, CompletionRequest, EventStream, LlmError, StreamEvent};
use crate::config::LlmConfig;
use crate::http_client::USER_AGENT;

const DONE_MARKER: &str = "[DONE]";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// One `data:` frame of a streamed completion
#[derive(Debug, Deserialize)]
struct ChunkFrame {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>, config: &LlmConfig) -> Result<Self, LlmError> {
        // No overall timeout: generation may legitimately stream for minutes
        let timeout = Duration::from_secs(config.timeout_seconds.into());
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LlmError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn stream(&self, request: CompletionRequest) -> Result<EventStream, LlmError> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Opening completion stream at {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Connect {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            error!("Completion API rejected request ({}): {}", status, body);
            return Err(LlmError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(sse_event_stream(response.bytes_stream()))
    }
}

/// Adapt a raw SSE byte stream into completion events.
///
/// The stream ends right after the first terminal event.
pub fn sse_event_stream<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = SseDecoder::default();

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for event in decoder.push(chunk.as_ref()) {
                        let terminal = !matches!(event, StreamEvent::TextDelta(_));
                        yield event;
                        if terminal {
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!("Completion stream broke off: {}", e);
                    yield StreamEvent::StreamError(format!("Upstream connection failed: {e}"));
                    return;
                }
            }
        }

        for event in decoder.finish() {
            yield event;
        }
    })
}

/// Incremental line decoder for `data:` frames
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    finish_seen: bool,
}

impl SseDecoder {
    /// Feed raw bytes, returning the events of every completed line
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            self.decode_line(line.trim_end_matches(['\r', '\n']), &mut events);
            if events
                .last()
                .is_some_and(|event| !matches!(event, StreamEvent::TextDelta(_)))
            {
                break;
            }
        }
        events
    }

    /// Remaining events once the byte stream is exhausted, ending in a terminal one
    pub fn finish(mut self) -> Vec<StreamEvent> {
        let rest = std::mem::take(&mut self.pending);
        let mut events = Vec::new();
        self.decode_line(String::from_utf8_lossy(&rest).trim_end(), &mut events);
        if events
            .last()
            .is_some_and(|event| !matches!(event, StreamEvent::TextDelta(_)))
        {
            return events;
        }

        events.push(if self.finish_seen {
            StreamEvent::StreamEnd
        } else {
            StreamEvent::StreamError("Completion stream ended unexpectedly".to_string())
        });
        events
    }

    fn decode_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        // Blank separators, comments and event/id fields carry no payload
        let Some(payload) = line.strip_prefix("data:") else {
            return;
        };
        let payload = payload.trim();
        if payload.is_empty() {
            return;
        }
        if payload == DONE_MARKER {
            events.push(StreamEvent::StreamEnd);
            return;
        }

        let frame: ChunkFrame = match serde_json::from_str(payload) {
            Ok(frame) => frame,
            Err(e) => {
                events.push(StreamEvent::StreamError(format!(
                    "Malformed completion frame: {e}"
                )));
                return;
            }
        };

        if let Some(err) = frame.error {
            events.push(StreamEvent::StreamError(error_message(&err)));
            return;
        }

        for choice in frame.choices {
            if let Some(content) = choice.delta.content {
                events.push(StreamEvent::TextDelta(content));
            }
            if choice.finish_reason.is_some() {
                self.finish_seen = true;
            }
        }
    }
}

fn error_message(err: &Value) -> String {
    err.get("message")
        .and_then(Value::as_str)
        .map_or_else(|| err.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use httpmock::prelude::*;

    fn delta_frame(text: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({ "choices": [{ "index": 0, "delta": { "content": text }, "finish_reason": null }] })
        )
    }

    const FINISH_FRAME: &str =
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n";

    async fn collect(chunks: Vec<Result<String, String>>) -> Vec<StreamEvent> {
        sse_event_stream(stream::iter(chunks)).collect().await
    }

    #[tokio::test]
    async fn test_deltas_then_done() {
        let body = format!("{}{}{}data: [DONE]\n\n", delta_frame("Day 1: "), delta_frame("Visit Riyadh."), FINISH_FRAME);
        let events = collect(vec![Ok(body)]).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("Day 1: ".to_string()),
                StreamEvent::TextDelta("Visit Riyadh.".to_string()),
                StreamEvent::StreamEnd,
            ]
        );
    }

    #[tokio::test]
    async fn test_frames_split_across_chunks() {
        let body = format!("{}data: [DONE]\n\n", delta_frame("مرحبا Riyadh"));
        let bytes = body.as_bytes();
        // Split inside the multi-byte Arabic text
        let cut = body.find("مرحبا").unwrap() + 1;
        let chunks = vec![
            Ok::<_, String>(bytes[..cut].to_vec()),
            Ok(bytes[cut..].to_vec()),
        ];
        let events: Vec<StreamEvent> = sse_event_stream(stream::iter(chunks)).collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("مرحبا Riyadh".to_string()),
                StreamEvent::StreamEnd,
            ]
        );
    }

    #[tokio::test]
    async fn test_error_frame() {
        let body = format!(
            "{}data: {{\"error\":{{\"message\":\"rate limit reached\",\"type\":\"tokens\"}}}}\n\n{}",
            delta_frame("partial"),
            delta_frame("never seen")
        );
        let events = collect(vec![Ok(body)]).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("partial".to_string()),
                StreamEvent::StreamError("rate limit reached".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_frame() {
        let events = collect(vec![Ok("data: {not json\n\n".to_string())]).await;
        assert!(matches!(events.as_slice(), [StreamEvent::StreamError(_)]));
    }

    #[tokio::test]
    async fn test_connection_error_mid_stream() {
        let events = collect(vec![Ok(delta_frame("Day 1: ")), Err("connection reset".to_string())]).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::TextDelta("Day 1: ".to_string()));
        assert!(matches!(&events[1], StreamEvent::StreamError(reason) if reason.contains("connection reset")));
    }

    #[tokio::test]
    async fn test_truncated_stream_is_an_error() {
        let events = collect(vec![Ok(delta_frame("Day 1: "))]).await;
        assert!(matches!(events.last(), Some(StreamEvent::StreamError(_))));
    }

    #[tokio::test]
    async fn test_finish_reason_without_done_ends_cleanly() {
        let body = format!("{}{}", delta_frame("Done."), FINISH_FRAME);
        let events = collect(vec![Ok(body)]).await;
        assert_eq!(events.last(), Some(&StreamEvent::StreamEnd));
    }

    #[tokio::test]
    async fn test_trailing_done_without_newline() {
        let body = format!("{}data: [DONE]", delta_frame("Last words"));
        let events = collect(vec![Ok(body)]).await;
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta("Last words".to_string()), StreamEvent::StreamEnd]
        );
    }

    #[test]
    fn test_decoder_ignores_comments_and_event_fields() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b": keep-alive\nevent: message\nid: 7\n\n");
        assert!(events.is_empty());
    }

    fn llm_config(server: &MockServer) -> LlmConfig {
        LlmConfig {
            base_url: server.url("/openai/v1"),
            timeout_seconds: 5,
            ..LlmConfig::default()
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "You are a planner".to_string(),
            user: "Plan a trip".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    #[tokio::test]
    async fn test_stream_against_mock_api() {
        let server = MockServer::start_async().await;
        let body = format!("{}{}data: [DONE]\n\n", delta_frame("Marhaba"), FINISH_FRAME);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/openai/v1/chat/completions")
                    .header("authorization", "Bearer test-key-123")
                    .json_body_partial(r#"{"model":"llama-3.1-8b-instant","stream":true,"max_tokens":4000}"#);
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(body);
            })
            .await;

        let client = GroqClient::new("test-key-123", &llm_config(&server)).unwrap();
        let events: Vec<StreamEvent> = client.stream(request()).await.unwrap().collect().await;

        mock.assert_async().await;
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta("Marhaba".to_string()), StreamEvent::StreamEnd]
        );
    }

    #[tokio::test]
    async fn test_rejected_request() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(401).body(r#"{"error":{"message":"Invalid API Key"}}"#);
            })
            .await;

        let client = GroqClient::new("bad-key-123", &llm_config(&server)).unwrap();
        let result = client.stream(request()).await;
        assert!(matches!(result, Err(LlmError::Rejected { status: 401, .. })));
    }
}
