//! HTTP client for the Ollama chat API.
//!
//! One client per run; the endpoint and model are explicit construction
//! parameters, never ambient state.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use brochure_shared::{BrochureError, Result};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single chat message in the Ollama conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user", or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    /// Build an assistant message (used to echo a prior model reply back).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/chat`.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    /// "json" forces the model to emit a JSON object.
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
    #[serde(default)]
    prompt_eval_count: Option<i64>,
    #[serde(default)]
    eval_count: Option<i64>,
}

/// One newline-delimited chunk of a streaming response.
#[derive(Debug, Deserialize)]
struct OllamaStreamChunk {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for a local Ollama-compatible chat endpoint.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for the given endpoint and model.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BrochureError::Model(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// The model this client talks to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat request and return the raw response, with status mapped
    /// to [`BrochureError::Model`].
    async fn send(&self, request: &OllamaChatRequest<'_>) -> Result<reqwest::Response> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(%url, model = %self.model, stream = request.stream, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BrochureError::Model(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrochureError::Model(format!(
                "model service returned HTTP {status}: {body}"
            )));
        }

        Ok(response)
    }

    /// One chat completion, returned whole.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.complete(messages, None).await
    }

    /// One chat completion with `format: "json"` — the reply is expected to
    /// be a single JSON object.
    pub async fn chat_json(&self, messages: &[ChatMessage]) -> Result<String> {
        self.complete(messages, Some("json")).await
    }

    async fn complete(&self, messages: &[ChatMessage], format: Option<&str>) -> Result<String> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format,
        };

        let response = self.send(&request).await?;
        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| BrochureError::Model(format!("failed to parse model response: {e}")))?;

        debug!(
            tokens_in = body.prompt_eval_count.unwrap_or(0),
            tokens_out = body.eval_count.unwrap_or(0),
            "chat completion finished"
        );

        Ok(body.message.content)
    }

    /// Streamed chat completion. `on_token` receives each content fragment as
    /// it arrives; the full accumulated text is returned at the end.
    pub async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        on_token: &mut dyn FnMut(&str),
    ) -> Result<String> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: true,
            format: None,
        };

        let response = self.send(&request).await?;
        let mut stream = response.bytes_stream();

        // Chunks are newline-delimited JSON, but chunk boundaries do not
        // align with line boundaries — buffer until a full line arrives.
        let mut buffer = String::new();
        let mut full = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes =
                chunk.map_err(|e| BrochureError::Model(format!("stream read failed: {e}")))?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].trim().to_string();
                buffer.drain(..=pos);

                if line.is_empty() {
                    continue;
                }

                let parsed: OllamaStreamChunk = serde_json::from_str(&line).map_err(|e| {
                    BrochureError::Model(format!("invalid stream chunk: {e}"))
                })?;

                if let Some(message) = parsed.message {
                    if !message.content.is_empty() {
                        on_token(&message.content);
                        full.push_str(&message.content);
                    }
                }

                if parsed.done {
                    return Ok(full);
                }
            }
        }

        Ok(full)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply_body(content: &str) -> String {
        serde_json::json!({
            "message": {"role": "assistant", "content": content},
            "done": true,
            "prompt_eval_count": 12,
            "eval_count": 34,
        })
        .to_string()
    }

    #[test]
    fn request_serializes_format_only_when_set() {
        let messages = vec![ChatMessage::user("hi")];

        let plain = OllamaChatRequest {
            model: "llama3.2",
            messages: &messages,
            stream: false,
            format: None,
        };
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("format"));

        let formatted = OllamaChatRequest {
            model: "llama3.2",
            messages: &messages,
            stream: false,
            format: Some("json"),
        };
        let json = serde_json::to_string(&formatted).unwrap();
        assert!(json.contains(r#""format":"json""#));
    }

    #[test]
    fn response_deserializes() {
        let body: OllamaChatResponse = serde_json::from_str(&reply_body("hello")).unwrap();
        assert_eq!(body.message.content, "hello");
        assert_eq!(body.prompt_eval_count, Some(12));
        assert_eq!(body.eval_count, Some(34));
    }

    #[test]
    fn stream_chunk_deserializes_final_marker() {
        let chunk: OllamaStreamChunk =
            serde_json::from_str(r#"{"done": true, "message": {"role": "assistant", "content": ""}}"#)
                .unwrap();
        assert!(chunk.done);
    }

    #[tokio::test]
    async fn chat_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_body("a brochure")))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2", 5).unwrap();
        let reply = client.chat(&[ChatMessage::user("write")]).await.unwrap();
        assert_eq!(reply, "a brochure");
    }

    #[tokio::test]
    async fn chat_json_requests_json_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_string_contains(r#""format":"json""#))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_body("{}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2", 5).unwrap();
        let reply = client.chat_json(&[ChatMessage::user("pick")]).await.unwrap();
        assert_eq!(reply, "{}");
    }

    #[tokio::test]
    async fn error_status_is_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "missing-model", 5).unwrap();
        let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, BrochureError::Model(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn chat_stream_accumulates_tokens() {
        let ndjson = concat!(
            r##"{"message":{"role":"assistant","content":"# Ex"},"done":false}"##,
            "\n",
            r#"{"message":{"role":"assistant","content":"ample"},"done":false}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":""},"done":true}"#,
            "\n",
        );

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ndjson))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2", 5).unwrap();
        let mut seen = Vec::new();
        let full = client
            .chat_stream(&[ChatMessage::user("write")], &mut |t| {
                seen.push(t.to_string())
            })
            .await
            .unwrap();

        assert_eq!(full, "# Example");
        assert_eq!(seen, vec!["# Ex", "ample"]);
    }

    // Integration test (requires a running Ollama instance).
    #[tokio::test]
    #[ignore]
    async fn chat_against_live_endpoint() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.2", 120).unwrap();
        let reply = client
            .chat(&[ChatMessage::user("Say hello in one word")])
            .await
            .unwrap();
        assert!(!reply.is_empty());
    }
}
