//! Structured model calls: parse-with-validation plus one corrective retry.
//!
//! A raw single-shot call that trusts the model's output shape is the main
//! reliability gap in this kind of tool, so every structured request goes
//! through here: the reply is validated by parsing, and a malformed first
//! reply earns exactly one retry with the bad reply echoed back and a
//! corrective instruction appended.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::warn;

use brochure_shared::{BrochureError, Result};

use crate::client::{ChatMessage, OllamaClient};

/// Instruction appended when the first reply fails validation.
const RETRY_INSTRUCTION: &str = "Your previous reply was not valid JSON in the requested shape. \
    Respond again with only the JSON object — no prose, no code fences.";

/// Strip a wrapping markdown code fence (```json, ```markdown, bare ```),
/// returning the inner text. Text without a fence is returned trimmed.
pub fn strip_code_fences(raw: &str) -> String {
    static FENCED: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("valid regex")
    });

    let trimmed = raw.trim();
    match FENCED.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => trimmed.to_string(),
    }
}

/// Parse a model reply into `T`, stripping code fences first.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| {
        let preview: String = cleaned.chars().take(200).collect();
        BrochureError::relevance_parse(format!("{e} (got: {preview})"))
    })
}

/// Ask the model for a JSON reply and parse it into `T`.
///
/// On a parse failure the malformed reply is echoed back as an assistant
/// message with [`RETRY_INSTRUCTION`], and the model is asked once more.
/// A second parse failure aborts with [`BrochureError::RelevanceParse`].
pub async fn request_structured<T: DeserializeOwned>(
    client: &OllamaClient,
    messages: &[ChatMessage],
) -> Result<T> {
    let first = client.chat_json(messages).await?;

    match parse_structured(&first) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            warn!(error = %first_err, "model reply failed validation, retrying once");

            let mut retry = messages.to_vec();
            retry.push(ChatMessage::assistant(first));
            retry.push(ChatMessage::user(RETRY_INSTRUCTION));

            let second = client.chat_json(&retry).await?;
            parse_structured(&second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brochure_shared::LinkSelection;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply_body(content: &str) -> String {
        serde_json::json!({
            "message": {"role": "assistant", "content": content},
            "done": true,
        })
        .to_string()
    }

    const SELECTION_JSON: &str =
        r#"{"links": [{"type": "about page", "url": "https://example.com/about"}]}"#;

    #[test]
    fn strips_json_fence() {
        let fenced = "```json\n{\"links\": []}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"links\": []}");
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = "```\n{\"links\": []}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"links\": []}");
    }

    #[test]
    fn unfenced_text_is_trimmed_only() {
        assert_eq!(strip_code_fences("  {\"links\": []} \n"), "{\"links\": []}");
    }

    #[test]
    fn parses_selection_through_fence() {
        let fenced = format!("```json\n{SELECTION_JSON}\n```");
        let selection: LinkSelection = parse_structured(&fenced).unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.links[0].category, "about page");
    }

    #[test]
    fn malformed_reply_is_relevance_parse_error() {
        let err = parse_structured::<LinkSelection>("here are the links you wanted!").unwrap_err();
        assert!(matches!(err, BrochureError::RelevanceParse { .. }));
    }

    #[tokio::test]
    async fn first_reply_good_needs_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_body(SELECTION_JSON)))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2", 5).unwrap();
        let selection: LinkSelection =
            request_structured(&client, &[ChatMessage::user("pick links")])
                .await
                .unwrap();
        assert_eq!(selection.len(), 1);
    }

    #[tokio::test]
    async fn malformed_first_reply_is_retried_once() {
        let server = MockServer::start().await;

        // First call: prose instead of JSON. Second call: valid selection.
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_body("Sure! Here you go")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_body(SELECTION_JSON)))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2", 5).unwrap();
        let selection: LinkSelection =
            request_structured(&client, &[ChatMessage::user("pick links")])
                .await
                .unwrap();
        assert_eq!(selection.len(), 1);
    }

    #[tokio::test]
    async fn two_malformed_replies_abort() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_body("not json")))
            .expect(2)
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2", 5).unwrap();
        let err = request_structured::<LinkSelection>(&client, &[ChatMessage::user("pick")])
            .await
            .unwrap_err();
        assert!(matches!(err, BrochureError::RelevanceParse { .. }));
    }
}
