use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::api::{ChatRequest, ChatResponse};
use crate::utils::url::construct_api_url;

/// Failure of a single completion call. Details are meant for logs; the
/// session reports a generic error to the user.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {summary}")]
    Status { status: StatusCode, summary: String },

    #[error("could not decode completion response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// The remote side of a conversation: one request in, one response out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, CompletionError>;
}

/// Talks to an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpCompletionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        construct_api_url(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, CompletionError> {
        let url = self.endpoint();
        debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CompletionError::Status {
                status,
                summary: summarize_api_error(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One-line description of an error body, preferring the provider's
/// `error.message` when the body is JSON.
pub(crate) fn summarize_api_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value).filter(|s| !s.is_empty()) {
            return summary;
        }
        return json_value.to_string();
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatMessage;
    use crate::core::message::Message;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> ChatRequest {
        ChatRequest {
            model: "test-model".to_string(),
            messages: vec![
                ChatMessage::from(&Message::system("You are Ava")),
                ChatMessage::from(&Message::user("Hi")),
            ],
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 1.0,
            stream: false,
            stop: None,
        }
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = HttpCompletionClient::new("https://api.example.com/v1/", "key");
        assert_eq!(
            client.endpoint(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn summarize_prefers_error_message() {
        let body = r#"{"error":{"message":"rate   limit\nexceeded","type":"rate_limit"}}"#;
        assert_eq!(summarize_api_error(body), "rate limit exceeded");
        assert_eq!(summarize_api_error(r#"{"error":"bad key"}"#), "bad key");
        assert_eq!(summarize_api_error(r#"{"status":"failed"}"#), r#"{"status":"failed"}"#);
        assert_eq!(summarize_api_error("  "), "<empty>");
        assert_eq!(summarize_api_error("gateway\ntimeout"), "gateway timeout");
    }

    #[tokio::test]
    async fn posts_request_with_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "top_p": 1.0,
                "stream": false,
                "messages": [{"role": "system"}, {"role": "user", "content": "Hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpCompletionClient::new(format!("{}/v1", server.uri()), "secret");
        let response = client.complete(&sample_request()).await.unwrap();
        assert_eq!(response.first_content(), Some("Hello!"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit reached"}
            })))
            .mount(&server)
            .await;

        let client = HttpCompletionClient::new(server.uri(), "secret");
        let err = client.complete(&sample_request()).await.unwrap_err();
        match err {
            CompletionError::Status { status, summary } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(summary, "Rate limit reached");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = HttpCompletionClient::new(server.uri(), "secret");
        let err = client.complete(&sample_request()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Decode(_)));
    }
}
