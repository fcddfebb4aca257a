//! Shared HTTP plumbing for the backends: posts a JSON body and maps the
//! outcome onto `AnalysisError`.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::{AnalysisError, ProviderId};

const MAX_ERROR_MESSAGE_CHARS: usize = 300;

/// One reqwest client shared by every backend. No timeout is configured here;
/// calls run under reqwest's defaults.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Sends `request` with `body` as JSON and deserializes a 2xx response
    /// into `T`.
    pub async fn send_json<B, T>(
        &self,
        provider: ProviderId,
        request: RequestBuilder,
        body: &B,
    ) -> Result<T, AnalysisError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| AnalysisError::NetworkFailure(format!("{provider}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AnalysisError::NetworkFailure(format!("{provider}: {e}")))?;

        if !status.is_success() {
            warn!(%provider, status = status.as_u16(), "Provider returned an error status");
            return Err(classify_failure(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            AnalysisError::MalformedResponse(format!("{provider} returned an unexpected payload: {e}"))
        })
    }
}

/// Maps a non-2xx status and its body onto the error taxonomy.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> AnalysisError {
    let message = error_message(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AnalysisError::CredentialInvalid(message)
        }
        StatusCode::TOO_MANY_REQUESTS => AnalysisError::RateLimited(message),
        StatusCode::BAD_REQUEST if mentions_invalid_key(body) => {
            AnalysisError::CredentialInvalid(message)
        }
        // Outages and any other refusal count as a failed exchange.
        _ => AnalysisError::NetworkFailure(format!("status {}: {message}", status.as_u16())),
    }
}

/// Gemini reports a bad key as 400 INVALID_ARGUMENT rather than 401.
fn mentions_invalid_key(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("api_key_invalid") || lower.contains("api key not valid")
}

/// Pulls a human-readable message out of a provider error body.
///
/// Providers disagree on the shape: `{"error": {"message": ..}}`,
/// `{"message": ..}` and `{"error": ".."}` all occur.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("message"))
            .or_else(|| v.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return "empty error body".to_string();
    }
    message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Echo {
        text: String,
    }

    #[test]
    fn test_classify_unauthorized_as_credential_invalid() {
        let err = classify_failure(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key provided"}}"#,
        );
        match err {
            AnalysisError::CredentialInvalid(msg) => assert_eq!(msg, "Incorrect API key provided"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_classify_429_as_rate_limited() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, r#"{"message": "too many"}"#);
        assert!(matches!(err, AnalysisError::RateLimited(ref m) if m == "too many"));
    }

    #[test]
    fn test_classify_gemini_bad_key() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code(), "CREDENTIAL_INVALID");
    }

    #[test]
    fn test_classify_server_error_as_network_failure() {
        let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, "model is loading");
        match err {
            AnalysisError::NetworkFailure(msg) => assert_eq!(msg, "status 503: model is loading"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_message_handles_string_error_field() {
        assert_eq!(
            error_message(r#"{"error": "Authorization header is invalid"}"#),
            "Authorization header is invalid"
        );
        assert_eq!(error_message(""), "empty error body");
    }

    #[tokio::test]
    async fn test_send_json_decodes_success_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_body(mockito::Matcher::Json(json!({"q": "hi"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text": "hello"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new();
        let request = transport.post(&format!("{}/echo", server.url()));
        let echo: Echo = transport
            .send_json(ProviderId::OpenAi, request, &json!({"q": "hi"}))
            .await
            .unwrap();

        assert_eq!(echo.text, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_json_reports_unexpected_shape() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/echo")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let transport = HttpTransport::new();
        let request = transport.post(&format!("{}/echo", server.url()));
        let err = transport
            .send_json::<_, Echo>(ProviderId::Cohere, request, &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MALFORMED_RESPONSE");
    }

    #[tokio::test]
    async fn test_send_json_reports_connection_failure() {
        let transport = HttpTransport::new();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let request = transport.post("http://127.0.0.1:9/unreachable");
        let err = transport
            .send_json::<_, Echo>(ProviderId::Gemini, request, &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NETWORK_FAILURE");
    }
}
