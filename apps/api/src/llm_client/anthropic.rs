//! Anthropic Messages API backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::HttpTransport;
use super::{AnalysisError, CompletionBackend, Credential, ProviderConfig, ProviderId};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

impl AnthropicResponse {
    /// Text of the first `text` block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

pub struct AnthropicBackend {
    transport: HttpTransport,
}

impl AnthropicBackend {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn send(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        credential: &Credential,
    ) -> Result<String, AnalysisError> {
        let body = AnthropicRequest {
            model: &config.model_name,
            max_tokens: config.max_output_tokens,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let request = self
            .transport
            .post(&config.endpoint("/v1/messages"))
            .header("x-api-key", credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION);

        let response: AnthropicResponse = self
            .transport
            .send_json(ProviderId::Anthropic, request, &body)
            .await?;

        response
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("anthropic returned no text block".to_string())
            })
    }
}
