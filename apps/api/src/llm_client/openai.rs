//! OpenAI chat completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::HttpTransport;
use super::{AnalysisError, CompletionBackend, Credential, ProviderConfig, ProviderId};

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiBackend {
    transport: HttpTransport,
}

impl OpenAiBackend {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn send(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        credential: &Credential,
    ) -> Result<String, AnalysisError> {
        let body = ChatRequest {
            model: &config.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: config.max_output_tokens,
            temperature: TEMPERATURE,
        };

        let request = self
            .transport
            .post(&config.endpoint("/v1/chat/completions"))
            .bearer_auth(credential.expose());

        let response: ChatResponse = self
            .transport
            .send_json(ProviderId::OpenAi, request, &body)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("openai returned no completion choice".to_string())
            })
    }
}
