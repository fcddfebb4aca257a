//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::HttpTransport;
use super::{AnalysisError, CompletionBackend, Credential, ProviderConfig, ProviderId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

pub struct GeminiBackend {
    transport: HttpTransport,
}

impl GeminiBackend {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn send(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        credential: &Credential,
    ) -> Result<String, AnalysisError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: config.max_output_tokens,
            },
        };

        let path = format!("/v1beta/models/{}:generateContent", config.model_name);
        let request = self
            .transport
            .post(&config.endpoint(&path))
            .header("x-goog-api-key", credential.expose());

        let response: GenerateContentResponse = self
            .transport
            .send_json(ProviderId::Gemini, request, &body)
            .await?;

        response.text().ok_or_else(|| {
            AnalysisError::MalformedResponse("gemini returned no candidate text".to_string())
        })
    }
}
