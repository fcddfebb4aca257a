//! Cohere `generate` backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::HttpTransport;
use super::{AnalysisError, CompletionBackend, Credential, ProviderConfig, ProviderId};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

pub struct CohereBackend {
    transport: HttpTransport,
}

impl CohereBackend {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CompletionBackend for CohereBackend {
    async fn send(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        credential: &Credential,
    ) -> Result<String, AnalysisError> {
        let body = GenerateRequest {
            model: &config.model_name,
            prompt,
            max_tokens: config.max_output_tokens,
        };

        let request = self
            .transport
            .post(&config.endpoint("/v1/generate"))
            .bearer_auth(credential.expose());

        let response: GenerateResponse = self
            .transport
            .send_json(ProviderId::Cohere, request, &body)
            .await?;

        response
            .generations
            .into_iter()
            .next()
            .map(|g| g.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("cohere returned no generation".to_string())
            })
    }
}
