//! Hugging Face Inference API backend.
//!
//! The hosted inference endpoint answers with a list of outputs whose text
//! field depends on the model's pipeline: `generated_text` for text
//! generation, `summary_text` for summarization models such as BART.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::HttpTransport;
use super::{AnalysisError, CompletionBackend, Credential, ProviderConfig, ProviderId};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: u32,
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    generated_text: Option<String>,
    summary_text: Option<String>,
}

pub struct HuggingFaceBackend {
    transport: HttpTransport,
}

impl HuggingFaceBackend {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CompletionBackend for HuggingFaceBackend {
    async fn send(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        credential: &Credential,
    ) -> Result<String, AnalysisError> {
        let body = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_length: config.max_output_tokens,
            },
        };

        let path = format!("/models/{}", config.model_name);
        let request = self
            .transport
            .post(&config.endpoint(&path))
            .bearer_auth(credential.expose());

        let outputs: Vec<InferenceOutput> = self
            .transport
            .send_json(ProviderId::HuggingFace, request, &body)
            .await?;

        outputs
            .into_iter()
            .next()
            .and_then(|o| o.generated_text.or(o.summary_text))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("huggingface returned no output text".to_string())
            })
    }
}
