//! LLM client: the single point of entry for every model API call.
//!
//! No other module talks to a provider directly. Callers hand an
//! `AnalysisRequest` and a provider identifier to the `Dispatcher`, which
//! builds the prompt, forwards it to the matching `CompletionBackend` and
//! flattens the answer into one `AnalysisResult`.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::percentage::extract_percentage;
use crate::models::analysis::{AnalysisRequest, AnalysisResult};

pub mod anthropic;
pub mod cohere;
pub mod gemini;
pub mod huggingface;
pub mod openai;
pub mod prompts;
pub mod transport;

use transport::HttpTransport;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Credential invalid: {0}")]
    CredentialInvalid(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Unsupported provider '{0}'")]
    UnsupportedProvider(String),
}

impl AnalysisError {
    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::CredentialInvalid(_) => "CREDENTIAL_INVALID",
            AnalysisError::RateLimited(_) => "RATE_LIMITED",
            AnalysisError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            AnalysisError::NetworkFailure(_) => "NETWORK_FAILURE",
            AnalysisError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
        }
    }
}

/// The hosted backends this service can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    OpenAi,
    Anthropic,
    Cohere,
    HuggingFace,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Gemini,
        ProviderId::OpenAi,
        ProviderId::Anthropic,
        ProviderId::Cohere,
        ProviderId::HuggingFace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Cohere => "cohere",
            ProviderId::HuggingFace => "huggingface",
        }
    }

    /// Prefix for the `<PREFIX>_MODEL`, `<PREFIX>_MAX_TOKENS` and
    /// `<PREFIX>_BASE_URL` overrides.
    pub fn env_prefix(self) -> &'static str {
        match self {
            ProviderId::Gemini => "GEMINI",
            ProviderId::OpenAi => "OPENAI",
            ProviderId::Anthropic => "ANTHROPIC",
            ProviderId::Cohere => "COHERE",
            ProviderId::HuggingFace => "HUGGINGFACE",
        }
    }

    /// Environment variables holding the credential, in lookup order.
    pub fn credential_envs(self) -> &'static [&'static str] {
        match self {
            ProviderId::Gemini => &["GOOGLE_API_KEY"],
            ProviderId::OpenAi => &["OPENAI_API_KEY"],
            ProviderId::Anthropic => &["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"],
            ProviderId::Cohere => &["COHERE_API_KEY"],
            ProviderId::HuggingFace => &["HUGGINGFACE_API_KEY"],
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini-1.5-flash",
            ProviderId::OpenAi => "gpt-4",
            ProviderId::Anthropic => "claude-3-opus-20240229",
            ProviderId::Cohere => "command-r",
            ProviderId::HuggingFace => "facebook/bart-large-cnn",
        }
    }

    pub fn default_max_output_tokens(self) -> u32 {
        match self {
            ProviderId::Gemini | ProviderId::OpenAi => 2048,
            ProviderId::Anthropic => 1024,
            ProviderId::Cohere => 300,
            ProviderId::HuggingFace => 512,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderId::Gemini => "https://generativelanguage.googleapis.com",
            ProviderId::OpenAi => "https://api.openai.com",
            ProviderId::Anthropic => "https://api.anthropic.com",
            ProviderId::Cohere => "https://api.cohere.ai",
            ProviderId::HuggingFace => "https://api-inference.huggingface.co",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderId::Gemini),
            "openai" | "chatgpt" | "gpt" => Ok(ProviderId::OpenAi),
            "anthropic" | "claude" => Ok(ProviderId::Anthropic),
            "cohere" => Ok(ProviderId::Cohere),
            "huggingface" | "hf" => Ok(ProviderId::HuggingFace),
            _ => Err(AnalysisError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// A provider secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Per-backend settings, loaded once at start-up and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_id: ProviderId,
    /// Absent credentials are tolerated until the provider is selected.
    pub credential: Option<Credential>,
    pub model_name: String,
    pub max_output_tokens: u32,
    pub base_url: String,
}

impl ProviderConfig {
    /// Defaults for `provider_id` with the given credential.
    pub fn with_defaults(provider_id: ProviderId, credential: Option<Credential>) -> Self {
        Self {
            provider_id,
            credential,
            model_name: provider_id.default_model().to_string(),
            max_output_tokens: provider_id.default_max_output_tokens(),
            base_url: provider_id.default_base_url().to_string(),
        }
    }

    /// Joins `path` onto the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// The one capability every backend implements: send a prompt, get text back.
///
/// Implementations flatten their provider's nested response shape to a single
/// trimmed string and map transport failures onto `AnalysisError`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn send(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        credential: &Credential,
    ) -> Result<String, AnalysisError>;
}

/// Builds the real HTTP backend for `provider_id`.
pub fn http_backend(provider_id: ProviderId, transport: HttpTransport) -> Arc<dyn CompletionBackend> {
    match provider_id {
        ProviderId::Gemini => Arc::new(gemini::GeminiBackend::new(transport)),
        ProviderId::OpenAi => Arc::new(openai::OpenAiBackend::new(transport)),
        ProviderId::Anthropic => Arc::new(anthropic::AnthropicBackend::new(transport)),
        ProviderId::Cohere => Arc::new(cohere::CohereBackend::new(transport)),
        ProviderId::HuggingFace => Arc::new(huggingface::HuggingFaceBackend::new(transport)),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub provider_id: ProviderId,
    pub model_name: String,
    pub max_output_tokens: u32,
    pub credential_configured: bool,
}

struct Route {
    config: ProviderConfig,
    backend: Arc<dyn CompletionBackend>,
}

/// Routes analysis requests to registered backends.
///
/// Each `analyze` call is one awaited backend round trip: no retry, no
/// caching, no fan-out.
#[derive(Default)]
pub struct Dispatcher {
    routes: BTreeMap<ProviderId, Route>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the HTTP backend for every config, sharing one transport.
    pub fn from_configs(configs: Vec<ProviderConfig>, transport: HttpTransport) -> Self {
        let mut dispatcher = Self::new();
        for config in configs {
            let backend = http_backend(config.provider_id, transport.clone());
            dispatcher.register(config, backend);
        }
        dispatcher
    }

    /// Adds or replaces the backend for `config.provider_id`.
    pub fn register(&mut self, config: ProviderConfig, backend: Arc<dyn CompletionBackend>) {
        self.routes
            .insert(config.provider_id, Route { config, backend });
    }

    pub fn providers(&self) -> Vec<ProviderSummary> {
        self.routes
            .values()
            .map(|route| ProviderSummary {
                provider_id: route.config.provider_id,
                model_name: route.config.model_name.clone(),
                max_output_tokens: route.config.max_output_tokens,
                credential_configured: route.config.credential.is_some(),
            })
            .collect()
    }

    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        provider_id: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let id: ProviderId = provider_id.parse()?;
        let route = self
            .routes
            .get(&id)
            .ok_or_else(|| AnalysisError::UnsupportedProvider(provider_id.to_string()))?;

        let credential = route.config.credential.as_ref().ok_or_else(|| {
            AnalysisError::CredentialInvalid(format!(
                "no credential configured for {id} (set {})",
                id.credential_envs().join(" or ")
            ))
        })?;

        let prompt = prompts::build_prompt(request);
        info!(
            provider = %id,
            model = %route.config.model_name,
            prompt_chars = prompt.len(),
            "Dispatching analysis"
        );

        let raw_text = match route.backend.send(&prompt, &route.config, credential).await {
            Ok(text) => text,
            Err(e) => {
                warn!(provider = %id, code = e.code(), "Analysis failed: {e}");
                return Err(e);
            }
        };

        let extracted_percentage = if request.instruction().expects_percentage {
            extract_percentage(&raw_text)
        } else {
            None
        };

        debug!(
            provider = %id,
            response_chars = raw_text.len(),
            ?extracted_percentage,
            "Analysis succeeded"
        );

        Ok(AnalysisResult {
            provider_id: id,
            raw_text,
            extracted_percentage,
        })
    }
}
