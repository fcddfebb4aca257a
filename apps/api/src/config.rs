use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{Credential, ProviderConfig, ProviderId};

/// Application configuration loaded from environment variables.
///
/// Provider credentials are optional here: a missing key only surfaces when
/// that provider is selected for an analysis.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub providers: Vec<ProviderConfig>,
    /// Sessions untouched for this long are dropped by the sweeper.
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let providers = ProviderId::ALL
            .into_iter()
            .map(|id| provider_config(id, &lookup))
            .collect::<Result<Vec<_>>>()?;

        let idle_secs = lookup("SESSION_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|| "3600".to_string())
            .parse::<u64>()
            .context("SESSION_IDLE_TIMEOUT_SECS must be a whole number of seconds")?;
        if idle_secs == 0 {
            bail!("SESSION_IDLE_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            providers,
            session_idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}

fn provider_config<F>(id: ProviderId, lookup: &F) -> Result<ProviderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let credential = id
        .credential_envs()
        .iter()
        .find_map(|key| non_empty(lookup(key)))
        .map(Credential::new);

    let mut config = ProviderConfig::with_defaults(id, credential);
    let prefix = id.env_prefix();

    if let Some(model) = non_empty(lookup(&format!("{prefix}_MODEL"))) {
        config.model_name = model;
    }
    if let Some(raw) = non_empty(lookup(&format!("{prefix}_MAX_TOKENS"))) {
        config.max_output_tokens = raw
            .parse::<u32>()
            .with_context(|| format!("{prefix}_MAX_TOKENS must be a positive integer"))?;
    }
    if let Some(base_url) = non_empty(lookup(&format!("{prefix}_BASE_URL"))) {
        config.base_url = base_url;
    }

    Ok(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    fn provider(config: &Config, id: ProviderId) -> &ProviderConfig {
        config
            .providers
            .iter()
            .find(|p| p.provider_id == id)
            .unwrap()
    }

    #[test]
    fn test_defaults_without_any_credentials() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.providers.len(), ProviderId::ALL.len());
        assert!(config.providers.iter().all(|p| p.credential.is_none()));
        assert_eq!(provider(&config, ProviderId::Cohere).max_output_tokens, 300);
    }

    #[test]
    fn test_credentials_and_overrides_are_read() {
        let config = config_from(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("OPENAI_MAX_TOKENS", "512"),
            ("COHERE_BASE_URL", "http://localhost:9999"),
        ])
        .unwrap();

        let gemini = provider(&config, ProviderId::Gemini);
        assert_eq!(gemini.credential, Some(Credential::new("g-key")));
        assert_eq!(gemini.model_name, "gemini-1.5-pro");
        assert_eq!(provider(&config, ProviderId::OpenAi).max_output_tokens, 512);
        assert_eq!(
            provider(&config, ProviderId::Cohere).base_url,
            "http://localhost:9999"
        );
    }

    #[test]
    fn test_claude_key_is_accepted_for_anthropic() {
        let config = config_from(&[("CLAUDE_API_KEY", "sk-ant")]).unwrap();
        assert!(provider(&config, ProviderId::Anthropic).credential.is_some());
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(provider(&config, ProviderId::OpenAi).credential.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("ANTHROPIC_MAX_TOKENS", "-1")]).is_err());
        assert!(config_from(&[("SESSION_IDLE_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_session_idle_timeout_override() {
        let config = config_from(&[("SESSION_IDLE_TIMEOUT_SECS", "900")]).unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(900));
    }
}
