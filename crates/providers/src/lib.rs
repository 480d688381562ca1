//! Chat-completion providers for Parley.
//!
//! All providers implement the `parley_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use parley_config::AppConfig;
use parley_core::error::ProviderError;
use tracing::debug;

/// Build the configured provider, sharing `client` with the tools.
pub fn build_from_config(
    config: &AppConfig,
    client: reqwest::Client,
) -> Result<OpenAiCompatProvider, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured("no API key (set OPENAI_API_KEY or api_key)".into())
    })?;
    let provider = OpenAiCompatProvider::new("openai", &config.base_url, api_key, client);
    debug!(base_url = provider.base_url(), model = %config.model, "Provider configured");
    Ok(provider)
}
