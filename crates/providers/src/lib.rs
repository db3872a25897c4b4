//! Model client implementations for minicursor.
//!
//! All clients implement the `minicursor_core::Provider` trait.

pub mod openai_compat;

use std::sync::Arc;

use minicursor_config::AppConfig;
use minicursor_core::error::ProviderError;
use minicursor_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the model client described by the configuration.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key; set MINICURSOR_API_KEY or OPENAI_API_KEY, or api_key in config.toml"
                .into(),
        )
    })?;

    let provider = OpenAiCompatProvider::new("openai_compat", &config.api_base_url, api_key)?;
    tracing::debug!(base_url = %provider.base_url(), "Configured model client");
    Ok(Arc::new(provider))
}
