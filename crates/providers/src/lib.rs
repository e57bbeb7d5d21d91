//! Model provider implementations for Recall.
//!
//! All providers implement the `recall_core::Provider` trait.
//! [`build_from_config`] constructs the provider the configuration asks for.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use recall_config::AppConfig;
use recall_core::error::ProviderError;
use recall_core::provider::Provider;
use std::sync::Arc;

/// Build the configured provider.
///
/// Fails with `NotConfigured` when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured("no API key (set RECALL_API_KEY or OPENAI_API_KEY)".into())
    })?;

    let name = if config.api_url.contains("api.openai.com") {
        "openai"
    } else {
        "custom"
    };

    Ok(Arc::new(OpenAiCompatProvider::new(
        name,
        &config.api_url,
        api_key,
    )))
}
