//! Translation collaborator: text in, translated text out.

mod http;
mod mock;

pub use http::HttpTranslator;
pub use mock::MockTranslator;

use crate::errors::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for translation providers.
///
/// Implementations must be Send + Sync for use across tokio tasks.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, AppError>;
}

/// Degrading wrapper around a provider: empty input short-circuits, provider
/// failures are logged and collapse to empty output. Callers that cannot
/// tolerate a blank result (title) apply their own fallback on top.
#[derive(Clone)]
pub struct ContentTranslator {
    provider: Arc<dyn Translator>,
    source_language: String,
}

impl ContentTranslator {
    pub fn new(provider: Arc<dyn Translator>, source_language: impl Into<String>) -> Self {
        Self {
            provider,
            source_language: source_language.into(),
        }
    }

    pub async fn translate(&self, text: &str, target: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        match self
            .provider
            .translate(text, &self.source_language, target)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(target, error = %e, "translation failed, dropping value");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl Translator for FailingProvider {
        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, AppError> {
            Err(AppError::Translation("service down".into()))
        }
    }

    #[tokio::test]
    async fn empty_input_skips_the_provider() {
        let translator = ContentTranslator::new(Arc::new(FailingProvider), "en");
        assert_eq!(translator.translate("", "fr").await, "");
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_empty() {
        let translator = ContentTranslator::new(Arc::new(FailingProvider), "en");
        assert_eq!(translator.translate("Hello", "fr").await, "");
    }

    #[tokio::test]
    async fn mock_provider_round_trip() {
        let translator = ContentTranslator::new(Arc::new(MockTranslator::new()), "en");
        assert_eq!(translator.translate("Hello", "fr").await, "[fr] Hello");
    }
}
