use super::Translator;
use crate::config::TranslationConfig;
use crate::errors::AppError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Request timeout for translation API calls
const TRANSLATE_TIMEOUT_SECS: u64 = 30;

/// HTTP translation provider.
///
/// Speaks the translate-v2 style API: POST `{q, source, target, format}`
/// with a key parameter, response under `data.translations[].translatedText`.
pub struct HttpTranslator {
    client: reqwest::Client,
    config: TranslationConfig,
}

impl HttpTranslator {
    pub fn new(config: TranslationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TRANSLATE_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self { client, config }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, AppError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let url = format!("{}?key={}", self.config.base_url, self.config.api_key);
        let body = json!({
            "q": [text],
            "source": source,
            "target": target,
            "format": "text",
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Translation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Translation(format!("API error {status}: {body}")));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Translation(format!("invalid response body: {e}")))?;

        value["data"]["translations"][0]["translatedText"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                AppError::Translation("response missing data.translations[0].translatedText".into())
            })
    }
}
