use super::Translator;
use crate::errors::AppError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Deterministic translator for tests and development.
///
/// Output is `"[target] input"`, which keeps assertions readable and makes
/// the target language visible in replicated content. Individual inputs can
/// be forced to translate to nothing or to fail outright.
pub struct MockTranslator {
    blanked: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            blanked: Mutex::new(HashSet::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make this exact input translate to an empty string.
    pub fn blank_out(&self, text: &str) {
        self.blanked.lock().unwrap().insert(text.to_string());
    }

    /// Make this exact input fail with a provider error.
    pub fn fail_on(&self, text: &str) {
        self.failing.lock().unwrap().insert(text.to_string());
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
    ) -> Result<String, AppError> {
        if self.failing.lock().unwrap().contains(text) {
            return Err(AppError::Translation(format!("mock failure for `{text}`")));
        }
        if self.blanked.lock().unwrap().contains(text) {
            return Ok(String::new());
        }
        if text.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("[{target}] {text}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn translates_deterministically() {
        let mock = MockTranslator::new();
        assert_eq!(mock.translate("Hello", "en", "fr").await.unwrap(), "[fr] Hello");
        assert_eq!(mock.translate("Hello", "en", "fr").await.unwrap(), "[fr] Hello");
    }

    #[tokio::test]
    async fn blanked_inputs_translate_to_nothing() {
        let mock = MockTranslator::new();
        mock.blank_out("Hello");
        assert_eq!(mock.translate("Hello", "en", "fr").await.unwrap(), "");
    }

    #[tokio::test]
    async fn failing_inputs_error() {
        let mock = MockTranslator::new();
        mock.fail_on("Hello");
        assert!(mock.translate("Hello", "en", "fr").await.is_err());
    }
}
