use crate::model::LanguageTarget;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub content_store: ContentStoreConfig,
    pub translation: TranslationConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string, or `memory` to run without a database.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentStoreConfig {
    pub base_url: String,
    pub api_token: String,
    /// Version header the store expects on every request.
    pub api_version: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    pub base_url: String,
    /// `mock` selects the deterministic in-process translator.
    pub api_key: String,
    pub source_language: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    /// `mock` selects the in-memory blob store.
    pub api_key: String,
    pub bucket: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    pub source_collection_id: String,
    /// Document whose child units `/content-units` dumps.
    pub preview_document_id: String,
    pub title_field: String,
    pub description_field: String,
    pub published_field: String,
    /// Base of the public site that computed destination URLs point at.
    pub site_base_url: String,
    /// Filter policy selector: `published` or `allow_list`.
    pub filter: String,
    pub published_limit: usize,
    #[serde(default)]
    pub allow_list: Vec<String>,
    pub languages: Vec<LanguageTarget>,
}

impl AppConfig {
    pub fn build() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.rust_log", "info,lingoforge=debug")?
            .set_default("database.url", "memory")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 30)?
            .set_default("content_store.base_url", "https://api.notion.com/v1")?
            .set_default("content_store.api_token", "")?
            .set_default("content_store.api_version", "2022-06-28")?
            .set_default("translation.base_url", "https://translation.googleapis.com/language/translate/v2")?
            // `mock` keys select the in-process stand-ins; real deployments
            // override them.
            .set_default("translation.api_key", "mock")?
            .set_default("translation.source_language", "en")?
            .set_default("storage.base_url", "https://example.supabase.co/storage/v1")?
            .set_default("storage.api_key", "mock")?
            .set_default("storage.bucket", "ppt")?
            .set_default("pipeline.title_field", "Name")?
            .set_default("pipeline.description_field", "Desc")?
            .set_default("pipeline.published_field", "Published")?
            .set_default("pipeline.filter", "published")?
            .set_default("pipeline.published_limit", 5)?
            // Language targets and credentials come from the config file
            // and/or `APP`-prefixed environment variables,
            // e.g. `APP_STORAGE__API_KEY=...`.
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::default().separator("__").prefix("APP"));

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.languages.is_empty() {
            return Err(ConfigError::Message(
                "pipeline.languages must name at least one target".into(),
            ));
        }
        match self.pipeline.filter.as_str() {
            "published" | "allow_list" => {}
            other => {
                return Err(ConfigError::Message(format!(
                    "pipeline.filter must be `published` or `allow_list`, got `{other}`"
                )))
            }
        }
        if self.pipeline.filter == "allow_list" && self.pipeline.allow_list.is_empty() {
            return Err(ConfigError::Message(
                "pipeline.filter = allow_list requires a non-empty pipeline.allow_list".into(),
            ));
        }
        Ok(())
    }
}
