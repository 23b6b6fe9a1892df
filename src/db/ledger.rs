use super::models;
use super::LinkLedger;
use crate::config::DatabaseConfig;
use crate::errors::AppError;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Postgres-backed ledger.
#[derive(Clone)]
pub struct DbLedger {
    db: DatabaseConnection,
}

impl DbLedger {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut opt = sea_orm::ConnectOptions::new(&config.url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout))
            .sqlx_logging(true);

        let db = sea_orm::Database::connect(opt).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl LinkLedger for DbLedger {
    async fn insert_record(&self, source_id: &str, source_url: &str) -> Result<(), AppError> {
        let now = chrono::Utc::now();
        let record = models::ActiveModel {
            id: Set(Uuid::new_v4()),
            source_id: Set(source_id.to_string()),
            source_url: Set(source_url.to_string()),
            links: Set(json!({})),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match record.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::DuplicateRecord(source_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_record(
        &self,
        source_id: &str,
        language: &str,
        url: &str,
    ) -> Result<(), AppError> {
        let record = models::Entity::find()
            .filter(models::Column::SourceId.eq(source_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(source_id.to_string()))?;

        let mut links = record.links.clone();
        if !links.is_object() {
            links = json!({});
        }
        links[language] = json!(url);

        let mut active: models::ActiveModel = record.into();
        active.links = Set(links);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;
        Ok(())
    }
}

/// In-memory ledger for tests and database-less runs.
pub struct MemoryLedger {
    records: Mutex<HashMap<String, MemoryRecord>>,
    fail_updates: Mutex<bool>,
}

#[derive(Clone, Debug, Default)]
struct MemoryRecord {
    source_url: String,
    links: HashMap<String, String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_updates: Mutex::new(false),
        }
    }

    /// Make every subsequent `update_record` fail.
    pub fn fail_updates(&self) {
        *self.fail_updates.lock().unwrap() = true;
    }

    pub fn links_for(&self, source_id: &str) -> HashMap<String, String> {
        self.records
            .lock()
            .unwrap()
            .get(source_id)
            .map(|r| r.links.clone())
            .unwrap_or_default()
    }

    pub fn source_url_of(&self, source_id: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(source_id)
            .map(|r| r.source_url.clone())
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkLedger for MemoryLedger {
    async fn insert_record(&self, source_id: &str, source_url: &str) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(source_id) {
            return Err(AppError::DuplicateRecord(source_id.to_string()));
        }
        records.insert(
            source_id.to_string(),
            MemoryRecord {
                source_url: source_url.to_string(),
                links: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn update_record(
        &self,
        source_id: &str,
        language: &str,
        url: &str,
    ) -> Result<(), AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(AppError::StoreWrite("ledger update rejected".into()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(source_id)
            .ok_or_else(|| AppError::NotFound(source_id.to_string()))?;
        record.links.insert(language.to_string(), url.to_string());
        Ok(())
    }
}
