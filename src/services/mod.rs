pub mod orchestrate;
pub mod replicate;

use crate::config::AppConfig;
use crate::content_store::ContentStore;
use crate::db::LinkLedger;
use crate::storage::{BlobStore, ImageRelocator};
use crate::translate::{ContentTranslator, Translator};
use orchestrate::{BatchOrchestrator, FilterPolicy};
use replicate::{ContentUnitTranslator, PageReplicator};
use std::sync::Arc;

/// Container for the wired-up services, injected into routes.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub store: Arc<dyn ContentStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the pipeline from its collaborators. Every external dependency
    /// comes in as a trait object so tests can substitute fakes.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ContentStore>,
        translator: Arc<dyn Translator>,
        blob_store: Arc<dyn BlobStore>,
        ledger: Arc<dyn LinkLedger>,
    ) -> Self {
        let content_translator =
            ContentTranslator::new(translator, config.translation.source_language.clone());
        let relocator = Arc::new(ImageRelocator::new(blob_store));
        let units = ContentUnitTranslator::new(content_translator.clone(), relocator);
        let replicator = Arc::new(PageReplicator::new(
            store.clone(),
            content_translator,
            units,
            config.pipeline.clone(),
        ));
        let orchestrator = Arc::new(BatchOrchestrator::new(
            store.clone(),
            replicator,
            ledger,
            config.pipeline.source_collection_id.clone(),
            config.pipeline.published_field.clone(),
        ));

        Self {
            orchestrator,
            store,
            config: Arc::new(config),
        }
    }

    /// Filter policy selected by configuration (validated at startup).
    pub fn filter_policy(&self) -> FilterPolicy {
        match self.config.pipeline.filter.as_str() {
            "allow_list" => FilterPolicy::AllowList(self.config.pipeline.allow_list.clone()),
            _ => FilterPolicy::Published {
                limit: self.config.pipeline.published_limit,
            },
        }
    }
}
