//! Batch orchestration: enumerate the source collection, drive replication
//! across every target language, and persist the resulting links.

use crate::content_store::ContentStore;
use crate::db::LinkLedger;
use crate::errors::AppError;
use crate::model::{LanguageTarget, Outcome, RunReport, SourceDocument};
use crate::services::replicate::PageReplicator;
use std::sync::Arc;

/// Which source documents a run processes. The two policies are mutually
/// exclusive by construction.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterPolicy {
    /// Documents with the published flag set, capped at `limit`.
    Published { limit: usize },
    /// Exactly the listed identifiers, published or not.
    AllowList(Vec<String>),
}

pub struct BatchOrchestrator {
    store: Arc<dyn ContentStore>,
    replicator: Arc<PageReplicator>,
    ledger: Arc<dyn LinkLedger>,
    source_collection_id: String,
    published_field: String,
}

impl BatchOrchestrator {
    pub fn new(
        store: Arc<dyn ContentStore>,
        replicator: Arc<PageReplicator>,
        ledger: Arc<dyn LinkLedger>,
        source_collection_id: impl Into<String>,
        published_field: impl Into<String>,
    ) -> Self {
        Self {
            store,
            replicator,
            ledger,
            source_collection_id: source_collection_id.into(),
            published_field: published_field.into(),
        }
    }

    /// Run the workflow over every document surviving `policy`, for every
    /// language in `languages`. One failed (document, language) pair never
    /// blocks the rest; only an enumeration failure aborts the run.
    pub async fn run(
        &self,
        policy: &FilterPolicy,
        languages: &[LanguageTarget],
    ) -> Result<RunReport, AppError> {
        let documents = self.enumerate().await?;
        let selected = self.apply_filter(documents, policy);
        tracing::info!(
            documents = selected.len(),
            languages = languages.len(),
            "starting replication run"
        );

        let mut report = RunReport::default();
        for doc in &selected {
            metrics::counter!("lingoforge_documents_total").increment(1);
            match self.ledger.insert_record(&doc.id, &doc.url).await {
                Ok(()) => {}
                Err(AppError::DuplicateRecord(_)) => {
                    tracing::info!(document = doc.id, "already tracked, skipping");
                    metrics::counter!("lingoforge_documents_skipped_total").increment(1);
                    continue;
                }
                Err(e) => {
                    tracing::warn!(document = doc.id, error = %e, "ledger insert failed, skipping");
                    metrics::counter!("lingoforge_documents_skipped_total").increment(1);
                    continue;
                }
            }

            for target in languages {
                report.record(self.replicate_one(doc, target).await);
            }
        }

        tracing::info!(
            successes = report.successes.len(),
            failures = report.failures.len(),
            "replication run finished"
        );
        Ok(report)
    }

    /// Follow continuation cursors until the collection is exhausted. The
    /// full set is collected before any filtering happens.
    async fn enumerate(&self) -> Result<Vec<SourceDocument>, AppError> {
        let mut documents = Vec::new();
        let mut cursor = None;
        loop {
            let page = self
                .store
                .query_collection(&self.source_collection_id, cursor)
                .await?;
            documents.extend(page.items);
            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                // A store claiming more pages without a cursor would loop
                // forever; treat it as end of enumeration.
                None => break,
            }
        }
        Ok(documents)
    }

    fn apply_filter(
        &self,
        documents: Vec<SourceDocument>,
        policy: &FilterPolicy,
    ) -> Vec<SourceDocument> {
        match policy {
            FilterPolicy::Published { limit } => documents
                .into_iter()
                .filter(|d| d.is_published(&self.published_field))
                .take(*limit)
                .collect(),
            FilterPolicy::AllowList(ids) => documents
                .into_iter()
                .filter(|d| ids.iter().any(|id| *id == d.id))
                .collect(),
        }
    }

    async fn replicate_one(&self, doc: &SourceDocument, target: &LanguageTarget) -> Outcome {
        match self.replicator.replicate(doc, target).await {
            Ok(page) => {
                if let Err(e) = self
                    .ledger
                    .update_record(&doc.id, &target.code, &page.url)
                    .await
                {
                    // The copy exists but its link was lost; report the pair
                    // as failed so it is never silently dropped.
                    tracing::error!(
                        document = doc.id,
                        language = target.code,
                        error = %e,
                        "destination link not persisted"
                    );
                    metrics::counter!("lingoforge_replication_failures_total").increment(1);
                    return Outcome::failure(
                        &doc.id,
                        &target.code,
                        format!("link persistence failed: {e}"),
                    );
                }
                metrics::counter!("lingoforge_pages_replicated_total").increment(1);
                Outcome::success(&doc.id, &target.code, page.id)
            }
            Err(e) => {
                tracing::error!(
                    document = doc.id,
                    language = target.code,
                    error = %e,
                    "replication failed"
                );
                metrics::counter!("lingoforge_replication_failures_total").increment(1);
                Outcome::failure(&doc.id, &target.code, e.to_string())
            }
        }
    }
}
