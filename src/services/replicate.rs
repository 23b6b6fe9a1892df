//! Page replication: translate one source document into one target language
//! and publish the copy in that language's destination collection.

use crate::config::PipelineConfig;
use crate::content_store::ContentStore;
use crate::errors::AppError;
use crate::model::{ContentUnit, FieldValue, LanguageTarget, NamedField, SourceDocument};
use crate::storage::ImageRelocator;
use crate::translate::ContentTranslator;
use std::sync::Arc;

/// Title written when both the translation and the original are empty.
const TITLE_PLACEHOLDER: &str = "Untitled";

/// Translates one body unit into its replacement, or decides to drop it.
pub struct ContentUnitTranslator {
    translator: ContentTranslator,
    relocator: Arc<ImageRelocator>,
}

impl ContentUnitTranslator {
    pub fn new(translator: ContentTranslator, relocator: Arc<ImageRelocator>) -> Self {
        Self {
            translator,
            relocator,
        }
    }

    /// `None` means the unit is dropped: images without a retrievable source
    /// or whose relocation fails, and text whose translation comes back
    /// empty. Empty translated units are never appended.
    pub async fn translate_unit(
        &self,
        unit: &ContentUnit,
        target: &str,
    ) -> Option<ContentUnit> {
        match unit {
            ContentUnit::Image { source } => {
                let Some(url) = source.effective_url() else {
                    tracing::warn!("image unit has no retrievable URL, dropping");
                    return None;
                };
                match self.relocator.relocate(url).await {
                    Ok(durable) => Some(ContentUnit::external_image(durable)),
                    Err(e) => {
                        tracing::warn!(url, error = %e, "image relocation failed, dropping unit");
                        None
                    }
                }
            }
            ContentUnit::Text { kind, .. } => {
                let text = unit.plain_text();
                let translated = self.translator.translate(&text, target).await;
                if translated.is_empty() {
                    return None;
                }
                Some(ContentUnit::Text {
                    kind: *kind,
                    runs: vec![translated],
                })
            }
        }
    }
}

/// Declarative write-back policy per field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CopyPolicy {
    /// Substitute the translated text, with fallback tiers.
    Translate,
    /// Copy the source value untouched.
    Verbatim,
}

/// A freshly published destination document.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicatedPage {
    pub id: String,
    pub url: String,
}

pub struct PageReplicator {
    store: Arc<dyn ContentStore>,
    translator: ContentTranslator,
    units: ContentUnitTranslator,
    pipeline: PipelineConfig,
}

impl PageReplicator {
    pub fn new(
        store: Arc<dyn ContentStore>,
        translator: ContentTranslator,
        units: ContentUnitTranslator,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            store,
            translator,
            units,
            pipeline,
        }
    }

    fn policy_for(&self, field_name: &str) -> CopyPolicy {
        if field_name == self.pipeline.title_field || field_name == self.pipeline.description_field
        {
            CopyPolicy::Translate
        } else {
            CopyPolicy::Verbatim
        }
    }

    /// Replicate `doc` into `target`'s collection. Destination creation,
    /// field write-back, and unit append are each fatal for this language;
    /// the error wraps the first such sub-failure.
    pub async fn replicate(
        &self,
        doc: &SourceDocument,
        target: &LanguageTarget,
    ) -> Result<ReplicatedPage, AppError> {
        // Two-step create-then-fill: the store needs a concrete id before
        // incremental updates can target it.
        let shell = [NamedField::new(
            self.pipeline.published_field.clone(),
            FieldValue::Checkbox(true),
        )];
        let destination_id = self
            .store
            .create_document(&target.collection_id, &shell)
            .await
            .map_err(|e| AppError::replication(&target.code, e))?;
        tracing::debug!(
            source = doc.id,
            destination = destination_id,
            language = target.code,
            "destination document created"
        );

        let original_title = doc.text_of(&self.pipeline.title_field).unwrap_or_default();
        let original_desc = doc
            .text_of(&self.pipeline.description_field)
            .unwrap_or_default();
        let translated_title = self.translator.translate(original_title, &target.code).await;
        let translated_desc = self.translator.translate(original_desc, &target.code).await;

        // Title is never blank: translated, else original, else placeholder.
        // Description only falls back to the original and may stay empty.
        let title = [translated_title.as_str(), original_title, TITLE_PLACEHOLDER]
            .into_iter()
            .find(|t| !t.is_empty())
            .unwrap_or(TITLE_PLACEHOLDER)
            .to_string();
        let desc = if translated_desc.is_empty() {
            original_desc.to_string()
        } else {
            translated_desc
        };

        let fields = self.plan_fields(doc, &title, &desc);
        self.store
            .update_document_fields(&destination_id, &fields)
            .await
            .map_err(|e| AppError::replication(&target.code, e))?;

        // Sequential on purpose: unit order must survive, and the external
        // services rate-limit aggressively.
        let source_units = self
            .store
            .list_content_units(&doc.id)
            .await
            .map_err(|e| AppError::replication(&target.code, e))?;
        let mut translated_units = Vec::with_capacity(source_units.len());
        for unit in &source_units {
            if let Some(replacement) = self.units.translate_unit(unit, &target.code).await {
                translated_units.push(replacement);
            }
        }
        if !translated_units.is_empty() {
            self.store
                .append_content_units(&destination_id, &translated_units)
                .await
                .map_err(|e| AppError::replication(&target.code, e))?;
        }

        let url = destination_url(&self.pipeline.site_base_url, target, &title, &destination_id);
        tracing::info!(
            source = doc.id,
            destination = destination_id,
            language = target.code,
            units = translated_units.len(),
            "page replicated"
        );
        Ok(ReplicatedPage {
            id: destination_id,
            url,
        })
    }

    /// Full write-back field set: translated title/description substituted,
    /// everything else present copied verbatim with its slot id; absent
    /// fields are omitted entirely.
    fn plan_fields(&self, doc: &SourceDocument, title: &str, desc: &str) -> Vec<NamedField> {
        doc.fields
            .iter()
            .map(|field| {
                let value = match (self.policy_for(&field.name), &field.value) {
                    (CopyPolicy::Translate, FieldValue::Title(_)) => {
                        FieldValue::Title(title.to_string())
                    }
                    (CopyPolicy::Translate, FieldValue::RichText(_)) => {
                        FieldValue::RichText(desc.to_string())
                    }
                    (_, value) => value.clone(),
                };
                NamedField {
                    name: field.name.clone(),
                    slot_id: field.slot_id.clone(),
                    value,
                }
            })
            .collect()
    }
}

/// Best-effort human-readable destination URL. Slugless targets publish
/// identifier-only paths.
pub fn destination_url(base: &str, target: &LanguageTarget, title: &str, id: &str) -> String {
    let base = base.trim_end_matches('/');
    let slug = slugify(title);
    if target.slugless || slug.is_empty() {
        format!("{base}/{}/{id}", target.code)
    } else {
        format!("{base}/{}/{slug}-{id}", target.code)
    }
}

/// Lowercased alphanumerics with single-dash separators.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_store::MemoryContentStore;
    use crate::model::TextKind;
    use crate::storage::MemoryBlobStore;
    use crate::translate::{MockTranslator, Translator};

    fn pipeline_config() -> PipelineConfig {
        PipelineConfig {
            source_collection_id: "src".into(),
            preview_document_id: "doc-1".into(),
            title_field: "Name".into(),
            description_field: "Desc".into(),
            published_field: "Published".into(),
            site_base_url: "https://site".into(),
            filter: "published".into(),
            published_limit: 5,
            allow_list: vec![],
            languages: vec![french()],
        }
    }

    fn french() -> LanguageTarget {
        LanguageTarget {
            code: "fr".into(),
            collection_id: "dest-fr".into(),
            slugless: false,
        }
    }

    fn unit_translator(mock: Arc<MockTranslator>) -> ContentUnitTranslator {
        let translator = ContentTranslator::new(mock as Arc<dyn Translator>, "en");
        let relocator = Arc::new(ImageRelocator::new(Arc::new(MemoryBlobStore::new())));
        ContentUnitTranslator::new(translator, relocator)
    }

    fn replicator(
        store: Arc<MemoryContentStore>,
        mock: Arc<MockTranslator>,
    ) -> PageReplicator {
        let translator = ContentTranslator::new(mock.clone() as Arc<dyn Translator>, "en");
        PageReplicator::new(
            store,
            translator.clone(),
            unit_translator(mock),
            pipeline_config(),
        )
    }

    fn sample_doc() -> SourceDocument {
        SourceDocument {
            id: "doc-1".into(),
            url: "https://store/doc-1".into(),
            fields: vec![
                NamedField::with_slot("Name", "title", FieldValue::Title("Hello".into())),
                NamedField::with_slot("Desc", "aBcD", FieldValue::RichText("World".into())),
                NamedField::new("Published", FieldValue::Checkbox(true)),
                NamedField::with_slot(
                    "Tags",
                    "tg",
                    FieldValue::MultiSelect(vec!["rust".into()]),
                ),
            ],
        }
    }

    #[tokio::test]
    async fn empty_translation_drops_the_unit() {
        let mock = Arc::new(MockTranslator::new());
        mock.blank_out("vanishes");
        let units = unit_translator(mock);

        let dropped = units
            .translate_unit(&ContentUnit::paragraph("vanishes"), "fr")
            .await;
        assert_eq!(dropped, None);

        let kept = units
            .translate_unit(&ContentUnit::paragraph("stays"), "fr")
            .await;
        assert_eq!(kept.unwrap().plain_text(), "[fr] stays");
    }

    #[tokio::test]
    async fn image_without_url_is_dropped() {
        let units = unit_translator(Arc::new(MockTranslator::new()));
        let unit = ContentUnit::Image {
            source: Default::default(),
        };
        assert_eq!(units.translate_unit(&unit, "fr").await, None);
    }

    #[tokio::test]
    async fn replicates_fields_units_and_url() {
        let store = Arc::new(MemoryContentStore::new());
        store.insert_document(
            "src",
            sample_doc(),
            vec![ContentUnit::paragraph("Hello")],
        );
        let replicator = replicator(store.clone(), Arc::new(MockTranslator::new()));

        let page = replicator.replicate(&sample_doc(), &french()).await.unwrap();

        let created = store.documents_in("dest-fr");
        assert_eq!(created.len(), 1);
        let dest = &created[0];
        assert_eq!(dest.text_of("Name"), Some("[fr] Hello"));
        assert_eq!(dest.text_of("Desc"), Some("[fr] World"));
        // Verbatim fields keep their slot ids.
        assert_eq!(dest.field("Tags").unwrap().slot_id.as_deref(), Some("tg"));
        assert!(dest.is_published("Published"));

        let body = store.units_of(&page.id);
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].plain_text(), "[fr] Hello");

        assert_eq!(page.url, format!("https://site/fr/fr-hello-{}", page.id));
    }

    #[tokio::test]
    async fn title_falls_back_to_original_then_placeholder() {
        let store = Arc::new(MemoryContentStore::new());
        store.insert_document("src", sample_doc(), vec![]);
        let mock = Arc::new(MockTranslator::new());
        mock.blank_out("Hello");
        mock.blank_out("World");
        let replicator = replicator(store.clone(), mock);

        let page = replicator.replicate(&sample_doc(), &french()).await.unwrap();
        let dest = &store.documents_in("dest-fr")[0];
        // Tier two: original title survives; description likewise falls back
        // to the original rather than the placeholder.
        assert_eq!(dest.text_of("Name"), Some("Hello"));
        assert_eq!(dest.text_of("Desc"), Some("World"));
        assert_eq!(page.url, format!("https://site/fr/hello-{}", page.id));

        // Tier three: nothing anywhere still yields a non-empty title.
        let mut bare = sample_doc();
        bare.id = "doc-2".into();
        bare.fields[0] = NamedField::with_slot("Name", "title", FieldValue::Title(String::new()));
        store.insert_document("src", bare.clone(), vec![]);
        replicator.replicate(&bare, &french()).await.unwrap();
        let dest = &store.documents_in("dest-fr")[1];
        assert_eq!(dest.text_of("Name"), Some("Untitled"));
    }

    #[tokio::test]
    async fn all_units_dropped_means_no_append() {
        let store = Arc::new(MemoryContentStore::new());
        store.insert_document(
            "src",
            sample_doc(),
            vec![
                ContentUnit::paragraph("vanishes"),
                ContentUnit::Image {
                    source: Default::default(),
                },
            ],
        );
        let mock = Arc::new(MockTranslator::new());
        mock.blank_out("vanishes");
        let replicator = replicator(store.clone(), mock);

        let page = replicator.replicate(&sample_doc(), &french()).await.unwrap();
        assert!(store.units_of(&page.id).is_empty());
    }

    #[tokio::test]
    async fn heading_kinds_survive_translation() {
        let store = Arc::new(MemoryContentStore::new());
        store.insert_document(
            "src",
            sample_doc(),
            vec![ContentUnit::Text {
                kind: TextKind::Heading2,
                runs: vec!["Part ".into(), "one".into()],
            }],
        );
        let replicator = replicator(store.clone(), Arc::new(MockTranslator::new()));

        let page = replicator.replicate(&sample_doc(), &french()).await.unwrap();
        match &store.units_of(&page.id)[0] {
            ContentUnit::Text { kind, runs } => {
                assert_eq!(*kind, TextKind::Heading2);
                assert_eq!(runs, &vec!["[fr] Part one".to_string()]);
            }
            other => panic!("expected text unit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_failure_is_fatal_for_the_language() {
        let store = Arc::new(MemoryContentStore::new());
        store.fail_creates_in("dest-fr");
        store.insert_document("src", sample_doc(), vec![]);
        let replicator = replicator(store, Arc::new(MockTranslator::new()));

        let err = replicator.replicate(&sample_doc(), &french()).await.unwrap_err();
        assert!(matches!(err, AppError::Replication { ref language, .. } if language == "fr"));
    }

    #[test]
    fn slugify_flattens_punctuation_and_case() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust   2024  "), "rust-2024");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugless_targets_publish_identifier_only_urls() {
        let mut target = french();
        assert_eq!(
            destination_url("https://site/", &target, "Bonjour", "abc"),
            "https://site/fr/bonjour-abc"
        );
        target.slugless = true;
        assert_eq!(
            destination_url("https://site/", &target, "Bonjour", "abc"),
            "https://site/fr/abc"
        );
    }
}
