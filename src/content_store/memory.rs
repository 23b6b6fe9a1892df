use super::{ContentStore, DocumentPage};
use crate::errors::AppError;
use crate::model::{ContentUnit, NamedField, SourceDocument};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory content store for tests and local development.
///
/// Documents are held per collection in insertion order; pagination follows
/// the same bounded-page contract as the real store.
pub struct MemoryContentStore {
    state: Mutex<State>,
    page_size: usize,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<String>>,
    documents: HashMap<String, SourceDocument>,
    units: HashMap<String, Vec<ContentUnit>>,
    failing_collections: HashSet<String>,
    fail_queries: bool,
    next_id: u64,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be positive");
        Self {
            state: Mutex::new(State::default()),
            page_size,
        }
    }

    /// Seed a source document with its body units.
    pub fn insert_document(&self, collection_id: &str, doc: SourceDocument, units: Vec<ContentUnit>) {
        let mut state = self.state.lock().unwrap();
        state
            .collections
            .entry(collection_id.to_string())
            .or_default()
            .push(doc.id.clone());
        state.units.insert(doc.id.clone(), units);
        state.documents.insert(doc.id.clone(), doc);
    }

    /// Make every `create_document` into this collection fail, for
    /// failure-isolation tests.
    pub fn fail_creates_in(&self, collection_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_collections
            .insert(collection_id.to_string());
    }

    /// Make every `query_collection` fail, for enumeration-abort tests.
    pub fn fail_queries(&self) {
        self.state.lock().unwrap().fail_queries = true;
    }

    /// Documents created in a collection, in creation order.
    pub fn documents_in(&self, collection_id: &str) -> Vec<SourceDocument> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(collection_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.documents.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn units_of(&self, document_id: &str) -> Vec<ContentUnit> {
        self.state
            .lock()
            .unwrap()
            .units
            .get(document_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn query_collection(
        &self,
        collection_id: &str,
        cursor: Option<String>,
    ) -> Result<DocumentPage, AppError> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(AppError::Enumeration("collection unavailable".into()));
        }
        let ids = state
            .collections
            .get(collection_id)
            .cloned()
            .unwrap_or_default();

        let offset: usize = match cursor {
            Some(cursor) => cursor
                .parse()
                .map_err(|_| AppError::Enumeration(format!("bad cursor `{cursor}`")))?,
            None => 0,
        };
        let end = (offset + self.page_size).min(ids.len());
        let items = ids[offset..end]
            .iter()
            .filter_map(|id| state.documents.get(id).cloned())
            .collect();
        let has_more = end < ids.len();

        Ok(DocumentPage {
            items,
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    async fn get_document(&self, document_id: &str) -> Result<SourceDocument, AppError> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(document_id.to_string()))
    }

    async fn create_document(
        &self,
        collection_id: &str,
        fields: &[NamedField],
    ) -> Result<String, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_collections.contains(collection_id) {
            return Err(AppError::StoreWrite(format!(
                "collection {collection_id} rejected the create"
            )));
        }
        state.next_id += 1;
        let id = format!("dest-{}", state.next_id);
        let doc = SourceDocument {
            id: id.clone(),
            url: format!("memory://{id}"),
            fields: fields.to_vec(),
        };
        state
            .collections
            .entry(collection_id.to_string())
            .or_default()
            .push(id.clone());
        state.documents.insert(id.clone(), doc);
        state.units.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn update_document_fields(
        &self,
        document_id: &str,
        fields: &[NamedField],
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let doc = state
            .documents
            .get_mut(document_id)
            .ok_or_else(|| AppError::NotFound(document_id.to_string()))?;
        for field in fields {
            match doc.fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field.clone(),
                None => doc.fields.push(field.clone()),
            }
        }
        Ok(())
    }

    async fn list_content_units(&self, document_id: &str) -> Result<Vec<ContentUnit>, AppError> {
        let state = self.state.lock().unwrap();
        state
            .units
            .get(document_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(document_id.to_string()))
    }

    async fn append_content_units(
        &self,
        document_id: &str,
        units: &[ContentUnit],
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let body = state
            .units
            .get_mut(document_id)
            .ok_or_else(|| AppError::NotFound(document_id.to_string()))?;
        body.extend(units.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldValue, NamedField};

    fn doc(id: &str) -> SourceDocument {
        SourceDocument {
            id: id.to_string(),
            url: format!("memory://{id}"),
            fields: vec![NamedField::new("Name", FieldValue::Title(id.to_string()))],
        }
    }

    #[tokio::test]
    async fn paginates_with_cursors() {
        let store = MemoryContentStore::with_page_size(2);
        for i in 0..5 {
            store.insert_document("src", doc(&format!("d{i}")), vec![]);
        }

        let mut items = Vec::new();
        let mut cursor = None;
        loop {
            let page = store.query_collection("src", cursor).await.unwrap();
            items.extend(page.items);
            if !page.has_more {
                break;
            }
            cursor = page.next_cursor;
        }
        assert_eq!(items.len(), 5);
        assert_eq!(items[4].id, "d4");
    }

    #[tokio::test]
    async fn update_replaces_matching_fields() {
        let store = MemoryContentStore::new();
        store.insert_document("src", doc("d1"), vec![]);
        store
            .update_document_fields(
                "d1",
                &[NamedField::new("Name", FieldValue::Title("renamed".into()))],
            )
            .await
            .unwrap();
        let updated = store.get_document("d1").await.unwrap();
        assert_eq!(updated.text_of("Name"), Some("renamed"));
        assert_eq!(updated.fields.len(), 1);
    }

    #[tokio::test]
    async fn create_can_be_forced_to_fail() {
        let store = MemoryContentStore::new();
        store.fail_creates_in("broken");
        let err = store.create_document("broken", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::StoreWrite(_)));
        assert!(store.create_document("ok", &[]).await.is_ok());
    }
}
