use super::codec;
use super::{ContentStore, DocumentPage};
use crate::config::ContentStoreConfig;
use crate::errors::AppError;
use crate::model::{ContentUnit, NamedField, SourceDocument};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Request timeout for content store calls
const STORE_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the external content store API.
///
/// Authenticates with a bearer token and a version header on every request;
/// the JSON mapping lives in [`codec`].
pub struct HttpContentStore {
    client: reqwest::Client,
    config: ContentStoreConfig,
}

impl HttpContentStore {
    pub fn new(config: ContentStoreConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(STORE_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, AppError> {
        let response = request
            .bearer_auth(&self.config.api_token)
            .header("Notion-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| AppError::StoreWrite(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(status.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StoreWrite(format!("API error {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::StoreWrite(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn query_collection(
        &self,
        collection_id: &str,
        cursor: Option<String>,
    ) -> Result<DocumentPage, AppError> {
        let mut body = json!({});
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }
        let request = self
            .client
            .post(self.url(&format!("databases/{collection_id}/query")))
            .json(&body);
        // Enumeration failures are the one globally fatal case; keep the
        // distinct variant so the orchestrator can surface the raw cause.
        let value = self
            .send(request)
            .await
            .map_err(|e| AppError::Enumeration(e.to_string()))?;

        let items = value["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .map(codec::parse_document)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|e| AppError::Enumeration(e.to_string()))?
            .unwrap_or_default();

        Ok(DocumentPage {
            items,
            next_cursor: value["next_cursor"].as_str().map(String::from),
            has_more: value["has_more"].as_bool().unwrap_or(false),
        })
    }

    async fn get_document(&self, document_id: &str) -> Result<SourceDocument, AppError> {
        let value = self
            .send(self.client.get(self.url(&format!("pages/{document_id}"))))
            .await?;
        codec::parse_document(&value)
    }

    async fn create_document(
        &self,
        collection_id: &str,
        fields: &[NamedField],
    ) -> Result<String, AppError> {
        let body = json!({
            "parent": { "database_id": collection_id },
            "properties": codec::fields_to_properties(fields),
        });
        let value = self
            .send(self.client.post(self.url("pages")).json(&body))
            .await?;
        value["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AppError::StoreWrite("create response missing `id`".into()))
    }

    async fn update_document_fields(
        &self,
        document_id: &str,
        fields: &[NamedField],
    ) -> Result<(), AppError> {
        let body = json!({ "properties": codec::fields_to_properties(fields) });
        self.send(
            self.client
                .patch(self.url(&format!("pages/{document_id}")))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn list_content_units(&self, document_id: &str) -> Result<Vec<ContentUnit>, AppError> {
        let value = self
            .send(
                self.client
                    .get(self.url(&format!("blocks/{document_id}/children"))),
            )
            .await?;
        Ok(codec::parse_units(&value["results"]))
    }

    async fn append_content_units(
        &self,
        document_id: &str,
        units: &[ContentUnit],
    ) -> Result<(), AppError> {
        let body = json!({ "children": codec::units_to_children(units) });
        self.send(
            self.client
                .patch(self.url(&format!("blocks/{document_id}/children")))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}
