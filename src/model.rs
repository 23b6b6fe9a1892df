//! Core data model for the translation pipeline.
//!
//! Source documents are owned by the external content store and read-only
//! here; everything in this module is a typed view over what that store
//! returns, plus the report types the orchestrator produces.

use serde::{Deserialize, Serialize};

/// One document in the source collection, pre-translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    /// Canonical URL of the source document, recorded in the ledger.
    pub url: String,
    /// Ordered set of named typed fields.
    pub fields: Vec<NamedField>,
}

impl SourceDocument {
    pub fn field(&self, name: &str) -> Option<&NamedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Plain-text content of a title or rich-text field, if present.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        match self.field(name).map(|f| &f.value) {
            Some(FieldValue::Title(s)) | Some(FieldValue::RichText(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_published(&self, flag_field: &str) -> bool {
        matches!(
            self.field(flag_field).map(|f| &f.value),
            Some(FieldValue::Checkbox(true))
        )
    }
}

/// A named field together with the stable identifier of its schema slot.
///
/// The slot id is what lets a write-back target the same logical field in the
/// destination schema; fields without one are matched by name alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedField {
    pub name: String,
    pub slot_id: Option<String>,
    pub value: FieldValue,
}

impl NamedField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            slot_id: None,
            value,
        }
    }

    pub fn with_slot(name: impl Into<String>, slot_id: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            slot_id: Some(slot_id.into()),
            value,
        }
    }
}

/// Typed field payloads supported by the content store schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldValue {
    Title(String),
    RichText(String),
    Checkbox(bool),
    /// ISO-8601 date, passed through verbatim.
    Date(String),
    MultiSelect(Vec<String>),
    Select(String),
    Files(Vec<FileRef>),
    Url(String),
}

/// One attached file on a file-list field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    /// Hosting kind as reported by the store (`file` or `external`).
    pub kind: String,
    pub url: String,
}

/// One paragraph/heading/image within a document body.
///
/// Units have no identity of their own; they are ordered within their parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentUnit {
    Text { kind: TextKind, runs: Vec<String> },
    Image { source: ImageSource },
}

impl ContentUnit {
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentUnit::Text {
            kind: TextKind::Paragraph,
            runs: vec![text.into()],
        }
    }

    pub fn external_image(url: impl Into<String>) -> Self {
        ContentUnit::Image {
            source: ImageSource {
                hosted_url: None,
                external_url: Some(url.into()),
            },
        }
    }

    /// Concatenation of all text runs; empty for image units.
    pub fn plain_text(&self) -> String {
        match self {
            ContentUnit::Text { runs, .. } => runs.concat(),
            ContentUnit::Image { .. } => String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Quote,
    BulletedListItem,
}

impl TextKind {
    /// Wire name used by the content store API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextKind::Paragraph => "paragraph",
            TextKind::Heading1 => "heading_1",
            TextKind::Heading2 => "heading_2",
            TextKind::Heading3 => "heading_3",
            TextKind::Quote => "quote",
            TextKind::BulletedListItem => "bulleted_list_item",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "paragraph" => Some(TextKind::Paragraph),
            "heading_1" => Some(TextKind::Heading1),
            "heading_2" => Some(TextKind::Heading2),
            "heading_3" => Some(TextKind::Heading3),
            "quote" => Some(TextKind::Quote),
            "bulleted_list_item" => Some(TextKind::BulletedListItem),
            _ => None,
        }
    }
}

/// Where an image unit's bytes live. Internally hosted files carry an
/// expiring URL minted by the store; external images point anywhere.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub hosted_url: Option<String>,
    pub external_url: Option<String>,
}

impl ImageSource {
    /// Effective source URL: the hosted copy wins over the external link.
    /// `None` means the unit has nothing retrievable and must be dropped.
    pub fn effective_url(&self) -> Option<&str> {
        self.hosted_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.external_url.as_deref().filter(|u| !u.is_empty()))
    }
}

/// One target language and the destination collection that receives its
/// copies. Static configuration, never derived.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LanguageTarget {
    pub code: String,
    pub collection_id: String,
    /// Some targets need identifier-only URLs (third-party slug encoding
    /// limitation, carried as configuration).
    #[serde(default)]
    pub slugless: bool,
}

/// Result of one (document, language) replication attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outcome {
    pub document_id: String,
    pub language: String,
    pub status: OutcomeStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success { destination_id: String },
    Failure { reason: String },
}

impl Outcome {
    pub fn success(document_id: &str, language: &str, destination_id: String) -> Self {
        Self {
            document_id: document_id.to_string(),
            language: language.to_string(),
            status: OutcomeStatus::Success { destination_id },
        }
    }

    pub fn failure(document_id: &str, language: &str, reason: String) -> Self {
        Self {
            document_id: document_id.to_string(),
            language: language.to_string(),
            status: OutcomeStatus::Failure { reason },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success { .. })
    }
}

/// Final report of an orchestrator run. Message lists preserve the
/// (document, language) processing order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub successes: Vec<String>,
    pub failures: Vec<String>,
    pub outcomes: Vec<Outcome>,
}

impl RunReport {
    pub fn record(&mut self, outcome: Outcome) {
        match &outcome.status {
            OutcomeStatus::Success { destination_id } => self.successes.push(format!(
                "{} translated to {} as {}",
                outcome.document_id, outcome.language, destination_id
            )),
            OutcomeStatus::Failure { reason } => self.failures.push(format!(
                "{} failed for {}: {}",
                outcome.document_id, outcome.language, reason
            )),
        }
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_url_prefers_hosted() {
        let source = ImageSource {
            hosted_url: Some("https://store/img.jpg".into()),
            external_url: Some("https://elsewhere/img.jpg".into()),
        };
        assert_eq!(source.effective_url(), Some("https://store/img.jpg"));
    }

    #[test]
    fn effective_url_falls_back_to_external() {
        let source = ImageSource {
            hosted_url: None,
            external_url: Some("https://elsewhere/img.jpg".into()),
        };
        assert_eq!(source.effective_url(), Some("https://elsewhere/img.jpg"));
    }

    #[test]
    fn effective_url_ignores_empty_strings() {
        let source = ImageSource {
            hosted_url: Some(String::new()),
            external_url: None,
        };
        assert_eq!(source.effective_url(), None);
    }

    #[test]
    fn plain_text_joins_runs() {
        let unit = ContentUnit::Text {
            kind: TextKind::Paragraph,
            runs: vec!["Hello, ".into(), "world".into()],
        };
        assert_eq!(unit.plain_text(), "Hello, world");
    }

    #[test]
    fn report_preserves_processing_order() {
        let mut report = RunReport::default();
        report.record(Outcome::success("a", "fr", "d1".into()));
        report.record(Outcome::failure("a", "es", "boom".into()));
        report.record(Outcome::success("b", "fr", "d2".into()));

        assert_eq!(report.successes.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.successes[0].starts_with("a "));
        assert!(report.successes[1].starts_with("b "));
    }

    #[test]
    fn text_kind_round_trips_wire_names() {
        for kind in [
            TextKind::Paragraph,
            TextKind::Heading1,
            TextKind::Heading2,
            TextKind::Heading3,
            TextKind::Quote,
            TextKind::BulletedListItem,
        ] {
            assert_eq!(TextKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TextKind::from_str("toggle"), None);
    }
}
