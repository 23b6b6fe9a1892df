//! JSON codec for the content store's wire format.
//!
//! Kept separate from the HTTP plumbing so the mapping between our typed
//! model and the store's property/block JSON can be tested without a server.

use crate::errors::AppError;
use crate::model::{ContentUnit, FieldValue, FileRef, ImageSource, NamedField, SourceDocument, TextKind};
use serde_json::{json, Map, Value};

/// Parse one document object (`id`, `url`, `properties`) into our model.
/// Properties of unknown type are skipped.
pub fn parse_document(value: &Value) -> Result<SourceDocument, AppError> {
    let id = value["id"]
        .as_str()
        .ok_or_else(|| AppError::StoreWrite("document object missing `id`".into()))?
        .to_string();
    let url = value["url"].as_str().unwrap_or_default().to_string();

    let mut fields = Vec::new();
    if let Some(props) = value["properties"].as_object() {
        for (name, prop) in props {
            if let Some(field) = parse_field(name, prop) {
                fields.push(field);
            }
        }
    }

    Ok(SourceDocument { id, url, fields })
}

fn parse_field(name: &str, prop: &Value) -> Option<NamedField> {
    let slot_id = prop["id"].as_str().map(String::from);
    let value = match prop["type"].as_str()? {
        "title" => FieldValue::Title(join_rich_text(&prop["title"])),
        "rich_text" => FieldValue::RichText(join_rich_text(&prop["rich_text"])),
        "checkbox" => FieldValue::Checkbox(prop["checkbox"].as_bool().unwrap_or(false)),
        "date" => FieldValue::Date(prop["date"]["start"].as_str()?.to_string()),
        "multi_select" => FieldValue::MultiSelect(
            prop["multi_select"]
                .as_array()?
                .iter()
                .filter_map(|t| t["name"].as_str().map(String::from))
                .collect(),
        ),
        "select" => FieldValue::Select(prop["select"]["name"].as_str()?.to_string()),
        "files" => FieldValue::Files(
            prop["files"]
                .as_array()?
                .iter()
                .filter_map(parse_file_ref)
                .collect(),
        ),
        "url" => FieldValue::Url(prop["url"].as_str()?.to_string()),
        other => {
            tracing::debug!(field = name, kind = other, "skipping unsupported field type");
            return None;
        }
    };
    Some(NamedField {
        name: name.to_string(),
        slot_id,
        value,
    })
}

fn parse_file_ref(file: &Value) -> Option<FileRef> {
    let kind = file["type"].as_str()?.to_string();
    let url = file[&kind]["url"].as_str().unwrap_or_default().to_string();
    Some(FileRef {
        name: file["name"].as_str().unwrap_or_default().to_string(),
        kind,
        url,
    })
}

fn join_rich_text(value: &Value) -> String {
    value
        .as_array()
        .map(|runs| {
            runs.iter()
                .filter_map(|r| r["plain_text"].as_str().or_else(|| r["text"]["content"].as_str()))
                .collect::<Vec<_>>()
                .concat()
        })
        .unwrap_or_default()
}

/// Encode a field set as a `properties` object for create/update calls.
/// Fields carrying a slot id keep it so the write targets the same logical
/// slot in the destination schema.
pub fn fields_to_properties(fields: &[NamedField]) -> Value {
    let mut props = Map::new();
    for field in fields {
        let mut prop = match &field.value {
            FieldValue::Title(text) => json!({ "title": [text_run(text)] }),
            FieldValue::RichText(text) => json!({ "rich_text": [text_run(text)] }),
            FieldValue::Checkbox(flag) => json!({ "checkbox": flag }),
            FieldValue::Date(start) => json!({ "date": { "start": start } }),
            FieldValue::MultiSelect(names) => json!({
                "multi_select": names.iter().map(|n| json!({ "name": n })).collect::<Vec<_>>()
            }),
            FieldValue::Select(name) => json!({ "select": { "name": name } }),
            FieldValue::Files(files) => json!({
                "files": files
                    .iter()
                    .map(|f| json!({ "name": f.name, "type": f.kind, f.kind.clone(): { "url": f.url } }))
                    .collect::<Vec<_>>()
            }),
            FieldValue::Url(url) => json!({ "url": url }),
        };
        if let Some(slot) = &field.slot_id {
            prop["id"] = json!(slot);
        }
        props.insert(field.name.clone(), prop);
    }
    Value::Object(props)
}

fn text_run(text: &str) -> Value {
    json!({ "type": "text", "text": { "content": text } })
}

/// Parse a block-children listing into ordered content units. Block types we
/// do not translate are dropped here.
pub fn parse_units(results: &Value) -> Vec<ContentUnit> {
    results
        .as_array()
        .map(|blocks| blocks.iter().filter_map(parse_unit).collect())
        .unwrap_or_default()
}

fn parse_unit(block: &Value) -> Option<ContentUnit> {
    let kind = block["type"].as_str()?;
    if kind == "image" {
        let image = &block["image"];
        return Some(ContentUnit::Image {
            source: ImageSource {
                hosted_url: image["file"]["url"].as_str().map(String::from),
                external_url: image["external"]["url"].as_str().map(String::from),
            },
        });
    }
    let text_kind = TextKind::from_str(kind)?;
    let runs = block[kind]["rich_text"]
        .as_array()
        .map(|runs| {
            runs.iter()
                .filter_map(|r| r["plain_text"].as_str().or_else(|| r["text"]["content"].as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    Some(ContentUnit::Text { kind: text_kind, runs })
}

/// Encode units as the `children` array of a batched append call.
pub fn units_to_children(units: &[ContentUnit]) -> Value {
    let children: Vec<Value> = units
        .iter()
        .map(|unit| match unit {
            ContentUnit::Text { kind, runs } => {
                let wire = kind.as_str();
                json!({
                    "object": "block",
                    "type": wire,
                    wire: { "rich_text": runs.iter().map(|r| text_run(r)).collect::<Vec<_>>() }
                })
            }
            ContentUnit::Image { source } => {
                // Appended images are always external links to the durable copy.
                let url = source.effective_url().unwrap_or_default();
                json!({
                    "object": "block",
                    "type": "image",
                    "image": { "type": "external", "external": { "url": url } }
                })
            }
        })
        .collect();
    json!(children)
}
