//! Projection of an EGRUL registry document into a flat [`Summary`].
//!
//! EGRUL documents are XML converted to JSON: element attributes live under
//! an `@attributes` object on each element. Any missing element or attribute
//! is data, not an error, and yields [`SENTINEL`]. Only a container that is
//! present but is not an object counts as an unexpected shape.

use serde_json::Value;

use crate::{LookupError, Summary};

/// Marker for any field whose value could not be determined.
pub const SENTINEL: &str = "-";

const ATTRS: &str = "@attributes";
const ENTITY: &str = "СвЮЛ";

/// Walk `path` through nested objects.
///
/// Returns `Ok(None)` when a segment is absent or `null`, and an
/// [`LookupError::Extraction`] when an intermediate value is not an object.
fn walk<'a>(doc: &'a Value, path: &[&str]) -> Result<Option<&'a Value>, LookupError> {
    let mut current = doc;
    for (depth, key) in path.iter().enumerate() {
        let Some(obj) = current.as_object() else {
            return Err(LookupError::Extraction(format!(
                "expected an object at `{}`, found {}",
                display_path(&path[..depth]),
                kind_of(current)
            )));
        };
        match obj.get(*key) {
            None | Some(Value::Null) => return Ok(None),
            Some(next) => current = next,
        }
    }
    Ok(Some(current))
}

/// Render a string, number, or boolean as text. `None` for anything else.
pub fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(v.to_string()),
        _ => None,
    }
}

/// Read a scalar at `path` as text, or [`SENTINEL`] when it is absent.
pub fn text_at(doc: &Value, path: &[&str]) -> Result<String, LookupError> {
    match walk(doc, path)? {
        None => Ok(SENTINEL.to_string()),
        Some(v) => scalar_text(v).ok_or_else(|| {
            LookupError::Extraction(format!(
                "expected a scalar at `{}`, found {}",
                display_path(path),
                kind_of(v)
            ))
        }),
    }
}

/// Like [`text_at`], but an empty string also counts as absent.
fn non_empty_at(doc: &Value, path: &[&str]) -> Result<Option<String>, LookupError> {
    let text = text_at(doc, path)?;
    Ok((text != SENTINEL && !text.is_empty()).then_some(text))
}

/// Build the summary for a registry document. Supplementary code fields are
/// left as [`SENTINEL`]; the caller overlays them.
pub fn extract_summary(doc: &Value) -> Result<Summary, LookupError> {
    if !doc.is_object() {
        return Err(LookupError::Extraction(format!(
            "document root is {}, expected an object",
            kind_of(doc)
        )));
    }

    let registration_date = match non_empty_at(doc, &[ENTITY, "СвОбрЮЛ", ATTRS, "ДатаРег"])? {
        Some(date) => date,
        None => text_at(doc, &[ENTITY, "СвОбрЮЛ", ATTRS, "ДатаОГРН"])?,
    };

    Ok(Summary {
        full_name: text_at(doc, &[ENTITY, "СвНаимЮЛ", ATTRS, "НаимЮЛПолн"])?,
        short_name: text_at(doc, &[ENTITY, "СвНаимЮЛ", "СвНаимЮЛСокр", ATTRS, "НаимСокр"])?,
        opf_code: text_at(doc, &[ENTITY, ATTRS, "КодОПФ"])?,
        inn: text_at(doc, &[ENTITY, ATTRS, "ИНН"])?,
        kpp: text_at(doc, &[ENTITY, ATTRS, "КПП"])?,
        ogrn: text_at(doc, &[ENTITY, ATTRS, "ОГРН"])?,
        registration_date,
        region_code: text_at(doc, &[ENTITY, "СвАдресЮЛ", "АдресРФ", ATTRS, "КодРегион"])?,
        okved_code: text_at(doc, &[ENTITY, "СвОКВЭД", "СвОКВЭДОсн", ATTRS, "КодОКВЭД"])?,
        ..Summary::default()
    })
}

fn display_path(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
