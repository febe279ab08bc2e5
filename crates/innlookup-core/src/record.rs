//! Enrichment records: the flat summary, supplementary codes, and the
//! success/error record that the cache stores.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{LookupError, SENTINEL, scalar_text};

/// Supplementary classification codes served by the secondary upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodeKind {
    /// ОКПО, all-Russian classifier of enterprises and organisations.
    Okpo,
    /// ОКАТО, territory classifier.
    Okato,
    /// ОКФС, ownership-form classifier.
    Okfs,
    /// ОКОГУ, classifier of state authorities.
    Okogu,
}

impl CodeKind {
    pub const ALL: [CodeKind; 4] = [
        CodeKind::Okpo,
        CodeKind::Okato,
        CodeKind::Okfs,
        CodeKind::Okogu,
    ];

    /// Map a requisite `id` from the code search response.
    pub fn from_requisite_id(id: &str) -> Option<Self> {
        match id {
            "okpo" => Some(CodeKind::Okpo),
            "okato" => Some(CodeKind::Okato),
            "okfs" => Some(CodeKind::Okfs),
            "okogu" => Some(CodeKind::Okogu),
            _ => None,
        }
    }
}

/// Partial mapping of code kind to value. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplementaryCodes(BTreeMap<CodeKind, String>);

impl SupplementaryCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: CodeKind, value: impl Into<String>) {
        self.0.insert(kind, value.into());
    }

    pub fn get(&self, kind: CodeKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from the code search `requisites` items, keeping the
    /// recognised kinds. Items are only inspected once their `id` matches a
    /// known kind, so unknown items may have any shape. A recognised item
    /// whose `content` is missing or not a scalar maps to the sentinel.
    pub fn from_requisites(items: &[Value]) -> Self {
        let mut codes = Self::new();
        for item in items {
            let Some(kind) = item
                .get("id")
                .and_then(Value::as_str)
                .and_then(CodeKind::from_requisite_id)
            else {
                continue;
            };
            let content = item.get("content").and_then(scalar_text);
            codes.insert(kind, content.unwrap_or_else(|| SENTINEL.to_string()));
        }
        codes
    }
}

/// Flat summary of a legal entity. Field names on the wire are the EGRUL
/// attribute names the web and bot layers already key on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "НаимЮЛПолн")]
    pub full_name: String,
    #[serde(rename = "НаимСокр")]
    pub short_name: String,
    #[serde(rename = "КодОПФ")]
    pub opf_code: String,
    #[serde(rename = "ИНН")]
    pub inn: String,
    #[serde(rename = "КПП")]
    pub kpp: String,
    #[serde(rename = "ОГРН")]
    pub ogrn: String,
    #[serde(rename = "ДатаОбр")]
    pub registration_date: String,
    #[serde(rename = "КодРегиона")]
    pub region_code: String,
    #[serde(rename = "КодОКВЭД")]
    pub okved_code: String,
    #[serde(rename = "ОКПО")]
    pub okpo: String,
    #[serde(rename = "ОКАТО")]
    pub okato: String,
    #[serde(rename = "ОКФС")]
    pub okfs: String,
    #[serde(rename = "ОКОГУ")]
    pub okogu: String,
}

impl Default for Summary {
    fn default() -> Self {
        let s = || SENTINEL.to_string();
        Self {
            full_name: s(),
            short_name: s(),
            opf_code: s(),
            inn: s(),
            kpp: s(),
            ogrn: s(),
            registration_date: s(),
            region_code: s(),
            okved_code: s(),
            okpo: s(),
            okato: s(),
            okfs: s(),
            okogu: s(),
        }
    }
}

impl Summary {
    pub fn supplementary(&self, kind: CodeKind) -> &str {
        match kind {
            CodeKind::Okpo => &self.okpo,
            CodeKind::Okato => &self.okato,
            CodeKind::Okfs => &self.okfs,
            CodeKind::Okogu => &self.okogu,
        }
    }

    fn supplementary_mut(&mut self, kind: CodeKind) -> &mut String {
        match kind {
            CodeKind::Okpo => &mut self.okpo,
            CodeKind::Okato => &mut self.okato,
            CodeKind::Okfs => &mut self.okfs,
            CodeKind::Okogu => &mut self.okogu,
        }
    }

    pub fn set_supplementary(&mut self, kind: CodeKind, value: impl Into<String>) {
        *self.supplementary_mut(kind) = value.into();
    }

    /// Overlay freshly fetched codes. Kinds the upstream did not return
    /// become the sentinel.
    pub fn overlay_codes(&mut self, codes: &SupplementaryCodes) {
        for kind in CodeKind::ALL {
            self.set_supplementary(kind, codes.get(kind).unwrap_or(SENTINEL));
        }
    }

    /// Overlay codes carried over from an earlier summary, or the sentinel
    /// for every kind when there is none.
    pub fn overlay_previous(&mut self, previous: Option<&Summary>) {
        for kind in CodeKind::ALL {
            let value = previous.map_or(SENTINEL, |p| p.supplementary(kind));
            self.set_supplementary(kind, value);
        }
    }
}

/// The cached value for one INN: either a success record or an error record.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentRecord {
    Found { raw: Value, summary: Summary },
    Failed(LookupError),
}

impl EnrichmentRecord {
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            EnrichmentRecord::Found { summary, .. } => Some(summary),
            EnrichmentRecord::Failed(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&Value> {
        match self {
            EnrichmentRecord::Found { raw, .. } => Some(raw),
            EnrichmentRecord::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            EnrichmentRecord::Found { .. } => None,
            EnrichmentRecord::Failed(err) => Some(err),
        }
    }
}

impl From<LookupError> for EnrichmentRecord {
    fn from(err: LookupError) -> Self {
        EnrichmentRecord::Failed(err)
    }
}

/// `{"data": .., "short": ..}` on success,
/// `{"error": .., "kind": .., "short": {}}` on failure.
impl Serialize for EnrichmentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EnrichmentRecord::Found { raw, summary } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("data", raw)?;
                map.serialize_entry("short", summary)?;
                map.end()
            }
            EnrichmentRecord::Failed(err) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("error", &err.to_string())?;
                map.serialize_entry("kind", err.kind())?;
                map.serialize_entry("short", &BTreeMap::<String, String>::new())?;
                map.end()
            }
        }
    }
}
