//! # Document Model
//!
//! The input representation for the card engine. A card document is an
//! ordered list of records plus the template that decides which of their
//! fields end up on each card. It is designed to be produced directly from a
//! spreadsheet export, a form, or hand-written JSON.
//!
//! Records are deliberately loose: any field name, any scalar value, missing
//! fields allowed. The template is the strict half.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::Template;

/// A complete card document ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDocument {
    /// Which fields to print, and which one drives the QR code.
    #[serde(default)]
    pub template: Template,

    /// One record per card, in print order.
    #[serde(default)]
    pub records: Vec<Record>,

    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// One card's source data: field name to value.
///
/// Deserializes leniently from a JSON object. Strings are kept as-is,
/// numbers and booleans are stringified, `null` means the field is absent,
/// and nested arrays/objects are kept as compact JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, String>")]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and hand-built records.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => other.to_string(),
                };
                Some((name, text))
            })
            .collect();
        Record { fields }
    }
}

impl From<Record> for BTreeMap<String, String> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_stringifies_scalars() {
        let record: Record = serde_json::from_str(
            r#"{"HH ID": "HH-1", "Mobile": 1712345678, "Active": true, "Union": null}"#,
        )
        .unwrap();
        assert_eq!(record.get("HH ID"), Some("HH-1"));
        assert_eq!(record.get("Mobile"), Some("1712345678"));
        assert_eq!(record.get("Active"), Some("true"));
        assert_eq!(record.get("Union"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn record_keeps_nested_values_as_json() {
        let record: Record = serde_json::from_str(r#"{"Tags": ["a", "b"]}"#).unwrap();
        assert_eq!(record.get("Tags"), Some(r#"["a","b"]"#));
    }

    #[test]
    fn document_defaults_template_and_metadata() {
        let doc: CardDocument = serde_json::from_str(r#"{"records": [{"Name": "Jane"}]}"#).unwrap();
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.template, Template::default());
        assert!(doc.metadata.title.is_none());
    }

    #[test]
    fn document_reads_camel_case_template() {
        let doc: CardDocument = serde_json::from_str(
            r#"{"template": {"columns": ["A", "B"], "primaryKey": "B"}, "records": []}"#,
        )
        .unwrap();
        assert_eq!(doc.template.columns, vec!["A", "B"]);
        assert_eq!(doc.template.primary_key, "B");
    }

    #[test]
    fn record_from_pairs() {
        let record: Record = [("Name", "Jane Doe"), ("Gender", "F")].into_iter().collect();
        assert_eq!(record.get("Name"), Some("Jane Doe"));
        assert_eq!(record.iter().count(), 2);
    }
}
