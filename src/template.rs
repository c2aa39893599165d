//! Card templates and field projection.
//!
//! A template names the fields printed on each card, in order, and picks one
//! of them as the primary key. The primary key is what the QR code encodes
//! and what each page header reports as its range.
//!
//! Projection turns a loose [`Record`] into the exact lines a card shows.
//! It never fails: a record missing fields still gets a card, with empty
//! values, so one malformed row cannot sink a whole batch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::model::Record;

/// Most fields a card has room for.
pub const MAX_COLUMNS: usize = 5;

/// Shown in headers when a record has no primary-key value.
pub const MISSING_KEY: &str = "N/A";

/// Ordered field list plus the field that drives the QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub columns: Vec<String>,
    pub primary_key: String,
}

impl Default for Template {
    /// The household card layout: `HH ID, Name, Gender, Mobile, Union`,
    /// keyed by `HH ID`.
    fn default() -> Self {
        Template {
            columns: ["HH ID", "Name", "Gender", "Mobile", "Union"]
                .into_iter()
                .map(String::from)
                .collect(),
            primary_key: "HH ID".to_string(),
        }
    }
}

impl Template {
    pub fn new<I, S>(columns: I, primary_key: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Template {
            columns: columns.into_iter().map(Into::into).collect(),
            primary_key: primary_key.into(),
        }
    }

    /// Check the template invariants. No side effects.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.columns.is_empty() {
            return Err(TemplateError::EmptyColumns);
        }
        if self.columns.len() > MAX_COLUMNS {
            return Err(TemplateError::TooManyColumns {
                count: self.columns.len(),
                max: MAX_COLUMNS,
            });
        }

        let mut seen = HashSet::new();
        for name in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(TemplateError::DuplicateColumn { name: name.clone() });
            }
        }

        if !seen.contains(self.primary_key.as_str()) {
            return Err(TemplateError::PrimaryKeyNotInColumns {
                primary_key: self.primary_key.clone(),
            });
        }
        Ok(())
    }

    /// The CSV header row operators fill in for batch uploads.
    pub fn csv_header(&self) -> String {
        self.columns
            .iter()
            .map(|c| {
                if c.contains([',', '"', '\n']) {
                    format!("\"{}\"", c.replace('"', "\"\""))
                } else {
                    c.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Project a record onto this template.
    pub fn project(&self, record: &Record) -> Projection {
        project(record, self)
    }
}

/// The printable view of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// `"<column>: <value>"`, one per template column, in template order.
    pub lines: Vec<String>,
    /// Primary-key value for page headers; [`MISSING_KEY`] when absent.
    pub key_value: String,
    /// Raw primary-key value handed to the code encoder. Empty when absent.
    pub code_value: String,
}

/// Build the card lines and key values for `record`.
pub fn project(record: &Record, template: &Template) -> Projection {
    let lines = template
        .columns
        .iter()
        .map(|name| format!("{}: {}", name, record.get(name).unwrap_or("")))
        .collect();

    let code_value = record.get(&template.primary_key).unwrap_or("").to_string();
    let key_value = if code_value.is_empty() {
        MISSING_KEY.to_string()
    } else {
        code_value.clone()
    };

    Projection {
        lines,
        key_value,
        code_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_is_valid() {
        assert_eq!(Template::default().validate(), Ok(()));
    }

    #[test]
    fn empty_columns_rejected() {
        let t = Template::new(Vec::<String>::new(), "A");
        assert_eq!(t.validate(), Err(TemplateError::EmptyColumns));
    }

    #[test]
    fn primary_key_must_be_a_column() {
        let t = Template::new(["A", "B"], "C");
        assert_eq!(
            t.validate(),
            Err(TemplateError::PrimaryKeyNotInColumns {
                primary_key: "C".to_string()
            })
        );
    }

    #[test]
    fn duplicate_column_rejected() {
        let t = Template::new(["A", "B", "A"], "A");
        assert_eq!(
            t.validate(),
            Err(TemplateError::DuplicateColumn {
                name: "A".to_string()
            })
        );
    }

    #[test]
    fn six_columns_rejected() {
        let t = Template::new(["A", "B", "C", "D", "E", "F"], "A");
        assert_eq!(
            t.validate(),
            Err(TemplateError::TooManyColumns { count: 6, max: 5 })
        );
    }

    #[test]
    fn projection_fills_missing_fields() {
        let record = Record::new().with("Name", "Jane Doe");
        let p = project(&record, &Template::default());
        assert_eq!(
            p.lines,
            vec!["HH ID: ", "Name: Jane Doe", "Gender: ", "Mobile: ", "Union: "]
        );
        assert_eq!(p.key_value, "N/A");
        assert_eq!(p.code_value, "");
    }

    #[test]
    fn projection_follows_template_order() {
        let record = Record::new()
            .with("B", "2")
            .with("A", "1")
            .with("Ignored", "x");
        let p = Template::new(["B", "A"], "A").project(&record);
        assert_eq!(p.lines, vec!["B: 2", "A: 1"]);
        assert_eq!(p.key_value, "1");
        assert_eq!(p.code_value, "1");
    }

    #[test]
    fn empty_key_value_reads_as_missing() {
        let record = Record::new().with("HH ID", "");
        let p = project(&record, &Template::default());
        assert_eq!(p.key_value, MISSING_KEY);
    }

    #[test]
    fn csv_header_quotes_awkward_names() {
        assert_eq!(
            Template::default().csv_header(),
            "HH ID,Name,Gender,Mobile,Union"
        );
        let t = Template::new(["Name, Full", "Id"], "Id");
        assert_eq!(t.csv_header(), "\"Name, Full\",Id");
    }
}
