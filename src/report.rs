//! Result consumers
//!
//! Flattening helpers for the collaborators that turn result sets into
//! documents: button label collection for translation, a label lookup table,
//! and row-shaped output for spreadsheet exporters.

use crate::classify::{ButtonRecord, ClassifiedRecord, ResultSet, TagKind};
use crate::config::ClassifierConfig;
use crate::core::tokenizer::Tag;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Non-empty button labels across all results, first-seen order, no repeats
pub fn collect_button_labels<'r>(results: impl IntoIterator<Item = &'r ResultSet>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for result in results {
        for text in result.button_texts() {
            if !text.is_empty() && seen.insert(text) {
                labels.push(text.to_string());
            }
        }
    }
    labels
}

/// One translated label as returned by the translation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedLabel {
    pub label: String,
    pub value: String,
}

/// Exact-text lookup of translated labels
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    entries: HashMap<String, String>,
}

impl LabelTable {
    pub fn new(labels: impl IntoIterator<Item = TranslatedLabel>) -> Self {
        LabelTable {
            entries: labels.into_iter().map(|t| (t.label, t.value)).collect(),
        }
    }

    /// Parse a JSON array of `{ "label", "value" }` objects
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let labels: Vec<TranslatedLabel> = serde_json::from_str(json)?;
        Ok(Self::new(labels))
    }

    /// Translated value, or `text` itself when no translation exists
    pub fn lookup<'a>(&'a self, text: &'a str) -> &'a str {
        self.entries.get(text).map_or(text, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Search,
    Data,
}

/// One exported row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Region the record was found in, `None` in permission mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    pub kind: TagKind,
    pub label: String,
    pub value: String,
    /// Character indices of the tag in its fragment
    pub start: usize,
    pub end: usize,
}

/// Flatten a result set into rows, in record order
///
/// Dynamic component records carry nothing to export and are left out.
pub fn report_rows(result: &ResultSet, config: &ClassifierConfig) -> Vec<ReportRow> {
    match result {
        ResultSet::Documentation(docs) => {
            let search = docs
                .search_params
                .iter()
                .map(|r| field_row(Some(Section::Search), TagKind::FormItem, &r.tag))
                .chain(docs.search_operations.iter().map(|b| button_row(Some(Section::Search), b, config)));
            let data = docs
                .data_params
                .iter()
                .map(|r| field_row(Some(Section::Data), TagKind::TableColumn, &r.tag))
                .chain(docs.data_operations.iter().map(|b| button_row(Some(Section::Data), b, config)));
            search.chain(data).collect()
        }
        ResultSet::Permission(_) => result
            .classified()
            .iter()
            .map(|record| match record {
                ClassifiedRecord::Button(b) => button_row(None, b, config),
                ClassifiedRecord::FormItem(r) => field_row(None, TagKind::FormItem, &r.tag),
                ClassifiedRecord::TableColumn(r) => field_row(None, TagKind::TableColumn, &r.tag),
            })
            .collect(),
    }
}

/// Render any serializable result as indented JSON
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

fn field_row(section: Option<Section>, kind: TagKind, tag: &Tag) -> ReportRow {
    ReportRow {
        section,
        kind,
        label: attribute_value(tag, "label"),
        value: attribute_value(tag, "prop"),
        start: tag.start,
        end: tag.end,
    }
}

fn button_row(section: Option<Section>, button: &ButtonRecord, config: &ClassifierConfig) -> ReportRow {
    ReportRow {
        section,
        kind: TagKind::Button,
        label: button.text.clone(),
        value: auth_value(&button.tag, &config.button_auth_attribute),
        start: button.tag.start,
        end: button.tag.end,
    }
}

fn attribute_value(tag: &Tag, name: &str) -> String {
    tag.attribute(name).map(|a| a.value.clone()).unwrap_or_default()
}

// Auth values are string-literal expressions: v-auth="'user:add'"
fn auth_value(tag: &Tag, name: &str) -> String {
    tag.attribute(name)
        .map(|a| a.value.replace('\'', ""))
        .unwrap_or_default()
}
