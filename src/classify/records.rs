//! Classified record types and the per-mode result sets

use crate::config::ExtractMode;
use crate::core::tokenizer::Tag;
use serde::Serialize;

/// The closed set of tag kinds the classifier inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TagKind {
    FormItem,
    Button,
    TableColumn,
    DynamicComponent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonRecord {
    #[serde(flatten)]
    pub tag: Tag,
    /// Inner label reduced to identifying characters
    pub text: String,
    pub has_auth_attribute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormItemRecord {
    #[serde(flatten)]
    pub tag: Tag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumnRecord {
    #[serde(flatten)]
    pub tag: Tag,
}

/// Any record produced by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClassifiedRecord {
    Button(ButtonRecord),
    FormItem(FormItemRecord),
    TableColumn(TableColumnRecord),
}

impl ClassifiedRecord {
    pub fn tag(&self) -> &Tag {
        match self {
            ClassifiedRecord::Button(r) => &r.tag,
            ClassifiedRecord::FormItem(r) => &r.tag,
            ClassifiedRecord::TableColumn(r) => &r.tag,
        }
    }
}

/// Documentation mode output: records bucketed by region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationResult {
    pub search_params: Vec<FormItemRecord>,
    pub search_operations: Vec<ButtonRecord>,
    pub data_params: Vec<TableColumnRecord>,
    pub data_operations: Vec<ButtonRecord>,
}

impl DocumentationResult {
    pub fn is_empty(&self) -> bool {
        self.search_params.is_empty()
            && self.search_operations.is_empty()
            && self.data_params.is_empty()
            && self.data_operations.is_empty()
    }

    pub fn merge(&mut self, other: DocumentationResult) {
        self.search_params.extend(other.search_params);
        self.search_operations.extend(other.search_operations);
        self.data_params.extend(other.data_params);
        self.data_operations.extend(other.data_operations);
    }
}

/// Permission mode record, one per watched tag in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    #[serde(flatten)]
    pub tag: Tag,
    pub kind: TagKind,
    /// Normalized label, buttons only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub is_button_auth_present: bool,
    pub is_table_column_auth_present: bool,
    pub is_table_column_legacy_auth_present: bool,
    pub is_dynamic_component_tag: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionResult {
    pub records: Vec<PermissionRecord>,
}

impl PermissionResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn merge(&mut self, other: PermissionResult) {
        self.records.extend(other.records);
    }
}

/// Output of one or more classifier passes in a single mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultSet {
    Documentation(DocumentationResult),
    Permission(PermissionResult),
}

impl ResultSet {
    pub fn empty(mode: ExtractMode) -> Self {
        match mode {
            ExtractMode::Documentation => ResultSet::Documentation(DocumentationResult::default()),
            ExtractMode::Permission => ResultSet::Permission(PermissionResult::default()),
        }
    }

    pub fn mode(&self) -> ExtractMode {
        match self {
            ResultSet::Documentation(_) => ExtractMode::Documentation,
            ResultSet::Permission(_) => ExtractMode::Permission,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ResultSet::Documentation(r) => r.is_empty(),
            ResultSet::Permission(r) => r.is_empty(),
        }
    }

    /// Append `other` after this set's records
    ///
    /// Both sets come from the same adapter, so a mode mismatch means the
    /// caller mixed adapters; the foreign set is dropped.
    pub fn merge(&mut self, other: ResultSet) {
        match (self, other) {
            (ResultSet::Documentation(a), ResultSet::Documentation(b)) => a.merge(b),
            (ResultSet::Permission(a), ResultSet::Permission(b)) => a.merge(b),
            (this, other) => {
                tracing::warn!(
                    expected = ?this.mode(),
                    found = ?other.mode(),
                    "dropping result set of another mode"
                );
            }
        }
    }

    pub fn as_documentation(&self) -> Option<&DocumentationResult> {
        match self {
            ResultSet::Documentation(r) => Some(r),
            ResultSet::Permission(_) => None,
        }
    }

    pub fn as_permission(&self) -> Option<&PermissionResult> {
        match self {
            ResultSet::Permission(r) => Some(r),
            ResultSet::Documentation(_) => None,
        }
    }

    /// Normalized button labels in record order
    pub fn button_texts(&self) -> Vec<&str> {
        match self {
            ResultSet::Documentation(r) => r
                .search_operations
                .iter()
                .chain(&r.data_operations)
                .map(|b| b.text.as_str())
                .collect(),
            ResultSet::Permission(r) => r
                .records
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect(),
        }
    }

    /// Every record as a [`ClassifiedRecord`], for consumers that do not care about mode
    pub fn classified(&self) -> Vec<ClassifiedRecord> {
        match self {
            ResultSet::Documentation(r) => r
                .search_params
                .iter()
                .cloned()
                .map(ClassifiedRecord::FormItem)
                .chain(r.search_operations.iter().cloned().map(ClassifiedRecord::Button))
                .chain(r.data_params.iter().cloned().map(ClassifiedRecord::TableColumn))
                .chain(r.data_operations.iter().cloned().map(ClassifiedRecord::Button))
                .collect(),
            ResultSet::Permission(r) => r
                .records
                .iter()
                .filter_map(|p| match p.kind {
                    TagKind::Button => Some(ClassifiedRecord::Button(ButtonRecord {
                        tag: p.tag.clone(),
                        text: p.text.clone().unwrap_or_default(),
                        has_auth_attribute: p.is_button_auth_present,
                    })),
                    TagKind::FormItem => Some(ClassifiedRecord::FormItem(FormItemRecord {
                        tag: p.tag.clone(),
                    })),
                    TagKind::TableColumn => Some(ClassifiedRecord::TableColumn(TableColumnRecord {
                        tag: p.tag.clone(),
                    })),
                    TagKind::DynamicComponent => None,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_fragment;
    use crate::config::ClassifierConfig;
    use pretty_assertions::assert_eq;

    const FRAGMENT: &str = concat!(
        "<template #search>",
        "<el-form-item label=\"Name\"/>",
        "<el-button>Query</el-button>",
        "</template>",
        "<template #table>",
        "<component :is=\"tab\"/>",
        "<el-table-column prop=\"age\"/>",
        "<el-button v-auth=\"'user:del'\">Delete</el-button>",
        "</template>",
    );

    fn summary(records: &[ClassifiedRecord]) -> Vec<(&str, &str)> {
        records
            .iter()
            .map(|r| match r {
                ClassifiedRecord::Button(b) => ("button", b.text.as_str()),
                ClassifiedRecord::FormItem(f) => ("formItem", f.tag.name.as_str()),
                ClassifiedRecord::TableColumn(c) => ("tableColumn", c.tag.name.as_str()),
            })
            .collect()
    }

    #[test]
    fn test_classified_documentation_follows_bucket_order() {
        let (result, _) = classify_fragment(FRAGMENT, &ClassifierConfig::default(), ExtractMode::Documentation);
        let records = result.classified();
        assert_eq!(
            summary(&records),
            [
                ("formItem", "el-form-item"),
                ("button", "Query"),
                ("tableColumn", "el-table-column"),
                ("button", "Delete"),
            ]
        );
    }

    #[test]
    fn test_classified_permission_drops_dynamic_components() {
        let (result, _) = classify_fragment(FRAGMENT, &ClassifierConfig::default(), ExtractMode::Permission);
        assert_eq!(result.as_permission().unwrap().records.len(), 5);

        let records = result.classified();
        assert_eq!(
            summary(&records),
            [
                ("formItem", "el-form-item"),
                ("button", "Query"),
                ("tableColumn", "el-table-column"),
                ("button", "Delete"),
            ]
        );
        match &records[3] {
            ClassifiedRecord::Button(b) => assert!(b.has_auth_attribute),
            other => panic!("expected a button, got {other:?}"),
        }
        assert_eq!(records[1].tag().name, "el-button");
    }

    #[test]
    fn test_classified_button_without_text() {
        let tag = Tag {
            name: "el-button".to_string(),
            lower_name: "el-button".to_string(),
            attributes: Vec::new(),
            start: 0,
            end: 11,
            bytes: Default::default(),
        };
        let result = ResultSet::Permission(PermissionResult {
            records: vec![PermissionRecord {
                tag,
                kind: TagKind::Button,
                text: None,
                is_button_auth_present: false,
                is_table_column_auth_present: false,
                is_table_column_legacy_auth_present: false,
                is_dynamic_component_tag: false,
            }],
        });
        match result.classified().as_slice() {
            [ClassifiedRecord::Button(b)] => assert_eq!(b.text, ""),
            other => panic!("unexpected records {other:?}"),
        }
    }

    #[test]
    fn test_classified_serializes_kind_tag() {
        let (result, _) = classify_fragment(FRAGMENT, &ClassifierConfig::default(), ExtractMode::Documentation);
        let json = serde_json::to_value(result.classified()).unwrap();
        assert_eq!(json[0]["kind"], "formItem");
        assert_eq!(json[1]["kind"], "button");
        assert_eq!(json[1]["text"], "Query");
    }
}
