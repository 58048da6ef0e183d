//! Semantic tag classification
//!
//! The [`Classifier`] is the [`TagHandler`] driven by the tokenizer. For each
//! start tag it:
//! 1. updates the sticky [`RegionContext`] when the tag is a marked root wrapper
//! 2. looks the tag name up in a closed [`TagKind`] table
//! 3. hands watched tags to the per-kind handler for the active [`ExtractMode`]
//!
//! Region flags belong to one classifier, which belongs to one fragment pass.

pub mod records;

pub use records::{
    ButtonRecord, ClassifiedRecord, DocumentationResult, FormItemRecord, PermissionRecord,
    PermissionResult, ResultSet, TableColumnRecord, TagKind,
};

use crate::config::{ClassifierConfig, ExtractMode};
use crate::core::tokenizer::{Tag, TagHandler, Termination, Tokenizer};
use crate::core::unicode::is_identifying_char;

/// Sticky region flags for one fragment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionContext {
    pub in_search_region: bool,
    pub in_data_region: bool,
}

/// Classifier for one fragment pass
pub struct Classifier<'a> {
    source: &'a str,
    config: &'a ClassifierConfig,
    mode: ExtractMode,
    region: RegionContext,
    result: ResultSet,
}

impl<'a> Classifier<'a> {
    /// `source` must be the exact text the tokenizer runs over
    pub fn new(source: &'a str, config: &'a ClassifierConfig, mode: ExtractMode) -> Self {
        Classifier {
            source,
            config,
            mode,
            region: RegionContext::default(),
            result: ResultSet::empty(mode),
        }
    }

    pub fn region(&self) -> RegionContext {
        self.region
    }

    pub fn finish(self) -> ResultSet {
        self.result
    }

    fn kind_of(&self, name: &str) -> Option<TagKind> {
        let c = self.config;
        [
            (c.form_item_tag.as_str(), TagKind::FormItem),
            (c.button_tag.as_str(), TagKind::Button),
            (c.table_column_tag.as_str(), TagKind::TableColumn),
            (c.dynamic_component_tag.as_str(), TagKind::DynamicComponent),
        ]
        .into_iter()
        .find_map(|(tag, kind)| (tag == name).then_some(kind))
    }

    /// Kind of a tag this mode classifies, `None` for everything else
    fn watched_kind(&self, tag: &Tag) -> Option<TagKind> {
        let kind = self.kind_of(&tag.name)?;
        match self.mode {
            ExtractMode::Documentation => match kind {
                TagKind::DynamicComponent => None,
                // A button is identified by its label, not its attributes
                TagKind::Button => Some(kind),
                _ if tag.attributes.is_empty() => None,
                _ => Some(kind),
            },
            ExtractMode::Permission => Some(kind),
        }
    }

    fn update_region(&mut self, tag: &Tag) {
        if tag.name != self.config.root_wrapper {
            return;
        }
        let Some(first) = tag.attributes.first() else {
            return;
        };
        let raw = first.bytes.slice(self.source);
        let search = raw.contains(self.config.search_marker.as_str());
        let data = raw.contains(self.config.data_marker.as_str());
        if search || data {
            self.region = RegionContext {
                in_search_region: search,
                in_data_region: data,
            };
        }
    }

    fn classify_documentation(&mut self, kind: TagKind, tag: Tag, text: String) {
        let region = self.region;
        let ResultSet::Documentation(out) = &mut self.result else {
            return;
        };
        let has_auth_attribute = tag.has_attribute(&self.config.button_auth_attribute);
        match kind {
            TagKind::Button => {
                let record = ButtonRecord {
                    tag,
                    text,
                    has_auth_attribute,
                };
                if region.in_search_region && region.in_data_region {
                    out.search_operations.push(record.clone());
                    out.data_operations.push(record);
                } else if region.in_search_region {
                    out.search_operations.push(record);
                } else if region.in_data_region {
                    out.data_operations.push(record);
                }
            }
            TagKind::FormItem if region.in_search_region => {
                out.search_params.push(FormItemRecord { tag });
            }
            TagKind::TableColumn if region.in_data_region => {
                out.data_params.push(TableColumnRecord { tag });
            }
            _ => {}
        }
    }

    fn classify_permission(&mut self, kind: TagKind, tag: Tag, text: String) {
        let config = self.config;
        let ResultSet::Permission(out) = &mut self.result else {
            return;
        };
        let mut record = PermissionRecord {
            kind,
            text: None,
            is_button_auth_present: false,
            is_table_column_auth_present: false,
            is_table_column_legacy_auth_present: false,
            is_dynamic_component_tag: false,
            tag,
        };
        match kind {
            TagKind::Button => {
                record.is_button_auth_present = record.tag.has_attribute(&config.button_auth_attribute);
                record.text = Some(text);
            }
            TagKind::TableColumn => {
                record.is_table_column_auth_present =
                    record.tag.has_attribute(&config.table_column_auth_attribute);
                record.is_table_column_legacy_auth_present =
                    record.tag.has_attribute(&config.table_column_legacy_auth_attribute);
            }
            TagKind::DynamicComponent => record.is_dynamic_component_tag = true,
            TagKind::FormItem => {}
        }
        out.records.push(record);
    }
}

impl TagHandler for Classifier<'_> {
    fn captures_inner_content(&self, tag: &Tag) -> bool {
        self.watched_kind(tag) == Some(TagKind::Button)
    }

    fn start_tag(&mut self, tag: Tag, inner: Option<&str>) {
        self.update_region(&tag);

        let Some(kind) = self.watched_kind(&tag) else {
            return;
        };
        let text = inner
            .map(|content| normalize_button_text(content, &self.config.icon_closer))
            .unwrap_or_default();

        tracing::trace!(tag = %tag.name, start = tag.start, end = tag.end, ?kind, "classified tag");

        match self.mode {
            ExtractMode::Documentation => self.classify_documentation(kind, tag, text),
            ExtractMode::Permission => self.classify_permission(kind, tag, text),
        }
    }
}

/// Reduce a button's inner content to its identifying text
///
/// Everything up to and including the first `icon_closer` is dropped, then
/// only CJK ideographs, ASCII letters and ASCII digits are kept.
pub fn normalize_button_text(content: &str, icon_closer: &str) -> String {
    let label = match content.find(icon_closer) {
        Some(at) if !icon_closer.is_empty() => &content[at + icon_closer.len()..],
        _ => content,
    };
    label.chars().filter(|&c| is_identifying_char(c)).collect()
}

/// Tokenize and classify one fragment
pub fn classify_fragment(
    source: &str,
    config: &ClassifierConfig,
    mode: ExtractMode,
) -> (ResultSet, Termination) {
    let mut classifier = Classifier::new(source, config, mode);
    let termination = Tokenizer::new(source).run(&mut classifier);
    (classifier.finish(), termination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn docs(source: &str) -> DocumentationResult {
        let config = ClassifierConfig::default();
        match classify_fragment(source, &config, ExtractMode::Documentation).0 {
            ResultSet::Documentation(r) => r,
            other => panic!("unexpected result set {other:?}"),
        }
    }

    fn permissions(source: &str) -> Vec<PermissionRecord> {
        let config = ClassifierConfig::default();
        match classify_fragment(source, &config, ExtractMode::Permission).0 {
            ResultSet::Permission(r) => r.records,
            other => panic!("unexpected result set {other:?}"),
        }
    }

    #[test]
    fn test_search_param() {
        let r = docs("<template #search><el-form-item label=\"Name\"/></template>");
        assert_eq!(r.search_params.len(), 1);
        assert!(r.search_operations.is_empty() && r.data_params.is_empty() && r.data_operations.is_empty());
        let attr = &r.search_params[0].tag.attributes[0];
        assert_eq!((attr.name.as_str(), attr.value.as_str()), ("label", "Name"));
    }

    #[test]
    fn test_data_operation() {
        let r = docs("<template #table><el-button>Delete</el-button></template>");
        assert_eq!(r.data_operations.len(), 1);
        assert_eq!(r.data_operations[0].text, "Delete");
        assert!(r.search_operations.is_empty());
    }

    #[rstest]
    #[case("<i class=\"icon\"></i>  Save ", "Save")]
    #[case("\n   新增 \n", "新增")]
    #[case("<i class=\"el-icon-plus\"></i> 批量-导出 (CSV)", "批量导出CSV")]
    #[case("{{ $t('common.save') }}", "tcommonsave")]
    #[case("", "")]
    fn test_normalize(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(normalize_button_text(content, "</i>"), expected);
    }

    #[test]
    fn test_malformed_keeps_earlier_records() {
        let config = ClassifierConfig::default();
        let source = "<template #search><el-form-item label=\"A\"/><!-- open <el-form-item label=\"B\"/>";
        let (result, end) = classify_fragment(source, &config, ExtractMode::Documentation);
        assert_eq!(end, Termination::Stalled { offset: 43 });
        assert_eq!(result.as_documentation().unwrap().search_params.len(), 1);

        let (result, end) = classify_fragment("<div>名称<!-- x", &config, ExtractMode::Documentation);
        assert_eq!(end, Termination::Stalled { offset: 7 });
        assert!(result.is_empty());
    }

    #[test]
    fn test_broken_tag_does_not_hide_later_records() {
        let config = ClassifierConfig::default();
        let source = r#"<template #search><el-form-item label="A"/><div class=="x"><el-form-item label="B"/></template>"#;
        let (result, end) = classify_fragment(source, &config, ExtractMode::Documentation);
        assert!(end.is_exhausted());
        let params = &result.as_documentation().unwrap().search_params;
        let labels: Vec<_> = params
            .iter()
            .map(|r| r.tag.attribute("label").unwrap().value.as_str())
            .collect();
        assert_eq!(labels, ["A", "B"]);

        let (result, end) = classify_fragment("<div><span", &config, ExtractMode::Permission);
        assert!(end.is_exhausted());
        assert!(result.is_empty());
    }

    #[test]
    fn test_outside_any_region() {
        let r = docs("<div><el-form-item label=\"x\"/><el-button>Go</el-button></div>");
        assert!(r.is_empty());
    }

    #[test]
    fn test_zero_attribute_form_item_skipped() {
        let r = docs("<template #search><el-form-item></el-form-item></template>");
        assert!(r.search_params.is_empty());
    }

    #[test]
    fn test_regions_reassigned_by_marked_wrappers() {
        let source = r#"
            <page-layout>
              <template #search>
                <el-form-item label="Name" prop="name"></el-form-item>
                <el-button type="primary">Query</el-button>
              </template>
              <template #table>
                <el-table-column label="Age" prop="age"></el-table-column>
                <el-table-column label="Ops">
                  <template slot-scope="scope">
                    <el-button @click="edit(scope.row)">Edit</el-button>
                  </template>
                </el-table-column>
              </template>
            </page-layout>"#;
        let r = docs(source);
        let labels: Vec<_> = r.search_operations.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, ["Query"]);
        let labels: Vec<_> = r.data_operations.iter().map(|b| b.text.as_str()).collect();
        // the unmarked slot-scope wrapper leaves the data region in place
        assert_eq!(labels, ["Edit"]);
        assert_eq!(r.search_params.len(), 1);
        assert_eq!(r.data_params.len(), 2);
    }

    #[test]
    fn test_region_sticks_after_close() {
        let config = ClassifierConfig::default();
        let source = "<template #search></template><el-form-item label=\"a\"/>";
        let mut classifier = Classifier::new(source, &config, ExtractMode::Documentation);
        Tokenizer::new(source).run(&mut classifier);
        assert_eq!(
            classifier.region(),
            RegionContext {
                in_search_region: true,
                in_data_region: false
            }
        );
        assert_eq!(classifier.finish().as_documentation().unwrap().search_params.len(), 1);
    }

    #[test]
    fn test_marker_only_checked_on_first_attribute() {
        let r = docs("<template v-if=\"x\" #search><el-form-item label=\"a\"/></template>");
        assert!(r.search_params.is_empty());
    }

    #[test]
    fn test_regions_do_not_leak_between_fragments() {
        let config = ClassifierConfig::default();
        classify_fragment("<template #search></template>", &config, ExtractMode::Documentation);
        let (r, _) = classify_fragment("<el-form-item label=\"a\"/>", &config, ExtractMode::Documentation);
        assert!(r.is_empty());
    }

    #[test]
    fn test_button_auth_flag() {
        let with = permissions("<el-button v-auth=\"'add_btn'\" type=\"primary\">Add</el-button>");
        let without = permissions("<el-button type=\"primary\">Add</el-button>");
        assert!(with[0].is_button_auth_present);
        assert!(!without[0].is_button_auth_present);
        assert_eq!(with[0].text.as_deref(), Some("Add"));
    }

    #[test]
    fn test_permission_flat_order() {
        let source = concat!(
            "<div>",
            "<el-table-column prop=\"a\" v-permission/>",
            "<component :is=\"view\"/>",
            "<el-button>删除</el-button>",
            "<el-form-item/>",
            "<el-table-column v-auth prop=\"b\"/>",
            "</div>",
        );
        let records = permissions(source);
        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            [
                TagKind::TableColumn,
                TagKind::DynamicComponent,
                TagKind::Button,
                TagKind::FormItem,
                TagKind::TableColumn
            ]
        );
        assert!(records.windows(2).all(|w| w[0].tag.end <= w[1].tag.start));
        assert!(!records[0].is_table_column_auth_present);
        assert!(records[0].is_table_column_legacy_auth_present);
        assert!(records[1].is_dynamic_component_tag);
        assert_eq!(records[2].text.as_deref(), Some("删除"));
        assert!(records[4].is_table_column_auth_present);
        assert!(!records[4].is_table_column_legacy_auth_present);
    }

    #[test]
    fn test_permission_offsets_splice_back() {
        let source = "<div>\n  <span>用户名称</span><el-button size=\"mini\">编辑</el-button>\n</div>";
        let records = permissions(source);
        let button = &records[0];
        assert_eq!(button.tag.bytes.slice(source), "<el-button size=\"mini\">");
        assert_eq!(button.tag.start, 25);

        // Splice by character index, the way a non-Rust consumer would
        let mut chars: Vec<char> = source.chars().collect();
        let gt = button.tag.end - 1;
        assert_eq!(chars[gt], '>');
        chars.splice(gt..gt, " v-auth=\"'edit_btn'\"".chars());
        let patched: String = chars.into_iter().collect();
        assert!(patched.contains("<span>用户名称</span><el-button size=\"mini\" v-auth=\"'edit_btn'\">编辑</el-button>"));
    }

    #[test]
    fn test_idempotent() {
        let source = "<template #table><el-table-column prop=\"a\" label=\"A\"/><el-button>X</el-button></template>";
        assert_eq!(docs(source), docs(source));
        assert_eq!(permissions(source), permissions(source));
    }

    #[test]
    fn test_offsets_bounded() {
        let source = "<template #table>\n<el-table-column prop=\"名称\" label=\"名\"/>\n<el-button>X</el-button>";
        let len = source.chars().count();
        for record in permissions(source) {
            assert!(record.tag.start <= record.tag.end);
            assert!(record.tag.end <= len);
            assert!(record.tag.bytes.end <= source.len());
            for attr in &record.tag.attributes {
                assert!(attr.start <= attr.end && attr.end <= record.tag.end);
            }
        }
    }
}
