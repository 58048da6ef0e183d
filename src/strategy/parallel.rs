//! Parallel Page Extraction
//!
//! Uses Rayon to extract many pages at once. Each page runs its own fragment
//! passes, so pages share nothing but the adapter's cache.

use crate::field::{FieldAdapter, PageFields, PageRequest, TemplateSource};
use rayon::prelude::*;

/// Extract every page in parallel, preserving input order
///
/// A page whose component cannot be read is logged and yields an empty result.
pub fn extract_pages_parallel<S: TemplateSource + Sync>(
    adapter: &FieldAdapter<S>,
    pages: &[PageRequest],
) -> Vec<PageFields> {
    pages
        .par_iter()
        .map(|page| adapter.extract_page_or_empty(page))
        .collect()
}

/// Sequential counterpart of [`extract_pages_parallel`]
pub fn extract_pages<S: TemplateSource>(adapter: &FieldAdapter<S>, pages: &[PageRequest]) -> Vec<PageFields> {
    pages.iter().map(|page| adapter.extract_page_or_empty(page)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifierConfig, ExtractMode};
    use crate::field::MemorySource;
    use pretty_assertions::assert_eq;

    fn pages() -> (MemorySource, Vec<PageRequest>) {
        let mut source = MemorySource::new();
        let mut requests = Vec::new();
        for i in 0..24 {
            let path = format!("/app/views/p{i}.vue");
            source.insert(
                path.clone(),
                format!(
                    "<template #table><el-table-column label=\"c{i}\" prop=\"c{i}\"/>\
                     <el-button v-auth=\"'p{i}:del'\">Delete{i}</el-button></template>"
                ),
            );
            requests.push(PageRequest::new(format!("p{i}"), path).sub_component("/app/views/shared.vue"));
        }
        source.insert("/app/views/shared.vue", "<template #search><el-form-item label=\"q\"/></template>");
        requests.push(PageRequest::new("ghost", "/app/views/ghost.vue"));
        (source, requests)
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (source, requests) = pages();
        let adapter = FieldAdapter::new(source, ClassifierConfig::default(), ExtractMode::Documentation).with_cache(64);

        let parallel = extract_pages_parallel(&adapter, &requests);
        let sequential = extract_pages(&adapter, &requests);
        assert_eq!(parallel, sequential);

        let names: Vec<&str> = parallel.iter().map(|p| p.name.as_str()).collect();
        let expected: Vec<String> = requests.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_unreadable_page_is_empty() {
        let (source, requests) = pages();
        let adapter = FieldAdapter::new(source, ClassifierConfig::default(), ExtractMode::Permission);
        let out = extract_pages_parallel(&adapter, &requests);

        let ghost = out.last().unwrap();
        assert_eq!(ghost.name, "ghost");
        assert!(ghost.result.is_empty());

        let first = out[0].result.as_permission().unwrap();
        assert_eq!(first.records.len(), 3);
        assert_eq!(out[0].result.button_texts(), ["Delete0"]);
    }
}
