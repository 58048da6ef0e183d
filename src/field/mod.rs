//! Field Adapter
//!
//! Runs one classifier pass per fragment and merges the results in the order
//! the fragments were supplied. A page contributes its own template plus one
//! fragment per dynamically rendered sub-component.
//!
//! ```text
//! TemplateSource ---> FieldAdapter ---> Tokenizer + Classifier (per fragment)
//!       |                  |
//!       v                  v
//!   ReadError        PageFields (merged ResultSet)
//! ```

pub mod cache;
pub mod resolve;

pub use cache::FragmentCache;

use crate::classify::{classify_fragment, ResultSet};
use crate::config::{ClassifierConfig, ExtractMode};
use crate::core::tokenizer::Termination;
use crate::error::ReadError;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A component file split into its sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSections {
    pub template_text: String,
    pub script_text: String,
    pub style_sections: Vec<String>,
}

/// Supplies component sections for a path
pub trait TemplateSource {
    fn load(&self, path: &Path) -> Result<ComponentSections, ReadError>;
}

/// Reads component files from disk, using the whole file as template text
///
/// Callers with a real section splitter implement [`TemplateSource`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn load(&self, path: &Path) -> Result<ComponentSections, ReadError> {
        let bytes = fs::read(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let template_text = String::from_utf8(bytes).map_err(|_| ReadError::Encoding {
            path: path.to_path_buf(),
        })?;
        Ok(ComponentSections {
            template_text,
            ..Default::default()
        })
    }
}

/// In-memory templates keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, ComponentSections>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, template_text: impl Into<String>) {
        self.files.insert(
            path.into(),
            ComponentSections {
                template_text: template_text.into(),
                ..Default::default()
            },
        );
    }

    pub fn with(mut self, path: impl Into<PathBuf>, template_text: impl Into<String>) -> Self {
        self.insert(path, template_text);
        self
    }

    /// Register a component with its script section as well
    pub fn insert_sections(&mut self, path: impl Into<PathBuf>, sections: ComponentSections) {
        self.files.insert(path.into(), sections);
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, path: &Path) -> Result<ComponentSections, ReadError> {
        self.files.get(path).cloned().ok_or_else(|| ReadError::Missing {
            path: path.to_path_buf(),
        })
    }
}

/// A page to extract: its own component plus resolved sub-components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub name: String,
    pub component_path: PathBuf,
    pub sub_components: Vec<PathBuf>,
}

impl PageRequest {
    pub fn new(name: impl Into<String>, component_path: impl Into<PathBuf>) -> Self {
        PageRequest {
            name: name.into(),
            component_path: component_path.into(),
            sub_components: Vec::new(),
        }
    }

    pub fn sub_component(mut self, path: impl Into<PathBuf>) -> Self {
        self.sub_components.push(path.into());
        self
    }
}

/// Result of one fragment pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentFields {
    pub path: PathBuf,
    pub result: ResultSet,
    pub termination: Termination,
}

/// Merged fields for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFields {
    pub name: String,
    pub component_path: PathBuf,
    /// Primary fragment followed by sub-components, in request order
    pub fragments: Vec<FragmentFields>,
    pub result: ResultSet,
}

impl PageFields {
    /// A page whose files could not be read
    pub fn empty(page: &PageRequest, mode: ExtractMode) -> Self {
        PageFields {
            name: page.name.clone(),
            component_path: page.component_path.clone(),
            fragments: Vec::new(),
            result: ResultSet::empty(mode),
        }
    }
}

pub struct FieldAdapter<S> {
    source: S,
    config: ClassifierConfig,
    mode: ExtractMode,
    cache: Option<FragmentCache>,
}

impl<S: TemplateSource> FieldAdapter<S> {
    pub fn new(source: S, config: ClassifierConfig, mode: ExtractMode) -> Self {
        FieldAdapter {
            source,
            config,
            mode,
            cache: None,
        }
    }

    /// Memoize fragment results by path
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = Some(FragmentCache::new(capacity));
        self
    }

    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&FragmentCache> {
        self.cache.as_ref()
    }

    /// Classify fragment texts already in memory and merge them in order
    pub fn extract_fragments<T: AsRef<str>>(&self, fragments: &[T]) -> ResultSet {
        let mut merged = ResultSet::empty(self.mode);
        for fragment in fragments {
            let (result, _) = classify_fragment(fragment.as_ref(), &self.config, self.mode);
            merged.merge(result);
        }
        merged
    }

    /// Load and classify one component file
    pub fn extract_file(&self, path: &Path) -> Result<FragmentFields, ReadError> {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(path)) {
            return Ok(hit);
        }

        let sections = self.source.load(path)?;
        let (result, termination) = classify_fragment(&sections.template_text, &self.config, self.mode);
        if let Termination::Stalled { offset } = termination {
            tracing::debug!(path = %path.display(), offset, "template scan stopped early");
        }

        let fields = FragmentFields {
            path: path.to_path_buf(),
            result,
            termination,
        };
        if let Some(cache) = &self.cache {
            cache.insert(fields.clone());
        }
        Ok(fields)
    }

    /// Build a page request whose sub-components are discovered from the
    /// component's own template and script
    pub fn discover_page(
        &self,
        name: impl Into<String>,
        component_path: impl Into<PathBuf>,
        project_root: &Path,
    ) -> Result<PageRequest, ReadError> {
        let component_path = component_path.into();
        let sections = self.source.load(&component_path)?;
        let sub_components = resolve::discover_sub_components(&sections, &self.config, &component_path, project_root);
        if !sub_components.is_empty() {
            tracing::debug!(
                path = %component_path.display(),
                count = sub_components.len(),
                "discovered dynamic sub-components"
            );
        }
        Ok(PageRequest {
            name: name.into(),
            component_path,
            sub_components,
        })
    }

    /// Extract a page: its own component must load, unreadable
    /// sub-components are logged and contribute nothing
    pub fn extract_page(&self, page: &PageRequest) -> Result<PageFields, ReadError> {
        let primary = self.extract_file(&page.component_path)?;

        let mut fragments = Vec::with_capacity(1 + page.sub_components.len());
        fragments.push(primary);
        for path in &page.sub_components {
            match self.extract_file(path) {
                Ok(fields) => fragments.push(fields),
                Err(err) => {
                    tracing::warn!(page = %page.name, error = %err, "skipping unreadable sub-component");
                }
            }
        }

        let mut result = ResultSet::empty(self.mode);
        for fragment in &fragments {
            result.merge(fragment.result.clone());
        }

        Ok(PageFields {
            name: page.name.clone(),
            component_path: page.component_path.clone(),
            fragments,
            result,
        })
    }

    /// Like [`extract_page`](Self::extract_page), but a read failure is
    /// logged and yields an empty page
    pub fn extract_page_or_empty(&self, page: &PageRequest) -> PageFields {
        self.extract_page(page).unwrap_or_else(|err| {
            tracing::warn!(page = %page.name, error = %err, "page unreadable, using empty result");
            PageFields::empty(page, self.mode)
        })
    }
}
