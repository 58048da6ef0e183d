//! RustyTmpl - Tolerant, offset-exact template scanning
//!
//! Layers:
//! A: Cursor and tokenizer over raw template text (core)
//! B: Semantic tag classifier in documentation or permission mode (classify)
//! C: Field adapter merging fragment passes per page (field)
//! D: Parallel page extraction (strategy)
//! E: Consumers of classified results (report)
//!
//! Record `start`/`end` values are character indices into the scanned text,
//! so any consumer can splice attributes back in. Each record also carries its
//! byte range (`bytes`) for slicing the `&str` directly.

pub mod classify;
pub mod config;
pub mod core;
pub mod error;
pub mod field;
pub mod report;
pub mod strategy;

pub use classify::{classify_fragment, Classifier, ClassifiedRecord, ResultSet, TagKind};
pub use config::{ClassifierConfig, ExtractMode};
pub use crate::core::scanner::{ByteSpan, Offset};
pub use crate::core::tokenizer::{Tag, TagHandler, Termination, Tokenizer};
pub use error::{ConfigError, ReadError};
pub use field::{FieldAdapter, FsTemplateSource, MemorySource, PageFields, PageRequest, TemplateSource};
pub use strategy::extract_pages_parallel;

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Entry Points
// ============================================================================

/// Classify one template fragment with the default designated names
///
/// Malformed markup never fails: scanning stops and whatever was classified
/// up to that point is returned.
pub fn parse(text: &str, mode: ExtractMode) -> ResultSet {
    let (result, termination) = classify_fragment(text, &ClassifierConfig::default(), mode);
    if let Termination::Stalled { offset } = termination {
        tracing::debug!(offset, chars = text.chars().count(), "template scan stalled");
    }
    result
}
