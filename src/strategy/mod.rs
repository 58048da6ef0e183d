//! Extraction Strategy Module
//!
//! - Sequential: one page after another on the calling thread
//! - Parallel: Rayon work-stealing across pages

pub mod parallel;

pub use parallel::{extract_pages, extract_pages_parallel};
