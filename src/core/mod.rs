//! Core template scanning primitives
//!
//! This module contains the fundamental building blocks for template scanning:
//! - Scanner: cursor plus anchored prefix patterns, memchr-accelerated
//! - Unicode: tag-name and identifying-text character classes
//! - Attributes: plain and dynamic-argument attribute grammar with offsets
//! - Tokenizer: single-pass loop dispatching start tags to a TagHandler

pub mod attributes;
pub mod scanner;
pub mod tokenizer;
pub mod unicode;
