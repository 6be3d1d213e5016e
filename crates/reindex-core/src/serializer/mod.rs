//! Report serialization module
//!
//! Serializers for turning a grouped [`IndexReport`](crate::IndexReport)
//! into output text.

pub mod markdown;

pub use markdown::{safe_output_filename, MarkdownOptions, MarkdownSerializer};
