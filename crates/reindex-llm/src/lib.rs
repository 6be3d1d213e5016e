//! # reindex-llm
//!
//! LLM structuring collaborator for the PDF path.
//!
//! A PDF's TOC and index arrive as raw page text; this crate sends that text
//! to an OpenAI-compatible chat completions endpoint and parses the reply
//! into the same [`Chapter`] / [`IndexOccurrence`] shapes the EPUB path
//! produces. The core engine never sees any of this: the [`Structurer`]
//! trait is the whole contract, and callers inject an implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reindex_llm::{LlmConfig, OpenAiClient, Structurer};
//!
//! # async fn example() -> Result<(), reindex_llm::LlmError> {
//! let config = LlmConfig::from_env()?;
//! let client = OpenAiClient::new(config);
//!
//! let chapters = client.structure_toc("Contents\n1. Intro .... 1", 320).await?;
//! let occurrences = client.structure_index("gathering, 9, 14\ndecision, 10").await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod openai;

use async_trait::async_trait;

use reindex_core::{Chapter, IndexOccurrence};

pub use error::{LlmError, Result};
pub use openai::OpenAiClient;

/// Default model when `REINDEX_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default endpoint when `OPENAI_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Structures raw TOC/index text into the core input shapes.
///
/// Implementations are injected by the caller; the core engine itself never
/// performs or retries these calls.
#[async_trait]
pub trait Structurer {
    /// Turn raw TOC text into a chapter boundary table. `last_page` is the
    /// document's page count, passed so the model can sanity-check starts.
    async fn structure_toc(&self, toc_raw: &str, last_page: u32) -> Result<Vec<Chapter>>;

    /// Turn raw index text into a flat occurrence list, one occurrence per
    /// page reference, in the order the index listed them.
    async fn structure_index(&self, index_raw: &str) -> Result<Vec<IndexOccurrence>>;
}

/// Connection settings, read once at startup and passed in explicitly.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token for the endpoint
    pub api_key: String,

    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
}

impl LlmConfig {
    /// Build a config from `OPENAI_API_KEY`, `REINDEX_MODEL`, and
    /// `OPENAI_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when `OPENAI_API_KEY` is unset
    /// or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        let model = std::env::var("REINDEX_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            api_key,
            model,
            base_url,
        })
    }
}
