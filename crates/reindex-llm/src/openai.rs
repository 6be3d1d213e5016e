//! OpenAI-compatible chat completions client.
//!
//! One JSON-mode request per structuring call, temperature 0. The reply is
//! parsed defensively: markdown fences are stripped, and both a bare JSON
//! array and an object wrapping the expected key are accepted.

use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use reindex_core::{Chapter, IndexOccurrence};

use crate::error::{LlmError, Result};
use crate::{LlmConfig, Structurer};

const TOC_PROMPT: &str = r#"You will receive raw text from a book's table of contents. Convert it into JSON: {"chapters": [{"title": string, "start_page": integer}, ...]} in reading order.
Roman numeral page numbers (ix, xi, ...) must be converted to integers (9, 11, ...).
The book's last page is {last_page}; no start_page may exceed it.
Return only valid JSON, no markdown or explanation."#;

const INDEX_PROMPT: &str = r#"You will receive raw text from a book index. Convert it into JSON: {"entries": [{"term": string, "subentry": string, "pages": [integer, ...]}, ...]} keeping the order of the source text. Use "" for subentry when there is none.
For page ranges like "120-125" or "120–125", include only the first number.
Roman numeral page numbers (ix, xi, xii) must be converted to integers (9, 11, 12).
Skip "see also" and "see" cross-reference lines that have no page numbers.
Return only valid JSON, no markdown or explanation."#;

// Input caps keep a generous page range from overflowing the model context.
const MAX_TOC_CHARS: usize = 8_000;
const MAX_INDEX_CHARS: usize = 50_000;

/// Chat completion request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// One chapter in the model's TOC reply.
#[derive(Debug, Deserialize)]
struct TocEntryResponse {
    title: String,
    start_page: u32,
}

/// One index entry in the model's reply.
#[derive(Debug, Deserialize)]
struct IndexEntryResponse {
    term: String,
    #[serde(default)]
    subentry: String,
    #[serde(default)]
    pages: Vec<i64>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    /// Creates a client from connection settings.
    #[must_use = "creates the structuring client"]
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send one JSON-mode completion request and return the message content.
    async fn complete(&self, prompt: &str, input: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: format!("{prompt}\n\n{input}"),
            }],
            max_tokens: 16000,
            temperature: 0.0,
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
        };

        let start = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await?;
        debug!(
            model = %self.config.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "structuring call completed"
        );

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl Structurer for OpenAiClient {
    async fn structure_toc(&self, toc_raw: &str, last_page: u32) -> Result<Vec<Chapter>> {
        let prompt = TOC_PROMPT.replace("{last_page}", &last_page.to_string());
        let content = self
            .complete(&prompt, clamp_chars(toc_raw, MAX_TOC_CHARS))
            .await?;
        parse_toc_response(&content)
    }

    async fn structure_index(&self, index_raw: &str) -> Result<Vec<IndexOccurrence>> {
        let content = self
            .complete(INDEX_PROMPT, clamp_chars(index_raw, MAX_INDEX_CHARS))
            .await?;
        parse_index_response(&content)
    }
}

/// Truncate to at most `max_chars` characters without splitting a character.
fn clamp_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Parse the model's TOC reply into a chapter boundary table.
///
/// # Errors
///
/// Fails when the reply is not JSON, or yields no chapters.
pub fn parse_toc_response(content: &str) -> Result<Vec<Chapter>> {
    let entries: Vec<TocEntryResponse> = parse_listing(content, "chapters")?;
    let chapters: Vec<Chapter> = entries
        .into_iter()
        .filter(|e| !e.title.trim().is_empty())
        .enumerate()
        .map(|(i, e)| Chapter::new(e.title.trim().to_string(), e.start_page.max(1), i))
        .collect();
    if chapters.is_empty() {
        return Err(LlmError::MalformedResponse(
            "TOC reply contained no chapters".to_string(),
        ));
    }
    Ok(chapters)
}

/// Parse the model's index reply into occurrences, one per page reference,
/// preserving reply order. Non-positive pages are dropped with a warning
/// rather than poisoning the engine's input.
///
/// # Errors
///
/// Fails when the reply is not the JSON shape the prompt asked for.
pub fn parse_index_response(content: &str) -> Result<Vec<IndexOccurrence>> {
    let entries: Vec<IndexEntryResponse> = parse_listing(content, "entries")?;
    let mut occurrences = Vec::new();
    for entry in entries {
        let term = entry.term.trim().to_string();
        if term.is_empty() {
            continue;
        }
        let subentry = match entry.subentry.trim() {
            "" => None,
            s => Some(s.to_string()),
        };
        for page in entry.pages {
            let Ok(page @ 1..) = u32::try_from(page) else {
                warn!(term = %term, page, "dropping non-positive page from LLM reply");
                continue;
            };
            occurrences.push(IndexOccurrence {
                term: term.clone(),
                subentry: subentry.clone(),
                page,
                subheading: None,
            });
        }
    }
    Ok(occurrences)
}

/// Deserialize a reply that is either a bare JSON array or an object
/// wrapping the array under `key`, with markdown fences tolerated.
fn parse_listing<T: serde::de::DeserializeOwned>(content: &str, key: &str) -> Result<Vec<T>> {
    let json = extract_json(content);
    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| LlmError::MalformedResponse(format!("not JSON: {e}")))?;
    let listing = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map.remove(key).ok_or_else(|| {
            LlmError::MalformedResponse(format!("reply object has no '{key}' key"))
        })?,
        _ => {
            return Err(LlmError::MalformedResponse(
                "reply is neither an array nor an object".to_string(),
            ))
        }
    };
    serde_json::from_value(listing)
        .map_err(|e| LlmError::MalformedResponse(format!("unexpected entry shape: {e}")))
}

/// Extract JSON from a reply, handling markdown code blocks.
fn extract_json(text: &str) -> String {
    let text = text.trim();

    // Handle ```json ... ``` wrapper
    if text.starts_with("```") {
        if let Some(start) = text.find('\n') {
            let after_first_line = &text[start + 1..];
            if let Some(end) = after_first_line.rfind("```") {
                return after_first_line[..end].trim().to_string();
            }
        }
    }

    text.to_string()
}
