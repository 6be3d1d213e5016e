//! In-chapter subheading capture.
//!
//! Chapter documents interleave `<h2>`/`<h3>` headings with `id="page_N"`
//! page anchors. Walking the markup in document order yields a compressed
//! (page, subheading) list: each pair means "from this page on, this
//! subheading applies" until a later pair replaces it. Anchors seen before
//! the first heading record an empty subheading so early pages resolve to
//! none.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::pages::normalize_page;

static RE_PAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)page[_\-]?(\w+)").expect("valid page id pattern"));

/// Build the compressed (page, subheading) list for one chapter document,
/// sorted by page. A new pair is recorded only when the subheading in force
/// differs from the last recorded one.
#[must_use]
pub fn parse_chapter_headings(html: &str) -> Vec<(u32, String)> {
    let document = Html::parse_document(html);

    let mut current = String::new();
    let mut last_recorded: Option<String> = None;
    let mut result: Vec<(u32, String)> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        match element.value().name() {
            "h2" | "h3" => {
                current = element
                    .text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            _ => {
                let Some(id) = element.value().id() else {
                    continue;
                };
                let Some(caps) = RE_PAGE_ID.captures(id) else {
                    continue;
                };
                let Some(page) = caps.get(1).and_then(|m| normalize_page(m.as_str())) else {
                    continue;
                };
                if last_recorded.as_deref() != Some(current.as_str()) {
                    result.push((page, current.clone()));
                    last_recorded = Some(current.clone());
                }
            }
        }
    }

    result.sort_by_key(|(page, _)| *page);
    result
}

/// Subheading in force at `page`: the last entry at or before it, if that
/// entry names one.
#[must_use]
pub fn subheading_at(headings: &[(u32, String)], page: u32) -> Option<&str> {
    let idx = headings.partition_point(|(p, _)| *p <= page);
    if idx == 0 {
        return None;
    }
    let (_, subheading) = &headings[idx - 1];
    if subheading.is_empty() {
        None
    } else {
        Some(subheading)
    }
}
