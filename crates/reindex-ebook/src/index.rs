//! Back-of-book index markup parsing.
//!
//! Publisher EPUBs mark index entries as paragraphs classed `Index-1` (main
//! terms), `Index-2` (subentries, which inherit the preceding main term) and
//! `Index-Alpha` (alphabet headers). Page references are links whose
//! fragment carries the printed page (`ch03.xhtml#page_143`).

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use reindex_core::IndexOccurrence;

use crate::pages::{href_basename, normalize_page};
use crate::types::IndexRef;

static RE_ENTRY_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)index-(1|2|alpha)").expect("valid entry class pattern"));
static RE_SKIP_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)index-(note|head)").expect("valid skip class pattern"));
static RE_PAGE_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)page[_\-]?(\w+)").expect("valid page fragment pattern"));

/// Parse an index document into occurrences, one per page-reference link,
/// in markup order.
///
/// Entries without any usable page link (alphabet headers, "see also"
/// cross-references) contribute nothing.
#[must_use]
pub fn parse_index_document(html: &str) -> Vec<IndexOccurrence> {
    parse_index_refs(html)
        .into_iter()
        .map(|r| r.occurrence)
        .collect()
}

/// Like [`parse_index_document`], but each occurrence keeps the basename of
/// the content file its link targets, for per-file subheading lookup.
#[must_use]
pub fn parse_index_refs(html: &str) -> Vec<IndexRef> {
    let document = Html::parse_document(html);
    let p_selector = Selector::parse("p").expect("valid p selector");
    let a_selector = Selector::parse("a[href]").expect("valid a selector");

    let mut refs = Vec::new();
    let mut current_main_term = String::new();

    for paragraph in document.select(&p_selector) {
        let classes: Vec<&str> = paragraph.value().classes().collect();
        let class_str = classes.join(" ");
        if !RE_ENTRY_CLASS.is_match(&class_str) || RE_SKIP_CLASS.is_match(&class_str) {
            continue;
        }

        let label = text_before_first_link(paragraph);
        let is_subentry = class_str.to_lowercase().contains("index-2");

        let (term, subentry) = if is_subentry {
            (current_main_term.clone(), Some(label))
        } else {
            current_main_term = label.clone();
            (label, None)
        };
        if term.is_empty() {
            continue;
        }

        for link in paragraph.select(&a_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(fragment) = href.split_once('#').map(|(_, frag)| frag) else {
                continue;
            };
            let Some(caps) = RE_PAGE_FRAGMENT.captures(fragment) else {
                continue;
            };
            let Some(page) = caps.get(1).and_then(|m| normalize_page(m.as_str())) else {
                continue;
            };
            refs.push(IndexRef {
                file: href_basename(href),
                occurrence: IndexOccurrence {
                    term: term.clone(),
                    subentry: subentry.clone(),
                    page,
                    subheading: None,
                },
            });
        }
    }

    refs
}

/// Concatenated text of the paragraph's children up to (excluding) the first
/// link, so page numbers rendered inside the links never leak into the term.
fn text_before_first_link(paragraph: ElementRef<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for child in paragraph.children() {
        if let Some(element) = ElementRef::wrap(child) {
            if element.value().name() == "a" {
                break;
            }
            parts.push(element.text().collect::<String>());
        } else if let Some(text) = child.value().as_text() {
            parts.push(text.to_string());
        }
    }
    parts
        .join("")
        .trim()
        .trim_end_matches(',')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_HTML: &str = r#"<html><body>
<p class="Index-Head">INDEX</p>
<p class="Index-Alpha">A</p>
<p class="Index-1">algorithms, <a href="ch01.xhtml#page_9">9</a>, <a href="ch02.xhtml#page_14">14</a></p>
<p class="Index-2">sorting, <a href="ch01.xhtml#page_11">11</a></p>
<p class="Index-1">angle brackets, see brackets</p>
<p class="Index-Note">Page numbers refer to the print edition.</p>
<p class="Index-1">anchors, <a href="front.xhtml#page_ix">ix</a></p>
</body></html>"#;

    #[test]
    fn test_entries_explode_per_page_link() {
        let occurrences = parse_index_document(INDEX_HTML);
        let algorithms: Vec<_> = occurrences
            .iter()
            .filter(|o| o.term == "algorithms" && o.subentry.is_none())
            .map(|o| o.page)
            .collect();
        assert_eq!(algorithms, vec![9, 14]);
    }

    #[test]
    fn test_subentry_inherits_main_term() {
        let occurrences = parse_index_document(INDEX_HTML);
        let sorting = occurrences
            .iter()
            .find(|o| o.subentry.as_deref() == Some("sorting"))
            .unwrap();
        assert_eq!(sorting.term, "algorithms");
        assert_eq!(sorting.page, 11);
    }

    #[test]
    fn test_roman_numeral_pages() {
        let occurrences = parse_index_document(INDEX_HTML);
        let anchors = occurrences.iter().find(|o| o.term == "anchors").unwrap();
        assert_eq!(anchors.page, 9);
    }

    #[test]
    fn test_crossrefs_headers_and_notes_drop_out() {
        let occurrences = parse_index_document(INDEX_HTML);
        assert!(occurrences.iter().all(|o| o.term != "A"));
        assert!(occurrences.iter().all(|o| !o.term.starts_with("angle")));
        assert!(occurrences.iter().all(|o| !o.term.contains("print edition")));
    }

    #[test]
    fn test_markup_order_preserved() {
        let occurrences = parse_index_document(INDEX_HTML);
        let pages: Vec<_> = occurrences.iter().map(|o| o.page).collect();
        assert_eq!(pages, vec![9, 14, 11, 9]);
    }

    #[test]
    fn test_refs_carry_target_file_basename() {
        let refs = parse_index_refs(INDEX_HTML);
        let files: Vec<_> = refs.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(
            files,
            vec!["ch01.xhtml", "ch02.xhtml", "ch01.xhtml", "front.xhtml"]
        );
    }

    #[test]
    fn test_unclassed_paragraphs_ignored() {
        let html = r#"<p>plain, <a href="ch01.xhtml#page_3">3</a></p>"#;
        assert!(parse_index_document(html).is_empty());
    }
}
