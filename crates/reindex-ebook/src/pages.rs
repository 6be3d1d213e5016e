//! Printed-page resolution for EPUBs.
//!
//! EPUB 2 ships a `pageList` in toc.ncx mapping printed page numbers to
//! content locations. That list is what lets the EPUB path speak the same
//! page-number scheme as the PDF path: each chapter's start position is the
//! first printed page that lands in its content file.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{EbookError, Result};
use crate::types::PageTarget;

/// Roman numeral page labels used for front matter.
const ROMAN_PAGES: [(&str, u32); 20] = [
    ("i", 1),
    ("ii", 2),
    ("iii", 3),
    ("iv", 4),
    ("v", 5),
    ("vi", 6),
    ("vii", 7),
    ("viii", 8),
    ("ix", 9),
    ("x", 10),
    ("xi", 11),
    ("xii", 12),
    ("xiii", 13),
    ("xiv", 14),
    ("xv", 15),
    ("xvi", 16),
    ("xvii", 17),
    ("xviii", 18),
    ("xix", 19),
    ("xx", 20),
];

/// Convert a page label (arabic or front-matter roman numeral) to a page
/// number. Curly braces around front-matter labels (`{vii}`) are stripped
/// first. Returns `None` for labels with no usable number.
#[must_use]
pub fn normalize_page(label: &str) -> Option<u32> {
    let label = label
        .trim()
        .trim_matches(|c| c == '{' || c == '}')
        .to_lowercase();
    if let Some((_, n)) = ROMAN_PAGES.iter().find(|(r, _)| *r == label) {
        return Some(*n);
    }
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

/// File basename of an href, with any `#fragment` dropped.
#[must_use]
pub fn href_basename(href: &str) -> String {
    let no_frag = href.split('#').next().unwrap_or(href);
    Path::new(no_frag)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Map each content file to the first printed page that falls in it.
///
/// Page targets arrive in reading order, so the first target per file wins.
#[must_use]
pub fn first_page_by_file(page_list: &[PageTarget]) -> HashMap<String, u32> {
    let mut map = HashMap::new();
    for target in page_list {
        let Some(page) = normalize_page(&target.label) else {
            continue;
        };
        let base = href_basename(&target.href);
        if base.is_empty() {
            continue;
        }
        map.entry(base).or_insert(page);
    }
    map
}

/// Extract the pageList from an EPUB's toc.ncx.
///
/// EPUB 2 uses toc.ncx with two navigation structures: navMap (chapters,
/// handled by the `epub` crate) and pageList (page markers, extracted here).
///
/// Returns an empty vector when no pageList exists; some EPUBs don't carry
/// one, and the caller falls back to in-document page anchors.
pub fn extract_page_list(epub_path: &Path) -> Result<Vec<PageTarget>> {
    use std::io::BufReader;

    let file = std::fs::File::open(epub_path)
        .map_err(|e| EbookError::EpubError(format!("Failed to open EPUB file: {e}")))?;
    let reader = BufReader::new(file);
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| EbookError::EpubError(format!("Invalid EPUB (not a ZIP): {e}")))?;

    let ncx_entry_idx = (0..archive.len()).find(|&i| {
        archive
            .by_index(i)
            .is_ok_and(|file| file.name().ends_with("toc.ncx"))
    });

    let Some(idx) = ncx_entry_idx else {
        return Ok(Vec::new());
    };

    let mut ncx_file = archive
        .by_index(idx)
        .map_err(|e| EbookError::EpubError(format!("Failed to read toc.ncx: {e}")))?;
    let mut ncx_content = String::new();
    ncx_file
        .read_to_string(&mut ncx_content)
        .map_err(|e| EbookError::EpubError(format!("Failed to read toc.ncx content: {e}")))?;

    parse_page_list(&ncx_content)
}

/// Parse the pageList section out of raw toc.ncx XML.
fn parse_page_list(ncx_content: &str) -> Result<Vec<PageTarget>> {
    let mut reader = Reader::from_str(ncx_content);
    reader.trim_text(true);

    let mut page_list = Vec::new();
    let mut in_page_list = false;
    let mut in_page_target = false;
    let mut in_nav_label = false;

    let mut current_label = String::new();
    let mut current_href = String::new();

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"pageList" => in_page_list = true,
                b"pageTarget" if in_page_list => in_page_target = true,
                b"navLabel" if in_page_target => in_nav_label = true,
                b"content" if in_page_target => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"src" {
                            if let Ok(value) = attr.unescape_value() {
                                current_href = value.to_string();
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_nav_label {
                    if let Ok(text) = e.unescape() {
                        current_label = text.trim().to_string();
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"pageList" => in_page_list = false,
                b"pageTarget" => {
                    if !current_label.is_empty() && !current_href.is_empty() {
                        page_list.push(PageTarget {
                            label: current_label.clone(),
                            href: current_href.clone(),
                        });
                    }
                    in_page_target = false;
                    current_label.clear();
                    current_href.clear();
                }
                b"navLabel" => in_nav_label = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(EbookError::XmlParse(format!(
                    "toc.ncx pageList is malformed: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(page_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_page_arabic() {
        assert_eq!(normalize_page("1"), Some(1));
        assert_eq!(normalize_page("324"), Some(324));
        assert_eq!(normalize_page(" 120 "), Some(120));
    }

    #[test]
    fn test_normalize_page_roman() {
        assert_eq!(normalize_page("ix"), Some(9));
        assert_eq!(normalize_page("XIV"), Some(14));
        assert_eq!(normalize_page("{vii}"), Some(7));
    }

    #[test]
    fn test_normalize_page_unusable() {
        assert_eq!(normalize_page(""), None);
        assert_eq!(normalize_page("Plate"), None);
        assert_eq!(normalize_page("0"), None);
    }

    #[test]
    fn test_href_basename() {
        assert_eq!(href_basename("text/ch01.xhtml#page_9"), "ch01.xhtml");
        assert_eq!(href_basename("ch01.xhtml"), "ch01.xhtml");
        assert_eq!(href_basename(""), "");
    }

    #[test]
    fn test_first_page_by_file_keeps_first() {
        let targets = vec![
            PageTarget {
                label: "9".to_string(),
                href: "ch01.xhtml#p9".to_string(),
            },
            PageTarget {
                label: "10".to_string(),
                href: "ch01.xhtml#p10".to_string(),
            },
            PageTarget {
                label: "11".to_string(),
                href: "ch02.xhtml#p11".to_string(),
            },
        ];
        let map = first_page_by_file(&targets);
        assert_eq!(map.get("ch01.xhtml"), Some(&9));
        assert_eq!(map.get("ch02.xhtml"), Some(&11));
    }

    #[test]
    fn test_parse_page_list() {
        let ncx = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/">
  <pageList>
    <pageTarget id="p7" type="front" value="7">
      <navLabel><text>{vii}</text></navLabel>
      <content src="front.xhtml#page_vii"/>
    </pageTarget>
    <pageTarget id="p1" type="normal" value="1">
      <navLabel><text>1</text></navLabel>
      <content src="ch01.xhtml#page_1"/>
    </pageTarget>
  </pageList>
</ncx>"#;
        let targets = parse_page_list(ncx).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].label, "{vii}");
        assert_eq!(targets[1].href, "ch01.xhtml#page_1");
    }

    #[test]
    fn test_parse_page_list_absent() {
        let ncx = r#"<?xml version="1.0"?><ncx><navMap/></ncx>"#;
        assert!(parse_page_list(ncx).unwrap().is_empty());
    }
}
