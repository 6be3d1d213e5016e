/// EPUB (Electronic Publication) extraction
///
/// Pulls the three things the engine needs out of an EPUB: the book title,
/// a chapter boundary table in printed page numbers, and the back-of-book
/// index as a flat occurrence list.
///
/// Uses the `epub` crate for the container and navMap; the NCX pageList and
/// the index markup are read straight from the ZIP archive.
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use epub::doc::{EpubDoc, NavPoint};
use log::{debug, warn};
use regex::Regex;
use zip::ZipArchive;

use reindex_core::{Chapter, IndexOccurrence};

use crate::error::{EbookError, Result};
use crate::headings::{parse_chapter_headings, subheading_at};
use crate::index::parse_index_refs;
use crate::pages::{extract_page_list, first_page_by_file, href_basename, normalize_page};
use crate::types::ExtractedBook;

static RE_PAGE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)id=["']page[_\-]?(\w+)["']"#).expect("valid page anchor pattern")
});

/// Parse an EPUB file from path.
///
/// # Errors
///
/// Returns an error if:
/// - The EPUB cannot be opened or is structurally invalid
/// - The navMap yields no chapters
/// - No index document exists in the package
/// - Neither a pageList nor in-document page anchors provide any page
///   numbering (the engine needs chapter starts in printed pages)
pub fn parse_epub<P: AsRef<Path>>(path: P) -> Result<ExtractedBook> {
    let path = path.as_ref();

    let doc = EpubDoc::new(path)
        .map_err(|e| EbookError::EpubError(format!("Failed to open EPUB: {e}")))?;

    let title = doc.mdata("title").map(|m| m.value.clone()).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
            .unwrap_or_default()
    });

    // Chapter candidates: first TOC entry per content file, in nav order.
    let candidates = chapter_candidates(&doc.toc);
    if candidates.is_empty() {
        return Err(EbookError::EmptyToc(format!(
            "no navPoints in {}",
            path.display()
        )));
    }

    let mut archive = open_archive(path)?;

    // Printed page per file, preferring the NCX pageList and falling back to
    // id="page_N" anchors inside the chapter documents themselves. The same
    // read collects each file's subheading boundaries.
    let page_list = extract_page_list(path)?;
    let mut page_by_file = first_page_by_file(&page_list);
    let mut headings_by_file: HashMap<String, Vec<(u32, String)>> = HashMap::new();
    for (_, file) in &candidates {
        let Some(content) = read_content_file(&mut archive, file) else {
            continue;
        };
        if !page_by_file.contains_key(file) {
            if let Some(page) = min_page_anchor(&content) {
                page_by_file.insert(file.clone(), page);
            }
        }
        let headings = parse_chapter_headings(&content);
        if !headings.is_empty() {
            headings_by_file.insert(file.clone(), headings);
        }
    }
    if page_by_file.is_empty() {
        return Err(EbookError::NoPageNumbers(format!(
            "{} has neither a pageList nor page anchors",
            path.display()
        )));
    }

    // Files without any page marker inherit the running position so the
    // boundary table stays sorted.
    let mut chapters = Vec::with_capacity(candidates.len());
    let mut running = 1u32;
    for (i, (label, file)) in candidates.iter().enumerate() {
        if let Some(&page) = page_by_file.get(file) {
            running = page;
        } else {
            debug!("no page marker for {file}; inheriting start {running}");
        }
        chapters.push(Chapter::new(label.clone(), running, i));
    }

    let refs = match find_index_document(&mut archive) {
        Some(html) => parse_index_refs(&html),
        None => {
            return Err(EbookError::MissingIndex(format!(
                "no index document in {}",
                path.display()
            )))
        }
    };
    let occurrences: Vec<IndexOccurrence> = refs
        .into_iter()
        .map(|r| {
            let sub = headings_by_file
                .get(&r.file)
                .and_then(|h| subheading_at(h, r.occurrence.page));
            match sub {
                Some(s) => r.occurrence.under_subheading(s),
                None => r.occurrence,
            }
        })
        .collect();
    if occurrences.is_empty() {
        warn!("index document in {} yielded no entries", path.display());
    }

    Ok(ExtractedBook {
        title,
        chapters,
        occurrences,
    })
}

/// Flatten the navMap depth-first into (label, file basename) pairs, keeping
/// the first entry per content file.
fn chapter_candidates(toc: &[NavPoint]) -> Vec<(String, String)> {
    fn walk(points: &[NavPoint], seen: &mut Vec<String>, out: &mut Vec<(String, String)>) {
        for point in points {
            let base = href_basename(&point.content.to_string_lossy());
            if !base.is_empty() && !seen.contains(&base) {
                seen.push(base.clone());
                out.push((point.label.trim().to_string(), base));
            }
            walk(&point.children, seen, out);
        }
    }

    let mut seen = Vec::new();
    let mut out = Vec::new();
    walk(toc, &mut seen, &mut out);
    out
}

/// Open the EPUB as a ZIP archive for direct entry access.
fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|e| EbookError::EpubError(format!("Failed to open EPUB file: {e}")))?;
    ZipArchive::new(BufReader::new(file))
        .map_err(|e| EbookError::EpubError(format!("Invalid EPUB (not a ZIP): {e}")))
}

/// Read the first archive entry whose name satisfies the predicate.
fn read_entry_matching<F>(archive: &mut ZipArchive<BufReader<File>>, pred: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    let idx = (0..archive.len()).find(|&i| {
        archive
            .by_index(i)
            .is_ok_and(|entry| pred(&entry.name().to_lowercase()))
    })?;
    let mut entry = archive.by_index(idx).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Read a content file by basename, wherever it sits in the package.
fn read_content_file(
    archive: &mut ZipArchive<BufReader<File>>,
    file_basename: &str,
) -> Option<String> {
    let wanted = file_basename.to_lowercase();
    read_entry_matching(archive, |name| {
        name == wanted || name.ends_with(&format!("/{wanted}"))
    })
}

/// Smallest printed page among `id="page_N"` anchors in a content file.
fn min_page_anchor(content: &str) -> Option<u32> {
    RE_PAGE_ANCHOR
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).and_then(|m| normalize_page(m.as_str())))
        .min()
}

/// Locate and read the index document (entry whose basename contains
/// "index" and is an (X)HTML file).
fn find_index_document(archive: &mut ZipArchive<BufReader<File>>) -> Option<String> {
    read_entry_matching(archive, |name| {
        let base = name.rsplit('/').next().unwrap_or(name);
        base.contains("index")
            && (base.ends_with(".xhtml") || base.ends_with(".html") || base.ends_with(".htm"))
    })
}
