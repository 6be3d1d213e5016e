//! The mapping-and-ordering engine.
//!
//! Assigns every index occurrence to the chapter whose page range contains
//! it, then orders each chapter's entries by order of first appearance:
//! ascending page, with same-page ties kept in extraction order.
//!
//! The engine is pure and deterministic: no I/O, no clocks, no randomness.
//! It is safe to call repeatedly and from multiple threads; all output is
//! freshly allocated.

use log::debug;

use crate::error::{CoreError, Result};
use crate::types::{Chapter, ChapterGroup, IndexOccurrence};

/// Groups index occurrences by owning chapter, ordered by first appearance.
///
/// The chapter list must be non-empty; if it arrives unsorted the engine
/// sorts it (stable) and reassigns `order_index` before mapping, since
/// upstream extraction order is not guaranteed.
///
/// Ownership rules:
/// - an occurrence belongs to the last chapter that has started by its page
///   (greatest `start_position <= page`);
/// - pages before the first chapter fold into the first chapter, so front
///   matter is kept rather than dropped;
/// - pages past the last chapter's start belong to the last chapter (its
///   range is open-ended);
/// - when several chapters share a start position, the first of them in
///   document order wins.
///
/// Chapters with no occurrences still produce a group with empty entries;
/// whether to print those is the renderer's decision, not the engine's.
///
/// # Errors
///
/// - [`CoreError::InvalidInput`] if `chapters` is empty.
/// - [`CoreError::PreconditionViolation`] if any occurrence has `page == 0`
///   (pages are 1-based; a zero page means the upstream extraction broke its
///   contract).
pub fn group_by_chapter(
    chapters: &[Chapter],
    occurrences: &[IndexOccurrence],
) -> Result<Vec<ChapterGroup>> {
    if chapters.is_empty() {
        return Err(CoreError::InvalidInput(
            "chapter list is empty; cannot assign index occurrences".to_string(),
        ));
    }

    if let Some(bad) = occurrences.iter().find(|o| o.page == 0) {
        return Err(CoreError::PreconditionViolation(format!(
            "occurrence '{}' has page 0; pages are 1-based",
            bad.term
        )));
    }

    // Precondition repair: extraction order is not guaranteed to be sorted.
    let mut ordered = chapters.to_vec();
    if !ordered
        .windows(2)
        .all(|w| w[0].start_position <= w[1].start_position)
    {
        debug!("chapter boundaries arrived unsorted; sorting by start position");
        ordered.sort_by_key(|c| c.start_position);
    }
    for (i, chapter) in ordered.iter_mut().enumerate() {
        chapter.order_index = i;
    }

    let mut buckets: Vec<Vec<IndexOccurrence>> = vec![Vec::new(); ordered.len()];
    for occurrence in occurrences {
        let owner = owning_chapter(&ordered, occurrence.page);
        buckets[owner].push(occurrence.clone());
    }

    // Buckets hold extraction order; a stable sort on page alone yields
    // (page ascending, extraction order for same-page ties).
    for bucket in &mut buckets {
        bucket.sort_by_key(|o| o.page);
    }

    Ok(ordered
        .into_iter()
        .zip(buckets)
        .map(|(chapter, entries)| ChapterGroup { chapter, entries })
        .collect())
}

/// Index of the chapter owning `page`: the rightmost chapter with
/// `start_position <= page`, except that a run of chapters sharing a start
/// position resolves to the first chapter of the run.
///
/// `chapters` must be non-empty and sorted by `start_position`.
fn owning_chapter(chapters: &[Chapter], page: u32) -> usize {
    let after = chapters.partition_point(|c| c.start_position <= page);
    if after == 0 {
        // Page precedes every chapter: boundary-inclusive fallback.
        return 0;
    }
    let mut idx = after - 1;
    while idx > 0 && chapters[idx - 1].start_position == chapters[idx].start_position {
        idx -= 1;
    }
    idx
}
