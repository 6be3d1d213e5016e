//! Markdown serialization for [`IndexReport`].
//!
//! Emits one `###` section per chapter and one bullet per entry, in exactly
//! the order the engine produced; the serializer never re-sorts.
//!
//! # Examples
//!
//! ```rust
//! use reindex_core::{group_by_chapter, Chapter, IndexOccurrence, IndexReport};
//! use reindex_core::serializer::MarkdownSerializer;
//!
//! let chapters = vec![Chapter::new("Intro", 1, 0)];
//! let occurrences = vec![IndexOccurrence::new("Gathering", 9)];
//!
//! let groups = group_by_chapter(&chapters, &occurrences)?;
//! let report = IndexReport::new("Field Notes", groups);
//! let markdown = MarkdownSerializer::new().serialize(&report);
//! assert!(markdown.contains("- **Gathering** — p. 9"));
//! # Ok::<(), reindex_core::CoreError>(())
//! ```

use crate::types::{IndexOccurrence, IndexReport};

/// Configuration options for Markdown serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkdownOptions {
    /// Whether to print a section heading for chapters with no entries.
    ///
    /// The engine always emits empty groups; by default the report hides
    /// them.
    ///
    /// Default: `false`.
    pub include_empty_chapters: bool,

    /// Whether to collect each chapter's entries under `####` sections for
    /// the in-chapter subheadings the extraction recovered. Entries without
    /// a subheading stay unlabeled; when no entry carries one the output is
    /// identical to flat rendering.
    ///
    /// Default: `true`.
    pub group_by_subheading: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_empty_chapters: false,
            group_by_subheading: true,
        }
    }
}

/// Markdown serializer for [`IndexReport`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarkdownSerializer {
    options: MarkdownOptions,
}

impl MarkdownSerializer {
    /// Create a new Markdown serializer with default options
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub const fn new() -> Self {
        Self {
            options: MarkdownOptions {
                include_empty_chapters: false,
                group_by_subheading: true,
            },
        }
    }

    /// Create a Markdown serializer with custom options
    #[inline]
    #[must_use = "creates serializer with the given options"]
    pub const fn with_options(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Render the report as Markdown text.
    #[must_use = "returns the rendered Markdown"]
    pub fn serialize(&self, report: &IndexReport) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push(format!("# {}", report.book_title));
        lines.push(String::new());
        lines.push("## Index (by order of appearance)".to_string());
        lines.push(String::new());

        for group in &report.groups {
            if group.entries.is_empty() && !self.options.include_empty_chapters {
                continue;
            }
            lines.push(format!("### {}", group.chapter.title));
            lines.push(String::new());

            // Partition entries by subheading in first-appearance order,
            // without disturbing the engine's ordering inside a section.
            let mut sections: Vec<(&str, Vec<&IndexOccurrence>)> = Vec::new();
            for entry in &group.entries {
                let sub = if self.options.group_by_subheading {
                    entry.subheading.as_deref().unwrap_or("")
                } else {
                    ""
                };
                match sections.iter_mut().find(|(s, _)| *s == sub) {
                    Some((_, entries)) => entries.push(entry),
                    None => sections.push((sub, vec![entry])),
                }
            }

            for (subheading, entries) in sections {
                if !subheading.is_empty() {
                    lines.push(format!("#### {subheading}"));
                    lines.push(String::new());
                }
                for entry in entries {
                    let bullet = match &entry.subentry {
                        Some(sub) => {
                            format!("- **{}** ({}) — p. {}", entry.term, sub, entry.page)
                        }
                        None => format!("- **{}** — p. {}", entry.term, entry.page),
                    };
                    lines.push(bullet);
                }
                lines.push(String::new());
            }
        }

        let mut out = lines.join("\n");
        // Single trailing newline regardless of whether the last section
        // already ended with a blank line.
        while out.ends_with('\n') {
            out.pop();
        }
        out.push('\n');
        out
    }
}

/// Build a filesystem-safe output filename from a book title.
///
/// Characters outside `[A-Za-z0-9 _-]` become underscores, and the result
/// gets the `_index.md` suffix: `"C++ & Friends"` → `"C__ _ Friends_index.md"`.
#[must_use = "returns the sanitized filename"]
pub fn safe_output_filename(book_title: &str) -> String {
    let safe: String = book_title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_index.md", safe.trim_matches('_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chapter, ChapterGroup, IndexOccurrence};

    fn report() -> IndexReport {
        IndexReport::new(
            "Sample Book",
            vec![
                ChapterGroup {
                    chapter: Chapter::new("Intro", 1, 0),
                    entries: vec![
                        IndexOccurrence::new("Gathering", 9),
                        IndexOccurrence::with_subentry("sorting", "stable", 9),
                    ],
                },
                ChapterGroup {
                    chapter: Chapter::new("Silent Chapter", 20, 1),
                    entries: Vec::new(),
                },
            ],
        )
    }

    #[test]
    fn test_layout_and_bullets() {
        let md = MarkdownSerializer::new().serialize(&report());
        assert!(md.starts_with("# Sample Book\n\n## Index (by order of appearance)\n"));
        assert!(md.contains("### Intro"));
        assert!(md.contains("- **Gathering** — p. 9"));
        assert!(md.contains("- **sorting** (stable) — p. 9"));
        assert!(md.ends_with('\n'));
        assert!(!md.ends_with("\n\n"));
    }

    #[test]
    fn test_empty_chapters_hidden_by_default() {
        let md = MarkdownSerializer::new().serialize(&report());
        assert!(!md.contains("Silent Chapter"));
    }

    #[test]
    fn test_empty_chapters_shown_when_requested() {
        let serializer = MarkdownSerializer::with_options(MarkdownOptions {
            include_empty_chapters: true,
            ..MarkdownOptions::default()
        });
        let md = serializer.serialize(&report());
        assert!(md.contains("### Silent Chapter"));
    }

    #[test]
    fn test_entry_order_is_preserved_verbatim() {
        // The serializer must not re-sort: feed it a deliberately
        // non-alphabetical, non-page-ordered group.
        let report = IndexReport::new(
            "Ordered",
            vec![ChapterGroup {
                chapter: Chapter::new("One", 1, 0),
                entries: vec![
                    IndexOccurrence::new("Zebra", 8),
                    IndexOccurrence::new("Apple", 3),
                ],
            }],
        );
        let md = MarkdownSerializer::new().serialize(&report);
        let zebra = md.find("Zebra").unwrap();
        let apple = md.find("Apple").unwrap();
        assert!(zebra < apple);
    }

    fn report_with_subheadings() -> IndexReport {
        IndexReport::new(
            "Tides",
            vec![ChapterGroup {
                chapter: Chapter::new("Ebb", 1, 0),
                entries: vec![
                    IndexOccurrence::new("salt", 2),
                    IndexOccurrence::new("moon", 4).under_subheading("Currents"),
                    IndexOccurrence::new("driftwood", 5),
                    IndexOccurrence::new("spray", 7).under_subheading("Currents"),
                ],
            }],
        )
    }

    #[test]
    fn test_subheadings_become_level_four_sections() {
        let md = MarkdownSerializer::new().serialize(&report_with_subheadings());
        assert!(md.contains(
            "- **driftwood** — p. 5\n\n#### Currents\n\n- **moon** — p. 4\n- **spray** — p. 7"
        ));
    }

    #[test]
    fn test_subheading_sections_merge_in_first_appearance_order() {
        // "driftwood" appears between the two Currents entries but carries
        // no subheading, so it joins the unlabeled section that came first.
        let md = MarkdownSerializer::new().serialize(&report_with_subheadings());
        assert!(md.contains("- **salt** — p. 2\n- **driftwood** — p. 5"));
        assert_eq!(md.matches("#### Currents").count(), 1);
    }

    #[test]
    fn test_subheading_grouping_can_be_disabled() {
        let serializer = MarkdownSerializer::with_options(MarkdownOptions {
            group_by_subheading: false,
            ..MarkdownOptions::default()
        });
        let md = serializer.serialize(&report_with_subheadings());
        assert!(!md.contains("####"));
        assert!(md.contains(
            "- **salt** — p. 2\n- **moon** — p. 4\n- **driftwood** — p. 5\n- **spray** — p. 7"
        ));
    }

    #[test]
    fn test_safe_output_filename() {
        assert_eq!(safe_output_filename("Plain Title"), "Plain Title_index.md");
        assert_eq!(
            safe_output_filename("War & Peace: Vol. 1"),
            "War _ Peace_ Vol_ 1_index.md"
        );
    }
}
