//! reindex CLI - re-organize a book's back-of-book index by chapter
//!
//! Takes an EPUB (machine-readable TOC and index) or a PDF (page-range
//! extraction plus LLM structuring) and writes a Markdown report listing
//! each chapter's index terms in order of first appearance.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;

use reindex_core::{
    group_by_chapter, safe_output_filename, IndexReport, MarkdownSerializer,
};
use reindex_ebook::parse_epub;
use reindex_llm::{LlmConfig, OpenAiClient, Structurer};
use reindex_pdf::{extract_pdf, PageRange};

#[derive(Parser)]
#[command(name = "reindex")]
#[command(about = "Re-organize a book index by order of appearance per chapter")]
struct Args {
    /// Path to an EPUB or PDF file
    input: PathBuf,

    /// Output directory for the Markdown report
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// PDF only: TOC page range, e.g. 5-8
    #[arg(long, value_name = "START-END", default_value = "5-8")]
    toc_pages: String,

    /// PDF only: index page range, e.g. 450-470 (required for PDF input)
    #[arg(long, value_name = "START-END")]
    index_pages: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();

    let input = &args.input;
    if !input.exists() {
        bail!("File not found: {}", input.display());
    }

    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "epub" => run_epub(input, &args.output_dir),
        "pdf" => run_pdf(input, &args).await,
        other => bail!("Unsupported input format '.{other}': expected .epub or .pdf"),
    }
}

/// EPUB path: everything is machine-readable, no LLM involved.
fn run_epub(input: &Path, output_dir: &Path) -> Result<()> {
    println!("{} Extracting TOC and index from EPUB...", "→".cyan());
    let book = parse_epub(input)
        .with_context(|| format!("Failed to extract {}", input.display()))?;
    info!(
        chapters = book.chapters.len(),
        occurrences = book.occurrences.len(),
        "EPUB extraction complete"
    );

    println!("{} Mapping index entries to chapters...", "→".cyan());
    let groups = group_by_chapter(&book.chapters, &book.occurrences)
        .context("Failed to map index entries to chapters")?;

    write_report(&IndexReport::new(book.title, groups), output_dir)
}

/// PDF path: raw page-range extraction, then LLM structuring.
async fn run_pdf(input: &Path, args: &Args) -> Result<()> {
    let Some(index_pages) = args.index_pages.as_deref() else {
        bail!("PDF requires --index-pages START-END (e.g. --index-pages 450-470)");
    };
    let toc_range = parse_range(&args.toc_pages)?;
    let index_range = parse_range(index_pages)?;

    println!("{} Extracting TOC and index pages from PDF...", "→".cyan());
    let raw = extract_pdf(input, toc_range, index_range)
        .with_context(|| format!("Failed to extract {}", input.display()))?;
    info!(
        pages = raw.page_count,
        toc_chars = raw.toc_raw.len(),
        index_chars = raw.index_raw.len(),
        "PDF extraction complete"
    );

    let config = LlmConfig::from_env().context("LLM configuration incomplete")?;
    let client = OpenAiClient::new(config);

    println!("{} Structuring index with LLM...", "→".cyan());
    let occurrences = client
        .structure_index(&raw.index_raw)
        .await
        .context("Failed to structure index text")?;

    println!("{} Structuring TOC with LLM...", "→".cyan());
    let chapters = client
        .structure_toc(&raw.toc_raw, raw.page_count)
        .await
        .context("Failed to structure TOC text")?;

    println!("{} Mapping index entries to chapters...", "→".cyan());
    let groups = group_by_chapter(&chapters, &occurrences)
        .context("Failed to map index entries to chapters")?;

    let book_title = input
        .file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default();
    write_report(&IndexReport::new(book_title, groups), &args.output_dir)
}

/// Render the report and write it into the output directory.
fn write_report(report: &IndexReport, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let out_path = output_dir.join(safe_output_filename(&report.book_title));
    let markdown = MarkdownSerializer::new().serialize(report);
    fs::write(&out_path, markdown)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    println!(
        "{} Wrote {} entries to {}",
        "✓".green().bold(),
        report.entry_count(),
        out_path.display()
    );
    Ok(())
}

/// Parse a "START-END" page range.
fn parse_range(s: &str) -> Result<PageRange> {
    let parts: Vec<&str> = s.trim().split('-').collect();
    let [start, end] = parts.as_slice() else {
        bail!("Invalid page range: {s}. Use START-END, e.g. 5-8");
    };
    let start: u32 = start
        .trim()
        .parse()
        .with_context(|| format!("Invalid page range: {s}"))?;
    let end: u32 = end
        .trim()
        .parse()
        .with_context(|| format!("Invalid page range: {s}"))?;
    if start < 1 || end < start {
        bail!("Invalid page range: {s}. Start must be >= 1 and <= end");
    }
    Ok(PageRange::new(start, end))
}
