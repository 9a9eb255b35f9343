//! Outline-driven chapter splitting.
//!
//! Pipeline: outline → chapter starts → page ranges → per-chapter PDFs and
//! table of contents. Only an unparseable document is fatal; everything else
//! is collected as warnings on the returned [`SplitResult`].

pub mod extract;
pub mod flatten;
pub mod toc;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::page_range::{partition, ChapterRange};
use crate::pdf::{ChapterSource, PdfDocument};
use crate::warnings::Warnings;

pub use extract::ChapterArtifact;
pub use toc::TocRecord;

pub const DEFAULT_MAX_TITLE_LEN: usize = 80;

#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Cap on the sanitized title part of chapter filenames
    pub max_title_len: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            max_title_len: DEFAULT_MAX_TITLE_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStatus {
    Success,
    Partial,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitResult {
    pub status: SplitStatus,
    pub message: String,
    /// Default name for an archive of the chapters
    pub archive_name: String,
    pub total_pages: u32,
    pub toc_text: String,
    pub toc_records: Vec<TocRecord>,
    pub chapters: Vec<ChapterArtifact>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Loaded,
    OutlineResolved,
    RangesComputed,
    Extracting,
    Extracted,
    Serialized,
    Done,
    Errored,
}

struct Progress(Stage);

impl Progress {
    fn start() -> Self {
        debug!(stage = ?Stage::Loaded, "split stage");
        Progress(Stage::Loaded)
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.0, "stage {:?} after {:?}", next, self.0);
        debug!(stage = ?next, "split stage");
        self.0 = next;
    }
}

/// Chapter ranges for a source, in outline order.
pub fn plan_chapters<S: ChapterSource + ?Sized>(
    source: &S,
    warnings: &mut Warnings,
) -> Vec<ChapterRange> {
    let outline = source.outline();
    let starts = flatten::flatten_outline(&outline, source, warnings);
    partition(&starts, source.page_count(), warnings)
}

/// Split raw PDF bytes. Never fails: problems are reported through the result.
pub fn split_pdf_bytes(bytes: &[u8], original_filename: &str, options: &SplitOptions) -> SplitResult {
    match PdfDocument::load_mem(bytes) {
        Ok(doc) => split_source(&doc, original_filename, options),
        Err(e) => {
            Progress::start().advance(Stage::Errored);
            let mut result = SplitResult::empty(original_filename, 0);
            result.message = format!("Failed to parse '{}' as PDF: {:#}", original_filename, e);
            info!(file = original_filename, "{}", result.message);
            result
        }
    }
}

pub fn split_source<S: ChapterSource + ?Sized>(
    source: &S,
    original_filename: &str,
    options: &SplitOptions,
) -> SplitResult {
    let mut progress = Progress::start();
    let mut warnings = Warnings::new();
    let total_pages = source.page_count();
    let mut result = SplitResult::empty(original_filename, total_pages);

    let outline = source.outline();
    let top_level = outline.top_level().count();
    let starts = flatten::flatten_outline(&outline, source, &mut warnings);
    progress.advance(Stage::OutlineResolved);

    let ranges = partition(&starts, total_pages, &mut warnings);
    progress.advance(Stage::RangesComputed);

    if ranges.is_empty() {
        result.message = if top_level == 0 {
            format!(
                "No chapters found: '{}' has no bookmarks (outline)",
                original_filename
            )
        } else if starts.is_empty() {
            format!(
                "No chapters found: none of the {} top-level bookmarks in '{}' point to a page",
                top_level, original_filename
            )
        } else {
            format!("No chapters found: '{}' has no pages", original_filename)
        };
        result.warnings = warnings.into_vec();
        info!(file = original_filename, "{}", result.message);
        return result;
    }

    progress.advance(Stage::Extracting);
    let (chapters, failed) =
        extract::extract_chapters(source, &ranges, options.max_title_len, &mut warnings);
    progress.advance(Stage::Extracted);

    result.toc_text = toc::toc_text(&ranges);
    result.toc_records = toc::toc_records(&ranges);
    progress.advance(Stage::Serialized);

    let planned = ranges.len();
    let succeeded = chapters.len();
    (result.status, result.message) = if failed == 0 {
        (
            SplitStatus::Success,
            format!(
                "Split '{}' into {} chapter(s)",
                original_filename, succeeded
            ),
        )
    } else if succeeded > 0 {
        (
            SplitStatus::Partial,
            format!(
                "Split '{}' into {} of {} chapters; {} failed",
                original_filename, succeeded, planned, failed
            ),
        )
    } else {
        (
            SplitStatus::Failure,
            format!(
                "Failed to extract any of the {} chapters from '{}'",
                planned, original_filename
            ),
        )
    };
    result.chapters = chapters;
    result.warnings = warnings.into_vec();
    progress.advance(Stage::Done);

    info!(
        file = original_filename,
        status = ?result.status,
        chapters = succeeded,
        warnings = result.warnings.len(),
        "{}",
        result.message
    );
    result
}

impl SplitResult {
    fn empty(original_filename: &str, total_pages: u32) -> Self {
        SplitResult {
            status: SplitStatus::Failure,
            message: String::new(),
            archive_name: archive_name(original_filename),
            total_pages,
            toc_text: String::new(),
            toc_records: Vec::new(),
            chapters: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// `<stem>_chapters.zip` for the uploaded file name
pub fn archive_name(original_filename: &str) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    format!("{}_chapters.zip", stem)
}
