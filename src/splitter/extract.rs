use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::page_range::ChapterRange;
use crate::pdf::ChapterSource;
use crate::warnings::Warnings;

lazy_static! {
    static ref UNSAFE_RUN: Regex = Regex::new(r"[^\w-]+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterArtifact {
    pub filename: String,
    pub start_page: u32,
    pub end_page: u32,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// `{seq:03}_{sanitized title}.pdf`, `seq` being 1-based
pub fn chapter_filename(seq: usize, title: &str, max_title_len: usize) -> String {
    format!("{:03}_{}.pdf", seq, sanitize_title(title, max_title_len))
}

/// Lowercased title with every run of non-word characters turned into one `_`.
pub fn sanitize_title(title: &str, max_len: usize) -> String {
    let replaced = UNSAFE_RUN.replace_all(title, "_").to_lowercase();
    let capped: String = replaced.trim_matches('_').chars().take(max_len).collect();
    let capped = capped.trim_end_matches('_');
    if capped.is_empty() {
        "chapter".chars().take(max_len.max(1)).collect()
    } else {
        capped.to_string()
    }
}

/// Extract every range in order. Failed chapters are left out and reported
/// as warnings; the number of failures is returned alongside.
pub fn extract_chapters<S: ChapterSource + ?Sized>(
    source: &S,
    ranges: &[ChapterRange],
    max_title_len: usize,
    warnings: &mut Warnings,
) -> (Vec<ChapterArtifact>, usize) {
    let mut artifacts = Vec::with_capacity(ranges.len());
    let mut failed = 0;

    for (i, range) in ranges.iter().enumerate() {
        let seq = i + 1;
        match source.extract_pages(range.start_page, range.end_page) {
            Ok(bytes) => {
                let filename = chapter_filename(seq, &range.title, max_title_len);
                debug!(%filename, pages = range.page_count(), size = bytes.len(), "extracted chapter");
                artifacts.push(ChapterArtifact {
                    filename,
                    start_page: range.start_page,
                    end_page: range.end_page,
                    bytes,
                });
            }
            Err(e) => {
                failed += 1;
                warnings.push(format!(
                    "Chapter {} '{}' (pages {}-{}) could not be extracted: {}",
                    seq,
                    range.title,
                    range.start_page + 1,
                    range.end_page + 1,
                    e
                ));
            }
        }
    }

    (artifacts, failed)
}
