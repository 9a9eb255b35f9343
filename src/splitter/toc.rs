use serde::{Deserialize, Serialize};

use crate::page_range::ChapterRange;
use crate::pdf::{DestinationResolver, OutlineTree};

/// Machine-readable chapter entry; pages are 0-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocRecord {
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
}

/// One `<title>: pages <start>-<end>` line per chapter, 1-based.
pub fn toc_text(ranges: &[ChapterRange]) -> String {
    ranges
        .iter()
        .map(|r| format!("{}: pages {}-{}", r.title, r.start_page + 1, r.end_page + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn toc_records(ranges: &[ChapterRange]) -> Vec<TocRecord> {
    ranges
        .iter()
        .map(|r| TocRecord {
            title: r.title.clone(),
            start_page: r.start_page,
            end_page: r.end_page,
        })
        .collect()
}

/// Contents of `chapters.json`
pub fn toc_json(records: &[TocRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Full outline at every depth, for inspection only.
pub fn outline_text<R: DestinationResolver + ?Sized>(tree: &OutlineTree, resolver: &R) -> String {
    tree.walk()
        .into_iter()
        .map(|node| {
            let indent = "  ".repeat(node.depth.saturating_sub(1) as usize);
            let page = resolver
                .resolve(node)
                .map(|p| (p + 1).to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("{}- {} (p{})", indent, node.title, page)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
