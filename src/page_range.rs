use crate::warnings::Warnings;

/// First page of one top-level bookmark, before partitioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterStart {
    pub title: String,
    /// 0-based; may still lie outside the document until partitioned
    pub page_index: u32,
}

impl ChapterStart {
    pub fn new(title: impl Into<String>, page_index: u32) -> Self {
        ChapterStart {
            title: title.into(),
            page_index,
        }
    }
}

/// Inclusive 0-based page range of one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRange {
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
    /// Collapsed onto its start page because the next bookmark starts on the same page
    pub degenerate: bool,
}

impl ChapterRange {
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

/// Turn ordered chapter starts into ranges covering `[first start, total_pages)`.
///
/// Starts are clamped into the document and then forced non-decreasing; they
/// are never reordered or dropped, so every start yields exactly one range.
pub fn partition(
    starts: &[ChapterStart],
    total_pages: u32,
    warnings: &mut Warnings,
) -> Vec<ChapterRange> {
    if starts.is_empty() {
        return Vec::new();
    }
    if total_pages == 0 {
        warnings.push("Document has no pages; no chapters can be produced");
        return Vec::new();
    }

    let last_page = total_pages - 1;
    let mut clamped: Vec<u32> = Vec::with_capacity(starts.len());

    for start in starts {
        let mut page = start.page_index;
        if page > last_page {
            warnings.push(format!(
                "Bookmark '{}' points to page {} beyond the last page {}; clamped",
                start.title,
                page + 1,
                total_pages
            ));
            page = last_page;
        }
        if let Some(&previous) = clamped.last() {
            if page < previous {
                warnings.push(format!(
                    "Bookmark '{}' points to page {}, before the previous chapter start (page {}); treating it as starting on page {}",
                    start.title,
                    page + 1,
                    previous + 1,
                    previous + 1
                ));
                page = previous;
            }
        }
        clamped.push(page);
    }

    if clamped[0] > 0 {
        warnings.push(format!(
            "{} leading page(s) before the first bookmark are not part of any chapter",
            clamped[0]
        ));
    }

    starts
        .iter()
        .zip(&clamped)
        .enumerate()
        .map(|(i, (start, &start_page))| {
            let (end_page, degenerate) = match clamped.get(i + 1) {
                Some(&next) if next > start_page => (next - 1, false),
                // Next chapter starts on the same page
                Some(_) => (start_page, true),
                None => (last_page, false),
            };
            ChapterRange {
                title: start.title.clone(),
                start_page,
                end_page,
                degenerate,
            }
        })
        .collect()
}
