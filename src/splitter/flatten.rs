use tracing::debug;

use crate::page_range::ChapterStart;
use crate::pdf::{DestinationResolver, OutlineTree};
use crate::warnings::Warnings;

/// Chapter starts for the top-level bookmarks, in outline order.
///
/// Bookmarks whose destination does not resolve are skipped with a warning.
/// Blank titles become `Untitled chapter N`, N being the 1-based outline position.
pub fn flatten_outline<R: DestinationResolver + ?Sized>(
    tree: &OutlineTree,
    resolver: &R,
    warnings: &mut Warnings,
) -> Vec<ChapterStart> {
    let mut starts = Vec::new();

    for (i, node) in tree.top_level().enumerate() {
        let title = chapter_title(&node.title, i + 1);

        match resolver.resolve(node) {
            Some(page_index) => {
                debug!(title = %title, page_index, "resolved bookmark");
                starts.push(ChapterStart::new(title, page_index));
            }
            None => warnings.push(format!(
                "Bookmark '{}' does not point to a page in this document; skipped",
                title
            )),
        }
    }

    starts
}

fn chapter_title(raw: &str, position: usize) -> String {
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        format!("Untitled chapter {}", position)
    } else {
        title
    }
}
