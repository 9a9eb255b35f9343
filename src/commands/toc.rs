use anyhow::{Context, Result};
use std::path::Path;

use crate::pdf::{ChapterSource, PdfDocument};
use crate::splitter::plan_chapters;
use crate::splitter::toc::{outline_text, toc_text};
use crate::warnings::Warnings;

pub fn run<P: AsRef<Path>>(path: P, all: bool) -> Result<()> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))?;
    let doc = PdfDocument::load_mem(&bytes)
        .with_context(|| format!("Failed to open PDF: {}", path.display()))?;

    if all {
        let outline = doc.outline();
        if outline.is_empty() {
            println!("No table of contents found.");
        } else {
            println!("{}", outline_text(&outline, &doc));
        }
        return Ok(());
    }

    let mut warnings = Warnings::new();
    let ranges = plan_chapters(&doc, &mut warnings);

    if ranges.is_empty() {
        println!("No chapters found.");
    } else {
        println!("{}", toc_text(&ranges));
    }
    if !warnings.is_empty() {
        println!();
        for warning in warnings.iter() {
            println!("warning: {}", warning);
        }
    }

    Ok(())
}
