use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::splitter::toc::toc_json;
use crate::splitter::{split_pdf_bytes, SplitOptions, SplitResult, SplitStatus};

pub const TOC_TEXT_FILE: &str = "chapters.txt";
pub const TOC_JSON_FILE: &str = "chapters.json";

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    options: &SplitOptions,
) -> Result<()> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    let jobs: Vec<(PathBuf, PathBuf)> = if input.is_dir() {
        find_pdfs(input)
            .into_iter()
            .map(|path| {
                let dir = output_dir.join(job_subdir(input, &path));
                (path, dir)
            })
            .collect()
    } else {
        vec![(input.to_path_buf(), output_dir.to_path_buf())]
    };

    if jobs.is_empty() {
        anyhow::bail!("No PDF files found in {}", input.display());
    }

    let mut failures = 0;
    for (path, dir) in &jobs {
        let result = split_file(path, options)?;
        let written = write_outputs(&result, dir)?;

        println!("{}", summary(&result));
        println!("Wrote {} file(s) to {}", written.len(), dir.display());

        if result.status == SplitStatus::Failure {
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} input(s) produced no chapters", failures, jobs.len());
    }

    Ok(())
}

/// Outcome message followed by one line per warning.
pub fn summary(result: &SplitResult) -> String {
    let mut out = result.message.clone();
    for warning in &result.warnings {
        out.push_str("\n  warning: ");
        out.push_str(warning);
    }
    out
}

/// Read and split one file; the result carries any per-document failure
pub fn split_file(path: &Path, options: &SplitOptions) -> Result<SplitResult> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(split_pdf_bytes(&bytes, &name, options))
}

/// Write chapter PDFs and the two table-of-contents files. Nothing is written
/// for a result without chapters.
pub fn write_outputs(result: &SplitResult, output_dir: &Path) -> Result<Vec<PathBuf>> {
    if result.chapters.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut written = Vec::new();
    let mut write = |name: &str, contents: &[u8]| -> Result<()> {
        let path = output_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
        Ok(())
    };

    for chapter in &result.chapters {
        write(&chapter.filename, &chapter.bytes)?;
    }
    write(TOC_TEXT_FILE, format!("{}\n", result.toc_text).as_bytes())?;
    let json = toc_json(&result.toc_records).context("Failed to serialize table of contents")?;
    write(TOC_JSON_FILE, json.as_bytes())?;

    info!(dir = %output_dir.display(), files = written.len(), "wrote chapters");
    Ok(written)
}

/// Output subdirectory for a file found below `root`: its relative path
/// without the extension, so `a/x.pdf` and `b/x.pdf` stay apart.
fn job_subdir(root: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let subdir = relative.with_extension("");
    if subdir.as_os_str().is_empty() {
        PathBuf::from("document")
    } else {
        subdir
    }
}

fn find_pdfs(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    found.sort();
    found
}
