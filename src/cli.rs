use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::splitter::DEFAULT_MAX_TITLE_LEN;

#[derive(Parser)]
#[command(name = "pdfchapters")]
#[command(about = "Split a PDF into one file per top-level bookmark, with a table of contents")]
#[command(version)]
pub struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Split a PDF (or every PDF below a directory) into chapters
    Split {
        /// PDF file or directory of PDFs
        path: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Maximum length of the title part of chapter filenames
        #[arg(long, default_value_t = DEFAULT_MAX_TITLE_LEN, value_parser = parse_max_title_len)]
        max_title_len: usize,
    },

    /// Print the chapter plan without writing anything
    Toc {
        /// PDF file to inspect
        path: PathBuf,

        /// Print the whole outline, nested bookmarks included
        #[arg(short, long)]
        all: bool,
    },
}

fn parse_max_title_len(s: &str) -> Result<usize, String> {
    let len: usize = s.parse().map_err(|e| format!("{}", e))?;
    if len == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(len)
}
