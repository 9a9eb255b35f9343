use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::commands::split::{split_file, write_outputs};
use crate::pdf::PdfDocument;
use crate::splitter::toc::{toc_records, TocRecord};
use crate::splitter::{plan_chapters, SplitOptions, SplitResult, DEFAULT_MAX_TITLE_LEN};
use crate::warnings::Warnings;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SplitChaptersRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Directory to write chapter PDFs, chapters.txt and chapters.json into")]
    pub output_dir: String,
    #[schemars(description = "Maximum length of the title part of chapter filenames (default: 80)")]
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,
}

fn default_max_title_len() -> usize {
    DEFAULT_MAX_TITLE_LEN
}

#[derive(Debug, Clone)]
pub struct ChapterServer {
    tool_router: ToolRouter<Self>,
}

impl ChapterServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for ChapterServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ChapterServer {
    #[tool(description = "Show how a PDF would be split into chapters by its top-level bookmarks, without writing files. Pages are 0-based and inclusive.")]
    fn pdf_chapter_plan(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let doc = match std::fs::read(&path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| PdfDocument::load_mem(&bytes))
        {
            Ok(d) => d,
            Err(e) => return format!("Error: {:#}", e),
        };

        let mut warnings = Warnings::new();
        let ranges = plan_chapters(&doc, &mut warnings);
        let result = ChapterPlanResult {
            path,
            total_pages: doc.page_count(),
            toc_records: toc_records(&ranges),
            warnings: warnings.into_vec(),
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }

    #[tool(description = "Split a PDF into one PDF per top-level bookmark and write them, with chapters.txt and chapters.json, to a directory")]
    fn pdf_split_chapters(&self, Parameters(req): Parameters<SplitChaptersRequest>) -> String {
        if req.max_title_len == 0 {
            return "Error: max_title_len must be at least 1".to_string();
        }
        let options = SplitOptions {
            max_title_len: req.max_title_len,
        };

        let result = match split_file(Path::new(&req.path), &options) {
            Ok(r) => r,
            Err(e) => return format!("Error: {:#}", e),
        };

        let written = match write_outputs(&result, Path::new(&req.output_dir)) {
            Ok(w) => w,
            Err(e) => return format!("Error: {:#}", e),
        };

        let result = SplitChaptersResult {
            written: written
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            result,
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize)]
pub struct ChapterPlanResult {
    pub path: String,
    pub total_pages: u32,
    pub toc_records: Vec<TocRecord>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SplitChaptersResult {
    #[serde(flatten)]
    pub result: SplitResult,
    pub written: Vec<String>,
}

#[tool_handler]
impl ServerHandler for ChapterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Split PDFs into chapters along their top-level bookmarks. Use pdf_chapter_plan \
                 to preview chapter page ranges and pdf_split_chapters to write one PDF per \
                 chapter plus chapters.txt and chapters.json."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = ChapterServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
