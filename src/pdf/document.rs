use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use super::destination::PageResolver;
use super::{ChapterSource, DestinationResolver, OutlineNode, OutlineTree};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("pages {start}-{end} are outside a document of {total} pages")]
    PageOutOfRange { start: u32, end: u32, total: u32 },

    #[error("page {page} is unreadable: {reason}")]
    BrokenPage { page: u32, reason: String },

    #[error("failed to build chapter: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to write chapter: {0}")]
    Io(#[from] std::io::Error),
}

pub struct PdfDocument {
    pub doc: Document,
    /// Page object id to 0-based page index
    page_map: HashMap<ObjectId, u32>,
}

impl PdfDocument {
    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).context("Failed to parse PDF")?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let page_map = doc
            .get_pages()
            .into_iter()
            .map(|(num, id)| (id, num - 1))
            .collect();
        PdfDocument { doc, page_map }
    }

    pub fn page_count(&self) -> u32 {
        self.page_map.len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        // get_pages() is a BTreeMap, already ordered
        self.doc.get_pages().into_iter().collect()
    }

    /// Copy the 0-based inclusive range `start..=end` into a new serialized PDF
    pub fn extract_range(&self, start: u32, end: u32) -> Result<Vec<u8>, ExtractError> {
        let all_pages = self.page_ids();
        let total = all_pages.len() as u32;

        if start > end || end >= total {
            return Err(ExtractError::PageOutOfRange { start, end, total });
        }

        let keep = (start + 1)..=(end + 1);
        for &(num, id) in &all_pages {
            if keep.contains(&num) {
                self.check_page(num - 1, id)?;
            }
        }

        let mut new_doc = self.doc.clone();

        let pages_to_delete: Vec<u32> = all_pages
            .iter()
            .map(|(num, _)| *num)
            .filter(|num| !keep.contains(num))
            .collect();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }

        // Bookmarks of the source point into deleted pages
        if let Ok(root) = new_doc.trailer.get(b"Root").and_then(Object::as_reference) {
            if let Ok(catalog) = new_doc.get_dictionary_mut(root) {
                catalog.remove(b"Outlines");
            }
        }

        let pruned = new_doc.prune_objects();
        new_doc.compress();
        debug!(start, end, pruned = pruned.len(), "copied page range");

        let mut buffer = Vec::new();
        new_doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    fn check_page(&self, page: u32, id: ObjectId) -> Result<(), ExtractError> {
        let broken = |e: lopdf::Error| ExtractError::BrokenPage {
            page,
            reason: e.to_string(),
        };

        let dict = self.doc.get_dictionary(id).map_err(broken)?;
        match dict.get(b"Contents") {
            Ok(Object::Reference(r)) => {
                self.doc.get_object(*r).map_err(broken)?;
            }
            Ok(Object::Array(parts)) => {
                for part in parts {
                    if let Object::Reference(r) = part {
                        self.doc.get_object(*r).map_err(broken)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn resolver(&self) -> PageResolver<'_> {
        PageResolver::new(&self.doc, &self.page_map)
    }
}

impl DestinationResolver for PdfDocument {
    fn resolve(&self, node: &OutlineNode) -> Option<u32> {
        self.resolver().resolve(node)
    }
}

impl ChapterSource for PdfDocument {
    fn page_count(&self) -> u32 {
        PdfDocument::page_count(self)
    }

    fn outline(&self) -> OutlineTree {
        OutlineTree::from_document(&self.doc)
    }

    fn extract_pages(&self, start: u32, end: u32) -> Result<Vec<u8>, ExtractError> {
        self.extract_range(start, end)
    }
}
