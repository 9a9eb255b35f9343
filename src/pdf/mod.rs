pub mod destination;
pub mod document;
pub mod outline;
#[cfg(test)]
pub mod test_support;

pub use destination::DestinationResolver;
pub use document::{ExtractError, PdfDocument};
pub use outline::{OutlineNode, OutlineTree};

/// Everything the splitter needs from a loaded PDF.
pub trait ChapterSource: DestinationResolver {
    fn page_count(&self) -> u32;

    fn outline(&self) -> OutlineTree;

    /// Copy the 0-based inclusive page range into a standalone PDF.
    fn extract_pages(&self, start: u32, end: u32) -> Result<Vec<u8>, ExtractError>;
}

/// Decode a PDF text string (UTF-16BE or UTF-8 with BOM, else PDFDocEncoding)
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|chunk| {
                if chunk.len() == 2 {
                    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
                } else {
                    None
                }
            })
            .collect();
        String::from_utf16_lossy(&u16_chars)
    } else if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(&bytes[3..]).into_owned()
    } else {
        // Latin-1 (simplified)
        bytes.iter().map(|&b| b as char).collect()
    }
}
