//! PDF processing module.

mod extractor;

pub use extractor::{split_lines, PdfExtractor};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract the text of the entire PDF as ordered lines.
    ///
    /// Trailing empty lines are dropped.
    fn extract_lines(&self) -> Result<Vec<String>> {
        Ok(split_lines(&self.extract_text()?))
    }
}
