//! Recipient record recognition in extracted label text.

mod label;
pub mod markers;
mod parser;

pub use label::ShippingLabelParser;
pub use parser::{CertificateParser, Effect, RecognitionState};

use crate::error::ParseError;
use crate::models::{LabelLayout, Record};
use crate::pdf::split_lines;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Trait for label text parsers.
pub trait RecordParser {
    /// Recognize records in ordered text lines.
    fn parse(&self, lines: &[String]) -> Result<Vec<Record>>;

    /// Recognize records in raw extracted text.
    fn parse_text(&self, text: &str) -> Result<Vec<Record>> {
        self.parse(&split_lines(text))
    }
}

/// Parser for the given label layout.
pub fn parser_for(layout: LabelLayout) -> Box<dyn RecordParser> {
    match layout {
        LabelLayout::Certificate => Box::new(CertificateParser::new()),
        LabelLayout::ShippingLabel => Box::new(ShippingLabelParser::new()),
    }
}
