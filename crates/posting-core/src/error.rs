//! Error types for the posting-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the posting library.
#[derive(Error, Debug)]
pub enum PostingError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Label text could not be turned into records.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Form template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An error raised while processing a specific source document.
    #[error("{}: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: Box<PostingError>,
    },
}

impl PostingError {
    /// Attach the source document to an error.
    pub fn in_document(self, path: impl Into<PathBuf>) -> Self {
        match self {
            doc @ PostingError::Document { .. } => doc,
            other => PostingError::Document {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while recognizing records in label text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The name, address and service tallies disagree at the end of the scan.
    #[error(
        "structural mismatch: {names} names, {addresses} addresses, {services} services"
    )]
    StructuralMismatch {
        names: usize,
        addresses: usize,
        services: usize,
    },

    /// A label marker sits too close to the start or end of the text.
    #[error("label block at line {line} is truncated")]
    Truncated { line: usize },
}

/// Errors related to form templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Failed to load the template document.
    #[error("failed to load template {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// The template has no interactive form.
    #[error("template has no AcroForm")]
    NoForm,

    /// The template has no field with the given name.
    #[error("unknown field {0:?}")]
    UnknownField(String),

    /// Failed to write a value into a field.
    #[error("failed to write field {field:?}: {reason}")]
    Write { field: String, reason: String },

    /// Failed to persist the filled form.
    #[error("failed to save {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },

    /// A failure while filling one chunk of records.
    #[error("chunk {chunk} (records from {offset}): {source}")]
    Chunk {
        chunk: usize,
        offset: usize,
        #[source]
        source: Box<TemplateError>,
    },
}

/// Result type for the posting library.
pub type Result<T> = std::result::Result<T, PostingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_context_is_not_nested() {
        let err = PostingError::Parse(ParseError::StructuralMismatch {
            names: 2,
            addresses: 1,
            services: 1,
        })
        .in_document("labels.pdf")
        .in_document("other.pdf");

        let message = err.to_string();
        assert!(message.starts_with("labels.pdf: "));
        assert!(message.contains("2 names, 1 addresses, 1 services"));
    }

    #[test]
    fn test_chunk_error_names_chunk() {
        let err = TemplateError::Chunk {
            chunk: 1,
            offset: 31,
            source: Box::new(TemplateError::UnknownField("Text57".into())),
        };
        assert_eq!(
            err.to_string(),
            "chunk 1 (records from 31): unknown field \"Text57\""
        );
    }
}
