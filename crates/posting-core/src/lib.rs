//! Core library for proof of posting form filling.
//!
//! This crate provides:
//! - PDF text extraction into ordered lines
//! - Recognition of recipient records in postage label text
//! - Distribution of records over copies of the 30-slot proof of posting form
//! - AcroForm field filling over lopdf

pub mod error;
pub mod form;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod posting;

pub use error::{ParseError, PdfError, PostingError, Result, TemplateError};
pub use form::{AcroFormSource, AcroFormTemplate, FormBatcher, FormTemplate, TemplateSource, FORM_SLOTS};
pub use models::{Batch, LabelLayout, PostingConfig, Record};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{Pipeline, ProcessOutcome};
pub use posting::{parser_for, CertificateParser, RecordParser, ShippingLabelParser};
