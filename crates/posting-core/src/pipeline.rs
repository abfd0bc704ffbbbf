//! End-to-end processing of one label PDF.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PostingError, Result};
use crate::form::{AcroFormSource, FormBatcher};
use crate::models::{Batch, PostingConfig, Record};
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::posting::{parser_for, RecordParser};

/// What processing one document produced.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// The source document.
    pub document: PathBuf,
    /// Records recognized in the document.
    pub records: Vec<Record>,
    /// Filled forms, in record order.
    pub outputs: Vec<PathBuf>,
}

impl ProcessOutcome {
    /// Whether the document held no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Extraction, parsing and form filling wired from configuration.
pub struct Pipeline {
    parser: Box<dyn RecordParser>,
    template: AcroFormSource,
    output_dir: PathBuf,
    file_prefix: String,
    capacity: usize,
}

impl Pipeline {
    /// Build a pipeline from validated configuration.
    pub fn from_config(config: &PostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: parser_for(config.parser.layout),
            template: AcroFormSource::new(&config.form.template),
            output_dir: config.output.dir.clone(),
            file_prefix: config.output.file_prefix.clone(),
            capacity: config.form.capacity,
        })
    }

    /// Extract and recognize the records of a document without filling forms.
    pub fn read_records(&self, path: &Path) -> Result<Vec<Record>> {
        self.try_read_records(path).map_err(|e| e.in_document(path))
    }

    /// Process a document into filled forms.
    pub fn process(&self, path: &Path) -> Result<ProcessOutcome> {
        self.process_with(path, |_, _| {})
    }

    /// Process a document, calling `on_saved` after each form is written.
    pub fn process_with<F>(&self, path: &Path, on_saved: F) -> Result<ProcessOutcome>
    where
        F: FnMut(&Batch<'_>, &Path),
    {
        info!("Processing {}", path.display());
        let records = self.read_records(path)?;

        if records.is_empty() {
            info!("No records found in {}, nothing to fill", path.display());
            return Ok(ProcessOutcome {
                document: path.to_path_buf(),
                records,
                outputs: Vec::new(),
            });
        }

        let batcher = FormBatcher::new(&self.output_dir)
            .with_capacity(self.capacity)
            .with_file_prefix(self.file_prefix.as_str());
        let outputs = batcher
            .fill_batches_with(&records, &self.template, on_saved)
            .map_err(|e| PostingError::from(e).in_document(path))?;

        Ok(ProcessOutcome {
            document: path.to_path_buf(),
            records,
            outputs,
        })
    }

    fn try_read_records(&self, path: &Path) -> Result<Vec<Record>> {
        let extractor = PdfExtractor::open(path)?;
        let lines = extractor.extract_lines()?;
        debug!(
            "Extracted {} lines from {} pages",
            lines.len(),
            extractor.page_count()
        );
        Ok(self.parser.parse(&lines)?)
    }
}
