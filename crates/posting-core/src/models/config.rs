//! Configuration structures for the posting pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PostingError;
use crate::form::FORM_SLOTS;

/// Main configuration for the posting pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingConfig {
    /// Folder watcher configuration.
    pub watch: WatchConfig,

    /// External PDF viewer configuration.
    pub viewer: ViewerConfig,

    /// Output file configuration.
    pub output: OutputConfig,

    /// Form template configuration.
    pub form: FormConfig,

    /// Label parsing configuration.
    pub parser: ParserConfig,
}

/// Folder watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory monitored for new label PDFs.
    pub dir: PathBuf,

    /// Delay between directory scans, in milliseconds.
    pub poll_interval_ms: u64,

    /// Open every filled form in the viewer.
    pub open_outputs: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            poll_interval_ms: 1000,
            open_outputs: true,
        }
    }
}

/// External PDF viewer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Executable launched with the filled form path as its only argument.
    pub path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let path = if cfg!(target_os = "windows") {
            r"C:\Program Files\Google\Chrome\Application\chrome.exe"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Self {
            path: PathBuf::from(path),
        }
    }
}

/// Output file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives the filled forms.
    pub dir: PathBuf,

    /// File name prefix for filled forms.
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            file_prefix: "proof-of-posting".to_string(),
        }
    }
}

/// Form template configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Path to the blank proof of posting form.
    pub template: PathBuf,

    /// Maximum records placed on one form.
    pub capacity: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("Royal Mail Proof Of Postage.pdf"),
            capacity: FORM_SLOTS,
        }
    }
}

/// Label parsing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Which label layout to recognize.
    pub layout: LabelLayout,
}

/// Known label text layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelLayout {
    /// "Certificate of Posting for Online Postage" sections.
    #[default]
    Certificate,
    /// Older "Postage Paid GB" shipping labels.
    ShippingLabel,
}

impl PostingConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check values the form template cannot accommodate.
    pub fn validate(&self) -> Result<(), PostingError> {
        if !(1..=FORM_SLOTS).contains(&self.form.capacity) {
            return Err(PostingError::Config(format!(
                "form.capacity must be between 1 and {}, got {}",
                FORM_SLOTS, self.form.capacity
            )));
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(PostingError::Config(
                "watch.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.output.file_prefix.trim().is_empty() {
            return Err(PostingError::Config(
                "output.file_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
