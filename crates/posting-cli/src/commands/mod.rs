//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod process;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use posting_core::{LabelLayout, PostingConfig};
use tracing::debug;

/// Load configuration from `--config`, the default config file, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PostingConfig> {
    let path = match config_path {
        Some(path) => PathBuf::from(path),
        None => {
            let default = config::default_config_path();
            if !default.exists() {
                debug!("No config file at {}, using defaults", default.display());
                return Ok(PostingConfig::default());
            }
            default
        }
    };

    debug!("Loading config from {}", path.display());
    PostingConfig::from_file(&path)
        .with_context(|| format!("Cannot read config {}", path.display()))
}

/// Fail early on inputs that are missing or not PDFs.
pub fn check_pdf_input(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    if !is_pdf(input) {
        let extension = input
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        anyhow::bail!("Unsupported file format: {}", extension);
    }
    Ok(())
}

/// Whether a path has a `.pdf` extension, in any case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Label layout selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LayoutArg {
    /// "Certificate of Posting for Online Postage" sections
    Certificate,
    /// Older "Postage Paid GB" shipping labels
    ShippingLabel,
}

impl From<LayoutArg> for LabelLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Certificate => LabelLayout::Certificate,
            LayoutArg::ShippingLabel => LabelLayout::ShippingLabel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("labels.pdf")));
        assert!(is_pdf(Path::new("LABELS.PDF")));
        assert!(!is_pdf(Path::new("labels.pdf.part")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        assert!(load_config(Some("/definitely/missing/config.json")).is_err());
    }
}
