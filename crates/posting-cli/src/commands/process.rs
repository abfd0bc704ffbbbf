//! Process command - fill proof of posting forms from a single label PDF.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use posting_core::{Pipeline, PostingConfig};

use super::{check_pdf_input, load_config, LayoutArg};
use crate::viewer;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input label PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Directory for the filled forms
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Blank proof of posting form
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Records per form (1-30)
    #[arg(long)]
    capacity: Option<usize>,

    /// Label layout to recognize
    #[arg(short, long, value_enum)]
    layout: Option<LayoutArg>,

    /// Open every filled form in the configured viewer
    #[arg(long)]
    open: bool,
}

impl ProcessArgs {
    fn apply(&self, config: &mut PostingConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(template) = &self.template {
            config.form.template = template.clone();
        }
        if let Some(capacity) = self.capacity {
            config.form.capacity = capacity;
        }
        if let Some(layout) = self.layout {
            config.parser.layout = layout.into();
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.apply(&mut config);

    check_pdf_input(&args.input)?;
    let pipeline = Pipeline::from_config(&config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Processing {}...", args.input.display()));

    let result = pipeline.process_with(&args.input, |batch, path| {
        pb.println(format!(
            "{} Form {} ({} items) saved to {}",
            style("✓").green(),
            batch.index + 1,
            batch.len(),
            path.display()
        ));
        if args.open {
            viewer::open(&config.viewer.path, path);
        }
    });
    pb.finish_and_clear();
    let outcome = result?;

    if outcome.is_empty() {
        println!(
            "{} No records found in {}, nothing to fill",
            style("ℹ").blue(),
            args.input.display()
        );
        return Ok(());
    }

    println!(
        "{} {} records placed on {} forms",
        style("✓").green(),
        outcome.records.len(),
        outcome.outputs.len()
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
