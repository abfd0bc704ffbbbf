//! Extract command - print the records recognized in a label PDF.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use posting_core::{Pipeline, Record};

use super::{check_pdf_input, load_config, LayoutArg};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input label PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Label layout to recognize
    #[arg(short, long, value_enum)]
    layout: Option<LayoutArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(layout) = args.layout {
        config.parser.layout = layout.into();
    }

    check_pdf_input(&args.input)?;
    let pipeline = Pipeline::from_config(&config)?;

    let records = pipeline.read_records(&args.input)?;
    info!("Found {} records in {}", records.len(), args.input.display());

    let output = format_records(&records, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

pub fn format_records(records: &[Record], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

fn format_csv(records: &[Record]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Header comes from the Record field names
    for record in records {
        wtr.serialize(record)?;
    }
    if records.is_empty() {
        wtr.write_record(["name", "address", "service"])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[Record]) -> String {
    let mut output = String::new();

    for (i, record) in records.iter().enumerate() {
        output.push_str(&format!("{:>3}. {}\n", i + 1, record.name));
        output.push_str(&format!("     {}\n", record.address));
        output.push_str(&format!("     {}\n", record.service));
    }
    output.push_str(&format!("{} items\n", records.len()));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("Jane Doe", "12 High St, Springfield", "Tracked 24"),
            Record::new("John Roe", "3 Low Rd", "Signed For 1st Class"),
        ]
    }

    #[test]
    fn test_csv_has_header_and_quotes() {
        let csv = format_records(&sample(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,address,service");
        assert_eq!(lines[1], "Jane Doe,\"12 High St, Springfield\",Tracked 24");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_empty_has_header() {
        let csv = format_records(&[], OutputFormat::Csv).unwrap();
        assert_eq!(csv.trim_end(), "name,address,service");
    }

    #[test]
    fn test_json_lists_records() {
        let json = format_records(&sample(), OutputFormat::Json).unwrap();
        let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_text_summary() {
        let text = format_records(&sample(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("  1. Jane Doe\n"));
        assert!(text.ends_with("2 items\n"));
    }
}
