//! Parser for the older "Postage Paid GB" shipping label layout.
//!
//! These labels have no zone markers; fields sit at fixed offsets from the
//! "Postage Paid GB" line:
//!
//! | offset | content                         |
//! |--------|---------------------------------|
//! | -2     | service name                    |
//! | +3     | tracking number (spaced/dashed) |
//! | +4     | recipient name                  |
//! | +5..+9 | address lines                   |

use tracing::debug;

use super::markers::POSTAGE_PAID_MARKER;
use super::{RecordParser, Result};
use crate::error::ParseError;
use crate::models::Record;

const SERVICE_OFFSET: usize = 2;
const TRACKING_OFFSET: usize = 3;
const NAME_OFFSET: usize = 4;
const ADDRESS_FIRST: usize = 5;
const ADDRESS_LAST: usize = 9;

/// Parser for fixed-offset shipping labels.
#[derive(Debug, Clone, Default)]
pub struct ShippingLabelParser;

impl ShippingLabelParser {
    /// Create a new shipping label parser.
    pub fn new() -> Self {
        Self
    }

    fn parse_label(lines: &[String], at: usize) -> Result<Record> {
        if at < SERVICE_OFFSET || at + ADDRESS_LAST >= lines.len() {
            return Err(ParseError::Truncated { line: at + 1 });
        }

        let tracking: String = lines[at + TRACKING_OFFSET]
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect();
        let service = format!("{} {}", lines[at - SERVICE_OFFSET], tracking);
        let address = lines[at + ADDRESS_FIRST..=at + ADDRESS_LAST].join(" ");

        Ok(Record::new(lines[at + NAME_OFFSET].clone(), address, service))
    }
}

impl RecordParser for ShippingLabelParser {
    fn parse(&self, lines: &[String]) -> Result<Vec<Record>> {
        let records = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(POSTAGE_PAID_MARKER))
            .map(|(at, _)| Self::parse_label(lines, at))
            .collect::<Result<Vec<_>>>()?;

        for record in &records {
            debug!("Content found {}", record);
        }
        Ok(records)
    }
}
