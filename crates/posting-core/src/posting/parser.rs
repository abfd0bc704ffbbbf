//! Certificate of posting recognizer.
//!
//! The extracted text of a postage PDF is a dump of several sections. Only the
//! certificate section carries recipients, laid out as three zones in a fixed
//! order:
//!
//! ```text
//! Certificate of Posting for Online Postage
//! ...
//! Name & Address
//! <name>
//! <address line>...
//! Service Used
//! <service>
//! ```
//!
//! The scan is a fold over the lines with an explicit [`RecognitionState`]
//! and an accumulator; a [`Record`] is built as soon as its service line is
//! read.

use tracing::{debug, trace};

use super::markers::{NAME_ADDRESS_MARKER, SECTION_MARKER, SERVICE_MARKER};
use super::{RecordParser, Result};
use crate::error::ParseError;
use crate::models::Record;

/// Position of the scan within one name/address/service block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecognitionState {
    /// Waiting for the "Name & Address" marker.
    #[default]
    Idle,
    /// The next line is the recipient name.
    AwaitingName,
    /// Collecting address lines until the "Service Used" marker.
    AwaitingAddress,
    /// The next line is the service label.
    AwaitingService,
}

/// What a single line contributes to the record being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect<'l> {
    /// Nothing to keep.
    Skip,
    /// The recipient name.
    Name(&'l str),
    /// One more address line.
    AddressLine(&'l str),
    /// The service label, completing the block.
    Service(&'l str),
}

impl RecognitionState {
    /// Transition on one line of an armed section.
    pub fn next(self, line: &str) -> (Self, Effect<'_>) {
        use RecognitionState::*;

        match self {
            Idle if line.contains(NAME_ADDRESS_MARKER) => (AwaitingName, Effect::Skip),
            Idle => (Idle, Effect::Skip),
            AwaitingName => (AwaitingAddress, Effect::Name(line)),
            // A real address containing the marker text ends the zone early.
            AwaitingAddress if line.contains(SERVICE_MARKER) => (AwaitingService, Effect::Skip),
            AwaitingAddress => (AwaitingAddress, Effect::AddressLine(line)),
            AwaitingService => (Idle, Effect::Service(line)),
        }
    }
}

/// Counts of each zone seen during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    names: usize,
    addresses: usize,
    services: usize,
}

/// Accumulator threaded through the scan.
#[derive(Debug, Default)]
struct Scan {
    state: RecognitionState,
    armed: bool,
    name: Option<String>,
    address: Vec<String>,
    tally: Tally,
    records: Vec<Record>,
}

impl Scan {
    fn step(mut self, line: &str) -> Self {
        if line.contains(SECTION_MARKER) {
            trace!("Section marker found, scan armed");
            self.armed = true;
            return self;
        }
        if !self.armed {
            return self;
        }

        let (next, effect) = self.state.next(line);
        self.state = next;

        match effect {
            Effect::Skip => {}
            Effect::Name(name) => {
                self.tally.names += 1;
                self.name = Some(name.to_string());
            }
            Effect::AddressLine(line) => self.address.push(line.to_string()),
            Effect::Service(service) => {
                self.tally.services += 1;
                self.armed = false;

                let address = std::mem::take(&mut self.address);
                if address.is_empty() {
                    debug!("Block without address lines before {:?}", service);
                    self.name = None;
                    return self;
                }
                self.tally.addresses += 1;

                if let Some(name) = self.name.take() {
                    let record = Record::from_lines(name, &address, service);
                    debug!("Content found {}", record);
                    self.records.push(record);
                }
            }
        }
        self
    }

    fn finish(self) -> Result<Vec<Record>> {
        // A name zone opened right before the end still counts as a name.
        let names = self.tally.names + usize::from(self.state == RecognitionState::AwaitingName);
        let Tally {
            addresses,
            services,
            ..
        } = self.tally;

        if names != addresses || names != services {
            return Err(ParseError::StructuralMismatch {
                names,
                addresses,
                services,
            });
        }
        Ok(self.records)
    }
}

/// Parser for "Certificate of Posting for Online Postage" sections.
#[derive(Debug, Clone, Default)]
pub struct CertificateParser;

impl CertificateParser {
    /// Create a new certificate parser.
    pub fn new() -> Self {
        Self
    }
}

impl RecordParser for CertificateParser {
    fn parse(&self, lines: &[String]) -> Result<Vec<Record>> {
        let records = lines
            .iter()
            .fold(Scan::default(), |scan, line| scan.step(line))
            .finish()?;

        debug!("Recognized {} records in {} lines", records.len(), lines.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn block(name: &str, address: &[&str], service: &str) -> Vec<String> {
        let mut out = lines(&[SECTION_MARKER, "Reference", NAME_ADDRESS_MARKER, name]);
        out.extend(lines(address));
        out.extend(lines(&[SERVICE_MARKER, service]));
        out
    }

    #[test]
    fn test_single_certificate() {
        let input = lines(&[
            "noise",
            "Certificate of Posting for Online Postage",
            "Name & Address",
            "Jane Doe",
            "12 High St",
            "Springfield",
            "Service Used",
            "Tracked 24",
        ]);

        let records = CertificateParser::new().parse(&input).unwrap();
        assert_eq!(
            records,
            vec![Record::new("Jane Doe", "12 High St, Springfield", "Tracked 24")]
        );
    }

    #[test]
    fn test_records_keep_encounter_order() {
        let mut input = lines(&["Page 1 of 3", "Postage label"]);
        input.extend(block("A Smith", &["1 Road"], "Tracked 48"));
        input.extend(lines(&["Page 2 of 3", "Name & Address", "ignored while disarmed"]));
        input.extend(block("B Jones", &["2 Lane", "Leeds", "LS1 1AA"], "Signed For 1st Class"));
        input.extend(block("C Brown", &["3 Close", "York"], "Tracked 24"));

        let records = CertificateParser::new().parse(&input).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A Smith", "B Jones", "C Brown"]);
        assert_eq!(records[1].address, "2 Lane, Leeds, LS1 1AA");
        assert_eq!(records[1].service, "Signed For 1st Class");
    }

    #[test]
    fn test_text_before_section_marker_is_inert() {
        let input = lines(&[
            "Name & Address",
            "Not A Recipient",
            "Service Used",
            "Nothing",
        ]);
        assert!(CertificateParser::new().parse(&input).unwrap().is_empty());
    }

    #[test]
    fn test_missing_service_is_mismatch() {
        let mut input = block("A Smith", &["1 Road"], "Tracked 48");
        input.extend(lines(&[SECTION_MARKER, NAME_ADDRESS_MARKER, "B Jones", "2 Lane"]));

        let err = CertificateParser::new().parse(&input).unwrap_err();
        assert_eq!(
            err,
            ParseError::StructuralMismatch {
                names: 2,
                addresses: 1,
                services: 1
            }
        );
    }

    #[test]
    fn test_name_marker_at_end_is_mismatch() {
        let mut input = block("A Smith", &["1 Road"], "Tracked 48");
        input.extend(lines(&[SECTION_MARKER, NAME_ADDRESS_MARKER]));

        let err = CertificateParser::new().parse(&input).unwrap_err();
        assert!(matches!(err, ParseError::StructuralMismatch { names: 2, .. }));
    }

    #[test]
    fn test_block_without_address_is_mismatch() {
        let input = lines(&[SECTION_MARKER, NAME_ADDRESS_MARKER, "A Smith", SERVICE_MARKER, "Tracked 48"]);

        let err = CertificateParser::new().parse(&input).unwrap_err();
        assert_eq!(
            err,
            ParseError::StructuralMismatch {
                names: 1,
                addresses: 0,
                services: 1
            }
        );
    }

    #[test]
    fn test_service_marker_inside_address_closes_zone() {
        let input = block("A Smith", &["1 Road", "Service Used Lane"], "Tracked 48");

        let records = CertificateParser::new().parse(&input).unwrap();
        // The marker line itself is then taken as the service.
        assert_eq!(records, vec![Record::new("A Smith", "1 Road", "Service Used")]);
    }

    #[test]
    fn test_transition_table() {
        use RecognitionState::*;

        assert_eq!(Idle.next("random"), (Idle, Effect::Skip));
        assert_eq!(Idle.next("Name & Address"), (AwaitingName, Effect::Skip));
        assert_eq!(AwaitingName.next("Jane"), (AwaitingAddress, Effect::Name("Jane")));
        assert_eq!(
            AwaitingAddress.next("12 High St"),
            (AwaitingAddress, Effect::AddressLine("12 High St"))
        );
        assert_eq!(AwaitingAddress.next("Service Used"), (AwaitingService, Effect::Skip));
        assert_eq!(AwaitingService.next("Tracked 24"), (Idle, Effect::Service("Tracked 24")));
    }

    #[test]
    fn test_parse_text_handles_crlf() {
        let text = "Certificate of Posting for Online Postage\r\nName & Address\r\nJane Doe\r\n12 High St\r\nService Used\r\nTracked 24\r\n\r\n";
        let records = CertificateParser::new().parse_text(text).unwrap();
        assert_eq!(records, vec![Record::new("Jane Doe", "12 High St", "Tracked 24")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(CertificateParser::new().parse(&[]).unwrap().is_empty());
    }
}
