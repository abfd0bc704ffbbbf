//! Marker phrases printed on postage labels.

/// Opens a certificate section; records are only read after this marker.
pub const SECTION_MARKER: &str = "Certificate of Posting for Online Postage";

/// Precedes the recipient name line.
pub const NAME_ADDRESS_MARKER: &str = "Name & Address";

/// Closes the address lines; the next line is the service.
pub const SERVICE_MARKER: &str = "Service Used";

/// Anchor of the older shipping label layout.
pub const POSTAGE_PAID_MARKER: &str = "Postage Paid GB";
