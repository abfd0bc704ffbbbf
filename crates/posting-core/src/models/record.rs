//! Recipient records recovered from label text.

use serde::{Deserialize, Serialize};

/// Separator placed between the lines of a multi-line address.
pub const ADDRESS_SEPARATOR: &str = ", ";

/// One posted item: who it went to, where, and by which service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Recipient name.
    pub name: String,

    /// Address lines joined with [`ADDRESS_SEPARATOR`].
    pub address: String,

    /// Service label (e.g. "Tracked 24").
    pub service: String,
}

impl Record {
    /// Create a record from its three parts.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            service: service.into(),
        }
    }

    /// Create a record from individual address lines.
    pub fn from_lines<S: AsRef<str>>(
        name: impl Into<String>,
        address_lines: &[S],
        service: impl Into<String>,
    ) -> Self {
        let address = address_lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join(ADDRESS_SEPARATOR);
        Self::new(name, address, service)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{},{}]", self.name, self.address, self.service)
    }
}

/// A slice of records destined for one copy of the form.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// 0-based chunk index within the run.
    pub index: usize,
    /// 1-based position of the first record in the overall sequence.
    pub offset: usize,
    /// The records placed on this form.
    pub records: &'a [Record],
}

impl<'a> Batch<'a> {
    /// Split records into consecutive batches of at most `capacity` records.
    ///
    /// Yields nothing for an empty slice. `capacity` must be non-zero.
    pub fn split(records: &'a [Record], capacity: usize) -> impl Iterator<Item = Batch<'a>> {
        records
            .chunks(capacity)
            .enumerate()
            .map(move |(index, records)| Batch {
                index,
                offset: index * capacity + 1,
                records,
            })
    }

    /// Number of records in this batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
