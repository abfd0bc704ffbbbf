//! Data models.

pub mod config;
pub mod record;

pub use config::{LabelLayout, PostingConfig};
pub use record::{Batch, Record, ADDRESS_SEPARATOR};
