//! Field names of the proof of posting form.
//!
//! The names come from the published template and must match it exactly,
//! including the irregular names of the first slot.

use chrono::NaiveDate;

use super::{FormTemplate, Result};
use crate::models::Record;

/// Summary field holding "<count> items".
pub const ITEM_COUNT_FIELD: &str = "Text57";

/// Summary field holding the posting date.
pub const DATE_FIELD: &str = "Text58";

/// Format of the posting date.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Field names of one recipient slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFields {
    pub name: String,
    pub address: String,
    pub service: String,
}

/// Field names for a 1-based slot number.
pub fn slot_fields(slot: usize) -> SlotFields {
    if slot == 1 {
        SlotFields {
            name: "1".to_string(),
            address: "my text here".to_string(),
            service: "service used 1".to_string(),
        }
    } else {
        SlotFields {
            name: slot.to_string(),
            address: format!("address and postcode {}", slot),
            service: format!("service used {}", slot),
        }
    }
}

/// Value of the item count field.
pub fn item_count(count: usize) -> String {
    format!("{} items", count)
}

/// Value of the date field.
pub fn posting_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Write a record into a 1-based slot.
pub fn fill_slot<T: FormTemplate>(template: &mut T, slot: usize, record: &Record) -> Result<()> {
    let fields = slot_fields(slot);
    template.set_field(&fields.name, &record.name)?;
    template.set_field(&fields.address, &record.address)?;
    template.set_field(&fields.service, &record.service)?;
    Ok(())
}

/// Write the item count and date summary fields.
pub fn fill_summary<T: FormTemplate>(template: &mut T, count: usize, date: NaiveDate) -> Result<()> {
    template.set_field(ITEM_COUNT_FIELD, &item_count(count))?;
    template.set_field(DATE_FIELD, &posting_date(date))?;
    Ok(())
}
