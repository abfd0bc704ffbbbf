//! Proof of posting form filling.

mod acroform;
mod batcher;
pub mod fields;

pub use acroform::{AcroFormSource, AcroFormTemplate};
pub use batcher::FormBatcher;

use std::path::Path;

use crate::error::TemplateError;

/// Number of recipient slots printed on the form.
pub const FORM_SLOTS: usize = 30;

/// Result type for form operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// A fillable form document.
///
/// Saving consumes the handle, so a filled instance never outlives its batch.
pub trait FormTemplate {
    /// Write a value into the named field.
    fn set_field(&mut self, name: &str, value: &str) -> Result<()>;

    /// Persist the filled form and release it.
    fn save(self, path: &Path) -> Result<()>
    where
        Self: Sized;
}

/// Produces a fresh, unfilled template for every batch.
pub trait TemplateSource {
    /// The template type produced.
    type Template: FormTemplate;

    /// Load a clean copy of the template.
    fn load(&self) -> Result<Self::Template>;
}

impl<F, T> TemplateSource for F
where
    F: Fn() -> Result<T>,
    T: FormTemplate,
{
    type Template = T;

    fn load(&self) -> Result<T> {
        self()
    }
}
