//! Distribution of records over copies of the fixed-capacity form.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use super::fields::{fill_slot, fill_summary};
use super::{FormTemplate, Result, TemplateSource, FORM_SLOTS};
use crate::error::TemplateError;
use crate::models::{Batch, Record};

/// Fills one form per batch of records and saves each under a unique name.
#[derive(Debug, Clone)]
pub struct FormBatcher {
    /// Maximum records per form.
    capacity: usize,
    /// Directory receiving the filled forms.
    output_dir: PathBuf,
    /// Leading part of every output file name.
    file_prefix: String,
    /// Distinguishes the outputs of separate runs.
    run_id: String,
    /// Date written into the summary field.
    date: NaiveDate,
}

impl FormBatcher {
    /// Create a batcher writing into `output_dir`, dated now with a fresh run id.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let now = Local::now();
        Self {
            capacity: FORM_SLOTS,
            output_dir: output_dir.into(),
            file_prefix: "proof-of-posting".to_string(),
            run_id: run_id(now),
            date: now.date_naive(),
        }
    }

    /// Set the number of records per form, clamped to the form's slot count.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.clamp(1, FORM_SLOTS);
        self
    }

    /// Set the output file name prefix.
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set the run identifier used in output file names.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Set the date written on every form.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Records per form.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Output path of a batch: `<prefix>-<run id>-<offset>.pdf`.
    pub fn output_path(&self, batch: &Batch<'_>) -> PathBuf {
        self.output_dir.join(format!(
            "{}-{}-{:03}.pdf",
            self.file_prefix, self.run_id, batch.offset
        ))
    }

    /// Fill and save one form per batch, returning the saved paths in order.
    pub fn fill_batches<S: TemplateSource>(
        &self,
        records: &[Record],
        source: &S,
    ) -> Result<Vec<PathBuf>> {
        self.fill_batches_with(records, source, |_, _| {})
    }

    /// Like [`fill_batches`](Self::fill_batches), calling `on_saved` after each form is written.
    ///
    /// The first failing batch aborts the run; forms saved before it stay on disk.
    pub fn fill_batches_with<S, F>(
        &self,
        records: &[Record],
        source: &S,
        mut on_saved: F,
    ) -> Result<Vec<PathBuf>>
    where
        S: TemplateSource,
        F: FnMut(&Batch<'_>, &Path),
    {
        if records.is_empty() {
            debug!("No records, nothing to fill");
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|e| TemplateError::Save {
            path: self.output_dir.clone(),
            reason: e.to_string(),
        })?;

        let mut saved = Vec::with_capacity(records.len().div_ceil(self.capacity));
        for batch in Batch::split(records, self.capacity) {
            let path = self
                .fill_batch(&batch, source)
                .map_err(|e| TemplateError::Chunk {
                    chunk: batch.index,
                    offset: batch.offset,
                    source: Box::new(e),
                })?;
            on_saved(&batch, &path);
            saved.push(path);
        }

        info!("Filled {} forms with {} records", saved.len(), records.len());
        Ok(saved)
    }

    fn fill_batch<S: TemplateSource>(&self, batch: &Batch<'_>, source: &S) -> Result<PathBuf> {
        let mut template = source.load()?;

        for (j, record) in batch.records.iter().enumerate() {
            fill_slot(&mut template, j + 1, record)?;
            debug!("Content added {}", record);
        }
        fill_summary(&mut template, batch.len(), self.date)?;

        let path = self.output_path(batch);
        template.save(&path)?;
        info!(
            "Saved form {} ({} items) to {}",
            batch.index + 1,
            batch.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Timestamp plus a random suffix, so runs started together never share names.
fn run_id(now: DateTime<Local>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.format("%Y%m%d-%H%M%S%3f"), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields::{slot_fields, DATE_FIELD, ITEM_COUNT_FIELD};
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    /// A saved form: its path and every field written.
    type SavedForm = (PathBuf, BTreeMap<String, String>);

    /// Template that records its writes into a shared log on save.
    struct RecordingTemplate<'a> {
        fields: BTreeMap<String, String>,
        saved: &'a RefCell<Vec<SavedForm>>,
    }

    impl FormTemplate for RecordingTemplate<'_> {
        fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
            self.fields.insert(name.to_string(), value.to_string());
            Ok(())
        }

        fn save(self, path: &Path) -> Result<()> {
            self.saved.borrow_mut().push((path.to_path_buf(), self.fields));
            Ok(())
        }
    }

    fn records(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new(format!("Name {i}"), format!("{i} High St, Town"), "Tracked 24"))
            .collect()
    }

    fn batcher(dir: &Path) -> FormBatcher {
        FormBatcher::new(dir)
            .with_run_id("run")
            .with_date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
    }

    #[test]
    fn test_forty_five_records_make_two_forms() {
        let dir = tempfile::tempdir().unwrap();
        let saved = RefCell::new(Vec::new());
        let source = || {
            Ok::<_, TemplateError>(RecordingTemplate {
                fields: BTreeMap::new(),
                saved: &saved,
            })
        };

        let paths = batcher(dir.path()).fill_batches(&records(45), &source).unwrap();
        assert_eq!(
            paths,
            vec![
                dir.path().join("proof-of-posting-run-001.pdf"),
                dir.path().join("proof-of-posting-run-031.pdf"),
            ]
        );

        let saved = saved.into_inner();
        assert_eq!(saved.len(), 2);

        let (_, first) = &saved[0];
        assert_eq!(first[ITEM_COUNT_FIELD], "30 items");
        assert_eq!(first[DATE_FIELD], "05/01/2024");
        assert_eq!(first["1"], "Name 1");
        assert_eq!(first["my text here"], "1 High St, Town");
        assert_eq!(first["30"], "Name 30");
        assert_eq!(first.len(), 30 * 3 + 2);

        let (_, second) = &saved[1];
        assert_eq!(second[ITEM_COUNT_FIELD], "15 items");
        // Slots restart at 1 on every form.
        assert_eq!(second["1"], "Name 31");
        assert_eq!(second["service used 1"], "Tracked 24");
        assert_eq!(second["15"], "Name 45");
        assert_eq!(second["address and postcode 15"], "45 High St, Town");
        assert!(!second.contains_key("16"));
        assert_eq!(second.len(), 15 * 3 + 2);
    }

    #[test]
    fn test_chunk_counts() {
        let dir = tempfile::tempdir().unwrap();
        for (n, forms) in [(1, 1), (29, 1), (30, 1), (31, 2), (60, 2), (61, 3)] {
            let saved = RefCell::new(Vec::new());
            let source = || {
                Ok::<_, TemplateError>(RecordingTemplate {
                    fields: BTreeMap::new(),
                    saved: &saved,
                })
            };
            let paths = batcher(dir.path()).fill_batches(&records(n), &source).unwrap();
            assert_eq!(paths.len(), forms, "n = {n}");

            let counts: Vec<String> = saved
                .into_inner()
                .into_iter()
                .map(|(_, f)| f[ITEM_COUNT_FIELD].clone())
                .collect();
            let last = if n % 30 == 0 { 30 } else { n % 30 };
            assert_eq!(counts.last().unwrap(), &format!("{last} items"));
        }
    }

    #[test]
    fn test_no_records_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never-created");
        let loads = Cell::new(0);
        let saved = RefCell::new(Vec::new());
        let source = || {
            loads.set(loads.get() + 1);
            Ok::<_, TemplateError>(RecordingTemplate {
                fields: BTreeMap::new(),
                saved: &saved,
            })
        };

        let paths = batcher(&out).fill_batches(&[], &source).unwrap();
        assert!(paths.is_empty());
        assert_eq!(loads.get(), 0);
        assert!(saved.into_inner().is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn test_each_form_starts_clean() {
        let dir = tempfile::tempdir().unwrap();
        let saved = RefCell::new(Vec::new());
        let source = || {
            Ok::<_, TemplateError>(RecordingTemplate {
                fields: BTreeMap::new(),
                saved: &saved,
            })
        };

        batcher(dir.path()).with_capacity(2).fill_batches(&records(3), &source).unwrap();

        let saved = saved.into_inner();
        assert_eq!(saved[1].1.get(&slot_fields(2).name), None);
        assert_eq!(saved[1].1[&slot_fields(1).name], "Name 3");
    }

    #[test]
    fn test_failure_aborts_remaining_batches() {
        let dir = tempfile::tempdir().unwrap();
        let loads = Cell::new(0);
        let saved = RefCell::new(Vec::new());
        let source = || {
            loads.set(loads.get() + 1);
            if loads.get() == 2 {
                return Err(TemplateError::NoForm);
            }
            Ok::<_, TemplateError>(RecordingTemplate {
                fields: BTreeMap::new(),
                saved: &saved,
            })
        };

        let mut seen = Vec::new();
        let err = batcher(dir.path())
            .fill_batches_with(&records(95), &source, |batch, _| seen.push(batch.index))
            .unwrap_err();

        assert!(matches!(
            err,
            TemplateError::Chunk {
                chunk: 1,
                offset: 31,
                ..
            }
        ));
        assert_eq!(loads.get(), 2);
        assert_eq!(seen, vec![0]);
        assert_eq!(saved.into_inner().len(), 1);
    }

    #[test]
    fn test_default_batchers_never_share_output_names() {
        let dir = tempfile::tempdir().unwrap();
        let all = records(1);
        let batch = Batch::split(&all, FORM_SLOTS).next().unwrap();

        let first = FormBatcher::new(dir.path());
        let second = FormBatcher::new(dir.path());
        assert_ne!(first.output_path(&batch), second.output_path(&batch));
    }

    #[test]
    fn test_default_outputs_of_back_to_back_runs_differ() {
        let dir = tempfile::tempdir().unwrap();
        let saved = RefCell::new(Vec::new());
        let source = || {
            Ok::<_, TemplateError>(RecordingTemplate {
                fields: BTreeMap::new(),
                saved: &saved,
            })
        };

        let a = FormBatcher::new(dir.path()).fill_batches(&records(1), &source).unwrap();
        let b = FormBatcher::new(dir.path()).fill_batches(&records(1), &source).unwrap();
        assert_ne!(a, b);
        assert!(a[0].to_string_lossy().ends_with("-001.pdf"));
    }

    #[test]
    fn test_capacity_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(batcher(dir.path()).with_capacity(0).capacity(), 1);
        assert_eq!(batcher(dir.path()).with_capacity(99).capacity(), FORM_SLOTS);
    }
}
