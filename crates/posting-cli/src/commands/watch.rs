//! Watch command - fill forms for every label PDF that lands in a folder.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, error, info, warn};

use posting_core::{Pipeline, PostingConfig};

use super::{is_pdf, load_config};
use crate::viewer;

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Directory to watch (default: the downloads folder)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Directory for the filled forms
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// PDF viewer executable
    #[arg(long)]
    viewer: Option<PathBuf>,

    /// Do not open filled forms
    #[arg(long)]
    no_open: bool,

    /// Delay between scans in milliseconds
    #[arg(long)]
    interval: Option<u64>,
}

impl WatchArgs {
    fn apply(&self, config: &mut PostingConfig) {
        if let Some(dir) = &self.dir {
            config.watch.dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(viewer) = &self.viewer {
            config.viewer.path = viewer.clone();
        }
        if let Some(interval) = self.interval {
            config.watch.poll_interval_ms = interval;
        }
        if self.no_open {
            config.watch.open_outputs = false;
        }
    }
}

pub async fn run(args: WatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.apply(&mut config);

    let pipeline = Pipeline::from_config(&config)?;
    let viewer = config
        .watch
        .open_outputs
        .then(|| config.viewer.path.clone());

    let mut watcher = DirWatcher::new(&config.watch.dir)
        .with_context(|| format!("Cannot watch {}", config.watch.dir.display()))?;

    println!(
        "{} Watching {} for label PDFs (Ctrl-C to stop)",
        style("ℹ").blue(),
        config.watch.dir.display()
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(config.watch.poll_interval_ms));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping watcher");
                break;
            }
            _ = ticker.tick() => {
                let ready = match watcher.poll() {
                    Ok(ready) => ready,
                    Err(e) => {
                        warn!("Cannot scan {}: {}", config.watch.dir.display(), e);
                        continue;
                    }
                };
                for document in ready {
                    handle_document(&pipeline, &mut watcher, &document, viewer.as_deref());
                }
            }
        }
    }

    println!("{} Watcher stopped", style("✓").green());
    Ok(())
}

fn handle_document(
    pipeline: &Pipeline,
    watcher: &mut DirWatcher,
    document: &Path,
    viewer: Option<&Path>,
) {
    println!("{} New label file {}", style("→").cyan(), document.display());

    let result = pipeline.process_with(document, |batch, path| {
        watcher.mark_known(path);
        println!(
            "{} Form {} ({} items) saved to {}",
            style("✓").green(),
            batch.index + 1,
            batch.len(),
            path.display()
        );
        if let Some(viewer) = viewer {
            viewer::open(viewer, path);
        }
    });

    match result {
        Ok(outcome) if outcome.is_empty() => {
            println!(
                "{} No records found in {}, nothing to fill",
                style("ℹ").blue(),
                document.display()
            );
        }
        Ok(outcome) => {
            info!(
                "{} records from {} placed on {} forms",
                outcome.records.len(),
                document.display(),
                outcome.outputs.len()
            );
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", style("✗").red(), e);
        }
    }
}

/// Polling view of a directory that reports PDFs once they stop growing.
pub struct DirWatcher {
    dir: PathBuf,
    known: HashSet<PathBuf>,
    pending: HashMap<PathBuf, u64>,
}

impl DirWatcher {
    /// Start watching `dir`; entries already present are never reported.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        let known = list_entries(&dir)?.into_iter().collect();
        Ok(Self {
            dir,
            known,
            pending: HashMap::new(),
        })
    }

    /// Scan once and return the PDFs that are ready to process.
    ///
    /// A new PDF is ready when its size is non-zero and matches the size
    /// seen on the previous scan.
    pub fn poll(&mut self) -> io::Result<Vec<PathBuf>> {
        let entries = list_entries(&self.dir)?;
        self.known.retain(|p| entries.contains(p));
        self.pending.retain(|p, _| entries.contains(p));

        let mut ready = Vec::new();
        for path in entries {
            if self.known.contains(&path) {
                continue;
            }
            if !path.is_file() || !is_pdf(&path) {
                info!("Ignoring {}", path.display());
                self.known.insert(path);
                continue;
            }

            // Vanished between listing and stat
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            let size = metadata.len();

            match self.pending.insert(path.clone(), size) {
                Some(previous) if previous == size && size > 0 => {
                    self.pending.remove(&path);
                    self.known.insert(path.clone());
                    ready.push(path);
                }
                _ => debug!("Waiting for {} to finish ({} bytes)", path.display(), size),
            }
        }

        Ok(ready)
    }

    /// Never report `path`, e.g. a form written into the watched folder.
    pub fn mark_known(&mut self, path: &Path) {
        self.pending.remove(path);
        self.known.insert(path.to_path_buf());
    }
}

fn list_entries(dir: &Path) -> io::Result<BTreeSet<PathBuf>> {
    let mut entries = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        entries.insert(entry?.path());
    }
    Ok(entries)
}
