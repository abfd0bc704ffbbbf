//! Launching the external PDF viewer.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

/// Open `document` with the viewer executable; failures are only logged.
pub fn open(viewer: &Path, document: &Path) {
    info!(
        "Opening pdf with exec [{} {}]",
        viewer.display(),
        document.display()
    );

    if let Err(e) = spawn_viewer(viewer, document) {
        warn!("Failed to launch viewer {}: {}", viewer.display(), e);
    }
}

/// Start the viewer and reap it on a background thread once it exits.
pub fn spawn_viewer(viewer: &Path, document: &Path) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = Command::new(viewer).arg(document).spawn()?;
    let pid = child.id();
    debug!("Viewer started with pid {}", pid);

    Ok(thread::spawn(move || {
        let status = child.wait();
        debug!("Viewer {} exited: {:?}", pid, status);
        status
    }))
}
