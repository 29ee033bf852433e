use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use filetime::FileTime;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::date::sidecar::Sidecar;
use crate::media::MediaFile;

/// What happened to one file (or side-car) during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    Copied,
    SkippedExisting,
    SkippedNoMetadata,
    SkippedUnclassified,
    Failed(String),
}

/// A single outcome together with the paths it concerns.
#[derive(Debug, Clone)]
pub struct Placement {
    pub source: PathBuf,
    /// Destination file path; `None` when the file never got one.
    pub destination: Option<PathBuf>,
    pub outcome: PlacementOutcome,
}

/// Copy `src` to `dest` keeping permissions and access/modification times.
fn copy_preserving_times(src: &Path, dest: &Path) -> anyhow::Result<()> {
    fs::copy(src, dest)
        .with_context(|| format!("copy {} -> {}", src.display(), dest.display()))?;
    let meta = fs::metadata(src).with_context(|| format!("stat {}", src.display()))?;
    let mtime = FileTime::from_last_modification_time(&meta);
    let atime = FileTime::from_last_access_time(&meta);
    filetime::set_file_times(dest, atime, mtime)
        .with_context(|| format!("set times on {}", dest.display()))?;
    Ok(())
}

/// Copy unless something already sits at the destination. Presence alone
/// counts; contents are never compared.
fn copy_if_absent(src: &Path, filename: &str, dir: &Path) -> Placement {
    let dest = dir.join(filename);
    let outcome = if dest.exists() {
        debug!("Skipping copying {} as exists", src.display());
        PlacementOutcome::SkippedExisting
    } else {
        match copy_preserving_times(src, &dest) {
            Ok(()) => {
                debug!("Copying {} to {}", src.display(), dir.display());
                PlacementOutcome::Copied
            }
            Err(e) => PlacementOutcome::Failed(format!("{:#}", e)),
        }
    };
    Placement {
        source: src.to_path_buf(),
        destination: Some(dest),
        outcome,
    }
}

/// Place a file, and its side-car if any, into `destination_dir`.
///
/// The directory is created first. The file and the side-car are then copied
/// as two independent idempotent steps; one outcome is reported per copy.
pub fn place(
    file: &MediaFile,
    sidecar: Option<&Sidecar>,
    destination_dir: &Path,
    mut sink: impl FnMut(Placement),
) {
    if let Err(e) = fs::create_dir_all(destination_dir) {
        let reason = format!("create {}: {}", destination_dir.display(), e);
        sink(Placement {
            source: file.path.clone(),
            destination: None,
            outcome: PlacementOutcome::Failed(reason.clone()),
        });
        if let Some(sc) = sidecar {
            sink(Placement {
                source: sc.path.clone(),
                destination: None,
                outcome: PlacementOutcome::Failed(reason),
            });
        }
        return;
    }

    sink(copy_if_absent(&file.path, &file.filename, destination_dir));
    if let Some(sc) = sidecar {
        sink(copy_if_absent(&sc.path, &sc.filename, destination_dir));
    }
}
