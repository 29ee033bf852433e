pub mod classify;
pub mod date;
pub mod media;
pub mod scan;
pub mod template;
pub mod writer;

#[cfg(test)]
mod testutil;

use std::path::{Path, PathBuf};

use anyhow::bail;
use log::{info, log, warn, Level};
use serde::{Deserialize, Serialize};

pub use date::{resolve_date, DateSource, ResolvedDate};
pub use media::{FileKind, MediaFile};
pub use template::{build_path, validate_template, DEFAULT_FORMAT};
pub use writer::{place, Placement, PlacementOutcome};

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortOptions {
    /// Directory tree to read media from
    pub source: PathBuf,
    /// Directory the dated folders are created under
    pub target: PathBuf,
    /// strftime-style template for the destination folders
    #[serde(default = "default_format")]
    pub format: String,
    /// Log every processing step at info level
    #[serde(default)]
    pub debug: bool,
}

impl SortOptions {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            format: default_format(),
            debug: false,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Totals for a run. Side-cars count as files of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortResult {
    pub files_scanned: u64,
    pub copied: u64,
    pub skipped_existing: u64,
    pub skipped_no_metadata: u64,
    pub skipped_unclassified: u64,
    pub failed: u64,
    #[serde(default)]
    pub failures: Vec<String>,
}

impl SortResult {
    fn record(&mut self, placement: &Placement) {
        match &placement.outcome {
            PlacementOutcome::Copied => self.copied += 1,
            PlacementOutcome::SkippedExisting => self.skipped_existing += 1,
            PlacementOutcome::SkippedNoMetadata => self.skipped_no_metadata += 1,
            PlacementOutcome::SkippedUnclassified => self.skipped_unclassified += 1,
            PlacementOutcome::Failed(reason) => {
                self.failed += 1;
                self.failures
                    .push(format!("{}: {}", placement.source.display(), reason));
            }
        }
    }
}

/// One outcome, reported while the run is in progress.
#[derive(Debug, Clone)]
pub struct FileEvent {
    /// Position of the scanned file this outcome belongs to
    pub index: u64,
    /// Number of scanned files
    pub total: u64,
    pub placement: Placement,
}

/// Type alias for the outcome callback; it may borrow from the caller.
pub type OutcomeCallback<'a> = dyn Fn(&FileEvent) + Send + Sync + 'a;

/// Fatal checks, done before any file is touched.
pub fn validate_options(options: &SortOptions) -> anyhow::Result<()> {
    if !options.source.is_dir() {
        bail!("Source directory {} does not exist", options.source.display());
    }
    if !options.target.is_dir() {
        bail!("Target directory {} does not exist", options.target.display());
    }
    validate_template(&options.format)
}

/// Classify, date and place a single file, reporting every outcome to `emit`.
fn process_file(file: &MediaFile, options: &SortOptions, emit: &mut dyn FnMut(Placement)) {
    let step = if options.debug { Level::Info } else { Level::Debug };
    log!(step, "Processing {}", file.path.display());

    let kind = classify::classify(&file.path);
    if kind == FileKind::Unclassified {
        emit(Placement {
            source: file.path.clone(),
            destination: None,
            outcome: PlacementOutcome::SkippedUnclassified,
        });
        return;
    }

    log!(step, "Getting Metadata for {}", file.path.display());
    let resolved = resolve_date(file, kind);
    let Some(timestamp) = resolved.timestamp else {
        warn!("No Metadata found for {}", file.path.display());
        emit(Placement {
            source: file.path.clone(),
            destination: None,
            outcome: PlacementOutcome::SkippedNoMetadata,
        });
        return;
    };

    let dir = match build_path(&options.format, &timestamp, Some(&options.target)) {
        Ok(dir) => dir,
        Err(e) => {
            emit(Placement {
                source: file.path.clone(),
                destination: None,
                outcome: PlacementOutcome::Failed(format!("{:#}", e)),
            });
            return;
        }
    };

    place(file, resolved.sidecar.as_ref(), &dir, |placement| {
        if placement.outcome == PlacementOutcome::Copied {
            log!(step, "Copying {} to {}", placement.source.display(), dir.display());
        }
        emit(placement)
    });
}

/// Run the full scan -> classify -> resolve -> place loop with outcome reporting.
pub fn process(options: &SortOptions, callback: &OutcomeCallback<'_>) -> anyhow::Result<SortResult> {
    validate_options(options)?;

    let files = scan::scan_source(&options.source)?;
    let total = files.len() as u64;
    info!("Found {} files under {}", total, options.source.display());

    let mut result = SortResult {
        files_scanned: total,
        ..SortResult::default()
    };

    for (index, file) in files.iter().enumerate() {
        let mut emit = |placement: Placement| {
            if let PlacementOutcome::Failed(reason) = &placement.outcome {
                warn!("Error Processing {}: {}", placement.source.display(), reason);
            }
            result.record(&placement);
            callback(&FileEvent {
                index: index as u64,
                total,
                placement,
            });
        };
        process_file(file, options, &mut emit);
    }

    info!(
        "Copied {} files, {} already present, {} without metadata, {} not media, {} failed",
        result.copied,
        result.skipped_existing,
        result.skipped_no_metadata,
        result.skipped_unclassified,
        result.failed
    );
    Ok(result)
}

/// Sort `source` into `target` using `format`, without progress reporting.
pub fn run(source: &Path, target: &Path, format: &str, debug: bool) -> anyhow::Result<SortResult> {
    let options = SortOptions::new(source, target)
        .with_format(format)
        .with_debug(debug);
    process(&options, &|_| {})
}
