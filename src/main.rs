use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mediasorter_core::{FileEvent, PlacementOutcome, SortOptions, SortResult, DEFAULT_FORMAT};

#[derive(Parser)]
#[command(
    name = "mediasorter",
    version,
    about = "Sort and copy images/videos into dated folders using their embedded metadata",
    arg_required_else_help = true
)]
struct Cli {
    /// Source directory of images/videos [default: current directory]
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Target directory of images/videos
    #[arg(short, long)]
    target: PathBuf,

    /// Directory format for how images/videos are saved to target
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    format: String,

    /// Log every processing step
    #[arg(short, long)]
    debug: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn describe(event: &FileEvent) -> String {
    let p = &event.placement;
    let source = p.source.display();
    match &p.outcome {
        PlacementOutcome::Copied => match p.destination.as_deref().and_then(|d| d.parent()) {
            Some(dir) => format!("Copying {} to {}", source, dir.display()),
            None => format!("Copying {}", source),
        },
        PlacementOutcome::SkippedExisting => format!("Skipping copying {} as exists", source),
        PlacementOutcome::SkippedNoMetadata => format!("No Metadata found for {}", source),
        PlacementOutcome::SkippedUnclassified => format!("Skipping {} (not an image or video)", source),
        PlacementOutcome::Failed(_) => format!("Error Processing {}", source),
    }
}

/// Run the sort, advancing `pb` once per scanned file.
fn sort_with_progress(options: &SortOptions, pb: &ProgressBar) -> anyhow::Result<SortResult> {
    let result = mediasorter_core::process(options, &|event| {
        pb.set_length(event.total);
        pb.set_position(event.index + 1);
        pb.set_message(describe(event));
    });
    pb.finish_and_clear();
    result
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.debug { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    let t_total = std::time::Instant::now();

    let source = match cli.source {
        Some(source) => source,
        None => std::env::current_dir()?,
    };
    let options = SortOptions::new(source, cli.target)
        .with_format(cli.format)
        .with_debug(cli.debug);

    eprintln!(
        "Sorting and Copy files from {} to {} using format {}",
        options.source.display(),
        options.target.display(),
        options.format
    );
    if cli.debug {
        eprintln!("Debug is {}", cli.debug);
    }

    let pb = ProgressBar::new(0);
    pb.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {wide_msg}")?);

    let result = sort_with_progress(&options, &pb)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for failure in &result.failures {
            eprintln!("  failed: {}", failure);
        }
        eprintln!(
            "Done! {} files scanned, {} copied, {} already present, {} without metadata, {} not media, {} failed ({:.2}s)",
            result.files_scanned,
            result.copied,
            result.skipped_existing,
            result.skipped_no_metadata,
            result.skipped_unclassified,
            result.failed,
            t_total.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
