//! fcp - Fit Copy
//!
//! Copy files and directories onto a volume that may not hold them all,
//! choosing what to keep when space runs short.

use clap::{Parser, ValueEnum};
use fitcopy::{
    Controller, ControllerBuilder, CopyItem, CopyStats, DEFAULT_CHUNK_SIZE, Outcome, Phase,
    ProgressBars, SessionEvent, Toggle,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// fcp - Copy what fits
///
/// Measures the sources first. When the destination volume cannot hold all
/// of them, lets you pick the subset to copy.
///
/// Usage:
///   fcp SOURCE DEST
///   fcp SOURCE... DIRECTORY
///   fcp -t DIRECTORY SOURCE...
#[derive(Parser, Debug)]
#[command(name = "fcp", version, about, long_about = None)]
struct Args {
    /// Source file(s) or directory(ies)
    ///
    /// When multiple sources are given, the destination must be a directory.
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Target directory (copy all sources into this directory)
    #[arg(short = 't', long = "target-directory", value_name = "DIRECTORY")]
    target_directory: Option<PathBuf>,

    /// Volume whose free space is measured
    ///
    /// Defaults to the nearest existing ancestor of the destination.
    #[arg(long, value_name = "PATH")]
    volume: Option<PathBuf>,

    /// Never assume more than BYTES free on the volume
    #[arg(long, value_name = "BYTES")]
    quota: Option<u64>,

    /// What to do when the sources do not fit
    #[arg(long, value_enum, default_value = "prompt")]
    select: SelectMode,

    /// Bytes read and written per step
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Disable progress bars
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Do not preserve file timestamps
    #[arg(long)]
    no_times: bool,

    /// Do not call fsync after each file (faster but less safe)
    #[arg(long)]
    no_sync: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum SelectMode {
    /// Ask on stdin which items to copy
    Prompt,
    /// Keep every item that still fits, in argument order
    Fit,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Source does not exist: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Target is not a directory: {path}")]
    TargetNotDirectory { path: PathBuf },

    #[error("Missing destination operand after '{operand}'")]
    MissingDestinationOperand { operand: PathBuf },

    #[error("Target '{path}' is not a directory (when copying multiple sources)")]
    MultiSourceTargetNotDirectory { path: PathBuf },

    #[error("Source has no filename: {path}")]
    SourceHasNoFilename { path: PathBuf },

    #[error("Failed to create directory: {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("Session ended without an outcome")]
    SessionLost,

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::SourceNotFound { .. }
            | Self::TargetNotDirectory { .. }
            | Self::MissingDestinationOperand { .. }
            | Self::MultiSourceTargetNotDirectory { .. }
            | Self::SourceHasNoFilename { .. } => 2,
            Self::CreateDirectory { .. } | Self::SessionLost | Self::JsonSerialize { .. } => 1,
        }
    }
}

fn exit_code_for(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Success | Outcome::NoFileSelected => 0,
        Outcome::CopyError => 1,
        Outcome::NoSpaceError => 3,
        Outcome::Cancelled => 130,
    }
}

fn main() {
    match run() {
        Ok(outcome) => std::process::exit(exit_code_for(outcome)),
        Err(error) => {
            eprintln!("error: {}", error);
            std::process::exit(error.exit_code());
        }
    }
}

fn run() -> CliResult<Outcome> {
    let args = Args::parse();

    let (sources, dest) = resolve_sources_and_dest(&args)?;
    for src in &sources {
        if !src.exists() {
            return Err(CliError::SourceNotFound { path: src.clone() });
        }
    }
    let items = build_items(&sources, &dest)?;
    let volume = args
        .volume
        .clone()
        .unwrap_or_else(|| nearest_existing_ancestor(&dest));

    let controller = build_controller(&args, &volume);
    install_ctrlc_handler(controller.clone());

    let events = controller.subscribe();
    let spinner = (args.output == OutputMode::Human && !args.quiet).then(|| {
        scanning_spinner(items.len())
    });

    controller.execute_copy(items.clone());
    let session = drive_session(&controller, &events, &args, spinner)?;

    match args.output {
        OutputMode::Human => report_human(&session, &items, &volume, args.verbose),
        OutputMode::Json => report_json(&session, &items, &volume)?,
    }
    Ok(session.outcome)
}

fn resolve_sources_and_dest(args: &Args) -> CliResult<(Vec<PathBuf>, PathBuf)> {
    if let Some(ref target_dir) = args.target_directory {
        if !target_dir.is_dir() && target_dir.exists() {
            return Err(CliError::TargetNotDirectory {
                path: target_dir.clone(),
            });
        }
        Ok((args.sources.clone(), target_dir.clone()))
    } else if args.sources.len() == 1 {
        Err(CliError::MissingDestinationOperand {
            operand: args.sources[0].clone(),
        })
    } else {
        let (sources_slice, dest_slice) = args.sources.split_at(args.sources.len() - 1);
        let dest = &dest_slice[0];

        if sources_slice.len() > 1 && !dest.is_dir() && dest.exists() {
            return Err(CliError::MultiSourceTargetNotDirectory { path: dest.clone() });
        }

        Ok((sources_slice.to_vec(), dest.clone()))
    }
}

/// Pair every source with its destination path.
///
/// Sources land inside `dest` when it is a directory, when there are several
/// of them, or with `-t`; a lone source is otherwise copied to `dest` itself.
fn build_items(sources: &[PathBuf], dest: &Path) -> CliResult<Vec<CopyItem>> {
    let into_dir = dest.is_dir() || sources.len() > 1;
    if into_dir && !dest.exists() {
        std::fs::create_dir_all(dest).map_err(|source| CliError::CreateDirectory {
            path: dest.to_path_buf(),
            source,
        })?;
    }

    sources
        .iter()
        .map(|src| {
            if into_dir {
                let filename = src
                    .file_name()
                    .ok_or_else(|| CliError::SourceHasNoFilename { path: src.clone() })?;
                Ok(CopyItem::new(src, dest.join(filename)))
            } else {
                Ok(CopyItem::new(src, dest))
            }
        })
        .collect()
}

fn nearest_existing_ancestor(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .ancestors()
        .find(|p| p.exists())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn build_controller(args: &Args, volume: &Path) -> Controller {
    let mut builder = ControllerBuilder::new(volume)
        .chunk_size(args.chunk_size)
        .on_warning(|msg| eprintln!("warning: {}", msg));
    if let Some(bytes) = args.quota {
        builder = builder.quota(bytes);
    }
    if args.no_sync {
        builder = builder.no_fsync();
    }
    if args.no_times {
        builder = builder.no_timestamps();
    }
    if args.verbose {
        builder = builder.verbose(|msg| eprintln!("{}", msg));
    }
    builder.build()
}

fn install_ctrlc_handler(controller: Controller) {
    let pressed = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler(move || {
        if pressed.swap(true, Ordering::Relaxed) {
            eprintln!("\nForce quit.");
            std::process::exit(130);
        }
        let phase = controller.phase();
        if controller.cancel() {
            if let Some(notice) = cancel_notice(phase) {
                eprintln!("\n{}", notice);
            }
        }
    })
    .ok();
}

/// What to tell the user after the first Ctrl+C in `phase`.
fn cancel_notice(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Scanning | Phase::Copying => Some(
            "Cancelling... stopping after the current chunk. Press Ctrl+C again to abort immediately.",
        ),
        // The prompt is still blocked reading stdin
        Phase::Selecting => {
            Some("Selection cancelled. Press Enter to finish, or Ctrl+C again to quit.")
        }
        _ => None,
    }
}

fn scanning_spinner(items: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    if items == 1 {
        pb.set_message("Measuring 1 item...");
    } else {
        pb.set_message(format!("Measuring {} items...", items));
    }
    pb
}

/// What a finished session left behind.
struct SessionSummary {
    outcome: Outcome,
    stats: Option<CopyStats>,
    /// Items handed to the copier, when a copy started
    copied_items: usize,
    /// Required and available bytes, when a selection was needed
    shortfall: Option<(u64, u64)>,
}

fn drive_session(
    controller: &Controller,
    events: &crossbeam_channel::Receiver<SessionEvent>,
    args: &Args,
    mut spinner: Option<ProgressBar>,
) -> CliResult<SessionSummary> {
    let show_bars = args.output == OutputMode::Human && !args.quiet;
    let mut bars: Option<ProgressBars> = None;
    let mut summary = SessionSummary {
        outcome: Outcome::CopyError,
        stats: None,
        copied_items: 0,
        shortfall: None,
    };

    for event in events {
        match event {
            SessionEvent::ScanStarted { .. } => {}
            SessionEvent::SelectionRequired {
                required_bytes,
                available_bytes,
                ..
            } => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                summary.shortfall = Some((required_bytes, available_bytes));
                match args.select {
                    SelectMode::Fit => select_fit(controller),
                    SelectMode::Prompt => {
                        let stdin = io::stdin();
                        select_prompt(controller, &mut stdin.lock(), required_bytes, available_bytes);
                    }
                }
            }
            SessionEvent::CopyStarted { items, .. } => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                summary.copied_items = items;
                if show_bars {
                    bars = Some(ProgressBars::new(items));
                }
            }
            SessionEvent::Progress(progress) => {
                if let Some(ref bars) = bars {
                    bars.update(&progress);
                }
            }
            SessionEvent::CopyFinished(stats) => summary.stats = Some(stats),
            SessionEvent::Finished(outcome) => {
                summary.outcome = outcome;
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                if let Some(ref bars) = bars {
                    bars.finish_and_clear();
                }
                return Ok(summary);
            }
        }
    }
    Err(CliError::SessionLost)
}

/// Keep every entry that still fits, in argument order.
fn select_fit(controller: &Controller) {
    if controller.select_fitting().is_ok() {
        let _ = controller.confirm_selection();
    }
}

/// Interactive selection on `input`.
///
/// Numbers toggle entries (1-based), `c` confirms, `q` or end of input
/// cancels. Returns once the selection is resolved, or once it was resolved
/// elsewhere (Ctrl+C).
fn select_prompt(
    controller: &Controller,
    input: &mut impl BufRead,
    required_bytes: u64,
    available_bytes: u64,
) {
    eprintln!(
        "Not enough space: {} needed, {} available.",
        format_bytes(required_bytes),
        format_bytes(available_bytes)
    );
    eprintln!("Toggle items by number, 'c' to copy the selection, 'q' to cancel.");

    let mut line = String::new();
    loop {
        let Ok(listing) = controller.inspect_selection(render_selection) else {
            return;
        };
        eprint!("{}> ", listing);
        let _ = io::stderr().flush();

        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                let _ = controller.cancel_selection();
                return;
            }
            Ok(_) => {}
        }

        match line.trim() {
            "c" => {
                let _ = controller.confirm_selection();
                return;
            }
            "q" => {
                let _ = controller.cancel_selection();
                return;
            }
            "" => {}
            other => match other.parse::<usize>() {
                Ok(number) if number >= 1 => match controller.toggle(number - 1) {
                    Ok(Toggle::Rejected) => {
                        eprintln!("Item {} does not fit in the remaining space.", number);
                    }
                    Ok(_) => {}
                    Err(fitcopy::Error::IndexOutOfRange { len, .. }) => {
                        eprintln!("No item {} (1-{}).", number, len);
                    }
                    Err(_) => return,
                },
                _ => eprintln!("Unknown command: {}", other),
            },
        }
    }
}

fn render_selection(selector: &fitcopy::Selector) -> String {
    let mut out = String::new();
    for (index, entry) in selector.entries().iter().enumerate() {
        let mark = if selector.is_selected(index) {
            "[x]"
        } else if selector.is_admissible(index) {
            "[ ]"
        } else {
            "[-]"
        };
        out.push_str(&format!(
            "  {} {}. {} ({})\n",
            mark,
            index + 1,
            entry.label,
            format_bytes(entry.size_bytes)
        ));
    }
    out.push_str(&format!(
        "  Selected {} of {}, {} remaining\n",
        format_bytes(selector.selected_bytes()),
        format_bytes(selector.available_bytes()),
        format_bytes(selector.remaining_bytes())
    ));
    out
}

fn report_human(session: &SessionSummary, items: &[CopyItem], volume: &Path, verbose: bool) {
    match session.outcome {
        Outcome::Success => match session.stats {
            Some(ref stats) => {
                if let Some((required, available)) = session.shortfall {
                    println!(
                        "Selected {} of {} items ({} needed, {} available)",
                        session.copied_items,
                        items.len(),
                        format_bytes(required),
                        format_bytes(available)
                    );
                }
                print_stats(stats, verbose);
            }
            None => println!("Nothing to copy"),
        },
        Outcome::NoFileSelected => println!("No files selected, nothing copied"),
        Outcome::NoSpaceError => {
            let name = items
                .first()
                .map(|item| item.source.display().to_string())
                .unwrap_or_default();
            eprintln!(
                "error: not enough space on {} for {}",
                volume.display(),
                name
            );
        }
        Outcome::Cancelled => eprintln!("Cancelled."),
        Outcome::CopyError => eprintln!("error: copy failed, destination may be incomplete"),
    }
}

fn report_json(session: &SessionSummary, items: &[CopyItem], volume: &Path) -> CliResult<()> {
    let stats = session.stats.clone().unwrap_or_default();
    let payload = json!({
        "schema_version": "1.0",
        "outcome": session.outcome.as_str(),
        "volume": display_path(volume),
        "items": items
            .iter()
            .map(|item| json!({
                "source": display_path(&item.source),
                "destination": display_path(&item.destination),
            }))
            .collect::<Vec<Value>>(),
        "items_copied": session.copied_items,
        "files_copied": stats.files_copied,
        "dirs_created": stats.dirs_created,
        "bytes_copied": stats.bytes_copied,
        "duration_ms": u64::try_from(stats.duration.as_millis()).unwrap_or(u64::MAX),
        "required_bytes": session.shortfall.map(|(required, _)| required),
        "available_bytes": session.shortfall.map(|(_, available)| available),
    });
    print_json_value(&payload)
}

fn print_stats(stats: &CopyStats, verbose: bool) {
    if stats.files_copied == 0 && stats.dirs_created == 0 {
        println!("Nothing to copy");
        return;
    }

    let bytes_str = format_bytes(stats.bytes_copied);

    if verbose {
        println!("Copy completed in {:?}", stats.duration);
        println!("  Files copied:   {}", stats.files_copied);
        println!("  Directories:    {}", stats.dirs_created);
        println!("  Total size:     {}", bytes_str);

        if stats.duration.as_secs_f64() > 0.0 {
            let speed = stats.bytes_copied as f64 / stats.duration.as_secs_f64();
            println!("  Speed:          {}/s", format_bytes(speed as u64));
        }
    } else {
        let mut parts = vec![];
        if stats.files_copied > 0 {
            parts.push(format!("{} files", stats.files_copied));
        }
        if stats.dirs_created > 0 {
            parts.push(format!("{} dirs", stats.dirs_created));
        }
        println!("Copied {} ({})", parts.join(", "), bytes_str);
    }
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
