//! Command-line front end.
//!
//! This module plays the directory-selection and display roles around the
//! library: it parses arguments, loads configuration, runs one operation,
//! writes the report and renders the outcome.

use crate::config::OrganizerConfig;
use crate::file_organizer::{FileOrganizer, OperationOutcome, OrganizeError, OrganizeResult, Progress};
use crate::output::OutputFormatter;
use crate::report::ReportGenerator;
use crate::storage::{StorageStatsProvider, SystemStorage};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Command-line arguments.
///
/// Both `foldersort folders /data` and `foldersort /data folders` select the
/// same run; a bare `foldersort /data` organizes files.
#[derive(Debug, Parser)]
#[command(
    name = "foldersort",
    version,
    about = "Sort files into category folders and gather stray folders into one place"
)]
pub struct Args {
    /// Directory to organize
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Show what would happen without moving anything
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Don't write a report file
    #[arg(long, global = true)]
    pub no_report: bool,

    /// Print the outcome as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Sniff file content when the extension is unknown
    #[arg(long, global = true)]
    pub detect_content: bool,

    /// Print debug diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands, each optionally naming the directory to work on.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Move files into category folders by extension
    Files(TargetArgs),
    /// Move non-category folders into the misc folder
    Folders(TargetArgs),
}

/// Directory argument accepted after a subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args)]
pub struct TargetArgs {
    /// Directory to organize
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub directory: Option<PathBuf>,
}

/// What to do with the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrganizeCommand {
    /// Move files into category folders by extension.
    #[default]
    Files,
    /// Move non-category folders into the misc folder.
    Folders,
}

impl Args {
    /// The operation to run; file organization when no subcommand is given.
    pub fn organize_command(&self) -> OrganizeCommand {
        match self.command {
            None | Some(Command::Files(_)) => OrganizeCommand::Files,
            Some(Command::Folders(_)) => OrganizeCommand::Folders,
        }
    }

    /// The selected directory.
    ///
    /// A directory given after the subcommand wins over one given before it.
    pub fn target_directory(&self) -> Option<&Path> {
        let after = match &self.command {
            Some(Command::Files(target) | Command::Folders(target)) => {
                target.directory.as_deref()
            }
            None => None,
        };
        after.or(self.directory.as_deref())
    }
}

/// Switches that shape a run.
///
/// # Example
///
/// ```
/// use foldersort::RunOptions;
///
/// let options = RunOptions {
///     write_report: true,
///     ..Default::default()
/// };
/// assert!(!options.dry_run);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub write_report: bool,
    pub detect_content: bool,
    pub config_path: Option<PathBuf>,
}

impl From<&Args> for RunOptions {
    fn from(args: &Args) -> Self {
        Self {
            dry_run: args.dry_run,
            write_report: !args.no_report,
            detect_content: args.detect_content,
            config_path: args.config.clone(),
        }
    }
}

/// Whether a report was written for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ReportStatus {
    Written(PathBuf),
    /// Dry runs and `--no-report` produce no report.
    NotRequested,
    /// Moves happened but the report could not be saved.
    Failed(String),
}

/// Everything the display layer needs about one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub directory: PathBuf,
    #[serde(flatten)]
    pub outcome: OperationOutcome,
    pub report: ReportStatus,
}

impl RunOutcome {
    /// Returns true if nothing failed, including the report.
    pub fn is_complete_success(&self) -> bool {
        self.outcome.failures().is_empty() && !matches!(self.report, ReportStatus::Failed(_))
    }
}

/// Runs one operation with the system storage statistics.
///
/// # Arguments
///
/// * `command` - Which operation to run
/// * `directory` - The directory to organize; `None` means none was selected
/// * `options` - Dry run, report and configuration switches
///
/// # Examples
///
/// ```no_run
/// use foldersort::{OrganizeCommand, RunOptions, run};
/// use std::path::Path;
///
/// let options = RunOptions {
///     write_report: true,
///     ..Default::default()
/// };
/// match run(OrganizeCommand::Files, Some(Path::new("/home/me/Downloads")), &options) {
///     Ok(outcome) => println!("report: {:?}", outcome.report),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run(
    command: OrganizeCommand,
    directory: Option<&Path>,
    options: &RunOptions,
) -> OrganizeResult<RunOutcome> {
    run_with_storage(command, directory, options, SystemStorage, |_| {})
}

/// Runs one operation, asking `storage` for report figures and passing
/// progress to `on_progress`.
///
/// # Arguments
///
/// * `command` - Which operation to run
/// * `directory` - The directory to organize
/// * `options` - Dry run, report and configuration switches
/// * `storage` - Source of the drive figures in the report
/// * `on_progress` - Called once after listing and once per entry
///
/// # Errors
///
/// Fails with [`OrganizeError::NoDirectorySelected`] when no directory is
/// given, and with the organizer's fatal errors. A report that cannot be
/// written does not fail the run; it shows up as [`ReportStatus::Failed`].
pub fn run_with_storage<S: StorageStatsProvider>(
    command: OrganizeCommand,
    directory: Option<&Path>,
    options: &RunOptions,
    storage: S,
    on_progress: impl FnMut(Progress<'_>),
) -> OrganizeResult<RunOutcome> {
    let directory = directory
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or(OrganizeError::NoDirectorySelected)?;

    let config = OrganizerConfig::load(options.config_path.as_deref())?;
    let organizer = FileOrganizer::from_config(&config)?
        .with_dry_run(options.dry_run)
        .with_content_detection(options.detect_content || config.organizer.detect_content);

    let outcome = match command {
        OrganizeCommand::Files => OperationOutcome::FileOrganization(
            organizer.organize_files_with_progress(directory, on_progress)?,
        ),
        OrganizeCommand::Folders => OperationOutcome::FolderConsolidation(
            organizer.consolidate_folders_with_progress(directory, on_progress)?,
        ),
    };

    let report = if options.dry_run || !options.write_report {
        ReportStatus::NotRequested
    } else {
        match ReportGenerator::new(storage).generate(directory, &outcome) {
            Ok(path) => ReportStatus::Written(path),
            Err(e) => {
                tracing::warn!("{}", e);
                ReportStatus::Failed(e.to_string())
            }
        }
    };

    Ok(RunOutcome {
        directory: directory.to_path_buf(),
        outcome,
        report,
    })
}

/// Entry point used by the binary.
///
/// Prints the outcome (or JSON with `--json`) and returns false if anything
/// failed, including the report.
///
/// # Example
///
/// ```no_run
/// use clap::Parser;
/// use foldersort::cli::{Args, run_cli};
///
/// let args = Args::parse_from(["foldersort", "folders", "/home/me/Desktop"]);
/// std::process::exit(if run_cli(&args) { 0 } else { 1 });
/// ```
pub fn run_cli(args: &Args) -> bool {
    let command = args.organize_command();
    let directory = args.target_directory();
    let options = RunOptions::from(args);

    if !args.json
        && let Some(dir) = directory
    {
        let verb = match command {
            OrganizeCommand::Files => "Organizing files in",
            OrganizeCommand::Folders => "Gathering folders in",
        };
        OutputFormatter::info(&format!("{} {}", verb, dir.display()));
    }

    let progress = (!args.json).then(OutputFormatter::create_progress_bar);
    let result = run_with_storage(
        command,
        directory,
        &options,
        SystemStorage,
        |event| {
            if let Some(pb) = &progress {
                match event {
                    Progress::Scanned { total } => pb.set_length(total as u64),
                    Progress::Processed { name } => {
                        pb.set_message(name.to_string());
                        pb.inc(1);
                    }
                }
            }
        },
    );
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    match result {
        Ok(run) => {
            if args.json {
                match serde_json::to_string_pretty(&run) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        OutputFormatter::error(&format!("Could not serialize outcome: {}", e));
                        return false;
                    }
                }
            } else {
                display(&run);
            }
            run.is_complete_success()
        }
        Err(e) => {
            if args.json {
                let error = serde_json::json!({ "error": e.to_string() });
                println!("{}", error);
            } else {
                OutputFormatter::error(&e.to_string());
            }
            false
        }
    }
}

fn display(run: &RunOutcome) {
    match &run.outcome {
        OperationOutcome::FileOrganization(result) => OutputFormatter::organization_result(result),
        OperationOutcome::FolderConsolidation(result) => {
            OutputFormatter::consolidation_result(result)
        }
    }

    match &run.report {
        ReportStatus::Written(path) => {
            OutputFormatter::plain(&format!("\nDetailed report saved to:\n{}", path.display()));
        }
        ReportStatus::NotRequested => {}
        ReportStatus::Failed(reason) => {
            OutputFormatter::warning(&format!(
                "Moves above were completed, but no report was saved: {}",
                reason
            ));
        }
    }
}
