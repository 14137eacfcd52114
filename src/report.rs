//! Plain-text reports written after each run.
//!
//! A report is created once, next to the files it describes, and never
//! touched again. Its file name carries a sortable, to-the-second timestamp:
//! `organization_report_YYYYMMDD_HHMMSS.txt`.

use crate::file_organizer::{
    ConsolidationResult, MoveFailure, OperationOutcome, OrganizationResult, OrganizeError,
    OrganizeResult,
};
use crate::storage::StorageStatsProvider;
use chrono::{DateTime, Local};
use std::fmt::{self, Write};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const REPORT_FILE_PREFIX: &str = "organization_report_";
pub const REPORT_FILE_EXTENSION: &str = ".txt";

/// Timestamp format embedded in report file names.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a byte count with two decimals in B, KB, MB, GB or TB.
///
/// Each step divides by 1024; scaling stops at the first unit where the value
/// drops below 1024, and never goes past TB.
///
/// # Examples
///
/// ```
/// use foldersort::report::format_size;
///
/// assert_eq!(format_size(0), "0.00 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}

/// Sums the sizes of every file below `path`.
///
/// Unreadable entries are left out of the total. A missing path counts as
/// empty.
pub fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Builds the report file name for a given moment.
pub fn report_file_name(at: &DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        REPORT_FILE_PREFIX,
        at.format(REPORT_TIMESTAMP_FORMAT),
        REPORT_FILE_EXTENSION
    )
}

/// Returns true for names shaped like the reports this crate writes.
pub fn is_report_file_name(name: &str) -> bool {
    name.strip_prefix(REPORT_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(REPORT_FILE_EXTENSION))
        .is_some_and(|stamp| {
            stamp.len() == 15
                && stamp
                    .char_indices()
                    .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
        })
}

/// Renders and writes reports, asking `storage` for usage figures.
pub struct ReportGenerator<S> {
    storage: S,
}

impl<S: StorageStatsProvider> ReportGenerator<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Writes the report for `outcome` into `base_dir`, stamped with the
    /// current local time, and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::ReportWriteFailure`] if the file cannot be
    /// written. Moves described by `outcome` have already happened by then.
    pub fn generate(&self, base_dir: &Path, outcome: &OperationOutcome) -> OrganizeResult<PathBuf> {
        self.generate_at(base_dir, outcome, Local::now())
    }

    /// Like [`generate`](Self::generate) with an explicit timestamp.
    pub fn generate_at(
        &self,
        base_dir: &Path,
        outcome: &OperationOutcome,
        at: DateTime<Local>,
    ) -> OrganizeResult<PathBuf> {
        let report_path = base_dir.join(report_file_name(&at));
        let write_failure = |source: io::Error| OrganizeError::ReportWriteFailure {
            path: report_path.clone(),
            source,
        };

        let mut body = String::new();
        self.render(&mut body, base_dir, outcome, &at)
            .map_err(|e| write_failure(io::Error::other(e)))?;
        fs::write(&report_path, body).map_err(write_failure)?;

        tracing::info!("report written to {}", report_path.display());
        Ok(report_path)
    }

    /// Renders the report text into `out`. Folder sizes are read from disk.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        base_dir: &Path,
        outcome: &OperationOutcome,
        at: &DateTime<Local>,
    ) -> fmt::Result {
        writeln!(out, "File Organization Report")?;
        writeln!(out, "Generated: {}", at.format(GENERATED_FORMAT))?;
        writeln!(out, "Operation Type: {}", outcome.kind().label())?;
        writeln!(out, "Directory: {}", base_dir.display())?;
        writeln!(out)?;

        writeln!(out, "Drive Information:")?;
        match self.storage.stats_for(base_dir) {
            Ok(stats) => {
                writeln!(out, "Total Space: {}", format_size(stats.total))?;
                writeln!(out, "Used Space: {}", format_size(stats.used))?;
                writeln!(out, "Free Space: {}", format_size(stats.free))?;
                writeln!(out, "Usage: {:.1}%", stats.percent_used())?;
            }
            Err(e) => {
                tracing::warn!("storage statistics unavailable: {}", e);
                writeln!(out, "Unavailable: {}", e)?;
            }
        }
        writeln!(out)?;

        writeln!(out, "Organization Results:")?;
        match outcome {
            OperationOutcome::FileOrganization(result) => render_files(out, base_dir, result)?,
            OperationOutcome::FolderConsolidation(result) => {
                render_folders(out, base_dir, result)?
            }
        }
        render_failures(out, outcome.failures())
    }
}

fn render_files<W: Write>(out: &mut W, base_dir: &Path, result: &OrganizationResult) -> fmt::Result {
    for tally in result.moved.iter().filter(|t| t.moved > 0) {
        let size = directory_size(&base_dir.join(&tally.category));
        writeln!(out, "{}:", capitalize(&tally.category))?;
        writeln!(out, "  Files Moved: {}", tally.moved)?;
        writeln!(out, "  Total Size: {}", format_size(size))?;
    }

    if !result.unorganized.is_empty() {
        writeln!(out, "\nUnorganized Files:")?;
        for name in &result.unorganized {
            writeln!(out, "  - {}", name)?;
        }
    }
    Ok(())
}

fn render_folders<W: Write>(out: &mut W, base_dir: &Path, result: &ConsolidationResult) -> fmt::Result {
    let size = directory_size(&base_dir.join(&result.target));
    writeln!(out, "Folders Moved to {}: {}", result.target, result.moved)?;
    writeln!(
        out,
        "Total Size of {}: {}",
        result.target,
        format_size(size)
    )
}

fn render_failures<W: Write>(out: &mut W, failures: &[MoveFailure]) -> fmt::Result {
    if failures.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nFailed Moves:")?;
    for failure in failures {
        writeln!(out, "  - {}: {}", failure.name, failure.reason)?;
    }
    Ok(())
}

/// Upper-cases the first character, e.g. "images" -> "Images".
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_organizer::CategoryTally;
    use crate::storage::{FixedStorage, StorageStats};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time(second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, second)
            .single()
            .expect("unambiguous local time")
    }

    fn render_text(base: &Path, outcome: &OperationOutcome) -> String {
        let mut text = String::new();
        generator()
            .render(&mut text, base, outcome, &fixed_time(0))
            .unwrap();
        text
    }

    fn generator() -> ReportGenerator<FixedStorage> {
        ReportGenerator::new(FixedStorage(StorageStats::from_total_and_free(
            1_073_741_824,
            268_435_456,
        )))
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
    }

    #[test]
    fn test_format_size_stops_at_tb() {
        assert_eq!(format_size(2048 * 1_099_511_627_776), "2048.00 TB");
    }

    #[test]
    fn test_report_file_name_format() {
        let name = report_file_name(&fixed_time(7));
        assert_eq!(name, "organization_report_20240309_140507.txt");
        assert!(is_report_file_name(&name));
    }

    #[test]
    fn test_report_names_differ_a_second_apart_and_sort() {
        let first = report_file_name(&fixed_time(7));
        let second = report_file_name(&fixed_time(8));
        assert_ne!(first, second);
        assert!(first < second);
    }

    #[test]
    fn test_is_report_file_name_rejects_lookalikes() {
        assert!(!is_report_file_name("organization_report_.txt"));
        assert!(!is_report_file_name("organization_report_20240309-140507.txt"));
        assert!(!is_report_file_name("organization_report_20240309_140507.log"));
        assert!(!is_report_file_name("my_organization_report_20240309_140507.txt"));
    }

    #[test]
    fn test_directory_size_is_recursive() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir_all(base.join("a").join("b")).unwrap();
        fs::write(base.join("a").join("one"), [0u8; 100]).unwrap();
        fs::write(base.join("a").join("b").join("two"), [0u8; 24]).unwrap();

        assert_eq!(directory_size(&base.join("a")), 124);
        assert_eq!(directory_size(&base.join("missing")), 0);
    }

    #[test]
    fn test_render_file_organization() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).unwrap();
        fs::write(base.join("images").join("a.jpg"), [0u8; 1536]).unwrap();

        let outcome = OperationOutcome::FileOrganization(OrganizationResult {
            moved: vec![
                CategoryTally {
                    category: "images".to_string(),
                    moved: 1,
                },
                CategoryTally {
                    category: "videos".to_string(),
                    moved: 0,
                },
            ],
            unorganized: vec!["c.xyz".to_string()],
            failures: vec![MoveFailure {
                name: "dup.png".to_string(),
                reason: "destination already exists".to_string(),
            }],
            ..Default::default()
        });

        let text = render_text(base, &outcome);

        assert!(text.starts_with("File Organization Report\n"));
        assert!(text.contains("Generated: 2024-03-09 14:05:00\n"));
        assert!(text.contains("Operation Type: File Organization\n"));
        assert!(text.contains("Total Space: 1.00 GB\n"));
        assert!(text.contains("Used Space: 768.00 MB\n"));
        assert!(text.contains("Free Space: 256.00 MB\n"));
        assert!(text.contains("Usage: 75.0%\n"));
        assert!(text.contains("Images:\n  Files Moved: 1\n  Total Size: 1.50 KB\n"));
        assert!(!text.contains("Videos:"));
        assert!(text.contains("\nUnorganized Files:\n  - c.xyz\n"));
        assert!(text.contains("\nFailed Moves:\n  - dup.png: destination already exists\n"));
    }

    #[test]
    fn test_render_consolidation() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir_all(base.join("misc_folders").join("projects")).unwrap();
        fs::write(
            base.join("misc_folders").join("projects").join("x"),
            [0u8; 2048],
        )
        .unwrap();

        let outcome = OperationOutcome::FolderConsolidation(ConsolidationResult {
            target: "misc_folders".to_string(),
            moved: 1,
            ..Default::default()
        });

        let text = render_text(base, &outcome);

        assert!(text.contains("Operation Type: Misc Folders Organization\n"));
        assert!(text.contains("Folders Moved to misc_folders: 1\n"));
        assert!(text.contains("Total Size of misc_folders: 2.00 KB\n"));
        assert!(!text.contains("Failed Moves"));
    }

    #[test]
    fn test_generate_writes_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let outcome = OperationOutcome::FileOrganization(OrganizationResult::default());

        let path = generator()
            .generate_at(base, &outcome, fixed_time(30))
            .unwrap();

        assert_eq!(path, base.join("organization_report_20240309_140530.txt"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(&format!("Directory: {}", base.display())));
    }

    #[test]
    fn test_generate_into_missing_dir_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("gone");
        let outcome = OperationOutcome::FileOrganization(OrganizationResult::default());

        let result = generator().generate_at(&missing, &outcome, fixed_time(0));
        assert!(matches!(
            result,
            Err(OrganizeError::ReportWriteFailure { .. })
        ));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("images"), "Images");
        assert_eq!(capitalize(""), "");
    }
}
