//! Terminal output for the command-line front end.
//!
//! Everything the user reads goes through [`OutputFormatter`], so styling stays
//! consistent and can be changed in one place. Diagnostics go through
//! `tracing` instead.

use crate::file_organizer::{CategoryTally, ConsolidationResult, MoveFailure, OrganizationResult};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Formats and prints run output with colors and symbols.
///
/// Provides:
/// - Success, error and warning lines with a leading symbol
/// - Section headers and a per-category summary table
/// - A progress bar over the entries of one run
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// OutputFormatter::success("File organization complete!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// OutputFormatter::error("Please select a directory first");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow, on stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an informational message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold section header preceded by a blank line.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a yellow `[DRY RUN]` line.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar over the entries of one run.
    ///
    /// The length is set once the directory listing is known.
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints per-category counts in table order with a total row.
    ///
    /// # Arguments
    ///
    /// * `tallies` - Moved counts, one per category
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::file_organizer::CategoryTally;
    /// use foldersort::output::OutputFormatter;
    ///
    /// OutputFormatter::summary_table(&[
    ///     CategoryTally { category: "images".to_string(), moved: 3 },
    ///     CategoryTally { category: "documents".to_string(), moved: 0 },
    /// ]);
    /// ```
    pub fn summary_table(tallies: &[CategoryTally]) {
        Self::header("SUMMARY");

        let width = tallies
            .iter()
            .map(|t| t.category.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for tally in tallies {
            let count = if tally.moved > 0 {
                tally.moved.to_string().green()
            } else {
                tally.moved.to_string().dimmed()
            };
            println!(
                "{:<width$} | {} {}",
                tally.category,
                count,
                plural(tally.moved),
                width = width
            );
        }

        let total: usize = tallies.iter().map(|t| t.moved).sum();
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );
    }

    /// Renders a file-organization result.
    pub fn organization_result(result: &OrganizationResult) {
        if result.dry_run {
            Self::dry_run_notice("No files were moved. Counts show what would happen.");
        } else {
            Self::success("File organization complete!");
        }

        Self::summary_table(&result.moved);

        if !result.unorganized.is_empty() {
            Self::header("Unorganized files");
            for name in &result.unorganized {
                Self::plain(&format!("  - {}", name));
            }
        }

        if !result.skipped.is_empty() {
            Self::header("Skipped");
            for name in &result.skipped {
                Self::plain(&format!("  - {}", name).dimmed().to_string());
            }
        }

        Self::failures(&result.failures);
    }

    /// Renders a folder-consolidation result.
    pub fn consolidation_result(result: &ConsolidationResult) {
        if result.dry_run {
            Self::dry_run_notice("No folders were moved. Counts show what would happen.");
        } else {
            Self::success("Miscellaneous folders organization complete!");
        }

        Self::plain(&format!(
            "Number of folders moved to {}: {}",
            result.target, result.moved
        ));
        for name in &result.moved_names {
            Self::plain(&format!("  - {}", name));
        }
        if result.moved == 0 && result.failures.is_empty() {
            Self::info("No miscellaneous folders found to organize.");
        }

        Self::failures(&result.failures);
    }

    fn failures(failures: &[MoveFailure]) {
        if failures.is_empty() {
            return;
        }
        Self::warning(&format!(
            "{} {} could not be moved:",
            failures.len(),
            if failures.len() == 1 { "entry" } else { "entries" }
        ));
        for failure in failures {
            Self::error(&format!("{}: {}", failure.name, failure.reason));
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
