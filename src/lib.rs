//! foldersort - sort a directory's files into category folders
//!
//! This library classifies files by extension, moves them into one folder per
//! category, gathers stray subfolders into a single container folder, and
//! writes a plain-text report with the outcome and current storage usage.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod report;
pub mod storage;

pub use config::{CompiledFilters, ConfigError, OrganizerConfig};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{
    ConsolidationResult, FileOrganizer, MoveFailure, OperationKind, OperationOutcome,
    OrganizationResult, OrganizeError, OrganizeResult,
};
pub use report::{ReportGenerator, format_size};
pub use storage::{FixedStorage, StorageStats, StorageStatsProvider, SystemStorage};

pub use cli::{OrganizeCommand, RunOptions, RunOutcome, run, run_with_storage};
