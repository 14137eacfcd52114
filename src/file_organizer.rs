//! Moving files into category folders and stray folders into one container.
//!
//! Both operations work on the immediate children of a base directory only.
//! A failure to move one entry is recorded in the returned result and the
//! remaining entries are still processed; only problems with the base
//! directory itself (or with creating the destination folders) abort a run.

use crate::config::{CompiledFilters, ConfigError, DEFAULT_MISC_FOLDER, OrganizerConfig};
use crate::file_category::{CategoryTable, sniff_extension};
use crate::report::is_report_file_name;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during an organization run.
#[derive(Debug)]
pub enum OrganizeError {
    /// No base directory was given.
    NoDirectorySelected,
    /// The base directory is missing, unreadable, or not a directory.
    DirectoryNotAccessible { path: PathBuf, source: io::Error },
    /// A category folder or the misc folder could not be created.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// One entry could not be moved.
    PerItemMoveFailure {
        name: String,
        destination: PathBuf,
        source: io::Error,
    },
    /// The report file could not be written.
    ReportWriteFailure { path: PathBuf, source: io::Error },
    /// The configuration could not be loaded or compiled.
    Config(ConfigError),
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDirectorySelected => write!(f, "Please select a directory first"),
            Self::DirectoryNotAccessible { path, source } => {
                write!(f, "Cannot access directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::PerItemMoveFailure {
                name,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    name,
                    destination.display(),
                    source
                )
            }
            Self::ReportWriteFailure { path, source } => {
                write!(f, "Failed to write report {}: {}", path.display(), source)
            }
            Self::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoDirectorySelected => None,
            Self::DirectoryNotAccessible { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::PerItemMoveFailure { source, .. }
            | Self::ReportWriteFailure { source, .. } => Some(source),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for OrganizeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// The two things the organizer can do to a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    FileOrganization,
    FolderConsolidation,
}

impl OperationKind {
    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FileOrganization => "File Organization",
            Self::FolderConsolidation => "Misc Folders Organization",
        }
    }
}

/// Files moved into one category during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub category: String,
    pub moved: usize,
}

/// An entry that could not be moved, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveFailure {
    pub name: String,
    pub reason: String,
}

impl MoveFailure {
    fn from_error(name: &str, e: &OrganizeError) -> Self {
        let reason = match e {
            OrganizeError::PerItemMoveFailure { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        Self {
            name: name.to_string(),
            reason,
        }
    }
}

/// Outcome of one file-organization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizationResult {
    /// One tally per category, in table order.
    pub moved: Vec<CategoryTally>,
    /// Files no category claims, in listing order.
    pub unorganized: Vec<String>,
    /// Files left alone by filter rules or because they are reports.
    pub skipped: Vec<String>,
    pub failures: Vec<MoveFailure>,
    /// True when nothing was actually touched on disk.
    pub dry_run: bool,
}

impl OrganizationResult {
    fn for_table(table: &CategoryTable, dry_run: bool) -> Self {
        Self {
            moved: table
                .names()
                .map(|name| CategoryTally {
                    category: name.to_string(),
                    moved: 0,
                })
                .collect(),
            dry_run,
            ..Default::default()
        }
    }

    fn record_move(&mut self, category: &str) {
        if let Some(tally) = self.moved.iter_mut().find(|t| t.category == category) {
            tally.moved += 1;
        }
    }

    /// Files moved into `category` (zero for unknown categories).
    pub fn moved_count(&self, category: &str) -> usize {
        self.moved
            .iter()
            .find(|t| t.category == category)
            .map_or(0, |t| t.moved)
    }

    /// Files moved across all categories.
    pub fn total_moved(&self) -> usize {
        self.moved.iter().map(|t| t.moved).sum()
    }

    /// Returns true if every classified file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of one folder-consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationResult {
    /// Name of the container folder.
    pub target: String,
    pub moved: usize,
    /// Folders moved, in listing order.
    pub moved_names: Vec<String>,
    /// Names that are never moved: every category plus the target itself.
    pub protected: Vec<String>,
    pub failures: Vec<MoveFailure>,
    pub dry_run: bool,
}

impl ConsolidationResult {
    /// Returns true if every candidate folder was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of either operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationOutcome {
    FileOrganization(OrganizationResult),
    FolderConsolidation(ConsolidationResult),
}

impl OperationOutcome {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::FileOrganization(_) => OperationKind::FileOrganization,
            Self::FolderConsolidation(_) => OperationKind::FolderConsolidation,
        }
    }

    pub fn failures(&self) -> &[MoveFailure] {
        match self {
            Self::FileOrganization(r) => &r.failures,
            Self::FolderConsolidation(r) => &r.failures,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        match self {
            Self::FileOrganization(r) => r.dry_run,
            Self::FolderConsolidation(r) => r.dry_run,
        }
    }
}

/// Progress notifications emitted while a run walks the directory.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// The listing was taken; `total` entries will be looked at.
    Scanned { total: usize },
    /// One entry has been handled.
    Processed { name: &'a str },
}

/// Organizes the top level of a directory.
///
/// Holds the category table and filters fixed at startup; every call works
/// only on the directory it is given.
#[derive(Debug, Clone)]
pub struct FileOrganizer {
    table: CategoryTable,
    filters: CompiledFilters,
    misc_folder: String,
    detect_content: bool,
    dry_run: bool,
}

impl Default for FileOrganizer {
    fn default() -> Self {
        Self::new(CategoryTable::default())
    }
}

impl FileOrganizer {
    /// Creates an organizer with the given table and default settings.
    pub fn new(table: CategoryTable) -> Self {
        Self {
            table,
            filters: CompiledFilters::default(),
            misc_folder: DEFAULT_MISC_FOLDER.to_string(),
            detect_content: false,
            dry_run: false,
        }
    }

    /// Creates an organizer from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the category table or the filters are invalid.
    pub fn from_config(config: &OrganizerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            table: config.category_table()?,
            filters: config.filters.compile()?,
            misc_folder: config.organizer.misc_folder.trim().to_string(),
            detect_content: config.organizer.detect_content,
            dry_run: false,
        })
    }

    /// Plans moves without touching the filesystem.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Falls back to content sniffing for files with unknown extensions.
    pub fn with_content_detection(mut self, detect_content: bool) -> Self {
        self.detect_content = detect_content;
        self
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn misc_folder(&self) -> &str {
        &self.misc_folder
    }

    /// Names folder consolidation never moves: categories, then the misc folder.
    pub fn protected_names(&self) -> Vec<String> {
        self.table
            .names()
            .chain(std::iter::once(self.misc_folder.as_str()))
            .map(str::to_string)
            .collect()
    }

    /// Moves every classifiable top-level file into its category folder.
    ///
    /// # Errors
    ///
    /// Fails before anything moves if `base_dir` is empty, unreadable, or a
    /// category folder cannot be created. Per-file move problems land in
    /// [`OrganizationResult::failures`] instead.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldersort::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::default()
    ///     .organize_files(Path::new("/home/me/Downloads"))
    ///     .expect("directory should be readable");
    /// println!("moved {} files", result.total_moved());
    /// ```
    pub fn organize_files(&self, base_dir: &Path) -> OrganizeResult<OrganizationResult> {
        self.organize_files_with_progress(base_dir, |_| {})
    }

    /// Same as [`organize_files`](Self::organize_files), reporting progress.
    pub fn organize_files_with_progress(
        &self,
        base_dir: &Path,
        mut on_progress: impl FnMut(Progress<'_>),
    ) -> OrganizeResult<OrganizationResult> {
        check_base_dir(base_dir)?;

        if !self.dry_run {
            for name in self.table.names() {
                ensure_dir(&base_dir.join(name))?;
            }
        }

        let entries = list_entries(base_dir)?;
        on_progress(Progress::Scanned {
            total: entries.len(),
        });
        tracing::info!(
            "organizing {} entries in {}",
            entries.len(),
            base_dir.display()
        );

        let mut result = OrganizationResult::for_table(&self.table, self.dry_run);
        for entry in &entries {
            match entry {
                Ok(entry) => self.organize_entry(base_dir, entry, &mut result),
                Err(failure) => result.failures.push(failure.clone()),
            }
            on_progress(Progress::Processed {
                name: listed_name(entry),
            });
        }

        Ok(result)
    }

    fn organize_entry(&self, base_dir: &Path, entry: &Entry, result: &mut OrganizationResult) {
        let Entry {
            name,
            os_name,
            path,
        } = entry;
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return,
            Err(e) => {
                tracing::warn!("cannot inspect {}: {}", name, e);
                result.failures.push(MoveFailure {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
                return;
            }
        }

        if is_report_file_name(name) || !self.filters.should_include(name) {
            tracing::debug!("skipping {}", name);
            result.skipped.push(name.to_string());
            return;
        }

        let category = self.table.classify(name).or_else(|| {
            if !self.detect_content {
                return None;
            }
            sniff_extension(path).and_then(|ext| self.table.classify_extension(&ext))
        });

        let Some(category) = category else {
            result.unorganized.push(name.to_string());
            return;
        };

        let category_name = category.dir_name();
        let destination = base_dir.join(category_name).join(os_name);
        let moved = if self.dry_run {
            check_destination(name, &destination)
        } else {
            move_entry(name, path, &destination)
        };
        match moved {
            Ok(()) => {
                tracing::debug!("moved {} to {}/", name, category_name);
                result.record_move(category_name);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                result.failures.push(MoveFailure::from_error(name, &e));
            }
        }
    }

    /// Moves every unprotected top-level folder into the misc folder.
    ///
    /// # Errors
    ///
    /// Fails before anything moves if `base_dir` is empty, unreadable, or the
    /// misc folder cannot be created. Per-folder problems, such as a folder
    /// of the same name already inside the misc folder, land in
    /// [`ConsolidationResult::failures`].
    pub fn consolidate_folders(&self, base_dir: &Path) -> OrganizeResult<ConsolidationResult> {
        self.consolidate_folders_with_progress(base_dir, |_| {})
    }

    /// Same as [`consolidate_folders`](Self::consolidate_folders), reporting progress.
    pub fn consolidate_folders_with_progress(
        &self,
        base_dir: &Path,
        mut on_progress: impl FnMut(Progress<'_>),
    ) -> OrganizeResult<ConsolidationResult> {
        check_base_dir(base_dir)?;

        let target_dir = base_dir.join(&self.misc_folder);
        if !self.dry_run {
            ensure_dir(&target_dir)?;
        }

        let protected = self.protected_names();
        let entries = list_entries(base_dir)?;
        on_progress(Progress::Scanned {
            total: entries.len(),
        });
        tracing::info!(
            "consolidating folders of {} into {}",
            base_dir.display(),
            self.misc_folder
        );

        let mut result = ConsolidationResult {
            target: self.misc_folder.clone(),
            protected: protected.clone(),
            dry_run: self.dry_run,
            ..Default::default()
        };

        for listed in &entries {
            let entry = match listed {
                Ok(entry) => entry,
                Err(failure) => {
                    result.failures.push(failure.clone());
                    on_progress(Progress::Processed {
                        name: &failure.name,
                    });
                    continue;
                }
            };
            let Entry {
                name,
                os_name,
                path,
            } = entry;
            let is_candidate = fs::metadata(path).is_ok_and(|meta| meta.is_dir())
                && !protected.iter().any(|p| p == name);

            if is_candidate {
                let destination = target_dir.join(os_name);
                let moved = if self.dry_run {
                    check_destination(name, &destination)
                } else {
                    move_entry(name, path, &destination)
                };
                match moved {
                    Ok(()) => {
                        tracing::debug!("moved folder {} to {}/", name, self.misc_folder);
                        result.moved += 1;
                        result.moved_names.push(name.clone());
                    }
                    Err(e) => {
                        tracing::warn!("{}", e);
                        result.failures.push(MoveFailure::from_error(name, &e));
                    }
                }
            }

            on_progress(Progress::Processed { name });
        }

        Ok(result)
    }
}

/// Validates the base directory before any side effects.
fn check_base_dir(base_dir: &Path) -> OrganizeResult<()> {
    if base_dir.as_os_str().is_empty() {
        return Err(OrganizeError::NoDirectorySelected);
    }

    let meta = fs::metadata(base_dir).map_err(|e| OrganizeError::DirectoryNotAccessible {
        path: base_dir.to_path_buf(),
        source: e,
    })?;

    if !meta.is_dir() {
        return Err(OrganizeError::DirectoryNotAccessible {
            path: base_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    Ok(())
}

fn ensure_dir(path: &Path) -> OrganizeResult<()> {
    fs::create_dir_all(path).map_err(|e| OrganizeError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// One immediate child of the base directory.
///
/// `os_name` is the name as stored on disk and is what destinations are
/// built from; `name` is its lossy UTF-8 form for matching and display.
#[derive(Debug)]
struct Entry {
    name: String,
    os_name: OsString,
    path: PathBuf,
}

/// Placeholder name for a listing entry that could not be read.
const UNREADABLE_ENTRY: &str = "<unreadable entry>";

fn listed_name(listed: &Result<Entry, MoveFailure>) -> &str {
    match listed {
        Ok(entry) => &entry.name,
        Err(failure) => &failure.name,
    }
}

/// Snapshot of the immediate children of `base_dir`.
///
/// Children the listing cannot read come back as failures so they still
/// show up in the result.
fn list_entries(base_dir: &Path) -> OrganizeResult<Vec<Result<Entry, MoveFailure>>> {
    let entries = fs::read_dir(base_dir).map_err(|e| OrganizeError::DirectoryNotAccessible {
        path: base_dir.to_path_buf(),
        source: e,
    })?;

    Ok(entries
        .map(|entry| match entry {
            Ok(entry) => {
                let os_name = entry.file_name();
                Ok(Entry {
                    name: os_name.to_string_lossy().into_owned(),
                    os_name,
                    path: entry.path(),
                })
            }
            Err(e) => {
                tracing::warn!("cannot read entry of {}: {}", base_dir.display(), e);
                Err(MoveFailure {
                    name: UNREADABLE_ENTRY.to_string(),
                    reason: e.to_string(),
                })
            }
        })
        .collect())
}

/// Fails if something already sits at `destination`.
fn check_destination(name: &str, destination: &Path) -> OrganizeResult<()> {
    if fs::symlink_metadata(destination).is_ok() {
        return Err(OrganizeError::PerItemMoveFailure {
            name: name.to_string(),
            destination: destination.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        });
    }
    Ok(())
}

/// Renames `source` to `destination`, refusing to replace anything there.
fn move_entry(name: &str, source: &Path, destination: &Path) -> OrganizeResult<()> {
    check_destination(name, destination)?;

    fs::rename(source, destination).map_err(|e| OrganizeError::PerItemMoveFailure {
        name: name.to_string(),
        destination: destination.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).expect("Failed to write test file");
    }

    #[test]
    fn test_organize_files_scenario() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "a.jpg");
        touch(base, "b.txt");
        touch(base, "c.xyz");

        let result = FileOrganizer::default().organize_files(base).unwrap();

        assert!(base.join("images").join("a.jpg").is_file());
        assert!(base.join("documents").join("b.txt").is_file());
        assert!(base.join("c.xyz").is_file());
        assert_eq!(result.unorganized, vec!["c.xyz".to_string()]);
        assert_eq!(result.moved_count("images"), 1);
        assert_eq!(result.moved_count("documents"), 1);
        assert_eq!(result.moved_count("videos"), 0);
        assert_eq!(result.moved.len(), 7);
        assert_eq!(result.total_moved(), 2);
        assert!(result.is_complete_success());
    }

    #[test]
    fn test_organize_creates_every_category_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        FileOrganizer::default().organize_files(base).unwrap();

        for name in CategoryTable::default().names() {
            assert!(base.join(name).is_dir(), "{} should exist", name);
        }
    }

    #[test]
    fn test_organize_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "song.MP3");
        touch(base, "clip.mkv");

        let organizer = FileOrganizer::default();
        let first = organizer.organize_files(base).unwrap();
        let second = organizer.organize_files(base).unwrap();

        assert_eq!(first.total_moved(), 2);
        assert_eq!(second.total_moved(), 0);
        assert!(second.unorganized.is_empty());
    }

    #[test]
    fn test_destination_collision_is_isolated() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).unwrap();
        fs::write(base.join("images").join("dup.png"), "old").unwrap();
        touch(base, "dup.png");
        touch(base, "fresh.png");

        let result = FileOrganizer::default().organize_files(base).unwrap();

        assert_eq!(result.moved_count("images"), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "dup.png");
        assert!(result.unorganized.is_empty());
        assert_eq!(
            fs::read_to_string(base.join("images").join("dup.png")).unwrap(),
            "old"
        );
        assert!(base.join("dup.png").exists());
        assert!(base.join("images").join("fresh.png").exists());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "a.jpg");
        touch(base, "c.xyz");

        let result = FileOrganizer::default()
            .with_dry_run(true)
            .organize_files(base)
            .unwrap();

        assert!(result.dry_run);
        assert_eq!(result.moved_count("images"), 1);
        assert_eq!(result.unorganized, vec!["c.xyz".to_string()]);
        assert!(base.join("a.jpg").exists());
        assert!(!base.join("images").exists());
    }

    #[test]
    fn test_dry_run_reports_destination_collisions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).unwrap();
        fs::write(base.join("images").join("dup.png"), "old").unwrap();
        touch(base, "dup.png");
        touch(base, "fresh.png");

        let result = FileOrganizer::default()
            .with_dry_run(true)
            .organize_files(base)
            .unwrap();

        assert_eq!(result.moved_count("images"), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "dup.png");
        assert!(base.join("fresh.png").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_kept_on_move() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let latin1 = OsStr::from_bytes(b"caf\xe9.jpg");
        let invalid = OsStr::from_bytes(b"caf\xff.jpg");
        if fs::write(base.join(latin1), "a").is_err() {
            // Some filesystems only accept UTF-8 names.
            return;
        }
        fs::write(base.join(invalid), "b").unwrap();

        let result = FileOrganizer::default().organize_files(base).unwrap();

        assert_eq!(result.moved_count("images"), 2);
        assert!(result.failures.is_empty());
        assert_eq!(fs::read(base.join("images").join(latin1)).unwrap(), b"a");
        assert_eq!(fs::read(base.join("images").join(invalid)).unwrap(), b"b");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_folder_name_is_kept_on_consolidation() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let name = OsStr::from_bytes(b"r\xe9sum\xe9s");
        if fs::create_dir(base.join(name)).is_err() {
            return;
        }

        let result = FileOrganizer::default().consolidate_folders(base).unwrap();

        assert_eq!(result.moved, 1);
        assert!(base.join("misc_folders").join(name).is_dir());
    }

    #[test]
    fn test_unreadable_entry_is_named_in_failures() {
        let listed: Result<Entry, MoveFailure> = Err(MoveFailure {
            name: UNREADABLE_ENTRY.to_string(),
            reason: "permission denied".to_string(),
        });
        assert_eq!(listed_name(&listed), "<unreadable entry>");

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "a.jpg");
        let entries = list_entries(temp_dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(listed_name(&entries[0]), "a.jpg");
    }

    #[test]
    fn test_report_files_are_skipped() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "organization_report_20240101_120000.txt");

        let result = FileOrganizer::default().organize_files(base).unwrap();

        assert_eq!(result.total_moved(), 0);
        assert_eq!(
            result.skipped,
            vec!["organization_report_20240101_120000.txt".to_string()]
        );
        assert!(base.join("organization_report_20240101_120000.txt").exists());
    }

    #[test]
    fn test_filtered_files_are_skipped() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "keep.tmp.txt");
        touch(base, "normal.txt");

        let config = OrganizerConfig::from_toml_str(
            r#"
            [filters.exclude]
            patterns = ["*.tmp.*"]
            "#,
        )
        .unwrap();
        let result = FileOrganizer::from_config(&config)
            .unwrap()
            .organize_files(base)
            .unwrap();

        assert_eq!(result.skipped, vec!["keep.tmp.txt".to_string()]);
        assert_eq!(result.moved_count("documents"), 1);
    }

    #[test]
    fn test_content_detection_fallback() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let png_header: &[u8] = &[
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52,
        ];
        fs::write(base.join("scan.unknown"), png_header).unwrap();

        let plain = FileOrganizer::default().with_dry_run(true);
        assert_eq!(
            plain.organize_files(base).unwrap().unorganized,
            vec!["scan.unknown".to_string()]
        );

        let sniffing = FileOrganizer::default().with_content_detection(true);
        let result = sniffing.organize_files(base).unwrap();
        assert_eq!(result.moved_count("images"), 1);
        assert!(base.join("images").join("scan.unknown").exists());
    }

    #[test]
    fn test_missing_base_dir() {
        let result = FileOrganizer::default().organize_files(Path::new("/non/existent/path"));
        assert!(matches!(
            result,
            Err(OrganizeError::DirectoryNotAccessible { .. })
        ));
    }

    #[test]
    fn test_empty_base_dir_is_no_directory_selected() {
        let result = FileOrganizer::default().consolidate_folders(Path::new(""));
        assert!(matches!(result, Err(OrganizeError::NoDirectorySelected)));
    }

    #[test]
    fn test_base_dir_that_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "plain.txt");
        let result = FileOrganizer::default().organize_files(&temp_dir.path().join("plain.txt"));
        assert!(matches!(
            result,
            Err(OrganizeError::DirectoryNotAccessible { .. })
        ));
    }

    #[test]
    fn test_consolidate_scenario() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("projects")).unwrap();
        touch(&base.join("projects"), "main.rs");
        fs::create_dir(base.join("images")).unwrap();
        fs::create_dir(base.join("misc_folders")).unwrap();
        touch(base, "loose.txt");

        let result = FileOrganizer::default().consolidate_folders(base).unwrap();

        assert_eq!(result.moved, 1);
        assert_eq!(result.moved_names, vec!["projects".to_string()]);
        assert!(base.join("misc_folders").join("projects").join("main.rs").exists());
        assert!(base.join("images").is_dir());
        assert!(base.join("loose.txt").is_file());
        assert!(!base.join("misc_folders").join("misc_folders").exists());
    }

    #[test]
    fn test_consolidate_protected_names() {
        let organizer = FileOrganizer::default();
        let protected = organizer.protected_names();
        assert_eq!(protected.len(), 8);
        assert_eq!(protected.last().map(String::as_str), Some("misc_folders"));
    }

    #[test]
    fn test_consolidate_collision_is_isolated() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir_all(base.join("misc_folders").join("old")).unwrap();
        fs::create_dir(base.join("old")).unwrap();
        fs::create_dir(base.join("new")).unwrap();

        let result = FileOrganizer::default().consolidate_folders(base).unwrap();

        assert_eq!(result.moved, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "old");
        assert!(base.join("old").is_dir());
        assert!(base.join("misc_folders").join("new").is_dir());
    }

    #[test]
    fn test_consolidate_dry_run() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("stuff")).unwrap();

        let result = FileOrganizer::default()
            .with_dry_run(true)
            .consolidate_folders(base)
            .unwrap();

        assert_eq!(result.moved, 1);
        assert!(base.join("stuff").is_dir());
        assert!(!base.join("misc_folders").exists());
    }

    #[test]
    fn test_consolidate_dry_run_reports_collisions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir_all(base.join("misc_folders").join("old")).unwrap();
        fs::create_dir(base.join("old")).unwrap();
        fs::create_dir(base.join("new")).unwrap();

        let result = FileOrganizer::default()
            .with_dry_run(true)
            .consolidate_folders(base)
            .unwrap();

        assert_eq!(result.moved_names, vec!["new".to_string()]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "old");
        assert!(base.join("new").is_dir());
    }

    #[test]
    fn test_progress_events() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        touch(base, "a.jpg");

        let mut total = None;
        let mut processed = 0;
        FileOrganizer::default()
            .organize_files_with_progress(base, |event| match event {
                Progress::Scanned { total: t } => total = Some(t),
                Progress::Processed { .. } => processed += 1,
            })
            .unwrap();

        // a.jpg plus the seven category folders
        assert_eq!(total, Some(8));
        assert_eq!(processed, 8);
    }
}
