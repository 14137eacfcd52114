//! Startup configuration.
//!
//! Configuration is read once from a TOML file and never written back. It can
//! replace the category table, rename the folder stray directories are gathered
//! into, and exclude top-level files from organization.
//!
//! # Configuration File Format
//!
//! ```toml
//! [organizer]
//! misc_folder = "misc_folders"
//! detect_content = false
//!
//! [[categories]]
//! name = "images"
//! extensions = [".jpg", "png"]
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Leaving out `[[categories]]` keeps the built-in table.

use crate::file_category::{Category, CategoryTable, normalize_extension};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the folder stray directories are moved into by default.
pub const DEFAULT_MISC_FOLDER: &str = "misc_folders";

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// The category table or misc folder name is unusable.
    InvalidCategory(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidCategory(msg) => write!(f, "Invalid category table: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub organizer: OrganizerSettings,

    /// Replacement category table, in lookup order.
    #[serde(default)]
    pub categories: Option<Vec<CategoryConfig>>,

    #[serde(default)]
    pub filters: FilterRules,
}

/// `[organizer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerSettings {
    /// Folder that folder consolidation moves stray directories into.
    #[serde(default = "default_misc_folder")]
    pub misc_folder: String,

    /// Sniff file content when the extension matches no category.
    #[serde(default)]
    pub detect_content: bool,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            misc_folder: default_misc_folder(),
            detect_content: false,
        }
    }
}

fn default_misc_folder() -> String {
    DEFAULT_MISC_FOLDER.to_string()
}

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// `[filters]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether dotfiles take part in organization. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist that overrides every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

fn default_enable_hidden_files() -> bool {
    true
}

/// Rules for leaving files where they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, with or without the leading dot, case-insensitive.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules that force a file back in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl OrganizerConfig {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given
    /// 2. `.foldersortrc.toml` in the current directory
    /// 3. `~/.config/foldersort/config.toml`
    /// 4. Built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing or unreadable,
    /// or if any file found is not valid TOML for this schema.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".foldersortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("foldersort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Loads configuration from one file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a TOML configuration file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::OrganizerConfig;
    /// use std::path::Path;
    ///
    /// let config = OrganizerConfig::load_from_file(Path::new(".foldersortrc.toml"))?;
    /// println!("misc folder: {}", config.organizer.misc_folder);
    /// # Ok::<(), foldersort::ConfigError>(())
    /// ```
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Example
    ///
    /// ```
    /// use foldersort::OrganizerConfig;
    ///
    /// let config = OrganizerConfig::from_toml_str(
    ///     r#"
    ///     [organizer]
    ///     misc_folder = "attic"
    ///     "#,
    /// )?;
    /// assert_eq!(config.organizer.misc_folder, "attic");
    /// # Ok::<(), foldersort::ConfigError>(())
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the category table, checking it against the misc folder name.
    ///
    /// # Errors
    ///
    /// Fails on an empty table, a blank or path-like category name, a name
    /// used twice, or a name equal to the misc folder.
    pub fn category_table(&self) -> Result<CategoryTable, ConfigError> {
        let misc_folder = self.organizer.misc_folder.trim();
        validate_folder_name(misc_folder, "misc folder")?;

        let table = match &self.categories {
            Some(entries) => Self::custom_table(entries)?,
            None => CategoryTable::default(),
        };
        if table.contains_name(misc_folder) {
            return Err(ConfigError::InvalidCategory(format!(
                "category '{}' collides with the misc folder name",
                misc_folder
            )));
        }

        Ok(table)
    }

    fn custom_table(entries: &[CategoryConfig]) -> Result<CategoryTable, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::InvalidCategory(
                "at least one category is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = entry.name.trim();
            validate_folder_name(name, "category")?;
            if !seen.insert(name.to_string()) {
                return Err(ConfigError::InvalidCategory(format!(
                    "category '{}' is listed more than once",
                    name
                )));
            }
            categories.push(Category::new(name, &entry.extensions));
        }

        Ok(CategoryTable::new(categories))
    }
}

/// Rejects names that can't be used as a single directory component.
fn validate_folder_name(name: &str, what: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidCategory(format!(
            "'{}' is not a valid {} name",
            name, what
        )));
    }
    Ok(())
}

impl FilterRules {
    /// Compiles the rules into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(&self) -> Result<CompiledFilters, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let exclude_regexes = self
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledFilters {
            enable_hidden_files: self.enable_hidden_files,
            exclude_filenames: self.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: self
                .exclude
                .extensions
                .iter()
                .filter_map(|ext| normalize_extension(ext))
                .collect(),
            exclude_patterns: compile_globs(self.exclude.patterns.as_slice())?,
            exclude_regexes,
            include_patterns: compile_globs(self.include.patterns.as_slice())?,
        })
    }
}

/// Filter rules ready for matching top-level file names.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl CompiledFilters {
    /// Decides whether a top-level file takes part in organization.
    ///
    /// Include patterns win outright; otherwise the hidden-file switch, exact
    /// names, extensions, glob patterns and regexes are checked in that order.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Name of the file, without any directory part
    ///
    /// # Example
    ///
    /// ```
    /// use foldersort::OrganizerConfig;
    ///
    /// let config = OrganizerConfig::from_toml_str(
    ///     r#"
    ///     [filters.exclude]
    ///     patterns = ["*.part"]
    ///     "#,
    /// )?;
    /// let filters = config.filters.compile()?;
    /// assert!(!filters.should_include("movie.mp4.part"));
    /// assert!(filters.should_include("movie.mp4"));
    /// # Ok::<(), foldersort::ConfigError>(())
    /// ```
    pub fn should_include(&self, file_name: &str) -> bool {
        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        let ext = crate::file_category::extension_of(file_name);
        if !ext.is_empty() && self.exclude_extensions.contains(&ext) {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(file_name))
    }
}
