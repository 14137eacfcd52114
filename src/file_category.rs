//! File categorization by extension.
//!
//! A [`CategoryTable`] is an ordered list of named categories, each owning a set
//! of lower-cased extensions (leading dot included). Lookups walk the table in
//! declaration order, so an extension accidentally listed twice resolves to the
//! first category that claims it.
//!
//! # Examples
//!
//! ```
//! use foldersort::file_category::CategoryTable;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.classify("holiday.JPG").map(|c| c.dir_name()), Some("images"));
//! assert_eq!(table.classify("notes.txt").map(|c| c.dir_name()), Some("documents"));
//! assert!(table.classify("data.xyz").is_none());
//! ```

use std::collections::HashSet;
use std::path::Path;

/// The built-in category table, in lookup order.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "images",
        &[
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp", ".svg", ".ico",
        ],
    ),
    (
        "documents",
        &[
            ".pdf", ".doc", ".docx", ".txt", ".xlsx", ".csv", ".ppt", ".pptx", ".rtf", ".odt",
        ],
    ),
    (
        "videos",
        &[
            ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".3gp",
        ],
    ),
    (
        "audio",
        &[
            ".mp3", ".wav", ".flac", ".m4a", ".aac", ".wma", ".ogg", ".midi", ".mid",
        ],
    ),
    (
        "compressed",
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".iso"],
    ),
    (
        "executables",
        &[".exe", ".msi", ".app", ".dmg", ".pkg", ".deb", ".rpm"],
    ),
    (
        "code",
        &[
            ".py", ".java", ".cpp", ".h", ".js", ".html", ".css", ".php", ".sql",
        ],
    ),
];

/// A named bucket of file extensions.
///
/// The name doubles as the subdirectory files of this category are moved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: HashSet<String>,
}

impl Category {
    /// Creates a category, normalizing every extension to lower case with a
    /// leading dot. Blank entries are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldersort::file_category::Category;
    ///
    /// let fonts = Category::new("fonts", ["TTF", ".otf"]);
    /// assert!(fonts.contains(".ttf"));
    /// assert!(fonts.contains(".otf"));
    /// ```
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    /// Returns the directory name for this category.
    pub fn dir_name(&self) -> &str {
        &self.name
    }

    /// Returns true if `ext` (lower-case, leading dot) belongs to this category.
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }

    /// Returns the extensions of this category in sorted order.
    pub fn sorted_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

/// Ordered mapping from category name to its extension set.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Creates a table from categories in lookup order.
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Returns the categories in lookup order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns the category names in lookup order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(Category::dir_name)
    }

    /// Returns true if a category with this directory name exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Classifies a file by the extension of its name.
    ///
    /// Returns `None` for names without an extension or with an extension no
    /// category claims. That is a normal outcome, not an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldersort::file_category::CategoryTable;
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.classify("A.JPG").map(|c| c.dir_name()), Some("images"));
    /// assert!(table.classify("Makefile").is_none());
    /// ```
    pub fn classify(&self, file_name: &str) -> Option<&Category> {
        self.classify_extension(&extension_of(file_name))
    }

    /// Looks up an already extracted extension (lower-case, leading dot).
    pub fn classify_extension(&self, ext: &str) -> Option<&Category> {
        if ext.is_empty() {
            return None;
        }
        self.categories.iter().find(|category| category.contains(ext))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_CATEGORIES
                .iter()
                .map(|(name, exts)| Category::new(*name, exts.iter()))
                .collect(),
        )
    }
}

/// Extracts the lower-cased extension of a file name, leading dot included.
///
/// Names without an extension (including dotfiles such as `.bashrc`) yield an
/// empty string. A trailing dot yields `"."`.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Guesses an extension from the leading bytes of a file using `infer`.
///
/// Returns `None` when the file cannot be read or its content is not a
/// recognized format.
pub fn sniff_extension(path: &Path) -> Option<String> {
    infer::get_from_path(path)
        .ok()
        .flatten()
        .map(|kind| format!(".{}", kind.extension()))
}

/// Lower-cases an extension and makes sure it starts with a dot.
pub(crate) fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{}", lower))
    }
}
