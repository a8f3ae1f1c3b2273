/// File classification for organizing files by extension.
///
/// Maps a file's dotted extension (".png", ".pdf", ...) to one of the fixed
/// category folders. The table is built once at startup and never mutated;
/// classification is a pure lookup.
///
/// # Examples
///
/// ```
/// use desktidy::file_category::{Category, CategoryMap};
///
/// let map = CategoryMap::new();
/// assert_eq!(map.category_for(".png"), Category::Images);
/// assert_eq!(map.category_for(".PDF"), Category::Documents);
/// assert_eq!(map.category_for(".xyz"), Category::Others);
/// ```
use std::collections::HashMap;
use std::path::Path;

/// A destination folder for organized files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (PNG, JPG, SVG, ...)
    Images,
    /// Document files (PDF, DOCX, TXT, ...)
    Documents,
    /// Archive files (ZIP, TAR, 7Z, ...)
    Archives,
    /// Source code and markup files
    Code,
    /// Audio files (MP3, WAV, FLAC, ...)
    Audio,
    /// Video files (MP4, MKV, MOV, ...)
    Video,
    /// Everything without a recognized extension
    Others,
}

impl Category {
    /// Returns the subfolder name used for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use desktidy::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Audio => "Audio",
            Category::Video => "Video",
            Category::Others => "Others",
        }
    }
}

/// Maps dotted file extensions to categories.
///
/// Keys are stored lowercase with the leading dot; lookups normalize their
/// input the same way, so classification is case-insensitive.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    extension_map: HashMap<String, Category>,
}

impl CategoryMap {
    /// Creates the standard category table.
    pub fn new() -> Self {
        let mut map = Self {
            extension_map: HashMap::new(),
        };
        map.populate_standard_mappings();
        map
    }

    fn populate_standard_mappings(&mut self) {
        for ext in [".png", ".jpg", ".jpeg", ".gif", ".bmp", ".svg", ".webp"] {
            self.add_extension(ext, Category::Images);
        }
        for ext in [
            ".pdf", ".docx", ".doc", ".xlsx", ".xls", ".pptx", ".txt", ".md",
        ] {
            self.add_extension(ext, Category::Documents);
        }
        for ext in [".zip", ".tar", ".gz", ".rar", ".7z"] {
            self.add_extension(ext, Category::Archives);
        }
        for ext in [
            ".py", ".js", ".ts", ".java", ".c", ".cpp", ".h", ".html", ".css", ".json",
        ] {
            self.add_extension(ext, Category::Code);
        }
        for ext in [".mp3", ".wav", ".flac", ".aac"] {
            self.add_extension(ext, Category::Audio);
        }
        for ext in [".mp4", ".mkv", ".mov", ".avi"] {
            self.add_extension(ext, Category::Video);
        }
    }

    fn add_extension(&mut self, ext: &str, category: Category) {
        self.extension_map.insert(ext.to_lowercase(), category);
    }

    /// Returns the category for a dotted extension.
    ///
    /// Total over all strings: unmatched (or empty) extensions fall back to
    /// [`Category::Others`].
    pub fn category_for(&self, ext: &str) -> Category {
        self.extension_map
            .get(&ext.to_lowercase())
            .copied()
            .unwrap_or(Category::Others)
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the dotted extension of a path ("photo.PNG" -> ".PNG"), or an
/// empty string when there is none. Only the final suffix counts, so
/// "archive.tar.gz" yields ".gz".
pub fn file_extension(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}
