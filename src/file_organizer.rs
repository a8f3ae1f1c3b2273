/// File movement and move logging.
///
/// This module owns the mechanics of an organization run: collision-safe
/// renames, the per-directory sidecar log that records every move, and the
/// informational report written after an execute run.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the sidecar log kept inside the organized directory.
pub const LOG_FILE_NAME: &str = ".desktidy_log.json";

/// Name of the per-run summary written next to the sidecar log.
pub const REPORT_FILE_NAME: &str = "report.json";

/// One completed move: where the file was and where it ended up.
///
/// Both paths are absolute. Records are immutable once created and owned by
/// the [`MoveLog`] of their directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// The persisted, ordered record of moves for one directory.
///
/// Sequence order is append order, which is chronological move order; undo
/// replays it back to front. Serialized in full to [`LOG_FILE_NAME`] on every
/// save (no incremental appends).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveLog {
    #[serde(default)]
    pub moves: Vec<MoveRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
}

impl MoveLog {
    fn log_file_path(base_path: &Path) -> PathBuf {
        base_path.join(LOG_FILE_NAME)
    }

    /// Loads the log for a directory, or a fresh empty log when no sidecar
    /// file exists yet.
    ///
    /// A sidecar that exists but does not parse is a fatal
    /// [`OrganizeError::LogFormat`]; the log is never silently reset.
    pub fn load(base_path: &Path) -> OrganizeResult<Self> {
        let log_path = Self::log_file_path(base_path);
        if !log_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&log_path)
            .map_err(|e| OrganizeError::LogReadFailed { source: e })?;

        serde_json::from_str(&contents).map_err(|e| OrganizeError::LogFormat {
            reason: e.to_string(),
        })
    }

    /// Serializes the log and overwrites the sidecar file in full.
    pub fn save(&self, base_path: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::LogWriteFailed {
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            }
        })?;

        fs::write(Self::log_file_path(base_path), json)
            .map_err(|e| OrganizeError::LogWriteFailed { source: e })
    }

    /// Appends records and stamps `last_run`. Returns the stamp so callers
    /// can reuse it (the report carries the same timestamp).
    pub fn append(&mut self, records: Vec<MoveRecord>) -> DateTime<Utc> {
        let stamp = Utc::now();
        self.moves.extend(records);
        self.last_run = Some(stamp);
        stamp
    }

    /// Empties the move sequence and drops the `last_run` stamp. Callers
    /// persist the cleared log with [`MoveLog::save`].
    pub fn clear(&mut self) {
        self.moves.clear();
        self.last_run = None;
    }
}

/// Disposable per-run summary, written once after each execute run.
///
/// Nothing reads it back; it exists for the user, not for undo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub moved_count: usize,
    pub moved: Vec<MoveRecord>,
    pub timestamp: DateTime<Utc>,
}

impl Report {
    pub fn new(moved: Vec<MoveRecord>, timestamp: DateTime<Utc>) -> Self {
        Self {
            moved_count: moved.len(),
            moved,
            timestamp,
        }
    }

    /// Overwrites the report file in the organized directory.
    pub fn write(&self, base_path: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::ReportWriteFailed {
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            }
        })?;

        fs::write(base_path.join(REPORT_FILE_NAME), json)
            .map_err(|e| OrganizeError::ReportWriteFailed { source: e })
    }
}

/// Errors that can occur while organizing or undoing.
#[derive(Debug)]
pub enum OrganizeError {
    /// The source path is missing or not a directory.
    InvalidSource { path: PathBuf },
    /// Failed to create a category (or restoration parent) directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file.
    FileMoveFailure {
        source_path: PathBuf,
        destination: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the sidecar log.
    LogReadFailed { source: std::io::Error },
    /// Failed to write the sidecar log.
    LogWriteFailed { source: std::io::Error },
    /// Sidecar log exists but is not parseable.
    LogFormat { reason: String },
    /// Failed to write the run report.
    ReportWriteFailed { source: std::io::Error },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSource { path } => {
                write!(f, "directory not found: {}", path.display())
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(f, "failed to create directory {}: {}", path.display(), source)
            }
            Self::FileMoveFailure {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "failed to move {} to {}: {}",
                    source_path.display(),
                    destination.display(),
                    source
                )
            }
            Self::LogReadFailed { source } => {
                write!(f, "failed to read move log: {}", source)
            }
            Self::LogWriteFailed { source } => {
                write!(f, "failed to write move log: {}", source)
            }
            Self::LogFormat { reason } => {
                write!(f, "move log is corrupt: {}", reason)
            }
            Self::ReportWriteFailed { source } => {
                write!(f, "failed to write report: {}", source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for organize and undo operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Moves files into category subdirectories, renaming on collision.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `source` to `destination` as a single rename, disambiguating
    /// with a timestamp suffix when the destination is already taken.
    ///
    /// The suffix is a second-resolution sortable stamp inserted between the
    /// file stem and its extension ("photo.png" -> "photo_20260807153000.png").
    /// A single attempt is made; two collisions within the same second are
    /// accepted as a residual race. Returns the path actually used.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use desktidy::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let realized = FileOrganizer::safe_move(
    ///     Path::new("/tmp/inbox/photo.png"),
    ///     Path::new("/tmp/inbox/Images/photo.png"),
    /// )?;
    /// println!("landed at {}", realized.display());
    /// # Ok::<(), desktidy::file_organizer::OrganizeError>(())
    /// ```
    pub fn safe_move(source: &Path, destination: &Path) -> OrganizeResult<PathBuf> {
        let destination = if destination.exists() {
            Self::timestamped_destination(destination)
        } else {
            destination.to_path_buf()
        };

        fs::rename(source, &destination).map_err(|e| OrganizeError::FileMoveFailure {
            source_path: source.to_path_buf(),
            destination: destination.clone(),
            source: e,
        })?;

        Ok(destination)
    }

    /// Builds the disambiguated name for an occupied destination.
    fn timestamped_destination(destination: &Path) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let stem = destination
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("file");

        let renamed = match destination.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}_{}.{}", stem, stamp, ext),
            None => format!("{}_{}", stem, stamp),
        };

        match destination.parent() {
            Some(parent) => parent.join(renamed),
            None => PathBuf::from(renamed),
        }
    }

    /// Moves a file into a category subfolder of `base_path`, creating the
    /// subfolder if needed, and returns the record of the move.
    pub fn move_to_category(
        base_path: &Path,
        file_path: &Path,
        category_dir_name: &str,
    ) -> OrganizeResult<MoveRecord> {
        let category_path = base_path.join(category_dir_name);
        if !category_path.exists() {
            fs::create_dir(&category_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: category_path.clone(),
                source: e,
            })?;
        }

        let file_name =
            file_path
                .file_name()
                .ok_or_else(|| OrganizeError::FileMoveFailure {
                    source_path: file_path.to_path_buf(),
                    destination: category_path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "file has no name component",
                    ),
                })?;

        let destination = category_path.join(file_name);
        let realized = Self::safe_move(file_path, &destination)?;

        Ok(MoveRecord {
            from: file_path.to_path_buf(),
            to: realized,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_to_category_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("report.pdf");
        fs::write(&file_path, "pdf data").expect("Failed to write test file");

        let record = FileOrganizer::move_to_category(base_path, &file_path, "Documents")
            .expect("Failed to move file");

        let category_dir = base_path.join("Documents");
        assert!(category_dir.is_dir());
        assert!(!file_path.exists());
        assert_eq!(record.from, file_path);
        assert_eq!(record.to, category_dir.join("report.pdf"));
        assert!(record.to.exists());
    }

    #[test]
    fn test_move_to_category_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        fs::create_dir(base_path.join("Images")).expect("Failed to create category directory");
        let file_path = base_path.join("photo.png");
        fs::write(&file_path, "image data").expect("Failed to write test file");

        FileOrganizer::move_to_category(base_path, &file_path, "Images")
            .expect("Failed to move file");

        assert!(base_path.join("Images").join("photo.png").exists());
    }

    #[test]
    fn test_safe_move_renames_on_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let incumbent = base_path.join("photo.png");
        fs::write(&incumbent, "old").expect("Failed to write incumbent");

        let source = base_path.join("new_photo.png");
        fs::write(&source, "new").expect("Failed to write source");

        let realized =
            FileOrganizer::safe_move(&source, &incumbent).expect("Failed to safe-move file");

        // Incumbent untouched; newcomer got a stem_timestamp.ext name.
        assert_eq!(fs::read_to_string(&incumbent).unwrap(), "old");
        assert_ne!(realized, incumbent);
        let name = realized.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("photo_"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "photo_.png".len() + 14);
        assert_eq!(fs::read_to_string(&realized).unwrap(), "new");
    }

    #[test]
    fn test_safe_move_returns_plain_destination_without_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let source = base_path.join("song.mp3");
        fs::write(&source, "audio").expect("Failed to write source");
        let destination = base_path.join("moved.mp3");

        let realized =
            FileOrganizer::safe_move(&source, &destination).expect("Failed to safe-move file");

        assert_eq!(realized, destination);
        assert!(!source.exists());
    }

    #[test]
    fn test_safe_move_missing_source_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let result = FileOrganizer::safe_move(
            &base_path.join("ghost.txt"),
            &base_path.join("moved.txt"),
        );
        assert!(matches!(
            result,
            Err(OrganizeError::FileMoveFailure { .. })
        ));
    }

    #[test]
    fn test_log_load_absent_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let log = MoveLog::load(temp_dir.path()).expect("Failed to load log");
        assert!(log.moves.is_empty());
        assert!(log.last_run.is_none());
    }

    #[test]
    fn test_log_save_and_load_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let mut log = MoveLog::default();
        let stamp = log.append(vec![MoveRecord {
            from: base_path.join("a.png"),
            to: base_path.join("Images").join("a.png"),
        }]);
        log.save(base_path).expect("Failed to save log");

        let reloaded = MoveLog::load(base_path).expect("Failed to reload log");
        assert_eq!(reloaded.moves.len(), 1);
        assert_eq!(reloaded.moves[0].from, base_path.join("a.png"));
        assert_eq!(reloaded.last_run, Some(stamp));
    }

    #[test]
    fn test_log_corrupt_sidecar_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        fs::write(base_path.join(LOG_FILE_NAME), "{ not json").expect("Failed to write sidecar");

        let result = MoveLog::load(base_path);
        assert!(matches!(result, Err(OrganizeError::LogFormat { .. })));
    }

    #[test]
    fn test_log_clear_empties_moves_and_stamp() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let mut log = MoveLog::default();
        log.append(vec![MoveRecord {
            from: base_path.join("a.txt"),
            to: base_path.join("Documents").join("a.txt"),
        }]);
        log.clear();
        log.save(base_path).expect("Failed to save cleared log");

        let reloaded = MoveLog::load(base_path).expect("Failed to reload log");
        assert!(reloaded.moves.is_empty());
        assert!(reloaded.last_run.is_none());
    }

    #[test]
    fn test_report_write() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let moved = vec![MoveRecord {
            from: base_path.join("a.png"),
            to: base_path.join("Images").join("a.png"),
        }];
        let report = Report::new(moved, Utc::now());
        report.write(base_path).expect("Failed to write report");

        let contents = fs::read_to_string(base_path.join(REPORT_FILE_NAME))
            .expect("Failed to read report");
        let parsed: Report = serde_json::from_str(&contents).expect("Report should parse");
        assert_eq!(parsed.moved_count, 1);
        assert_eq!(parsed.moved.len(), 1);
    }
}
