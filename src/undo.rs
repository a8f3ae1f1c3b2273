/// Undo support: replay the move log backwards.
///
/// Moves recorded by an organize run are reversed last-first, so renames and
/// folder effects unwind in the opposite order they were applied.
use crate::file_organizer::{FileOrganizer, MoveLog, OrganizeError, OrganizeResult};
use std::fs;
use std::path::{Path, PathBuf};

/// What an undo run did.
#[derive(Debug)]
pub enum UndoOutcome {
    /// The move log had no recorded moves; nothing was touched.
    NothingToUndo,
    /// The log was replayed and cleared.
    Restored(UndoReport),
}

/// Tally of an undo pass.
#[derive(Debug)]
pub struct UndoReport {
    /// Files moved back to their original paths.
    pub restored: usize,
    /// Records whose moved-to file was gone, with the reason for the skip.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Replays and clears the move log of a directory.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the moves recorded for `base_path`.
    ///
    /// Records are processed in strict reverse (LIFO) order. A record whose
    /// moved-to file no longer exists is skipped with a warning; any other
    /// failure is fatal and leaves the log as it was, since the log is only
    /// cleared and persisted after the full reverse pass completes.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use desktidy::undo::{UndoManager, UndoOutcome};
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/tmp/inbox"))? {
    ///     UndoOutcome::NothingToUndo => println!("nothing to undo"),
    ///     UndoOutcome::Restored(report) => println!("restored {}", report.restored),
    /// }
    /// # Ok::<(), desktidy::file_organizer::OrganizeError>(())
    /// ```
    pub fn undo(base_path: &Path) -> OrganizeResult<UndoOutcome> {
        let mut log = MoveLog::load(base_path)?;
        if log.moves.is_empty() {
            return Ok(UndoOutcome::NothingToUndo);
        }

        let mut report = UndoReport {
            restored: 0,
            skipped: Vec::new(),
        };

        for record in log.moves.iter().rev() {
            if !record.to.exists() {
                report.skipped.push((
                    record.to.clone(),
                    "file no longer at its recorded location".to_string(),
                ));
                continue;
            }

            if let Some(parent) = record.from.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    OrganizeError::DirectoryCreationFailed {
                        path: parent.to_path_buf(),
                        source: e,
                    }
                })?;
            }

            // Restoration is collision-safe too: an occupied original path
            // gets the timestamp-suffix treatment instead of being replaced.
            FileOrganizer::safe_move(&record.to, &record.from)?;
            report.restored += 1;
        }

        // Clearing happens only after the full reverse pass, skips included.
        log.clear();
        log.save(base_path)?;

        Ok(UndoOutcome::Restored(report))
    }
}
