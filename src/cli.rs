//! Command-line orchestration for desktidy.
//!
//! Ties the pieces together: resolving the source directory, scanning its
//! direct children, classifying and moving files, recording moves in the
//! sidecar log, and handling the undo path.

use crate::config::FilterConfig;
use crate::file_category::{Category, CategoryMap, file_extension};
use crate::file_organizer::{
    FileOrganizer, LOG_FILE_NAME, MoveLog, MoveRecord, OrganizeError, REPORT_FILE_NAME, Report,
};
use crate::output::OutputFormatter;
use crate::undo::{UndoManager, UndoOutcome};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A scanned file eligible for organization.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// The file name.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// The dotted extension ("" when the file has none).
    pub extension: String,
    /// Content-sniffed MIME type, shown in listings only.
    pub mime_type: Option<String>,
    /// The category the extension maps to.
    pub category: Category,
}

/// A command to execute.
#[derive(Debug, Clone, Copy)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize {
        /// If true, plan and announce but mutate nothing.
        dry_run: bool,
    },
    /// Replay the move log backwards.
    Undo,
}

/// Runs the given command against a directory.
///
/// # Examples
///
/// ```no_run
/// use desktidy::cli::{OrganizeCommand, run_cli};
/// use std::path::Path;
///
/// if let Err(e) = run_cli(OrganizeCommand::Organize { dry_run: true }, Path::new("/tmp/inbox")) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path) -> Result<(), String> {
    run_cli_with_config(command, dir_path, None)
}

/// Runs the given command with an explicit filter-rules file.
pub fn run_cli_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), String> {
    match command {
        OrganizeCommand::Organize { dry_run } => {
            if dry_run {
                organize_directory_dry_run(dir_path, config_path)
            } else {
                organize_directory(dir_path, config_path)
            }
        }
        OrganizeCommand::Undo => undo_organization(dir_path),
    }
}

/// Canonicalizes the source path and insists it is a directory.
fn resolve_source(dir_path: &Path) -> Result<PathBuf, String> {
    let invalid = || {
        OrganizeError::InvalidSource {
            path: dir_path.to_path_buf(),
        }
        .to_string()
    };

    let resolved = fs::canonicalize(dir_path).map_err(|_| invalid())?;
    if !resolved.is_dir() {
        return Err(invalid());
    }
    Ok(resolved)
}

/// Enumerates the direct children of `base_path` that are eligible for
/// organization: regular files only, minus the sidecar log, the report file,
/// and anything the filter rules exclude. Entries come back sorted by name
/// since directory iteration order is filesystem-dependent.
fn scan_directory(base_path: &Path, config_path: Option<&Path>) -> Result<Vec<FileInfo>, String> {
    let config = FilterConfig::load(config_path)
        .map_err(|e| format!("error loading configuration: {}", e))?;
    let filter = config
        .compile()
        .map_err(|e| format!("error compiling filter rules: {}", e))?;

    let entries = fs::read_dir(base_path)
        .map_err(|e| format!("error reading directory {}: {}", base_path.display(), e))?;

    let mapper = CategoryMap::new();
    let mut files: Vec<FileInfo> = Vec::new();

    for entry in entries.flatten() {
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            let name = entry.file_name().to_string_lossy().to_string();
            // The sidecar log and report describe previous runs; they are
            // never classified or moved.
            if name == LOG_FILE_NAME || name == REPORT_FILE_NAME {
                continue;
            }
            if filter.is_ignored(&name) {
                continue;
            }
            files.push(inspect_file(name, entry.path(), &mapper));
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn inspect_file(name: String, path: PathBuf, mapper: &CategoryMap) -> FileInfo {
    let extension = file_extension(&path);
    let category = mapper.category_for(&extension);
    let mime_type = sniff_mime(&path);

    FileInfo {
        name,
        path,
        extension,
        mime_type,
        category,
    }
}

/// Content-based MIME detection for listing lines. Display only:
/// classification stays extension-driven so repeated runs are deterministic.
fn sniff_mime(path: &Path) -> Option<String> {
    let mut head = [0u8; 8192];
    let mut file = fs::File::open(path).ok()?;
    let read = file.read(&mut head).ok()?;
    infer::get(&head[..read]).map(|kind| kind.mime_type().to_string())
}

fn mime_suffix(info: &FileInfo) -> String {
    match &info.mime_type {
        Some(mime) => format!(" ({})", mime),
        None => String::new(),
    }
}

/// Organizes the direct children of a directory into category subfolders,
/// recording every move in the sidecar log and writing a run report.
pub fn organize_directory(base_path: &Path, config_path: Option<&Path>) -> Result<(), String> {
    let base_path = resolve_source(base_path)?;
    OutputFormatter::info(&format!("Organizing contents of: {}", base_path.display()));

    let mut log = MoveLog::load(&base_path).map_err(|e| e.to_string())?;
    let files = scan_directory(&base_path, config_path)?;

    if files.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::header("Organizing files");
    let progress = OutputFormatter::create_progress_bar(files.len() as u64);
    let mut records: Vec<MoveRecord> = Vec::new();
    let mut category_counts: HashMap<String, usize> = HashMap::new();

    for info in &files {
        let category_dir = info.category.dir_name();
        match FileOrganizer::move_to_category(&base_path, &info.path, category_dir) {
            Ok(record) => {
                progress.println(format!(
                    " - {}{} -> {}/",
                    info.name,
                    mime_suffix(info),
                    category_dir
                ));
                *category_counts.entry(category_dir.to_string()).or_insert(0) += 1;
                records.push(record);
                progress.inc(1);
            }
            Err(e) => {
                // One failing move aborts the batch. Files moved before the
                // failure stay moved but are not recorded, since the log is
                // only persisted after the full loop.
                progress.abandon();
                OutputFormatter::warning(
                    "Organization aborted; moves made before the failure were not logged.",
                );
                return Err(e.to_string());
            }
        }
    }
    progress.finish_and_clear();

    if !records.is_empty() {
        let moved = records.clone();
        let stamp = log.append(records);
        log.save(&base_path).map_err(|e| e.to_string())?;
        Report::new(moved, stamp)
            .write(&base_path)
            .map_err(|e| e.to_string())?;
    }

    OutputFormatter::summary_table(&category_counts, files.len());
    OutputFormatter::success("Organization complete!");
    OutputFormatter::plain(&format!(
        "Use 'desktidy --source {} --undo' to revert.",
        base_path.display()
    ));

    Ok(())
}

/// Plans an organization run without touching the filesystem.
pub fn organize_directory_dry_run(
    base_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let base_path = resolve_source(base_path)?;
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", base_path.display()));

    // A corrupt sidecar should surface in a dry run too, before any planning.
    MoveLog::load(&base_path).map_err(|e| e.to_string())?;

    let files = scan_directory(&base_path, config_path)?;
    if files.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::header("Files would be organized as follows");
    let mut category_counts: HashMap<String, usize> = HashMap::new();

    for info in &files {
        OutputFormatter::plain(&format!(
            " - {}{} -> {}/",
            info.name,
            mime_suffix(info),
            info.category.dir_name()
        ));
        *category_counts
            .entry(info.category.dir_name().to_string())
            .or_insert(0) += 1;
    }

    OutputFormatter::summary_table(&category_counts, files.len());
    OutputFormatter::success("Dry run complete. No files were modified.");

    Ok(())
}

/// Replays the move log backwards and reports the result.
fn undo_organization(dir_path: &Path) -> Result<(), String> {
    let base_path = resolve_source(dir_path)?;
    OutputFormatter::info(&format!(
        "Undoing previous organization in: {}",
        base_path.display()
    ));

    match UndoManager::undo(&base_path).map_err(|e| e.to_string())? {
        UndoOutcome::NothingToUndo => {
            OutputFormatter::plain("No recorded moves to undo.");
        }
        UndoOutcome::Restored(report) => {
            OutputFormatter::success(&format!(
                "Undo complete. Restored {} file{}.",
                report.restored,
                if report.restored == 1 { "" } else { "s" }
            ));
            if !report.skipped.is_empty() {
                OutputFormatter::warning(&format!("Skipped {}:", report.skipped.len()));
                for (path, reason) in &report.skipped {
                    OutputFormatter::plain(&format!("  - {}: {}", path.display(), reason));
                }
            }
        }
    }

    Ok(())
}
