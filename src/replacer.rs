use crate::errors::Result;
use crate::reporter::{Event, Reporter, TracingReporter};
use crate::substitution::{Transform, build_transform};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Counters from a content replacement walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Regular files that were read.
    pub scanned: usize,
    /// Files that were rewritten, or would have been in a dry run.
    pub changed: usize,
    /// Lines that differ across all changed files.
    pub lines_changed: usize,
    /// Non-text files and symlinks that were left alone.
    pub skipped: usize,
    /// Directories or files that could not be read or written.
    pub errors: usize,
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    NotText,
    /// The file was (or would be) rewritten; `lines` of it differ.
    Rewritten { lines: usize },
}

/// Executes the `replace` command.
pub fn run_replace(
    path: PathBuf,
    old_pattern: String,
    new_pattern: String,
    regex: bool,
    dry_run: bool,
) -> Result<()> {
    let transform = build_transform(&old_pattern, &new_pattern, regex)?;
    let summary = walk(&path, transform.as_ref(), dry_run, &TracingReporter);

    println!("\n{}", "-".repeat(50));
    println!("Files scanned : {}", summary.scanned);
    println!("Files changed : {}", summary.changed);
    println!("Total edits   : {}", summary.lines_changed);
    if summary.skipped > 0 {
        println!("Files skipped : {}", summary.skipped);
    }
    if summary.errors > 0 {
        println!("Errors        : {}", summary.errors);
    }
    if dry_run {
        println!("\nPlease note that the above doesn't happen as it's a dry run");
    }

    Ok(())
}

/// Rewrites the content of every text file below `root`.
///
/// Nothing here aborts the walk: a missing root, an unreadable directory or
/// a file that cannot be opened or replaced is reported as `Event::Failed`
/// and counted, and the walk moves on. Files that are not UTF-8 and
/// symlinks are never touched.
pub fn walk(
    root: &Path,
    transform: &dyn Transform,
    dry_run: bool,
    reporter: &dyn Reporter,
) -> ReplaceSummary {
    let mut summary = ReplaceSummary::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report_walk_error(&err, root, reporter);
                summary.errors += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            reporter.report(Event::Symlink {
                path: entry.path().to_path_buf(),
            });
            summary.skipped += 1;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        summary.scanned += 1;
        match process_file(entry.path(), transform, dry_run, reporter) {
            Ok(FileOutcome::Rewritten { lines }) => {
                summary.changed += 1;
                summary.lines_changed += lines;
            }
            Ok(FileOutcome::NotText) => summary.skipped += 1,
            Ok(FileOutcome::Unchanged) => {}
            Err(e) => {
                reporter.report(Event::Failed {
                    path: entry.path().to_path_buf(),
                    message: e.to_string(),
                });
                summary.errors += 1;
            }
        }
    }

    summary
}

/// Applies the transform to one file.
///
/// The whole text decides whether anything would change. The rewrite itself
/// goes line by line into a temp file next to the original, so a match that
/// spans a line break is never replaced. Outside a dry run the temp file then
/// atomically takes the original's place, keeping its permissions.
pub fn process_file(
    path: &Path,
    transform: &dyn Transform,
    dry_run: bool,
    reporter: &dyn Reporter,
) -> Result<FileOutcome> {
    let Ok(content) = String::from_utf8(fs::read(path)?) else {
        reporter.report(Event::NotText {
            path: path.to_path_buf(),
        });
        return Ok(FileOutcome::NotText);
    };

    if transform.apply(&content) == content.as_str() {
        reporter.report(Event::Unchanged {
            path: path.to_path_buf(),
        });
        return Ok(FileOutcome::Unchanged);
    }

    let (temp_file, lines) = write_transformed(path, transform, reporter)?;
    if lines == 0 {
        reporter.report(Event::Unchanged {
            path: path.to_path_buf(),
        });
        return Ok(FileOutcome::Unchanged);
    }

    if !dry_run {
        let perms = fs::metadata(path)?.permissions();
        fs::set_permissions(temp_file.path(), perms)?;
        temp_file.persist(path)?;
        reporter.report(Event::Rewritten {
            path: path.to_path_buf(),
        });
    }

    Ok(FileOutcome::Rewritten { lines })
}

/// Streams `path` through the transform into a fresh temp file in the same
/// directory, reporting every line that changes.
///
/// The temp file is deleted when the returned handle is dropped, so an early
/// return leaves nothing behind.
fn write_transformed(
    path: &Path,
    transform: &dyn Transform,
    reporter: &dyn Reporter,
) -> Result<(NamedTempFile, usize)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(dir)?;
    let mut reader = BufReader::new(File::open(path)?);
    let mut writer = BufWriter::new(temp_file.as_file_mut());

    let mut changed = 0;
    let mut line_number = 0;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_number += 1;

        let new_line = transform.apply(&line);
        writer.write_all(new_line.as_bytes())?;
        if new_line != line {
            changed += 1;
            reporter.report(Event::LineChanged {
                path: path.to_path_buf(),
                line: line_number,
                before: line.clone(),
                after: new_line.into_owned(),
            });
        }
    }
    writer.flush()?;
    drop(writer);

    Ok((temp_file, changed))
}

fn report_walk_error(err: &walkdir::Error, root: &Path, reporter: &dyn Reporter) {
    let path = err.path().unwrap_or(root).to_path_buf();
    let message = match err.io_error() {
        Some(io) if io.kind() == ErrorKind::NotFound && err.depth() == 0 => {
            "No such directory".to_string()
        }
        _ => err.to_string(),
    };
    reporter.report(Event::Failed { path, message });
}
