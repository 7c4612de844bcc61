use crate::errors::{Error, Result};
use crate::patterns::Preset;
use crate::reporter::{Event, Reporter, TracingReporter};
use crate::substitution::{Transform, build_transform};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counters from a rename walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenameSummary {
    /// Entries (files and directories) below the root that were looked at.
    pub visited: usize,
    /// Entries that were renamed, or would have been in a dry run.
    pub renamed: usize,
}

/// Executes the `rename` command.
///
/// The transform is either a named preset or the `old_pattern`/`new_pattern`
/// pair, taken literally unless `regex` is set.
pub fn run_rename(
    path: PathBuf,
    old_pattern: Option<String>,
    new_pattern: Option<String>,
    preset: Option<Preset>,
    regex: bool,
    dry_run: bool,
) -> Result<()> {
    let transform: Box<dyn Transform> = match (preset, old_pattern) {
        (Some(preset), None) => Box::new(preset),
        (Some(_), Some(_)) => return Err("Specify either --preset or a pattern, not both".into()),
        (None, Some(old)) => {
            let new = new_pattern.ok_or("Missing <NEW_PATTERN>")?;
            build_transform(&old, &new, regex)?
        }
        (None, None) => return Err("Specify --preset or <OLD_PATTERN> <NEW_PATTERN>".into()),
    };

    let summary = walk(&path, transform.as_ref(), dry_run, &TracingReporter)?;

    println!("\n{}", "-".repeat(50));
    println!("Entries scanned: {}", summary.visited);
    println!("Entries renamed: {}", summary.renamed);
    if dry_run {
        println!("\nPlease note that the above doesn't happen as it's a dry run");
    }

    Ok(())
}

/// Renames every entry below `root` whose name the transform changes.
///
/// A directory's contents are always handled before the directory itself,
/// using the directory's original path, so no path is ever stale and a dry
/// run visits exactly what a real run would. `root` itself is never renamed.
///
/// Any filesystem error aborts the walk. A rename onto a name that exists,
/// or that an earlier rename in this walk already took, fails the same way
/// in a dry run as in a real one.
pub fn walk(
    root: &Path,
    transform: &dyn Transform,
    dry_run: bool,
    reporter: &dyn Reporter,
) -> Result<RenameSummary> {
    let mut summary = RenameSummary::default();
    let mut targets = Targets::default();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        summary.visited += 1;
        if rename_entry(entry.path(), transform, dry_run, &mut targets, reporter)?.is_some() {
            summary.renamed += 1;
        }
    }

    Ok(summary)
}

/// Paths this walk has renamed into and out of.
///
/// A dry run leaves the disk as it was, so collisions with earlier renames
/// are checked against this instead.
#[derive(Debug, Default)]
struct Targets {
    claimed: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl Targets {
    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path)
            || (fs::symlink_metadata(path).is_ok() && !self.vacated.contains(path))
    }

    fn record(&mut self, from: &Path, to: &Path) {
        self.claimed.remove(from);
        self.vacated.insert(from.to_path_buf());
        self.vacated.remove(to);
        self.claimed.insert(to.to_path_buf());
    }
}

/// Renames a single entry if the transform changes its name.
///
/// # Returns
///
/// Returns `Ok(Some(new_path))` if the entry was (or would be) renamed, and `Ok(None)` otherwise.
fn rename_entry(
    path: &Path,
    transform: &dyn Transform,
    dry_run: bool,
    targets: &mut Targets,
    reporter: &dyn Reporter,
) -> Result<Option<PathBuf>> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        reporter.report(Event::NotText {
            path: path.to_path_buf(),
        });
        return Ok(None);
    };

    let new_name = transform.apply(name);
    if new_name == name {
        reporter.report(Event::Ignored {
            path: path.to_path_buf(),
        });
        return Ok(None);
    }

    if !is_plain_file_name(&new_name) {
        return Err(Error::InvalidName {
            from: path.to_path_buf(),
            name: new_name.into_owned(),
        });
    }

    let new_path = path.with_file_name(&*new_name);
    if targets.is_taken(&new_path) {
        return Err(Error::TargetExists {
            from: path.to_path_buf(),
            to: new_path,
        });
    }

    reporter.report(Event::Renamed {
        from: path.to_path_buf(),
        to: new_path.clone(),
    });

    if !dry_run {
        fs::rename(path, &new_path).map_err(|source| Error::Rename {
            from: path.to_path_buf(),
            to: new_path.clone(),
            source,
        })?;
    }
    targets.record(path, &new_path);

    Ok(Some(new_path))
}

/// A name that stays in its parent directory when renamed to.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::RecordingReporter;
    use crate::substitution::Ruleset;
    use tempfile::TempDir;

    /// Every path below `root` with its file contents, sorted.
    fn snapshot(root: &Path) -> Vec<(PathBuf, Option<Vec<u8>>)> {
        let mut entries: Vec<_> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
                let content = e.file_type().is_file().then(|| fs::read(e.path()).unwrap());
                (rel, content)
            })
            .collect();
        entries.sort();
        entries
    }

    fn music_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("Jazz Volume");
        fs::create_dir_all(album.join("Disc Suite")).unwrap();
        fs::write(album.join("Track 3.flac"), "three").unwrap();
        fs::write(album.join("Disc Suite").join("Intro Volume.flac"), "intro").unwrap();
        fs::write(temp_dir.path().join("Album Volume.flac"), "album").unwrap();
        temp_dir
    }

    #[test]
    fn test_strip_volume_and_suite() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Album Volume.flac"), "x").unwrap();

        let reporter = RecordingReporter::new();
        let summary = walk(temp_dir.path(), &Preset::StripVolumeSuite, false, &reporter).unwrap();

        assert_eq!(summary, RenameSummary { visited: 1, renamed: 1 });
        assert!(temp_dir.path().join("Album.flac").exists());
        assert!(!temp_dir.path().join("Album Volume.flac").exists());
    }

    #[test]
    fn test_children_renamed_before_parent() {
        let temp_dir = music_tree();
        let reporter = RecordingReporter::new();

        walk(temp_dir.path(), &Preset::StripVolumeSuite, false, &reporter).unwrap();

        let root = temp_dir.path();
        assert!(root.join("Jazz").join("Disc").join("Intro.flac").exists());
        assert!(root.join("Jazz").join("Track 3.flac").exists());
        assert!(root.join("Album.flac").exists());

        let renames: Vec<PathBuf> = reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Renamed { from, .. } => Some(from.strip_prefix(root).unwrap().to_path_buf()),
                _ => None,
            })
            .collect();
        let pos = |p: &str| renames.iter().position(|r| r == Path::new(p)).unwrap();
        assert!(pos("Jazz Volume/Disc Suite/Intro Volume.flac") < pos("Jazz Volume/Disc Suite"));
        assert!(pos("Jazz Volume/Disc Suite") < pos("Jazz Volume"));
    }

    #[test]
    fn test_dry_run_leaves_tree_untouched() {
        let temp_dir = music_tree();
        let before = snapshot(temp_dir.path());

        let reporter = RecordingReporter::new();
        let summary = walk(temp_dir.path(), &Preset::StripVolumeSuite, true, &reporter).unwrap();

        assert_eq!(summary.renamed, 4);
        assert_eq!(snapshot(temp_dir.path()), before);
    }

    #[test]
    fn test_dry_run_reports_what_a_real_run_does() {
        let dry = music_tree();
        let real = music_tree();

        let dry_reporter = RecordingReporter::new();
        let real_reporter = RecordingReporter::new();
        walk(dry.path(), &Preset::StripVolumeSuite, true, &dry_reporter).unwrap();
        walk(real.path(), &Preset::StripVolumeSuite, false, &real_reporter).unwrap();

        let relative = |events: Vec<Event>, root: &Path| -> Vec<(PathBuf, PathBuf)> {
            events
                .into_iter()
                .filter_map(|e| match e {
                    Event::Renamed { from, to } => Some((
                        from.strip_prefix(root).unwrap().to_path_buf(),
                        to.strip_prefix(root).unwrap().to_path_buf(),
                    )),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(
            relative(dry_reporter.events(), dry.path()),
            relative(real_reporter.events(), real.path())
        );
    }

    #[test]
    fn test_unchanged_names_reported_at_debug() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Track 12.flac"), "x").unwrap();

        let reporter = RecordingReporter::new();
        let summary = walk(temp_dir.path(), &Preset::ZeroPadTrack, false, &reporter).unwrap();

        assert_eq!(summary, RenameSummary { visited: 1, renamed: 0 });
        assert!(matches!(&reporter.events()[..], [Event::Ignored { .. }]));
    }

    #[test]
    fn test_zero_pad_through_walk() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Track 3.flac"), "x").unwrap();
        fs::write(temp_dir.path().join("Track 12.flac"), "y").unwrap();

        walk(temp_dir.path(), &Preset::ZeroPadTrack, false, &RecordingReporter::new()).unwrap();

        assert!(temp_dir.path().join("Track 03.flac").exists());
        assert!(temp_dir.path().join("Track 12.flac").exists());
    }

    #[test]
    fn test_root_is_never_renamed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("foo");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("foo.txt"), "x").unwrap();

        let rules = Ruleset::from_pairs([("foo", "bar")]);
        walk(&root, &rules, false, &RecordingReporter::new()).unwrap();

        assert!(root.join("bar.txt").exists());
        assert!(!temp_dir.path().join("bar").exists());
    }

    #[test]
    fn test_collision_aborts_without_overwriting() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "b").unwrap();

        let rules = Ruleset::from_pairs([("a", "b")]);
        let err = walk(temp_dir.path(), &rules, false, &RecordingReporter::new()).unwrap_err();

        assert!(matches!(err, Error::TargetExists { .. }));
        assert_eq!(fs::read_to_string(temp_dir.path().join("b.txt")).unwrap(), "b");
        assert!(temp_dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_dry_run_sees_collisions_between_siblings() {
        let dry = TempDir::new().unwrap();
        let real = TempDir::new().unwrap();
        for dir in [&dry, &real] {
            fs::write(dir.path().join("a Suite.flac"), "suite").unwrap();
            fs::write(dir.path().join("a Volume.flac"), "volume").unwrap();
        }
        let before = snapshot(dry.path());

        let dry_err = walk(dry.path(), &Preset::StripVolumeSuite, true, &RecordingReporter::new())
            .unwrap_err();
        let real_err = walk(real.path(), &Preset::StripVolumeSuite, false, &RecordingReporter::new())
            .unwrap_err();

        let failed_on = |err: Error, root: &Path| match err {
            Error::TargetExists { from, to } => (
                from.strip_prefix(root).unwrap().to_path_buf(),
                to.strip_prefix(root).unwrap().to_path_buf(),
            ),
            other => panic!("unexpected error {other:?}"),
        };
        let dry_failure = failed_on(dry_err, dry.path());
        assert_eq!(dry_failure, failed_on(real_err, real.path()));
        assert_eq!(dry_failure.0, PathBuf::from("a Volume.flac"));
        assert_eq!(snapshot(dry.path()), before);
    }

    #[test]
    fn test_dry_run_allows_reusing_a_vacated_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "b").unwrap();

        // "a.txt" moves out of the way before "b.txt" takes its name.
        let rules = Ruleset::from_pairs([("a", "c"), ("b", "a")]);
        let dry = walk(temp_dir.path(), &rules, true, &RecordingReporter::new()).unwrap();
        let real = walk(temp_dir.path(), &rules, false, &RecordingReporter::new()).unwrap();

        assert_eq!(dry, real);
        assert_eq!(fs::read_to_string(temp_dir.path().join("a.txt")).unwrap(), "b");
        assert_eq!(fs::read_to_string(temp_dir.path().join("c.txt")).unwrap(), "a");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_is_left_alone() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(OsStr::from_bytes(b"bad\xff Volume"));
        fs::write(&path, "x").unwrap();

        let reporter = RecordingReporter::new();
        let summary = walk(temp_dir.path(), &Preset::StripVolumeSuite, false, &reporter).unwrap();

        assert_eq!(summary, RenameSummary { visited: 1, renamed: 0 });
        assert_eq!(reporter.events(), vec![Event::NotText { path: path.clone() }]);
        assert!(path.exists());
    }

    #[test]
    fn test_rejects_name_with_separator() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a-b.txt"), "x").unwrap();

        let rules = Ruleset::from_pairs([("-", "/")]);
        let err = walk(temp_dir.path(), &rules, false, &RecordingReporter::new()).unwrap_err();

        assert!(matches!(err, Error::InvalidName { .. }));
        assert!(temp_dir.path().join("a-b.txt").exists());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let rules = Ruleset::from_pairs([("a", "b")]);
        let result = walk(
            &temp_dir.path().join("missing"),
            &rules,
            false,
            &RecordingReporter::new(),
        );
        assert!(matches!(result, Err(Error::WalkDir(_))));
    }
}
