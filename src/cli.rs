use crate::patterns::Preset;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Recursive rename and find-and-replace over a directory tree.
///
/// Both tools walk the tree depth-first, apply a substitution to every entry
/// name or every line of every text file, and log what changed. `--dry-run`
/// reports the same changes without touching the filesystem.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Recursively rename files or rewrite their contents",
    long_about = "treesub - rename entries or rewrite file contents across a directory tree.

QUICK EXAMPLES:
  treesub rename . ' Volume' ''              # 'Album Volume.flac' -> 'Album.flac'
  treesub rename . --preset zero-pad-track   # 'Track 3.flac' -> 'Track 03.flac'
  treesub replace src/ 'foo' 'bar' --dry-run # Preview a content rewrite

Set RUST_LOG for finer control over log output.",
    arg_required_else_help = true
)]
pub struct Args {
    /// Also log entries that were left alone (-v), or everything (-vv).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// The set of available commands for the `treesub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rename files and directories whose names contain a pattern
    ///
    /// Directory contents are renamed before the directory itself. The
    /// starting directory is never renamed.
    ///
    /// EXAMPLES:
    ///   treesub rename music/ ' Volume' ''
    ///   treesub rename . 'test_(.*)' 'spec_$1' --regex
    ///   treesub rename . --preset strip-track-number --dry-run
    Rename {
        /// The path to start renaming files recursively.
        path: PathBuf,

        /// The old pattern to be replaced.
        #[arg(required_unless_present = "preset")]
        old_pattern: Option<String>,

        /// The new pattern to replace it with.
        #[arg(required_unless_present = "preset")]
        new_pattern: Option<String>,

        /// Use a built-in named transform instead of a pattern pair.
        #[arg(long, value_enum, conflicts_with_all = ["old_pattern", "new_pattern", "regex"])]
        preset: Option<Preset>,

        /// Treat the old pattern as a regex; the new pattern may use `$1`, `$2`, ...
        #[arg(long)]
        regex: bool,

        /// Show what would happen without doing it.
        #[arg(long, alias = "dry_run")]
        dry_run: bool,
    },

    /// Replace a pattern in the contents of every text file
    ///
    /// Files are rewritten line by line through a temp file that atomically
    /// replaces the original. Non UTF-8 files and symlinks are skipped.
    ///
    /// EXAMPLES:
    ///   treesub replace . 'old_name' 'new_name'
    ///   treesub replace src/ 'v(\d+)' 'version $1' --regex --dry-run
    Replace {
        /// The path to start recursively.
        path: PathBuf,

        /// The old pattern to be replaced.
        old_pattern: String,

        /// The new pattern to replace it with.
        new_pattern: String,

        /// Treat the old pattern as a regex; the new pattern may use `$1`, `$2`, ...
        #[arg(long)]
        regex: bool,

        /// Show what would happen without doing it.
        #[arg(long, alias = "dry_run")]
        dry_run: bool,
    },

    /// List the built-in named transforms usable with `rename --preset`
    Presets,
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
