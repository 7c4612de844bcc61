//! `treesub` is a library for recursive rename and find-and-replace over a
//! directory tree.
//!
//! It provides the core logic for the `treesub` command-line tool but can also
//! be used as a standalone library. The main components are:
//!
//! - `substitution`: Literal rulesets, regex rules and the `Transform` trait
//!   they share.
//! - `patterns`: The registry of named, built-in transforms (`Preset`).
//! - `file_renamer`: Renames entries whose names a transform changes,
//!   contents before their directory.
//! - `replacer`: Rewrites text files line by line through an atomic temp file.
//! - `reporter`: The event sink both walkers report to.
//!
//! Everything runs on one thread, in depth-first order, and every walk can be
//! run as a dry run that leaves the filesystem untouched.

pub mod cli;
pub mod errors;
pub mod file_renamer;
pub mod patterns;
pub mod replacer;
pub mod reporter;
pub mod substitution;

// Re-export main types for easier access by library users.
pub use errors::{Error, Result};
pub use patterns::Preset;
pub use reporter::{Event, RecordingReporter, Reporter, TracingReporter};
pub use substitution::{RegexRule, Rule, Ruleset, Transform};
