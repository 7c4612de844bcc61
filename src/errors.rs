use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in `treesub`.
///
/// Only failures that abort a walk end up here. Recoverable per-file problems
/// in the content replacer are reported through a `Reporter` instead.
#[derive(Error, Debug)]
pub enum Error {
    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that occurred during regex compilation.
    #[error("Pattern compilation failed: {0}")]
    Regex(#[from] regex::Error),

    /// A general configuration-related error.
    #[error("Config error: {0}")]
    Config(String),

    /// No named transform is registered under this name.
    #[error("Unknown preset '{0}' (run `treesub presets` to list them)")]
    UnknownPreset(String),

    /// A rename would clobber an existing entry.
    #[error("Refusing to rename {from} to {to}: target already exists")]
    TargetExists { from: PathBuf, to: PathBuf },

    /// A transform produced a name that cannot live in the same directory.
    #[error("Cannot rename {from}: '{name}' is not a valid file name")]
    InvalidName { from: PathBuf, name: String },

    /// The filesystem rejected a rename.
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// An error related to persisting a temporary file.
    #[error("Tempfile error: {0}")]
    TempFile(#[from] tempfile::PersistError),

    /// An error from the `walkdir` crate.
    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, treesub::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
