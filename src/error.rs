use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the fallible edges of the crate (snapshots and config files).
///
/// Numerical code never returns errors: an undersized buffer makes `learn` a no-op
/// and shape mismatches panic inside burn.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to record module at {path}: {message}")]
    Recorder { path: PathBuf, message: String },
    #[error("failed to load config from {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
