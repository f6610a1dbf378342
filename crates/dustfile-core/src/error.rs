//! Error types for inventory runs.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end the walk of a single root.
///
/// None of these abort a whole run: the collector reports them per root and
/// moves on to the next one.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Path is not a regular file.
    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// The error policy asked for the walk to stop.
    #[error("Walk aborted at {path}: {message}")]
    Aborted { path: PathBuf, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// Non-fatal warning encountered during a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from an I/O error, picking the kind from the error.
    pub fn from_io(path: impl Into<PathBuf>, error: &io::Error, fallback: WarningKind) -> Self {
        let kind = if error.kind() == io::ErrorKind::PermissionDenied {
            WarningKind::PermissionDenied
        } else {
            fallback
        };
        Self::new(path, error.to_string(), kind)
    }
}

/// What to do with a per-entry error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Skip the entry without reporting it.
    Suppress,
    /// Skip the entry and report it.
    Log,
    /// Stop walking the current root.
    Abort,
}

/// Decides how per-entry filesystem errors are handled during a walk.
pub trait ErrorPolicy: Send + Sync {
    fn classify(&self, error: &io::Error) -> ErrorAction;
}

/// Suppresses access-denied errors and logs everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorPolicy;

/// `ERROR_CANT_ACCESS_FILE`: the file cannot be accessed by the system.
#[cfg(windows)]
const ERROR_CANT_ACCESS_FILE: i32 = 1920;

impl ErrorPolicy for DefaultErrorPolicy {
    fn classify(&self, error: &io::Error) -> ErrorAction {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return ErrorAction::Suppress;
        }
        #[cfg(windows)]
        if error.raw_os_error() == Some(ERROR_CANT_ACCESS_FILE) {
            return ErrorAction::Suppress;
        }
        ErrorAction::Log
    }
}
