//! Error types for t
//!
//! Exit codes:
//! - 0: Success
//! - 1: User error (unknown or ambiguous reference, empty text, bad substitution)
//! - 2: Fatal (task file is a directory, I/O failure, bad config)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the t CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 1;
    pub const FATAL: i32 = 2;
}

#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 1)
    #[error("The ID \"{0}\" does not match any task.")]
    UnknownReference(String),

    #[error("The ID \"{0}\" matches more than one task.")]
    AmbiguousReference(String),

    #[error("Task text must not be empty")]
    EmptyText,

    #[error("Task text cannot start with '#' or span several lines: \"{0}\"")]
    UnstorableText(String),

    #[error("Invalid substitution \"{0}\": expected s/<find>/<replace>")]
    InvalidSubstitution(String),

    // Fatal (exit code 2)
    #[error("Invalid task file: '{}'", .0.display())]
    InvalidStorageLocation(PathBuf),

    #[error("Invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownReference(_)
            | Error::AmbiguousReference(_)
            | Error::EmptyText
            | Error::UnstorableText(_)
            | Error::InvalidSubstitution(_) => exit_codes::USER_ERROR,
            Error::InvalidStorageLocation(_) | Error::Config { .. } | Error::Io(_) => {
                exit_codes::FATAL
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
