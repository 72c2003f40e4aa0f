//! Error types for project indexing and retrieval.

use std::fmt;
use std::path::PathBuf;

/// Errors surfaced to callers of [`ProjectIndex`](super::ProjectIndex) and
/// [`Retriever`](super::Retriever).
#[derive(Debug)]
pub enum ProjectError {
    /// The directory to index does not exist or is not a directory.
    DirectoryNotFound(PathBuf),
    /// A query was issued while no project blocks are loaded.
    EmptyIndex,
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::DirectoryNotFound(path) => {
                write!(f, "Directory not found: {}", path.display())
            }
            ProjectError::EmptyIndex => write!(f, "No project loaded"),
        }
    }
}

impl std::error::Error for ProjectError {}

/// Why a single file was left out of an index. Never fatal to a build.
#[derive(Debug)]
pub enum FileSkip {
    Unreadable(std::io::Error),
    NotUtf8,
}

impl fmt::Display for FileSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSkip::Unreadable(err) => write!(f, "unreadable: {err}"),
            FileSkip::NotUtf8 => write!(f, "not valid UTF-8"),
        }
    }
}
