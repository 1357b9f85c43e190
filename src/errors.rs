//! Filesystem errors.
//!
//! Every fallible operation in this crate returns an [`FsError`]. The set of variants is closed:
//! an operation either succeeds or fails with exactly one of these.
//!
//! `FsError` converts into an [`io::Error`] carrying the raw Unix error code the failure would
//! have produced on a real system, which lets callers that already speak `std::io` treat this
//! filesystem like any other.
//!
//! [`FsError`]: enum.FsError.html
//! [`io::Error`]: https://doc.rust-lang.org/std/io/struct.Error.html

use std::io;

use thiserror::Error;

/// Raw os error for a file or directory that does not exist.
pub const ENOENT: i32 = 2;
/// Raw os error for a creation target that already exists.
pub const EEXIST: i32 = 17;
/// Raw os error for a directory operation performed on a file.
pub const ENOTDIR: i32 = 20;
/// Raw os error for a file operation performed on a directory.
pub const EISDIR: i32 = 21;
/// Raw os error for an operation that can never succeed on its arguments.
pub const EINVAL: i32 = 22;

/// The error type for every filesystem operation. Each variant carries the path the caller
/// passed in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// A path component (or the final entry an operation requires) does not exist.
    #[error("no such file or directory: {0}")]
    NoSuchFileOrDirectory(String),

    /// An operation needing a directory found a file.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// An operation needing a file found a directory, or a directory was removed without
    /// `recursive`.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// A creation target already resolves to a node.
    #[error("file exists: {0}")]
    FileExists(String),

    /// The operation can not apply to this path at all: removing or moving `.`, `..`, or the
    /// root, or moving a directory beneath itself.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl FsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NoSuchFileOrDirectory(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    pub fn exists(path: impl Into<String>) -> Self {
        Self::FileExists(path.into())
    }

    pub fn invalid(path: impl Into<String>) -> Self {
        Self::InvalidArgument(path.into())
    }

    /// The path the failing operation was called with.
    pub fn path(&self) -> &str {
        match self {
            FsError::NoSuchFileOrDirectory(p)
            | FsError::NotADirectory(p)
            | FsError::IsADirectory(p)
            | FsError::FileExists(p)
            | FsError::InvalidArgument(p) => p,
        }
    }

    /// The Unix error code matching this failure.
    pub fn raw_os_error(&self) -> i32 {
        match self {
            FsError::NoSuchFileOrDirectory(_) => ENOENT,
            FsError::NotADirectory(_) => ENOTDIR,
            FsError::IsADirectory(_) => EISDIR,
            FsError::FileExists(_) => EEXIST,
            FsError::InvalidArgument(_) => EINVAL,
        }
    }
}

impl From<FsError> for io::Error {
    fn from(e: FsError) -> Self {
        io::Error::from_raw_os_error(e.raw_os_error())
    }
}

/// Result type for filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;
