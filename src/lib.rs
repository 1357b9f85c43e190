//! An in-memory hierarchical filesystem.
//!
//! `treefs` keeps a tree of directories and files in process memory and addresses it with
//! POSIX-like paths. It supports creating, reading, writing, listing, moving and removing
//! entries, hard links, a current directory, and searching by name. Nothing is ever written to
//! disk and there are no permissions.
//!
//! The entry point is [`FileSystem`], a session over a tree. Paths starting with `/` resolve from
//! the root, anything else from the session's current directory. Every directory has the reserved
//! entries `.` and `..`; they resolve like they do on Unix, but never show up in listings or
//! searches and can not be created, moved or removed.
//!
//! Nodes handed out by the API are shared [`Node`] handles. Hard links are just more handles to
//! the same inode, and an inode stays alive for as long as a directory entry or a handle refers
//! to it.
//!
//! Errors are the closed set in [`FsError`]; each converts into an `io::Error` with the matching
//! Unix error code.
//!
//! # Example
//!
//! ```
//! use treefs::FileSystem;
//!
//! let mut fs = FileSystem::new();
//! fs.mkdir("a/b/c/d", true).unwrap();
//! fs.touch("a/b/c/d/e").unwrap();
//! fs.mkdir("a/b/e", false).unwrap();
//!
//! assert_eq!(fs.find("e", None).unwrap(), vec!["a/b/e", "a/b/c/d/e"]);
//!
//! fs.cd("a/b/c").unwrap();
//! assert!(fs.cd("../nope").is_err());
//! assert_eq!(fs.cwd(), "/a/b/c");
//! ```
//!
//! [`FileSystem`]: struct.FileSystem.html
//! [`Node`]: inode/struct.Node.html
//! [`FsError`]: errors/enum.FsError.html

mod fs;
pub use fs::*;

pub mod clock;
pub mod errors;
pub mod inode;
pub mod path_parts;
pub mod resolve;
pub mod search;

pub use errors::{FsError, Result};
pub use inode::{ContentStream, FileType, Metadata, Node};
