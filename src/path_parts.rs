//! Splitting path strings into the parts that resolution walks.
//!
//! Paths are `/` separated. A leading `/` makes a path absolute; anything else is relative to the
//! current directory. Repeated and trailing separators are ignored. Unlike
//! [`std::path::Path::components`], `.` is kept as a part: whether `.` and `..` mean anything is
//! up to the directory being walked, not to lexical parsing, so `a/../b` is never shortened to
//! `b` here.
//!
//! [`std::path::Path::components`]: https://doc.rust-lang.org/std/path/struct.Path.html#method.components

use std::slice;
use std::vec;

use crate::inode::{PARENT_DIR, THIS_DIR};

/// The path separator.
pub const SEPARATOR: char = '/';

/// One component of a path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Part<'a> {
    /// A `.`.
    CurDir,
    /// A `..`.
    ParentDir,
    /// A file or directory name.
    Normal(&'a str),
}

impl<'a> Part<'a> {
    fn new(s: &'a str) -> Part<'a> {
        match s {
            THIS_DIR => Part::CurDir,
            PARENT_DIR => Part::ParentDir,
            _ => Part::Normal(s),
        }
    }

    /// The component as it was written in the path.
    pub fn as_str(&self) -> &'a str {
        match *self {
            Part::CurDir => THIS_DIR,
            Part::ParentDir => PARENT_DIR,
            Part::Normal(s) => s,
        }
    }
}

/// A parsed path.
///
/// This struct is created by the [`parse`] function.
///
/// [`parse`]: fn.parse.html
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parts<'a> {
    // at_root signifies whether the path began with a separator.
    at_root: bool,
    parts: Vec<Part<'a>>,
}

impl<'a> Parts<'a> {
    /// Returns whether the path began at the root directory.
    pub fn at_root(&self) -> bool {
        self.at_root
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<Part<'a>> {
        self.parts.iter()
    }

    /// Renders the first `n` parts back into a path, keeping a leading separator for absolute
    /// paths. Used to name the component a walk failed at.
    pub fn prefix(&self, n: usize) -> String {
        let joined = join(self.parts[..n].iter().map(|p| p.as_str()));
        if self.at_root {
            format!("{}{}", SEPARATOR, joined)
        } else {
            joined
        }
    }
}

impl<'a, 'b> IntoIterator for &'b Parts<'a> {
    type Item = &'b Part<'a>;
    type IntoIter = slice::Iter<'b, Part<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

impl<'a> IntoIterator for Parts<'a> {
    type Item = Part<'a>;
    type IntoIter = vec::IntoIter<Part<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

/// Splits `path` into its parts.
///
/// # Example
///
/// ```
/// use treefs::path_parts::{parse, Part};
///
/// let parts = parse("/a//../b/");
/// assert!(parts.at_root());
/// assert_eq!(parts.into_iter().collect::<Vec<_>>(),
///            vec![Part::Normal("a"), Part::ParentDir, Part::Normal("b")]);
///
/// assert!(parse("").is_empty());
/// ```
pub fn parse(path: &str) -> Parts {
    Parts {
        at_root: path.starts_with(SEPARATOR),
        parts: path.split(SEPARATOR)
                   .filter(|s| !s.is_empty())
                   .map(Part::new)
                   .collect(),
    }
}

/// Splits `path` into the path of its parent directory and its final component.
///
/// The parent of a relative single component is `""` (the current directory) and the parent of
/// an absolute single component is `"/"`. Returns `None` when there is no final component: the
/// empty path, or the root itself.
///
/// # Example
///
/// ```
/// use treefs::path_parts::split_parent;
///
/// assert_eq!(split_parent("a/b/c"), Some(("a/b", "c")));
/// assert_eq!(split_parent("a/b/"), Some(("a", "b")));
/// assert_eq!(split_parent("c"), Some(("", "c")));
/// assert_eq!(split_parent("/c"), Some(("/", "c")));
/// assert_eq!(split_parent("/"), None);
/// assert_eq!(split_parent(""), None);
/// ```
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind(SEPARATOR) {
        None => Some(("", trimmed)),
        Some(at) => {
            let parent = trimmed[..at].trim_end_matches(SEPARATOR);
            let parent = if parent.is_empty() { "/" } else { parent };
            Some((parent, &trimmed[at + 1..]))
        }
    }
}

/// Returns whether `path` names the root directory and nothing else.
pub fn is_root(path: &str) -> bool {
    path.starts_with(SEPARATOR) && split_parent(path).is_none()
}

/// Joins path segments with the separator, skipping empty segments and never doubling a
/// separator a segment already ends with.
pub fn join<'a, I>(segments: I) -> String
    where I: IntoIterator<Item = &'a str>
{
    let mut out = String::new();
    for seg in segments.into_iter().filter(|s| !s.is_empty()) {
        if !out.is_empty() && !out.ends_with(SEPARATOR) {
            out.push(SEPARATOR);
        }
        out.push_str(seg);
    }
    out
}
