//! The filesystem session: a tree plus a current directory.
//!
//! [`FileSystem`] owns a handle to the root of a tree and the [`Chain`] of directories leading
//! to its current directory. Relative paths resolve against that chain, absolute paths against
//! the root. `cd` is the only operation that takes `&mut self`: everything else resolves paths
//! on a copy of the chain and can not move the session.
//!
//! Nodes are shared handles, so several sessions may work over one tree (see
//! [`FileSystem::session`]). Each directory serializes changes to its own entries, but an
//! operation touching several directories is not atomic with respect to other sessions.
//!
//! # Example
//!
//! ```
//! use treefs::{FileSystem, FsError};
//!
//! let mut fs = FileSystem::new();
//! fs.mkdir("a/b/c", true).unwrap();
//! fs.write_file("a/f", "hello").unwrap();
//!
//! fs.cd("a").unwrap();
//! assert_eq!(fs.cwd(), "/a");
//! assert_eq!(fs.ls("").unwrap(), vec!["b", "f"]);
//! assert_eq!(fs.read_file("f").unwrap(), "hello");
//!
//! fs.ln("f", "b/g").unwrap();
//! assert_eq!(fs.lookup("b/g").unwrap().link_count(), 2);
//!
//! assert_eq!(fs.rm("b", false), Err(FsError::is_a_directory("b")));
//! assert_eq!(fs.find("g", Some("/")).unwrap(), vec!["/a/b/g"]);
//! ```
//!
//! [`FileSystem`]: struct.FileSystem.html
//! [`Chain`]: ../resolve/struct.Chain.html
//! [`FileSystem::session`]: struct.FileSystem.html#method.session

use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::errors::{FsError, Result};
use crate::inode::{is_reserved, ContentStream, DirectoryNode, FileType, Node};
use crate::path_parts::{self, Part};
use crate::resolve::{self, Chain, Resolved};
use crate::search;

/// A listing record for one directory entry.
///
/// Returned by [`FileSystem::ls_details`] and [`FileSystem::stat`]. Rendering it is up to the
/// caller; it serializes with serde.
///
/// [`FileSystem::ls_details`]: struct.FileSystem.html#method.ls_details
/// [`FileSystem::stat`]: struct.FileSystem.html#method.stat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Details {
    pub name: String,
    pub file_type: FileType,
    pub created: SystemTime,
    pub modified: SystemTime,
    pub accessed: SystemTime,
    pub links: u64,
    /// Characters in a file, entries in a directory.
    pub len: usize,
}

impl Details {
    fn new(name: &str, node: &Node) -> Details {
        let meta = node.metadata();
        Details {
            name: name.to_string(),
            file_type: node.file_type(),
            created: meta.created_at(),
            modified: meta.modified_at(),
            accessed: meta.accessed_at(),
            links: meta.link_count(),
            len: node.len(),
        }
    }
}

/// Configures a new tree.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::SystemTime;
/// use treefs::clock::ManualClock;
/// use treefs::FileSystem;
///
/// let clock = Arc::new(ManualClock::new(SystemTime::UNIX_EPOCH));
/// let fs = FileSystem::builder().clock(clock).build();
/// let file = fs.touch("f").unwrap();
/// assert_eq!(file.created_at(), SystemTime::UNIX_EPOCH);
/// ```
#[derive(Debug)]
pub struct Builder {
    clock: Arc<dyn Clock>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder { clock: Arc::new(SystemClock) }
    }
}

impl Builder {
    /// Sets the clock every timestamp in the tree is taken from.
    pub fn clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
        self.clock = clock;
        self
    }

    /// Creates a tree holding only an empty root, and a session at that root.
    pub fn build(&self) -> FileSystem {
        let root = Node::new_dir(None, self.clock.now());
        FileSystem {
            cwd: Chain::root(root.clone()),
            root,
            clock: self.clock.clone(),
        }
    }
}

/// An in-memory filesystem session.
///
/// See the module [documentation] for an example.
///
/// [documentation]: index.html
#[derive(Clone, Debug)]
pub struct FileSystem {
    root: Node,
    cwd: Chain,
    clock: Arc<dyn Clock>,
}

impl Default for FileSystem {
    fn default() -> Self {
        FileSystem::new()
    }
}

impl FileSystem {
    /// Creates an empty filesystem stamped by the system clock.
    pub fn new() -> FileSystem {
        Builder::default().build()
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Opens another session over the same tree, starting at its root.
    pub fn session(&self) -> FileSystem {
        FileSystem {
            root: self.root.clone(),
            cwd: Chain::root(self.root.clone()),
            clock: self.clock.clone(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The current directory as an absolute path.
    pub fn cwd(&self) -> String {
        self.cwd.path()
    }

    fn now(&self) -> SystemTime {
        self.clock.now()
    }

    /// Changes the current directory. The empty path goes back to the root.
    ///
    /// On failure the current directory is left unchanged.
    pub fn cd(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            self.cwd = Chain::root(self.root.clone());
        } else {
            let now = self.now();
            self.cwd = resolve::walk_dir(&self.cwd, path, now)?.chain;
        }
        debug!(cwd = %self.cwd.path(), "changed directory");
        Ok(())
    }

    /// Resolves `path` to the node it names. The empty path is the current directory.
    pub fn lookup(&self, path: &str) -> Result<Node> {
        resolve::lookup(&self.cwd, path, self.now())
    }

    /// Returns whether `path` resolves to anything.
    pub fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_ok()
    }

    /// Describes the node at `path`. Directories are named by the name they were reached
    /// through, so `stat("a/b/..")` is named `a`.
    pub fn stat(&self, path: &str) -> Result<Details> {
        let Resolved { chain, node } = resolve::walk(&self.cwd, path, self.now())?;
        if node.is_dir() {
            return Ok(Details::new(chain.name(), &node));
        }
        let name = path_parts::split_parent(path).map_or("", |(_, name)| name);
        Ok(Details::new(name, &node))
    }

    /// Creates the directory at `path`.
    ///
    /// With `intermediates`, every missing ancestor is created first; otherwise a missing
    /// ancestor is an error. The final component must not exist either way.
    pub fn mkdir(&self, path: &str, intermediates: bool) -> Result<Node> {
        let now = self.now();
        let (parent, name) = if intermediates {
            let (parent_path, name) = self.split(path, FsError::exists)?;
            if is_reserved(name) {
                return Err(FsError::exists(path));
            }
            (self.create_ancestors(path, parent_path, now)?, name)
        } else {
            let (resolved, name) = self.entry(path, FsError::exists, now)?;
            (resolved.node, name)
        };

        if find_in(&parent, name, path, now)?.is_some() {
            return Err(FsError::exists(path));
        }
        let dir = Node::new_dir(Some(&parent), now);
        add_to(&parent, name, dir.clone(), path, now)?;
        debug!(path, "created directory");
        Ok(dir)
    }

    // Walks parent_path, creating each missing directory along the way.
    fn create_ancestors(&self, path: &str, parent_path: &str, now: SystemTime) -> Result<Node> {
        let parts = path_parts::parse(parent_path);
        let mut at = if parts.at_root() {
            Resolved {
                chain: Chain::root(self.root.clone()),
                node: self.root.clone(),
            }
        } else {
            Resolved {
                chain: self.cwd.clone(),
                node: self.cwd.tail().clone(),
            }
        };

        for (n, part) in parts.iter().enumerate() {
            let name = part.as_str();
            let prefix = parts.prefix(n + 1);
            if let Part::Normal(_) = *part {
                match find_in(&at.node, name, path, now)? {
                    Some(child) if child.is_dir() => {}
                    Some(_) => return Err(FsError::not_a_directory(prefix)),
                    None => {
                        let dir = Node::new_dir(Some(&at.node), now);
                        add_to(&at.node, name, dir, path, now)?;
                        debug!(path = %prefix, "created intermediate directory");
                    }
                }
            }
            at = resolve::walk_dir(&at.chain, name, now)?;
        }
        Ok(at.node)
    }

    /// Creates an empty file at `path`, which must not exist.
    pub fn create_file(&self, path: &str) -> Result<Node> {
        self.create_file_at(path, self.now())
    }

    fn create_file_at(&self, path: &str, now: SystemTime) -> Result<Node> {
        let (resolved, name) = self.entry(path, FsError::exists, now)?;
        let parent = resolved.node;
        if find_in(&parent, name, path, now)?.is_some() {
            return Err(FsError::exists(path));
        }
        let file = add_to(&parent, name, Node::new_file(now), path, now)?;
        debug!(path, "created file");
        Ok(file)
    }

    /// Returns the node at `path` if there is one, otherwise creates an empty file there.
    pub fn touch(&self, path: &str) -> Result<Node> {
        let now = self.now();
        match resolve::lookup(&self.cwd, path, now) {
            Err(FsError::NoSuchFileOrDirectory(_)) => self.create_file_at(path, now),
            found => found,
        }
    }

    /// Replaces the contents of the file at `path`, creating it if it does not exist.
    pub fn write_file<S: Into<String>>(&self, path: &str, contents: S) -> Result<Node> {
        let now = self.now();
        let file = match resolve::lookup(&self.cwd, path, now) {
            Err(FsError::NoSuchFileOrDirectory(_)) => self.create_file_at(path, now)?,
            found => found?,
        };
        let contents = contents.into();
        let len = contents.len();
        file.with_file(|f| f.write_contents(contents, now))
            .ok_or_else(|| FsError::is_a_directory(path))?;
        debug!(path, bytes = len, "wrote file");
        Ok(file)
    }

    /// Returns the contents of the file at `path`.
    pub fn read_file(&self, path: &str) -> Result<String> {
        let now = self.now();
        resolve::lookup(&self.cwd, path, now)?
            .with_file(|f| f.read_contents(now))
            .ok_or_else(|| FsError::is_a_directory(path))
    }

    /// Returns a lazy iterator over the characters the file at `path` holds right now.
    pub fn stream_file(&self, path: &str) -> Result<ContentStream> {
        let now = self.now();
        resolve::lookup(&self.cwd, path, now)?
            .with_file(|f| f.stream_contents(now))
            .ok_or_else(|| FsError::is_a_directory(path))
    }

    /// Lists the names in the directory at `path` (the current directory if empty), in the
    /// order they were added.
    pub fn ls(&self, path: &str) -> Result<Vec<String>> {
        let now = self.now();
        let dir = self.dir_at(path, now)?;
        let children = dir.with_dir(|d| d.children(now))
                          .ok_or_else(|| FsError::not_a_directory(path))?;
        Ok(children.map(|(name, _)| name).collect())
    }

    /// Like [`ls`], but returns a [`Details`] record per entry.
    ///
    /// [`ls`]: #method.ls
    /// [`Details`]: struct.Details.html
    pub fn ls_details(&self, path: &str) -> Result<Vec<Details>> {
        let now = self.now();
        let dir = self.dir_at(path, now)?;
        let children = dir.with_dir(|d| d.children(now))
                          .ok_or_else(|| FsError::not_a_directory(path))?;
        Ok(children.map(|(name, node)| Details::new(&name, &node)).collect())
    }

    fn dir_at(&self, path: &str, now: SystemTime) -> Result<Node> {
        if path.is_empty() {
            return Ok(self.cwd.tail().clone());
        }
        Ok(resolve::walk_dir(&self.cwd, path, now)?.node)
    }

    /// Adds a hard link at `dest` to the node at `target`.
    pub fn ln(&self, target: &str, dest: &str) -> Result<Node> {
        let now = self.now();
        let node = resolve::lookup(&self.cwd, target, now)?;
        let (resolved, name) = self.entry(dest, FsError::exists, now)?;
        let parent = resolved.node;
        if find_in(&parent, name, dest, now)?.is_some() {
            return Err(FsError::exists(dest));
        }

        let links = node.link();
        add_to(&parent, name, node.clone(), dest, now)?;
        debug!(target, dest, links, "linked");
        Ok(node)
    }

    /// Moves the entry at `old` to `new`.
    ///
    /// Moving an entry onto itself does nothing. An existing entry at `new` is never replaced,
    /// and a directory can not be moved beneath itself.
    pub fn mv(&self, old: &str, new: &str) -> Result<Node> {
        let now = self.now();
        let (from, old_name) = self.entry(old, FsError::invalid, now)?;
        if is_reserved(old_name) {
            return Err(FsError::invalid(old));
        }
        let node = find_in(&from.node, old_name, old, now)?
            .ok_or_else(|| FsError::not_found(old))?;

        let (to, new_name) = self.entry(new, FsError::exists, now)?;
        if from.node == to.node && old_name == new_name {
            return Ok(node);
        }
        if find_in(&to.node, new_name, new, now)?.is_some() {
            return Err(FsError::exists(new));
        }
        if node.is_dir() && to.chain.contains(&node) {
            return Err(FsError::invalid(new));
        }

        add_to(&to.node, new_name, node.clone(), new, now)?;
        to_dir(&from.node, old, |d| d.delete_child(old_name, now))?;
        node.set_parent(&to.node);
        debug!(old, new, "moved");
        Ok(node)
    }

    /// Removes the entry at `path`. Directories need `recursive`.
    ///
    /// The node loses one link. A node whose last link is gone leaves the tree; a directory in
    /// that state gives up its own entries in turn. Any handle still held (including the one
    /// returned) keeps the node itself in memory.
    pub fn rm(&self, path: &str, recursive: bool) -> Result<Node> {
        let now = self.now();
        let (resolved, name) = self.entry(path, FsError::invalid, now)?;
        let parent = resolved.node;
        let node = find_in(&parent, name, path, now)?
            .ok_or_else(|| FsError::not_found(path))?;
        if node.is_dir() && !recursive {
            return Err(FsError::is_a_directory(path));
        }
        if is_reserved(name) {
            return Err(FsError::invalid(path));
        }

        to_dir(&parent, path, |d| d.delete_child(name, now))?;
        let links = node.unlink();
        if links == 0 {
            release(&node, now);
        }
        debug!(path, links, "removed");
        Ok(node)
    }

    /// Returns the path of every entry named `name` below `relative_to` (or the current
    /// directory), in discovery order.
    ///
    /// Paths are relative to the search root, or prefixed with `relative_to` when given.
    pub fn find(&self, name: &str, relative_to: Option<&str>) -> Result<Vec<String>> {
        let now = self.now();
        let start = match relative_to {
            Some(dir) => resolve::lookup(&self.cwd, dir, now)?,
            None => self.cwd.tail().clone(),
        };
        let found = search::find(&start, name, now);
        Ok(match relative_to {
            Some(prefix) if !prefix.is_empty() => {
                found.iter().map(|p| path_parts::join(vec![prefix, p.as_str()])).collect()
            }
            _ => found,
        })
    }

    // Splits path into parent path and final component, failing with root_err when path is the
    // root and with NoSuchFileOrDirectory when it is empty.
    fn split<'p>(&self,
                 path: &'p str,
                 root_err: fn(String) -> FsError)
                 -> Result<(&'p str, &'p str)> {
        path_parts::split_parent(path).ok_or_else(|| if path_parts::is_root(path) {
                                                      root_err(path.to_string())
                                                  } else {
                                                      FsError::not_found(path)
                                                  })
    }

    // Resolves the directory that holds (or would hold) path's final component.
    fn entry<'p>(&self,
                 path: &'p str,
                 root_err: fn(String) -> FsError,
                 now: SystemTime)
                 -> Result<(Resolved, &'p str)> {
        let (parent_path, name) = self.split(path, root_err)?;
        let parent = resolve::walk_dir(&self.cwd, parent_path, now)?;
        Ok((parent, name))
    }
}

fn to_dir<R>(dir: &Node,
             path: &str,
             f: impl FnOnce(&mut DirectoryNode) -> R)
             -> Result<R> {
    dir.with_dir(f).ok_or_else(|| FsError::not_a_directory(path))
}

fn find_in(dir: &Node, name: &str, path: &str, now: SystemTime) -> Result<Option<Node>> {
    to_dir(dir, path, |d| d.find_child(name, now))
}

fn add_to(dir: &Node, name: &str, node: Node, path: &str, now: SystemTime) -> Result<Node> {
    to_dir(dir, path, |d| d.add_child(name.to_string(), node, now))
}

// Drops the entries of a directory that has lost its last link, and of every directory below
// it that loses its last link as a result.
fn release(node: &Node, now: SystemTime) {
    let mut pending = node.drain(now);
    while let Some(child) = pending.pop() {
        if child.unlink() == 0 {
            pending.extend(child.drain(now));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn stamped() -> (FileSystem, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(at(10)));
        let fs = FileSystem::builder().clock(clock.clone()).build();
        (fs, clock)
    }

    #[test]
    fn mkdir() {
        let fs = FileSystem::new();
        assert!(fs.mkdir("a/b/c", true).is_ok());
        assert_eq!(fs.mkdir("/a/b/c/", true).unwrap_err(), FsError::exists("/a/b/c/"));
        assert_eq!(fs.mkdir("a/b/c", false).unwrap_err(), FsError::exists("a/b/c"));
        assert_eq!(fs.mkdir("x/y", false).unwrap_err(), FsError::not_found("x"));
        assert!(!fs.exists("x"));

        fs.touch("f").unwrap();
        assert_eq!(fs.mkdir("f/g", true).unwrap_err(), FsError::not_a_directory("f"));
        assert_eq!(fs.mkdir("f/g", false).unwrap_err(), FsError::not_a_directory("f"));

        assert_eq!(fs.mkdir("/", true).unwrap_err(), FsError::exists("/"));
        assert_eq!(fs.mkdir("a/..", false).unwrap_err(), FsError::exists("a/.."));
        assert_eq!(fs.mkdir("a/.", true).unwrap_err(), FsError::exists("a/."));
        assert_eq!(fs.mkdir("", false).unwrap_err(), FsError::not_found(""));

        // intermediates walk through dots like any other path
        assert!(fs.mkdir("a/../n/./m", true).is_ok());
        assert_eq!(fs.ls("/").unwrap(), vec!["a", "f", "n"]);
        assert_eq!(fs.ls("n").unwrap(), vec!["m"]);
    }

    #[test]
    fn create_and_touch() {
        let fs = FileSystem::new();
        let file = fs.create_file("f").unwrap();
        assert_eq!(fs.create_file("f").unwrap_err(), FsError::exists("f"));
        assert_eq!(fs.touch("f").unwrap(), file);
        assert_eq!(fs.touch("nope/f").unwrap_err(), FsError::not_found("nope"));

        let dir = fs.mkdir("d", false).unwrap();
        assert_eq!(fs.touch("d").unwrap(), dir);
        assert_eq!(fs.touch("d/.").unwrap(), dir);
        assert_eq!(fs.create_file("d/..").unwrap_err(), FsError::exists("d/.."));
        assert_eq!(fs.create_file("/").unwrap_err(), FsError::exists("/"));
    }

    #[test]
    fn write_and_read() {
        let (fs, clock) = stamped();
        fs.mkdir("a", false).unwrap();
        let file = fs.write_file("f", "héllo").unwrap();
        assert_eq!(file.len(), 5);
        assert_eq!(fs.read_file("f").unwrap(), "héllo");
        assert_eq!(fs.stream_file("f").unwrap().collect::<String>(), "héllo");

        clock.advance(Duration::from_secs(5));
        fs.write_file("f", String::from("bye")).unwrap();
        clock.advance(Duration::from_secs(5));
        assert_eq!(fs.read_file("f").unwrap(), "bye");

        assert_eq!(file.created_at(), at(10));
        assert_eq!(file.modified_at(), at(15));
        assert_eq!(file.accessed_at(), at(20));

        assert_eq!(fs.write_file("a", "x").unwrap_err(), FsError::is_a_directory("a"));
        assert_eq!(fs.read_file("a").unwrap_err(), FsError::is_a_directory("a"));
        assert_eq!(fs.stream_file("a").unwrap_err(), FsError::is_a_directory("a"));
        assert_eq!(fs.read_file("zz").unwrap_err(), FsError::not_found("zz"));
        assert_eq!(fs.write_file("zz/f", "").unwrap_err(), FsError::not_found("zz"));
    }

    #[test]
    fn stream_is_a_snapshot() {
        let fs = FileSystem::new();
        fs.write_file("f", "abc").unwrap();
        let mut stream = fs.stream_file("f").unwrap();
        assert_eq!(stream.next(), Some('a'));
        fs.write_file("f", "xyz").unwrap();
        assert_eq!(stream.collect::<String>(), "bc");
    }

    #[test]
    fn ln() {
        let fs = FileSystem::new();
        fs.write_file("t", "A").unwrap();
        let node = fs.ln("t", "d").unwrap();
        assert_eq!(node.link_count(), 2);
        assert_eq!(fs.lookup("d").unwrap(), fs.lookup("t").unwrap());
        assert_eq!(fs.read_file("d").unwrap(), "A");

        assert_eq!(fs.ln("t", "d").unwrap_err(), FsError::exists("d"));
        assert_eq!(fs.ln("nope", "x").unwrap_err(), FsError::not_found("nope"));
        assert_eq!(fs.ln("t", "nope/x").unwrap_err(), FsError::not_found("nope"));
        assert_eq!(fs.ln("t", ".").unwrap_err(), FsError::exists("."));
        assert_eq!(node.link_count(), 2);

        fs.rm("t", false).unwrap();
        assert!(!fs.exists("t"));
        assert_eq!(fs.read_file("d").unwrap(), "A");
        assert_eq!(node.link_count(), 1);
    }

    #[test]
    fn ln_directory() {
        let mut fs = FileSystem::new();
        fs.mkdir("dir/sub", true).unwrap();
        fs.ln("dir", "alias").unwrap();
        fs.cd("alias/sub").unwrap();
        assert_eq!(fs.cwd(), "/alias/sub");
        fs.cd("..").unwrap();
        assert_eq!(fs.cwd(), "/alias");
        assert_eq!(fs.ls("").unwrap(), vec!["sub"]);
    }

    #[test]
    fn mv() {
        let fs = FileSystem::new();
        fs.mkdir("a/b", true).unwrap();
        let file = fs.write_file("a/b/f", "x").unwrap();
        assert_eq!(fs.mv("a/b/f", "a/g").unwrap(), file);
        assert_eq!(fs.read_file("a/g").unwrap(), "x");
        assert!(!fs.exists("a/b/f"));
        assert_eq!(fs.ls("a").unwrap(), vec!["b", "g"]);
        assert_eq!(file.link_count(), 1);

        assert_eq!(fs.mv("a/g", "a/g").unwrap(), file);
        assert_eq!(fs.mv("a/g", "a/./g").unwrap(), file);
        assert_eq!(fs.ls("a").unwrap(), vec!["b", "g"]);

        fs.touch("a/h").unwrap();
        assert_eq!(fs.mv("a/g", "a/h").unwrap_err(), FsError::exists("a/h"));
        assert_eq!(fs.read_file("a/g").unwrap(), "x");

        assert_eq!(fs.mv("a", "a/b/c").unwrap_err(), FsError::invalid("a/b/c"));
        assert_eq!(fs.mv("a", "a/c").unwrap_err(), FsError::invalid("a/c"));
        assert_eq!(fs.mv("a/..", "z").unwrap_err(), FsError::invalid("a/.."));
        assert_eq!(fs.mv("/", "z").unwrap_err(), FsError::invalid("/"));
        assert_eq!(fs.mv("nope", "z").unwrap_err(), FsError::not_found("nope"));
        assert_eq!(fs.mv("a/g", "nope/z").unwrap_err(), FsError::not_found("nope"));
        assert!(fs.exists("a/g"));
    }

    #[test]
    fn mv_directory_repoints_parent() {
        let fs = FileSystem::new();
        let q = fs.mkdir("p/q", true).unwrap();
        let r = fs.mkdir("r", false).unwrap();
        fs.mv("p/q", "r/q").unwrap();
        assert_eq!(fs.ls("p").unwrap(), Vec::<String>::new());
        assert_eq!(fs.lookup("r/q").unwrap(), q);
        assert_eq!(q.with_dir(|d| d.parent()).unwrap(), Some(r));
    }

    #[test]
    fn rm() {
        let fs = FileSystem::new();
        fs.mkdir("d/e", true).unwrap();
        let e = fs.lookup("d/e").unwrap();
        let f = fs.touch("d/e/f").unwrap();

        assert_eq!(fs.rm("d", false).unwrap_err(), FsError::is_a_directory("d"));
        let d = fs.rm("d", true).unwrap();
        assert!(!fs.exists("d"));
        for node in &[&d, &e, &f] {
            assert_eq!(node.link_count(), 0);
        }
        assert!(d.is_empty());
        assert!(e.is_empty());

        assert_eq!(fs.rm("nope", false).unwrap_err(), FsError::not_found("nope"));
        assert_eq!(fs.rm("/", true).unwrap_err(), FsError::invalid("/"));
        assert_eq!(fs.rm(".", true).unwrap_err(), FsError::invalid("."));
        assert_eq!(fs.rm("..", true).unwrap_err(), FsError::invalid(".."));
        assert_eq!(fs.rm("", false).unwrap_err(), FsError::not_found(""));
    }

    #[test]
    fn rm_keeps_linked_subtrees() {
        let fs = FileSystem::new();
        fs.mkdir("k/l", true).unwrap();
        fs.write_file("k/l/f", "kept").unwrap();
        fs.ln("k/l", "m").unwrap();

        fs.rm("k", true).unwrap();
        assert!(!fs.exists("k"));
        assert_eq!(fs.lookup("m").unwrap().link_count(), 1);
        assert_eq!(fs.ls("m").unwrap(), vec!["f"]);
        assert_eq!(fs.read_file("m/f").unwrap(), "kept");

        assert_eq!(fs.lookup("m/..").unwrap(), *fs.root());
        assert_eq!(fs.lookup("m/.").unwrap(), fs.lookup("m").unwrap());
        assert_eq!(fs.create_file("m/..").unwrap_err(), FsError::exists("m/.."));
        assert_eq!(fs.mkdir("m/..", false).unwrap_err(), FsError::exists("m/.."));
        assert_eq!(fs.ls("m").unwrap(), vec!["f"]);
    }

    #[test]
    fn cd() {
        let mut fs = FileSystem::new();
        fs.mkdir("a/b", true).unwrap();
        fs.touch("a/f").unwrap();

        fs.cd("a/b").unwrap();
        assert_eq!(fs.cwd(), "/a/b");
        assert_eq!(fs.cd("../f").unwrap_err(), FsError::not_a_directory("../f"));
        assert_eq!(fs.cd("../x/y").unwrap_err(), FsError::not_found("../x"));
        assert_eq!(fs.cwd(), "/a/b");

        fs.cd("/a").unwrap();
        assert_eq!(fs.cwd(), "/a");
        fs.cd("").unwrap();
        assert_eq!(fs.cwd(), "/");
    }

    #[test]
    fn sessions_share_a_tree() {
        let mut one = FileSystem::new();
        one.mkdir("x", false).unwrap();
        one.cd("x").unwrap();

        let two = one.session();
        assert_eq!(two.cwd(), "/");
        assert_eq!(two.root(), one.root());
        two.touch("x/f").unwrap();
        assert_eq!(one.ls("").unwrap(), vec!["f"]);

        let three = one.clone();
        assert_eq!(three.cwd(), "/x");
        one.cd("/").unwrap();
        assert_eq!(three.cwd(), "/x");
    }

    #[test]
    fn stat() {
        let (fs, _) = stamped();
        fs.mkdir("a", false).unwrap();
        fs.write_file("a/f", "abc").unwrap();

        let expected = Details {
            name: "f".to_string(),
            file_type: FileType::File,
            created: at(10),
            modified: at(10),
            accessed: at(10),
            links: 1,
            len: 3,
        };
        assert_eq!(fs.stat("a/f").unwrap(), expected);
        assert_eq!(fs.stat("/a/f/").unwrap(), expected);
        assert_eq!(fs.ls_details("a").unwrap(), vec![expected]);

        let dir = fs.stat("a/.").unwrap();
        assert_eq!(dir.name, "a");
        assert_eq!(dir.file_type, FileType::Directory);
        assert_eq!(dir.len, 1);
        assert_eq!(fs.stat("").unwrap().name, "");
        assert_eq!(fs.stat("a/nope").unwrap_err(), FsError::not_found("a/nope"));
    }

    #[test]
    fn find() {
        let mut fs = FileSystem::new();
        fs.mkdir("a/b/c/d", true).unwrap();
        fs.touch("a/b/c/d/e").unwrap();
        fs.mkdir("a/b/e", false).unwrap();
        fs.touch("a/x").unwrap();

        assert_eq!(fs.find("e", None).unwrap(), vec!["a/b/e", "a/b/c/d/e"]);
        assert_eq!(fs.find("e", Some("a/b")).unwrap(), vec!["a/b/e", "a/b/c/d/e"]);
        assert_eq!(fs.find("e", Some("/a/")).unwrap(), vec!["/a/b/e", "/a/b/c/d/e"]);
        assert_eq!(fs.find("e", Some("nope")).unwrap_err(), FsError::not_found("nope"));
        assert!(fs.find("x", Some("a/x")).unwrap().is_empty());
        assert!(fs.find(".", None).unwrap().is_empty());

        fs.cd("a/b").unwrap();
        assert_eq!(fs.find("e", None).unwrap(), vec!["e", "c/d/e"]);
        assert_eq!(fs.find("x", Some("..")).unwrap(), vec!["../x"]);
    }
}
