//! Inodes: the files and directories that make up a tree.
//!
//! Every node in the tree lives behind a [`Node`] handle, a reference counted pointer to a lock
//! around an [`Inode`]. A directory owns its children through their handles, so a file linked
//! into two directories is a single inode with two owning handles and a link count of two.
//!
//! Directories also know themselves (`.`) and their parent (`..`). Both are weak pointers: they
//! never keep a node alive and never count as links, so the only strong edges in the graph point
//! from a directory down to its children.
//!
//! Timestamps are passed in by the caller rather than read here; see the [`clock`] module.
//!
//! [`Node`]: struct.Node.html
//! [`Inode`]: enum.Inode.html
//! [`clock`]: ../clock/index.html

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use std::time::SystemTime;
use std::vec::IntoIter;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

/// The reserved entry every directory has for itself.
pub const THIS_DIR: &str = ".";
/// The reserved entry every directory has for its parent.
pub const PARENT_DIR: &str = "..";

/// Returns whether `name` is one of the reserved `.` or `..` entries.
pub fn is_reserved(name: &str) -> bool {
    name == THIS_DIR || name == PARENT_DIR
}

/// Differentiates between a directory and a file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
}

impl FileType {
    pub fn is_file(&self) -> bool {
        *self == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        *self == FileType::Directory
    }
}

/// Metadata common to files and directories.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    created_at: SystemTime,
    modified_at: SystemTime,
    accessed_at: SystemTime,
    links: u64,
}

impl Metadata {
    fn new(now: SystemTime) -> Metadata {
        Metadata {
            created_at: now,
            modified_at: now,
            accessed_at: now,
            links: 1,
        }
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn modified_at(&self) -> SystemTime {
        self.modified_at
    }

    pub fn accessed_at(&self) -> SystemTime {
        self.accessed_at
    }

    /// The number of directory entries referencing this inode. `.` and `..` never count.
    pub fn link_count(&self) -> u64 {
        self.links
    }

    /// Stamps the access time.
    pub fn mark_accessed(&mut self, now: SystemTime) {
        self.accessed_at = now;
    }

    /// Stamps the modification time. A modification is also an access.
    pub fn mark_modified(&mut self, now: SystemTime) {
        self.modified_at = now;
        self.accessed_at = now;
    }
}

/// A lazy iterator over the characters of a file, as they were when the stream was opened.
///
/// Writes to the file after the stream was opened are not observed. To read the file again,
/// open a new stream.
#[derive(Clone, Debug)]
pub struct ContentStream {
    contents: String,
    at: usize,
}

impl Iterator for ContentStream {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.contents[self.at..].chars().next()?;
        self.at += c.len_utf8();
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.contents.len() - self.at;
        ((left + 3) / 4, Some(left))
    }
}

/// A regular file: metadata plus its contents.
#[derive(Debug)]
pub struct FileNode {
    meta: Metadata,
    contents: String,
}

impl FileNode {
    pub fn read_contents(&mut self, now: SystemTime) -> String {
        self.meta.mark_accessed(now);
        self.contents.clone()
    }

    pub fn stream_contents(&mut self, now: SystemTime) -> ContentStream {
        self.meta.mark_accessed(now);
        ContentStream {
            contents: self.contents.clone(),
            at: 0,
        }
    }

    /// Replaces the whole contents of the file.
    pub fn write_contents(&mut self, contents: String, now: SystemTime) {
        self.meta.mark_modified(now);
        self.contents = contents;
    }
}

/// A directory: metadata, its children in insertion order, and the reserved `.` and `..`.
pub struct DirectoryNode {
    meta: Metadata,
    children: IndexMap<String, Node>,
    this: Weak<RwLock<Inode>>,
    parent: Weak<RwLock<Inode>>,
}

impl fmt::Debug for DirectoryNode {
    // Children are printed by name only; hard links can make the tree cyclic.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DirectoryNode")
            .field("meta", &self.meta)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DirectoryNode {
    /// Looks up `name`, falling back to the reserved `.` and `..` entries only when no real
    /// child has that name.
    pub fn find_child(&mut self, name: &str, now: SystemTime) -> Option<Node> {
        self.meta.mark_accessed(now);
        if let Some(child) = self.children.get(name) {
            return Some(child.clone());
        }
        match name {
            THIS_DIR => self.this.upgrade().map(Node),
            // A parent that has since been freed leaves `..` behaving like `.`.
            PARENT_DIR => self.parent.upgrade().or_else(|| self.this.upgrade()).map(Node),
            _ => None,
        }
    }

    /// Associates `name` with `node`, returning the stored node. Replacing an existing name keeps
    /// its position among the children. Link counts are left to the caller.
    pub fn add_child(&mut self, name: String, node: Node, now: SystemTime) -> Node {
        self.meta.mark_modified(now);
        self.children.insert(name, node.clone());
        node
    }

    /// Removes and returns the child called `name`, keeping the order of the rest. Link counts
    /// are left to the caller.
    pub fn delete_child(&mut self, name: &str, now: SystemTime) -> Option<Node> {
        let removed = self.children.shift_remove(name)?;
        self.meta.mark_modified(now);
        Some(removed)
    }

    /// Returns the real children, excluding `.` and `..`, in insertion order.
    pub fn children(&mut self, now: SystemTime) -> Children {
        self.meta.mark_accessed(now);
        Children {
            inner: self
                .children
                .iter()
                .map(|(name, node)| (name.clone(), node.clone()))
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The directory `..` currently refers to, if it is still alive.
    pub fn parent(&self) -> Option<Node> {
        self.parent.upgrade().map(Node)
    }

    fn drain(&mut self, now: SystemTime) -> Vec<Node> {
        if !self.children.is_empty() {
            self.meta.mark_modified(now);
        }
        self.children.drain(..).map(|(_, node)| node).collect()
    }
}

// Tears a subtree down level by level. Each directory this drop holds the last handle to is
// emptied before it is freed, so freeing never nests one directory inside another.
impl Drop for DirectoryNode {
    fn drop(&mut self) {
        let mut pending: Vec<Node> = self.children.drain(..).map(|(_, node)| node).collect();
        while let Some(Node(inode)) = pending.pop() {
            if let Ok(lock) = Arc::try_unwrap(inode) {
                if let Inode::Directory(mut dir) = lock.into_inner() {
                    pending.extend(dir.children.drain(..).map(|(_, node)| node));
                }
            }
        }
    }
}

/// An iterator over a snapshot of a directory's children.
///
/// This struct is created by [`DirectoryNode::children`].
///
/// [`DirectoryNode::children`]: struct.DirectoryNode.html#method.children
#[derive(Debug)]
pub struct Children {
    inner: IntoIter<(String, Node)>,
}

impl Iterator for Children {
    type Item = (String, Node);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An inode is either a file or a directory.
#[derive(Debug)]
pub enum Inode {
    File(FileNode),
    Directory(DirectoryNode),
}

impl Inode {
    pub fn meta(&self) -> &Metadata {
        match self {
            Inode::File(f) => &f.meta,
            Inode::Directory(d) => &d.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut Metadata {
        match self {
            Inode::File(f) => &mut f.meta,
            Inode::Directory(d) => &mut d.meta,
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Inode::File(_) => FileType::File,
            Inode::Directory(_) => FileType::Directory,
        }
    }
}

/// A shared handle to an inode.
///
/// Cloning a `Node` clones the handle, not the inode. Two handles compare equal exactly when
/// they point at the same inode, which is how hard links are told apart from copies. A node
/// stays in memory for as long as any directory entry or any handle refers to it.
#[derive(Clone)]
pub struct Node(Arc<RwLock<Inode>>);

impl Node {
    pub(crate) fn new_file(now: SystemTime) -> Node {
        Node(Arc::new(RwLock::new(Inode::File(FileNode {
            meta: Metadata::new(now),
            contents: String::new(),
        }))))
    }

    /// Creates a directory whose `..` is `parent`, or itself when `parent` is `None`.
    pub(crate) fn new_dir(parent: Option<&Node>, now: SystemTime) -> Node {
        Node(Arc::new_cyclic(|this| {
            RwLock::new(Inode::Directory(DirectoryNode {
                meta: Metadata::new(now),
                children: IndexMap::new(),
                this: this.clone(),
                parent: parent.map_or_else(|| this.clone(), |p| Arc::downgrade(&p.0)),
            }))
        }))
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<Inode> {
        self.0.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<Inode> {
        self.0.write()
    }

    /// Runs `f` against the directory behind this handle, or returns `None` for a file.
    pub(crate) fn with_dir<R>(&self, f: impl FnOnce(&mut DirectoryNode) -> R) -> Option<R> {
        match &mut *self.write() {
            Inode::Directory(d) => Some(f(d)),
            Inode::File(_) => None,
        }
    }

    /// Runs `f` against the file behind this handle, or returns `None` for a directory.
    pub(crate) fn with_file<R>(&self, f: impl FnOnce(&mut FileNode) -> R) -> Option<R> {
        match &mut *self.write() {
            Inode::File(file) => Some(f(file)),
            Inode::Directory(_) => None,
        }
    }

    /// Records one more directory entry pointing at this node.
    pub(crate) fn link(&self) -> u64 {
        let mut inode = self.write();
        let meta = inode.meta_mut();
        meta.links += 1;
        meta.links
    }

    /// Records one less directory entry pointing at this node, returning the remaining count.
    pub(crate) fn unlink(&self) -> u64 {
        let mut inode = self.write();
        let meta = inode.meta_mut();
        meta.links = meta.links.saturating_sub(1);
        meta.links
    }

    /// Points this directory's `..` at `parent`. Does nothing for files.
    pub(crate) fn set_parent(&self, parent: &Node) {
        if let Inode::Directory(d) = &mut *self.write() {
            d.parent = Arc::downgrade(&parent.0);
        }
    }

    /// Empties this directory and returns what it held. Files return nothing.
    pub(crate) fn drain(&self, now: SystemTime) -> Vec<Node> {
        self.with_dir(|d| d.drain(now)).unwrap_or_default()
    }

    pub fn file_type(&self) -> FileType {
        self.read().file_type()
    }

    pub fn is_dir(&self) -> bool {
        self.file_type().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.file_type().is_file()
    }

    /// A copy of the node's metadata. Reading metadata does not count as an access.
    pub fn metadata(&self) -> Metadata {
        *self.read().meta()
    }

    pub fn link_count(&self) -> u64 {
        self.read().meta().links
    }

    pub fn created_at(&self) -> SystemTime {
        self.read().meta().created_at
    }

    pub fn modified_at(&self) -> SystemTime {
        self.read().meta().modified_at
    }

    pub fn accessed_at(&self) -> SystemTime {
        self.read().meta().accessed_at
    }

    /// The number of characters in a file, or of real children in a directory.
    pub fn len(&self) -> usize {
        match &*self.read() {
            Inode::File(f) => f.contents.chars().count(),
            Inode::Directory(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether both handles refer to the same inode.
    pub fn ptr_eq(this: &Node, other: &Node) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        Node::ptr_eq(self, other)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inode = self.read();
        f.debug_struct("Node")
            .field("type", &inode.file_type())
            .field("links", &inode.meta().links)
            .finish()
    }
}
