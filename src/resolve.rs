//! Path resolution.
//!
//! A path is resolved against a [`Chain`]: the directories from the root down to the current
//! directory, each with the name it was entered through. Walking a path never touches the chain
//! it started from; it works on its own copy and hands that copy back on success. Only
//! [`FileSystem::cd`] ever stores the result, so a walk that fails half way through leaves the
//! current directory exactly as it was.
//!
//! `..` pops the walked chain rather than following the directory's own parent pointer, so
//! `a/b/..` always lands back in `a` even if `b` is a hard link to a directory living elsewhere.
//! `..` at the root stays at the root.
//!
//! [`Chain`]: struct.Chain.html
//! [`FileSystem::cd`]: ../struct.FileSystem.html#method.cd

use std::time::SystemTime;

use tracing::trace;

use crate::errors::{FsError, Result};
use crate::inode::Node;
use crate::path_parts::{self, Part, SEPARATOR};

/// The directories from the root down to some directory, each paired with its name.
///
/// The first entry is always the root, with an empty name.
#[derive(Clone, Debug)]
pub struct Chain {
    links: Vec<(String, Node)>,
}

impl Chain {
    /// A chain holding only `root`.
    pub fn root(root: Node) -> Chain {
        Chain { links: vec![(String::new(), root)] }
    }

    /// The root directory the chain starts from.
    pub fn root_node(&self) -> &Node {
        &self.links[0].1
    }

    /// The directory the chain ends at.
    pub fn tail(&self) -> &Node {
        &self.links[self.links.len() - 1].1
    }

    /// The name the tail was entered through; empty for the root.
    pub fn name(&self) -> &str {
        &self.links[self.links.len() - 1].0
    }

    /// The number of directories below the root.
    pub fn depth(&self) -> usize {
        self.links.len() - 1
    }

    /// Returns whether `node` is any directory along the chain.
    pub fn contains(&self, node: &Node) -> bool {
        self.links.iter().any(|(_, n)| n == node)
    }

    /// The absolute path the chain spells out, `/` for the root.
    pub fn path(&self) -> String {
        if self.depth() == 0 {
            return SEPARATOR.to_string();
        }
        let mut path = String::new();
        for (name, _) in &self.links[1..] {
            path.push(SEPARATOR);
            path.push_str(name);
        }
        path
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.links.iter().map(|(name, node)| (name.as_str(), node))
    }

    fn push(&mut self, name: &str, dir: Node) {
        self.links.push((name.to_string(), dir));
    }

    // The root is never popped.
    fn pop(&mut self) {
        if self.links.len() > 1 {
            self.links.pop();
        }
    }
}

/// A resolved path: the node it names and the directory chain leading to it.
///
/// When `node` is a directory it is the tail of `chain`; when it is a file, `chain` ends at the
/// file's parent.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub chain: Chain,
    pub node: Node,
}

/// Walks `path` starting from `cwd` (or from its root, for absolute paths).
///
/// Fails with `NoSuchFileOrDirectory` at the first component that does not exist and with
/// `NotADirectory` when a file is followed by more components. The error names the path up to
/// and including the failing component.
pub fn walk(cwd: &Chain, path: &str, now: SystemTime) -> Result<Resolved> {
    let parts = path_parts::parse(path);
    let mut chain = if parts.at_root() {
        Chain::root(cwd.root_node().clone())
    } else {
        cwd.clone()
    };
    let mut node = chain.tail().clone();

    for (at, part) in parts.iter().enumerate() {
        // `.` and `..` only ever move along the chain; the lookup still stamps the access.
        let found = chain.tail()
                         .with_dir(|d| d.find_child(part.as_str(), now))
                         .ok_or_else(|| FsError::not_a_directory(parts.prefix(at)))?;
        match *part {
            Part::CurDir => node = chain.tail().clone(),
            Part::ParentDir => {
                chain.pop();
                node = chain.tail().clone();
            }
            Part::Normal(name) => {
                let found = found.ok_or_else(|| FsError::not_found(parts.prefix(at + 1)))?;
                if found.is_dir() {
                    chain.push(name, found.clone());
                } else if at + 1 < parts.len() {
                    return Err(FsError::not_a_directory(parts.prefix(at + 1)));
                }
                node = found;
            }
        }
    }

    trace!(path, depth = chain.depth(), "resolved");
    Ok(Resolved { chain, node })
}

/// Walks `path` like [`walk`], additionally requiring that it names a directory.
///
/// [`walk`]: fn.walk.html
pub fn walk_dir(cwd: &Chain, path: &str, now: SystemTime) -> Result<Resolved> {
    let resolved = walk(cwd, path, now)?;
    if !resolved.node.is_dir() {
        return Err(FsError::not_a_directory(path));
    }
    Ok(resolved)
}

/// Resolves `path` to a node without keeping the chain. The empty path is the current
/// directory.
pub fn lookup(cwd: &Chain, path: &str, now: SystemTime) -> Result<Node> {
    if path.is_empty() {
        return Ok(cwd.tail().clone());
    }
    walk(cwd, path, now).map(|resolved| resolved.node)
}
