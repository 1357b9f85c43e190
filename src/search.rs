//! Searching a tree by name.
//!
//! The search is a depth first walk driven by an explicit stack. Each `(name, node)` pair is
//! visited once, which is what stops the walk from looping forever when hard links make the
//! tree cyclic. Every pair remembers the pair it was discovered from; once the walk is done,
//! those back pointers are followed to rebuild each match's path.
//!
//! Results come back in discovery order. Children are pushed in insertion order and popped last
//! in first out, so the most recently created sibling's subtree is explored first, but matches
//! are reported in the order they were first seen.

use std::collections::HashSet;
use std::time::SystemTime;

use indexmap::IndexMap;
use tracing::trace;

use crate::inode::Node;
use crate::path_parts;

type Pair = (String, Node);

/// Returns the path, relative to `start`, of every entry below `start` named `name`.
///
/// `start` itself is never a match. A file as `start` has nothing below it.
pub fn find(start: &Node, name: &str, now: SystemTime) -> Vec<String> {
    let origin: Pair = (String::new(), start.clone());

    let mut visited: HashSet<Pair> = HashSet::new();
    visited.insert(origin.clone());
    // child pair -> the pair it was discovered from, in discovery order
    let mut found_from: IndexMap<Pair, Pair> = IndexMap::new();
    let mut stack = vec![origin];

    while let Some(pair) = stack.pop() {
        let children = match pair.1.with_dir(|d| d.children(now)) {
            Some(children) => children,
            None => continue,
        };
        for child in children {
            if visited.insert(child.clone()) {
                found_from.insert(child.clone(), pair.clone());
                stack.push(child);
            }
        }
    }
    trace!(name, visited = visited.len(), "search walked");

    found_from.keys()
              .filter(|(n, _)| n == name)
              .map(|pair| {
                  let mut names = vec![pair.0.as_str()];
                  let mut parent = &found_from[pair];
                  while let Some(next) = found_from.get(parent) {
                      names.push(parent.0.as_str());
                      parent = next;
                  }
                  names.reverse();
                  path_parts::join(names)
              })
              .collect()
}
