//! Path resolution: turning path strings into canonical paths and nodes.

use diagnostics::log_debug;

use crate::error::{EntryKind, Error, Result};
use crate::fs::FS;
use crate::node::{NodeID, NodeType};
use crate::path::{self, SEPARATOR};

impl FS {
    /// Normalizes `path` into a canonical absolute path ending with `/`.
    ///
    /// An absolute input is returned as-is (plus the trailing separator)
    /// without checking that any of it exists. A relative input is walked
    /// from `start`: `..` at the root stays at the root, a symlink to a
    /// directory is descended into, and a file or a symlink to a file ends
    /// the walk under its own name.
    pub fn absolute_path(&self, path: &str, start: NodeID) -> Result<String> {
        self.absolute_path_at(path, start, 0)
    }

    pub(crate) fn absolute_path_at(&self, path: &str, start: NodeID, depth: u32) -> Result<String> {
        if path::is_absolute(path) {
            return Ok(path::with_trailing_separator(path));
        }

        let mut current = start;
        let mut leaf: Option<&str> = None;
        for seg in path::segments(path) {
            match seg {
                "." => {}
                ".." => {
                    if leaf.take().is_some() {
                        continue;
                    }
                    current = self.step_up(current)?;
                }
                name => {
                    if leaf.is_some() {
                        return Err(Error::not_found(name, EntryKind::Entry));
                    }
                    let child = self
                        .entries(current)?
                        .get(name)
                        .ok_or_else(|| Error::not_found(name, EntryKind::Entry))?;
                    match self.node(child)?.node_type() {
                        NodeType::Directory(_) => current = child,
                        NodeType::Symlink(_) => {
                            let target = self.follow_link(child, depth)?;
                            if self.is_dir(target)? {
                                current = target;
                            } else {
                                leaf = Some(name);
                            }
                        }
                        NodeType::File(_) => leaf = Some(name),
                    }
                }
            }
        }

        let mut out = self.path(current)?;
        if let Some(name) = leaf {
            out.push_str(name);
            out.push(SEPARATOR);
        }
        log_debug!("Absolute path of {path}: {out}", path: path, out: out.as_str());
        Ok(out)
    }

    /// Target of `..`: the root is its own parent, a removed node has none.
    fn step_up(&self, id: NodeID) -> Result<NodeID> {
        if id.is_root() {
            return Ok(id);
        }
        self.parent(id)?.ok_or_else(|| Error::detached(id))
    }

    /// Walks an absolute path from the root, following symlinks met along
    /// the way but not the final segment. The error names the first
    /// segment that does not exist.
    pub(crate) fn walk_absolute(&self, abs: &str, depth: u32) -> Result<NodeID> {
        let mut current = self.root();
        for seg in path::segments(abs) {
            match seg {
                "." => {}
                ".." => current = self.step_up(current)?,
                name => {
                    let dir = self.follow_link(current, depth)?;
                    let child = self
                        .node(dir)?
                        .as_dir()
                        .and_then(|entries| entries.get(name))
                        .ok_or_else(|| Error::not_found(name, EntryKind::Entry))?;
                    current = child;
                }
            }
        }
        Ok(current)
    }

    /// Finds the node designated by `path`, relative to `start`.
    ///
    /// With `follow`, a symlink in final position is replaced by its
    /// target; without it the link node itself is returned.
    pub fn resolve(&self, path: &str, start: NodeID, follow: bool) -> Result<NodeID> {
        let abs = self.absolute_path(path, start)?;
        let node = self.walk_absolute(&abs, 0)?;
        log_debug!("Resolved {path} to node {id}", path: path, id: node.as_usize());
        if follow {
            self.link_target(node)
        } else {
            Ok(node)
        }
    }

    /// Like `resolve` without following, except that only the parent part
    /// is normalized. A symlink named by the final segment is therefore
    /// returned as a link even when it points at a file.
    pub fn resolve_entry(&self, path: &str, start: NodeID) -> Result<NodeID> {
        let Some((parent, name)) = path::split_last(path) else {
            return self.resolve(path, start, false);
        };
        if name == "." || name == ".." {
            return self.resolve(path, start, false);
        }
        let dir = self.resolve(parent, start, true)?;
        self.entries(dir)?
            .get(name)
            .ok_or_else(|| Error::not_found(name, EntryKind::Entry))
    }

    /// True when `path` designates a node. Broken links still exist.
    #[must_use]
    pub fn exists(&self, path: &str, start: NodeID) -> bool {
        self.resolve(path, start, false).is_ok()
    }

    /// Resolves `path` and requires a directory.
    pub fn resolve_dir(&self, path: &str, start: NodeID) -> Result<NodeID> {
        let id = self.resolve(path, start, true)?;
        if self.is_dir(id)? {
            Ok(id)
        } else {
            Err(Error::not_a_directory(path))
        }
    }
}

/// True when `path` is the root written in any way (`/`, `//`, `/./..`).
#[must_use]
pub fn is_root_path(path: &str) -> bool {
    path::is_absolute(path) && path::segments(path).all(|s| s == "." || s == "..")
}
