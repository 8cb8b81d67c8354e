// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use diagnostics::{log_debug, log_info};

use crate::config::Config;
use crate::error::{EntryKind, Error, Result};
use crate::fs::FS;
use crate::node::NodeID;
use crate::path;
use crate::persistence::Snapshot;
use crate::tree_format::TreeNode;

/// A filesystem together with a current working directory.
///
/// Every path argument is interpreted relative to the working directory
/// unless it starts with `/`.
#[derive(Debug, Clone)]
pub struct Session {
    fs: FS,
    cwd: NodeID,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::from_fs(FS::new())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::from_fs(FS::with_config(config))
    }

    /// Starts a session at the root of an existing filesystem.
    #[must_use]
    pub fn from_fs(fs: FS) -> Self {
        let cwd = fs.root();
        Self { fs, cwd }
    }

    /// Restores a filesystem from a snapshot and starts at its root.
    pub fn restore(snapshot: &Snapshot, config: Config) -> Result<Self> {
        Ok(Self::from_fs(FS::restore_with_config(snapshot, config)?))
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        self.fs.snapshot()
    }

    #[must_use]
    pub fn fs(&self) -> &FS {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut FS {
        &mut self.fs
    }

    #[must_use]
    pub fn into_fs(self) -> FS {
        self.fs
    }

    #[must_use]
    pub fn cwd(&self) -> NodeID {
        self.cwd
    }

    /// The working directory's path, `/` for the root.
    pub fn pwd(&self) -> Result<String> {
        self.fs.display_path(self.cwd)
    }

    pub fn cd(&mut self, path: &str) -> Result<()> {
        let dir = self.fs.resolve(path, self.cwd, true)?;
        if !self.fs.is_dir(dir)? {
            return Err(Error::not_a_directory(path));
        }
        self.cwd = dir;
        log_debug!("Changed directory to {path}", path: path);
        Ok(())
    }

    pub fn absolute_path(&self, path: &str) -> Result<String> {
        self.fs.absolute_path(path, self.cwd)
    }

    pub fn resolve(&self, path: &str, follow: bool) -> Result<NodeID> {
        self.fs.resolve(path, self.cwd, follow)
    }

    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.fs.exists(path, self.cwd)
    }

    /// Splits `path` into an existing directory and the name of a new
    /// entry inside it.
    fn parent_and_name<'a>(&self, path: &'a str) -> Result<(NodeID, &'a str)> {
        let (parent, name) =
            path::split_last(path).ok_or_else(|| Error::invalid_name(path))?;
        let dir = self.fs.resolve(parent, self.cwd, true)?;
        if !self.fs.is_dir(dir)? {
            return Err(Error::not_found(parent, EntryKind::Directory));
        }
        Ok((dir, name))
    }

    pub fn mkdir(&mut self, path: &str) -> Result<NodeID> {
        let (dir, name) = self.parent_and_name(path)?;
        let id = self.fs.create_dir(dir, name)?;
        log_info!("Created directory {path}", path: path);
        Ok(id)
    }

    /// Creates a new file. Fails with `AlreadyExists` when the name is taken.
    pub fn create_file(&mut self, path: &str, content: &str) -> Result<NodeID> {
        let (dir, name) = self.parent_and_name(path)?;
        self.fs.create_file(dir, name, content)
    }

    /// Replaces the content of a file, creating it when missing. A link
    /// to a file writes through to its target.
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<NodeID> {
        let (dir, name) = self.parent_and_name(path)?;
        match self.fs.find(dir, name)? {
            Some(existing) => {
                let file = self.fs.link_target(existing)?;
                self.fs.set_content(file, content)?;
                Ok(file)
            }
            None => self.fs.create_file(dir, name, content),
        }
    }

    /// Appends to an existing file, separated from non-empty content by the
    /// configured separator.
    pub fn append_file(&mut self, path: &str, text: &str) -> Result<NodeID> {
        let file = self.fs.resolve(path, self.cwd, true)?;
        self.fs.append_content(file, text)?;
        Ok(file)
    }

    pub fn cat(&self, path: &str) -> Result<&str> {
        let file = self.fs.resolve(path, self.cwd, true)?;
        self.fs.read_file(file)
    }

    /// Creates a symbolic link to `target_path`, which must exist.
    ///
    /// When `link_path` names an existing directory the link goes inside
    /// it under the target's base name. Otherwise the last segment of
    /// `link_path` names the new link. The target is resolved from the
    /// current working directory, now and on every later access.
    pub fn link(&mut self, link_path: &str, target_path: &str) -> Result<NodeID> {
        if !self.fs.exists(target_path, self.cwd) {
            return Err(Error::not_found(target_path, EntryKind::Entry));
        }

        let (dir, name) = if self.fs.exists(link_path, self.cwd) {
            let existing = self.fs.resolve(link_path, self.cwd, true)?;
            if !self.fs.is_dir(existing)? {
                return Err(Error::already_exists(link_path));
            }
            let name =
                path::basename(target_path).ok_or_else(|| Error::invalid_name(target_path))?;
            (existing, name)
        } else {
            self.parent_and_name(link_path)?
        };
        self.fs.create_symlink(dir, name, target_path, self.cwd)
    }

    /// Removes the entry named by `path` and everything below it.
    ///
    /// A link named by the final segment is removed itself, not its target.
    /// When the working directory is removed along with it, the session
    /// moves to the removed entry's parent.
    pub fn remove(&mut self, path: &str) -> Result<usize> {
        if path::is_dot_path(path) {
            return Err(Error::invalid_remove_path(path));
        }
        let id = self.fs.resolve_entry(path, self.cwd)?;
        if id.is_root() {
            return Err(Error::invalid_remove_path(path));
        }
        let parent = self.fs.parent(id)?.unwrap_or(self.fs.root());
        let resets_cwd = self.fs.is_ancestor_or_self(id, self.cwd);

        let invalidated = self.fs.remove(id)?;
        if resets_cwd {
            self.cwd = parent;
        }
        Ok(invalidated)
    }

    pub fn copy(&mut self, src: &str, dst: &str) -> Result<NodeID> {
        self.fs.copy_path(src, dst, self.cwd)
    }

    /// Moves `src` into the directory `dst`, following the working
    /// directory out of the moved subtree when needed.
    pub fn mv(&mut self, src: &str, dst: &str) -> Result<NodeID> {
        let outcome = self.fs.move_path(src, dst, self.cwd)?;
        self.cwd = outcome.cwd;
        Ok(outcome.node)
    }

    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<()> {
        let id = self.fs.resolve_entry(path, self.cwd)?;
        self.fs.rename(id, new_name)
    }

    /// Names of a directory's children in listing order, or the single name
    /// of anything else.
    pub fn list(&self, path: &str) -> Result<Vec<String>> {
        let entry = self.fs.resolve_entry(path, self.cwd)?;
        let target = self.fs.link_target(entry)?;
        if self.fs.is_dir(target)? {
            Ok(self
                .fs
                .children(target)?
                .map(|(name, _)| name.to_string())
                .collect())
        } else {
            Ok(vec![self.fs.name(entry)?.to_string()])
        }
    }

    /// Canonical paths of every entry under `path` (itself included) whose
    /// name satisfies `predicate`, depth first in listing order.
    ///
    /// Links are matched by name but not descended into. The root is never
    /// reported.
    pub fn find<F>(&self, path: &str, predicate: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let start = self.fs.resolve(path, self.cwd, true)?;
        let mut found = Vec::new();
        if !start.is_root() && predicate(self.fs.name(start)?) {
            found.push(self.fs.path(start)?);
        }
        if self.fs.is_dir(start)? {
            self.find_in(start, &self.fs.path(start)?, &predicate, &mut found)?;
        }
        Ok(found)
    }

    fn find_in<F>(&self, dir: NodeID, prefix: &str, predicate: &F, found: &mut Vec<String>) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        for (name, child) in self.fs.children(dir)? {
            let child_path = format!("{prefix}{name}/");
            if predicate(name) {
                found.push(child_path.clone());
            }
            if self.fs.is_dir(child)? {
                self.find_in(child, &child_path, predicate, found)?;
            }
        }
        Ok(())
    }

    pub fn tree(&self, path: &str) -> Result<TreeNode> {
        let id = self.fs.resolve(path, self.cwd, true)?;
        self.fs.tree(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut s = Session::new();
        s.mkdir("A").unwrap();
        s.mkdir("A/B").unwrap();
        s.create_file("A/B/f", "hi").unwrap();
        s.mkdir("C").unwrap();
        s
    }

    #[test]
    fn test_cd_and_pwd() {
        let mut s = session();
        assert_eq!(s.pwd().unwrap(), "/");
        s.cd("A/B").unwrap();
        assert_eq!(s.pwd().unwrap(), "/A/B");
        s.cd("../..").unwrap();
        assert_eq!(s.pwd().unwrap(), "/");
        s.cd("..").unwrap();
        assert_eq!(s.pwd().unwrap(), "/");

        assert_eq!(s.cd("A/B/f"), Err(Error::not_a_directory("A/B/f")));
        assert_eq!(s.cd("nope"), Err(Error::not_found("nope", EntryKind::Entry)));
        assert_eq!(s.pwd().unwrap(), "/");
    }

    #[test]
    fn test_mkdir() {
        let mut s = session();
        assert_eq!(s.mkdir("A"), Err(Error::already_exists("A")));
        assert_eq!(
            s.mkdir("A/B/f/x"),
            Err(Error::not_found("A/B/f", EntryKind::Directory))
        );
        assert_eq!(
            s.mkdir("missing/x"),
            Err(Error::not_found("missing", EntryKind::Entry))
        );
        assert_eq!(s.mkdir("/"), Err(Error::invalid_name("/")));

        s.cd("C").unwrap();
        s.mkdir("D/").unwrap();
        assert!(s.exists("/C/D"));
    }

    #[test]
    fn test_files() {
        let mut s = session();
        assert_eq!(s.cat("A/B/f").unwrap(), "hi");
        assert_eq!(s.create_file("A/B/f", "x"), Err(Error::already_exists("f")));

        s.append_file("A/B/f", "there").unwrap();
        assert_eq!(s.cat("/A/B/f").unwrap(), "hi\nthere");

        s.write_file("A/B/f", "over").unwrap();
        assert_eq!(s.cat("A/B/f").unwrap(), "over");

        s.write_file("C/new", "fresh").unwrap();
        assert_eq!(s.cat("C/new").unwrap(), "fresh");

        assert_eq!(s.cat("A"), Err(Error::not_a_file("/A")));
        assert_eq!(
            s.append_file("nope", "x"),
            Err(Error::not_found("nope", EntryKind::Entry))
        );
    }

    #[test]
    fn test_link_into_existing_directory() {
        let mut s = session();
        let link = s.link("C", "A/B").unwrap();
        assert_eq!(s.fs().path(link).unwrap(), "/C/B/");
        assert_eq!(s.list("C/B").unwrap(), vec!["f"]);
        assert_eq!(s.link("A/B/f", "C"), Err(Error::already_exists("A/B/f")));
        assert_eq!(s.link("L", "nope"), Err(Error::not_found("nope", EntryKind::Entry)));
    }

    #[test]
    fn test_link_anchor_is_cwd() {
        let mut s = session();
        s.cd("A").unwrap();
        s.link("/C/toB", "B").unwrap();
        s.cd("/").unwrap();
        // "B" is still resolved from /A
        assert_eq!(s.cat("C/toB/f").unwrap(), "hi");
    }

    #[test]
    fn test_remove_resets_cwd() {
        let mut s = session();
        s.cd("A/B").unwrap();
        assert_eq!(s.remove("."), Err(Error::invalid_remove_path(".")));
        assert_eq!(s.remove("../"), Err(Error::invalid_remove_path("../")));
        assert_eq!(s.remove("/"), Err(Error::invalid_remove_path("/")));

        s.remove("/A").unwrap();
        assert_eq!(s.pwd().unwrap(), "/");
        assert!(!s.exists("/A"));
    }

    #[test]
    fn test_remove_link_keeps_target() {
        let mut s = session();
        s.link("L", "/A/B/f").unwrap();
        assert_eq!(s.remove("L").unwrap(), 0);
        assert_eq!(s.cat("/A/B/f").unwrap(), "hi");
        assert!(!s.exists("L"));
    }

    #[test]
    fn test_mv_updates_cwd() {
        let mut s = session();
        s.cd("A/B").unwrap();
        s.mv("/A", "/C").unwrap();
        assert_eq!(s.pwd().unwrap(), "/");
        assert!(s.exists("/C/A/B/f"));
    }

    #[test]
    fn test_rename_and_list() {
        let mut s = session();
        s.create_file("zed", "").unwrap();
        s.rename("zed", "b").unwrap();
        assert_eq!(s.list("/").unwrap(), vec!["A", "b", "C"]);
        assert_eq!(s.list("A/B/f").unwrap(), vec!["f"]);
    }

    #[test]
    fn test_find() {
        let mut s = session();
        s.create_file("C/f2", "").unwrap();
        s.link("C/lf", "/A").unwrap();

        let found = s.find("/", |name| name.starts_with('f')).unwrap();
        assert_eq!(found, vec!["/A/B/f/", "/C/f2/"]);

        let found = s.find("C", |name| name.contains('l')).unwrap();
        assert_eq!(found, vec!["/C/lf/"]);

        let found = s.find("A", |_| true).unwrap();
        assert_eq!(found, vec!["/A/", "/A/B/", "/A/B/f/"]);
    }

    #[test]
    fn test_tree() {
        let s = session();
        assert_eq!(
            s.tree("A").unwrap().to_string(),
            "A/\n└─┬ B/\n  └── f\n"
        );
    }
}
