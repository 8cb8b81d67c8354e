use diagnostics::{log_debug, log_info, log_warn};

use crate::config::Config;
use crate::dir::Entries;
use crate::error::{Error, Result};
use crate::node::{Node, NodeID, NodeType, ROOT_ID, is_valid_name};
use crate::path::{ROOT_PATH, SEPARATOR, without_trailing_separator};

/// Main filesystem structure that owns all nodes.
///
/// Nodes live in an arena addressed by `NodeID`. Slots are never reused.
/// Removing a node frees the slots of its descendants, so a stale handle
/// fails with `Detached` instead of aliasing a newer node. The removed node
/// itself stays behind with no parent.
#[derive(Debug, Clone)]
pub struct FS {
    nodes: Vec<Option<Node>>,
    config: Config,
}

impl Default for FS {
    fn default() -> Self {
        Self::new()
    }
}

impl FS {
    /// Creates a new filesystem with an empty root directory
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let root = Node::new(String::new(), NodeType::Directory(Entries::new()));
        FS {
            nodes: vec![Some(root)],
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> NodeID {
        ROOT_ID
    }

    /// True while `id` names a live node (attached, or a clone not yet attached).
    #[must_use]
    pub fn contains(&self, id: NodeID) -> bool {
        matches!(self.nodes.get(id.as_usize()), Some(Some(_)))
    }

    /// Number of nodes reachable from the root, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.subtree(ROOT_ID).map_or(0, |nodes| nodes.len())
    }

    pub fn node(&self, id: NodeID) -> Result<&Node> {
        self.nodes
            .get(id.as_usize())
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::detached(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeID) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.as_usize())
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::detached(id))
    }

    pub fn name(&self, id: NodeID) -> Result<&str> {
        Ok(self.node(id)?.name())
    }

    pub fn parent(&self, id: NodeID) -> Result<Option<NodeID>> {
        Ok(self.node(id)?.parent())
    }

    /// Canonical path of a node, always ending with the separator.
    /// The root is `/`.
    pub fn path(&self, id: NodeID) -> Result<String> {
        let mut names = Vec::new();
        let mut current = id;
        while !current.is_root() {
            let node = self.node(current)?;
            names.push(node.name());
            current = node.parent().ok_or_else(|| Error::detached(current))?;
        }
        let mut path = String::from(ROOT_PATH);
        for name in names.iter().rev() {
            path.push_str(name);
            path.push(SEPARATOR);
        }
        Ok(path)
    }

    /// Path as shown to users: no trailing separator except for the root.
    pub fn display_path(&self, id: NodeID) -> Result<String> {
        let path = self.path(id)?;
        Ok(without_trailing_separator(&path).to_string())
    }

    pub(crate) fn entries(&self, dir: NodeID) -> Result<&Entries> {
        let node = self.node(dir)?;
        match node.as_dir() {
            Some(entries) => Ok(entries),
            None => Err(Error::not_a_directory(self.display_path(dir)?)),
        }
    }

    fn entries_mut(&mut self, dir: NodeID) -> Result<&mut Entries> {
        if !self.node(dir)?.is_dir() {
            return Err(Error::not_a_directory(self.display_path(dir)?));
        }
        self.node_mut(dir)?
            .as_dir_mut()
            .ok_or_else(|| Error::detached(dir))
    }

    /// Looks up a child by exact name.
    pub fn find(&self, dir: NodeID, name: &str) -> Result<Option<NodeID>> {
        Ok(self.entries(dir)?.get(name))
    }

    /// A directory's children in listing order.
    pub fn children(&self, dir: NodeID) -> Result<impl Iterator<Item = (&str, NodeID)> + '_> {
        Ok(self.entries(dir)?.iter())
    }

    pub fn is_dir(&self, id: NodeID) -> Result<bool> {
        Ok(self.node(id)?.is_dir())
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeID, id: NodeID) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.node(cur).ok().and_then(Node::parent);
        }
        false
    }

    /// Node handles of a subtree, pre-order, starting with `id`.
    pub fn subtree(&self, id: NodeID) -> Result<Vec<NodeID>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = self.node(cur)?;
            out.push(cur);
            if let Some(entries) = node.as_dir() {
                // Reverse so the first child is visited first
                stack.extend(entries.ids().into_iter().rev());
            }
        }
        Ok(out)
    }

    /// Adds an unattached node to the arena.
    pub(crate) fn alloc(&mut self, mut node: Node, parent: Option<NodeID>) -> NodeID {
        node.parent = parent;
        let id = NodeID::new(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    /// Inserts an unattached node into a directory, setting its parent.
    pub(crate) fn attach(&mut self, dir: NodeID, id: NodeID) -> Result<()> {
        let name = self.name(id)?.to_string();
        self.entries_mut(dir)?.insert(name, id)?;
        self.node_mut(id)?.parent = Some(dir);
        Ok(())
    }

    /// Creates a node directly under `dir`. Nothing is allocated when the
    /// name is invalid or taken.
    pub(crate) fn create_node(
        &mut self,
        dir: NodeID,
        name: &str,
        node_type: NodeType,
    ) -> Result<NodeID> {
        if !is_valid_name(name) {
            return Err(Error::invalid_name(name));
        }
        if self.entries(dir)?.contains(name) {
            return Err(Error::already_exists(name));
        }
        let kind = node_type.type_name();
        let id = self.alloc(Node::new(name.to_string(), node_type), None);
        self.attach(dir, id)?;
        log_debug!("Created {kind} {name} as node {id}", kind: kind, name: name, id: id.as_usize());
        Ok(id)
    }

    /// Creates a new file in a directory
    pub fn create_file(&mut self, dir: NodeID, name: &str, content: &str) -> Result<NodeID> {
        self.create_node(dir, name, NodeType::File(content.to_string()))
    }

    /// Creates a new empty directory in a directory
    pub fn create_dir(&mut self, dir: NodeID, name: &str) -> Result<NodeID> {
        self.create_node(dir, name, NodeType::Directory(Entries::new()))
    }

    /// Removes the child called `name` from `dir` and clears its parent.
    /// The node stays in the arena. Absent names are a no-op.
    pub fn detach(&mut self, dir: NodeID, name: &str) -> Result<Option<NodeID>> {
        let removed = self.entries_mut(dir)?.remove(name);
        if let Some(id) = removed {
            self.node_mut(id)?.parent = None;
        }
        Ok(removed)
    }

    /// Removes a node and its whole subtree.
    ///
    /// Every symlink registered against a node of the subtree is
    /// invalidated before the subtree is detached. The descendants are
    /// freed. The node itself is kept with its parent cleared, an empty
    /// directory if it was one and a broken link if it was a symlink.
    /// Returns the number of links invalidated.
    pub fn remove(&mut self, id: NodeID) -> Result<usize> {
        if id.is_root() {
            return Err(Error::invalid_remove_path(ROOT_PATH));
        }
        let path = self.display_path(id)?;
        let subtree = self.subtree(id)?;

        let mut invalidated = 0;
        for &member in &subtree {
            let links = std::mem::take(&mut self.node_mut(member)?.backlinks);
            for link in links {
                if self.invalidate_link(link) {
                    invalidated += 1;
                }
            }
        }

        if let Some(parent) = self.parent(id)? {
            let name = self.name(id)?.to_string();
            _ = self.detach(parent, &name)?;
        }
        for &member in subtree.iter().skip(1) {
            self.nodes[member.as_usize()] = None;
        }
        match &mut self.node_mut(id)?.node_type {
            NodeType::Directory(entries) => *entries = Entries::new(),
            NodeType::Symlink(link) => link.invalidate(),
            NodeType::File(_) => {}
        }

        log_info!("Removed {path} ({count} nodes)", path: path.as_str(), count: subtree.len());
        if invalidated > 0 {
            log_warn!("Removing {path} broke {links} symbolic links", path: path.as_str(), links: invalidated);
        }
        Ok(invalidated)
    }

    /// Renames a node in place. Identity, content and backlinks are kept.
    pub fn rename(&mut self, id: NodeID, new_name: &str) -> Result<()> {
        if !is_valid_name(new_name) {
            return Err(Error::invalid_name(new_name));
        }
        let Some(parent) = self.parent(id)? else {
            return Err(Error::invalid_name(ROOT_PATH));
        };
        let old_name = self.name(id)?.to_string();
        if old_name == new_name {
            return Ok(());
        }
        if self.entries(parent)?.contains(new_name) {
            return Err(Error::already_exists(new_name));
        }
        _ = self.entries_mut(parent)?.remove(&old_name);
        self.node_mut(id)?.name = new_name.to_string();
        self.entries_mut(parent)?.insert(new_name.to_string(), id)
    }

    pub fn read_file(&self, id: NodeID) -> Result<&str> {
        match self.node(id)?.as_file() {
            Some(content) => Ok(content),
            None => Err(Error::not_a_file(self.display_path(id)?)),
        }
    }

    fn file_mut(&mut self, id: NodeID) -> Result<&mut String> {
        let path = self.display_path(id)?;
        match &mut self.node_mut(id)?.node_type {
            NodeType::File(content) => Ok(content),
            _ => Err(Error::not_a_file(path)),
        }
    }

    pub fn set_content(&mut self, id: NodeID, content: &str) -> Result<()> {
        *self.file_mut(id)? = content.to_string();
        Ok(())
    }

    /// Appends text, separated from existing content by the configured
    /// separator. An empty file gets no separator.
    pub fn append_content(&mut self, id: NodeID, text: &str) -> Result<()> {
        let separator = self.config.append_separator.clone();
        let content = self.file_mut(id)?;
        if !content.is_empty() {
            content.push_str(&separator);
        }
        content.push_str(text);
        Ok(())
    }
}
