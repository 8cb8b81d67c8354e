use diagnostics::log_info;

use crate::dir::Entries;
use crate::error::{Error, Result};
use crate::fs::FS;
use crate::node::{Node, NodeID, NodeType};
use crate::resolve::is_root_path;

/// Where a move left things.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The relocated node under its new parent.
    pub node: NodeID,
    /// The working directory to continue from. Differs from the one passed
    /// in when it was the moved node or inside it.
    pub cwd: NodeID,
}

/// A checked copy or move request.
struct Transfer {
    source: NodeID,
    dest: NodeID,
}

impl FS {
    /// Checks every precondition of a copy or move before anything is
    /// mutated.
    fn validate_transfer(&self, src: &str, dst: &str, cwd: NodeID) -> Result<Transfer> {
        let src_abs = self.absolute_path(src, cwd)?;
        if is_root_path(&src_abs) {
            return Err(Error::CannotCopyRoot);
        }
        let dst_abs = self.absolute_path(dst, cwd)?;
        if src_abs == dst_abs {
            return Err(Error::CannotCopyToSelf);
        }

        let source = self.resolve_entry(src, cwd)?;
        if source.is_root() {
            return Err(Error::CannotCopyRoot);
        }
        let dest = self.resolve(dst, cwd, true)?;
        if dest == source {
            return Err(Error::CannotCopyToSelf);
        }
        if !self.is_dir(dest)? {
            return Err(Error::DestinationMustBeDirectory);
        }

        let name = self.name(source)?;
        if self.entries(dest)?.contains(name) {
            return Err(Error::already_exists(name));
        }
        Ok(Transfer { source, dest })
    }

    /// Builds an unattached deep copy of `id`.
    ///
    /// Files keep their content, links keep their target path, anchor and
    /// state, and directories keep their child order. No node of the copy
    /// is shared with the source, and backlinks start empty except for
    /// what copied links register themselves.
    fn clone_subtree(&mut self, id: NodeID) -> Result<NodeID> {
        let (name, node_type) = {
            let node = self.node(id)?;
            (node.name().to_string(), node.node_type().clone())
        };

        let node_type = match node_type {
            NodeType::File(content) => NodeType::File(content),
            NodeType::Symlink(link) => NodeType::Symlink(link),
            NodeType::Directory(entries) => {
                let mut cloned = Entries::new();
                for (child_name, child) in entries.iter() {
                    let copy = self.clone_subtree(child)?;
                    cloned.push_in_order(child_name.to_string(), copy);
                }
                NodeType::Directory(cloned)
            }
        };
        let is_link = matches!(node_type, NodeType::Symlink(_));

        let clone = self.alloc(Node::new(name, node_type), None);
        let children = self.node(clone)?.as_dir().map(Entries::ids).unwrap_or_default();
        for child in children {
            self.node_mut(child)?.parent = Some(clone);
        }
        if is_link {
            _ = self.register_backlink(clone);
        }
        Ok(clone)
    }

    /// Deep-copies `src` into the directory `dst`, both relative to `cwd`.
    ///
    /// The source is named without following a final symlink, so copying
    /// a link copies the link. Copying a directory into its own descendant
    /// is allowed: the copy is complete before it is attached.
    pub fn copy_path(&mut self, src: &str, dst: &str, cwd: NodeID) -> Result<NodeID> {
        let Transfer { source, dest } = self.validate_transfer(src, dst, cwd)?;
        let clone = self.clone_subtree(source)?;
        self.attach(dest, clone)?;
        log_info!("Copied {src} to {dst}", src: src, dst: dst);
        Ok(clone)
    }

    /// Moves `src` into the directory `dst`: a copy followed by removal of
    /// the original, which invalidates every link into the moved subtree.
    pub fn move_path(&mut self, src: &str, dst: &str, cwd: NodeID) -> Result<MoveOutcome> {
        let Transfer { source, dest } = self.validate_transfer(src, dst, cwd)?;
        if self.is_ancestor_or_self(source, dest) {
            return Err(Error::CannotCopyToSelf);
        }
        let former_parent = self.parent(source)?.unwrap_or(self.root());
        let cwd = if self.is_ancestor_or_self(source, cwd) {
            former_parent
        } else {
            cwd
        };

        let clone = self.clone_subtree(source)?;
        self.attach(dest, clone)?;
        // Past this point a failure leaves both copies in place
        let invalidated = self.remove(source)?;
        log_info!(
            "Moved {src} to {dst} ({links} links invalidated)",
            src: src,
            dst: dst,
            links: invalidated
        );
        Ok(MoveOutcome { node: clone, cwd })
    }
}
