use diagnostics::{log_debug, log_info};

use crate::config::MAX_SYMLINK_HOP_LIMIT;
use crate::error::{Error, Result};
use crate::fs::FS;
use crate::node::{NodeID, NodeType, Symlink};

impl FS {
    /// Creates a symlink called `name` in `dir`.
    ///
    /// `target` is resolved relative to `anchor`, the directory current at
    /// creation time, on every access. When the target resolves now, the
    /// link is registered in the target's backlinks so that removing the
    /// target breaks it.
    pub fn create_symlink(
        &mut self,
        dir: NodeID,
        name: &str,
        target: &str,
        anchor: NodeID,
    ) -> Result<NodeID> {
        let link = Symlink::new(target.to_string(), anchor);
        let id = self.create_node(dir, name, NodeType::Symlink(link))?;
        let registered = self.register_backlink(id);
        log_info!(
            "Created symlink {name} -> {target} (registered: {registered})",
            name: name,
            target: target,
            registered: registered
        );
        Ok(id)
    }

    /// Resolves a symlink to the node it designates, following chains.
    ///
    /// Nothing is cached: the stored path is resolved again on every call,
    /// so a moved or removed target is noticed. Fails with `BrokenLink`
    /// when the link was invalidated or its path no longer resolves.
    /// A non-link resolves to itself.
    pub fn link_target(&self, link: NodeID) -> Result<NodeID> {
        self.follow_link(link, 0)
    }

    pub(crate) fn follow_link(&self, id: NodeID, depth: u32) -> Result<NodeID> {
        let Some(link) = self.node(id)?.as_symlink() else {
            return Ok(id);
        };
        let target = link.target();
        if link.is_broken() {
            return Err(Error::broken_link(target));
        }
        // A Config built in code is not validated
        let limit = self.config().symlink_hop_limit.min(MAX_SYMLINK_HOP_LIMIT);
        if depth >= limit {
            return Err(Error::symlink_loop(target));
        }

        log_debug!("Following symlink {id} -> {target}", id: id.as_usize(), target: target);
        let found = self
            .absolute_path_at(target, link.anchor(), depth + 1)
            .and_then(|abs| self.walk_absolute(&abs, depth + 1))
            .map_err(|e| {
                if e.is_lookup_failure() {
                    Error::broken_link(target)
                } else {
                    e
                }
            })?;
        self.follow_link(found, depth + 1)
    }

    /// Marks a link permanently broken. Returns false when `link` is not a
    /// live, still-valid symlink.
    pub fn invalidate_link(&mut self, link: NodeID) -> bool {
        match self.node_mut(link).map(|n| &mut n.node_type) {
            Ok(NodeType::Symlink(s)) if !s.is_broken() => {
                s.invalidate();
                true
            }
            _ => false,
        }
    }

    /// Records `link` in the backlinks of the node it currently resolves to.
    /// Broken or unresolvable links are not registered.
    pub(crate) fn register_backlink(&mut self, link: NodeID) -> bool {
        let Ok(target) = self.link_target(link) else {
            return false;
        };
        if target == link {
            return false;
        }
        match self.node_mut(target) {
            Ok(node) => {
                if !node.backlinks.contains(&link) {
                    node.backlinks.push(link);
                }
                true
            }
            Err(_) => false,
        }
    }

    /// Symlinks registered against a node that are still attached and valid.
    pub fn backlinks(&self, id: NodeID) -> Result<Vec<NodeID>> {
        Ok(self
            .node(id)?
            .backlinks()
            .iter()
            .copied()
            .filter(|link| {
                self.node(*link)
                    .is_ok_and(|n| n.as_symlink().is_some_and(|s| !s.is_broken()))
            })
            .collect())
    }
}
