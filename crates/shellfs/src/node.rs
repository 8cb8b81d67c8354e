use crate::dir::Entries;

pub const ROOT_ID: NodeID = NodeID(0);

/// Stable handle of a node in the filesystem arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeID(usize);

impl std::fmt::Display for NodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl NodeID {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0
    }

    #[must_use]
    pub fn is_root(self) -> bool {
        self == ROOT_ID
    }
}

/// Represents a symbolic link to another path.
///
/// The target is a path string resolved against `anchor`, the directory
/// that was current when the link was created. It is re-resolved on every
/// access.
#[derive(Debug, Clone, PartialEq)]
pub struct Symlink {
    target: String,
    anchor: NodeID,
    broken: bool,
}

impl Symlink {
    pub(crate) fn new(target: String, anchor: NodeID) -> Self {
        Self {
            target,
            anchor,
            broken: false,
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn anchor(&self) -> NodeID {
        self.anchor
    }

    /// True once the link has been invalidated by removal of its target.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub(crate) fn invalidate(&mut self) {
        self.broken = true;
    }

    pub(crate) fn with_broken(mut self, broken: bool) -> Self {
        self.broken = broken;
        self
    }

    pub(crate) fn reanchor(&mut self, anchor: NodeID) {
        self.anchor = anchor;
    }
}

/// Type of node (file, directory, or symlink)
#[derive(Debug, Clone)]
pub enum NodeType {
    File(String),
    Directory(Entries),
    Symlink(Symlink),
}

impl NodeType {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeType::File(_) => "file",
            NodeType::Directory(_) => "directory",
            NodeType::Symlink(_) => "symlink",
        }
    }
}

/// One slot of the arena.
///
/// `parent` is a plain handle, never ownership; a directory owns its
/// children through its `Entries`.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeID>,
    pub(crate) backlinks: Vec<NodeID>,
    pub(crate) node_type: NodeType,
}

impl Node {
    pub(crate) fn new(name: String, node_type: NodeType) -> Self {
        Self {
            name,
            parent: None,
            backlinks: Vec::new(),
            node_type,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeID> {
        self.parent
    }

    /// Symlinks registered as pointing at this node.
    #[must_use]
    pub fn backlinks(&self) -> &[NodeID] {
        &self.backlinks
    }

    #[must_use]
    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self.node_type, NodeType::Directory(_))
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&str> {
        match &self.node_type {
            NodeType::File(content) => Some(content),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dir(&self) -> Option<&Entries> {
        match &self.node_type {
            NodeType::Directory(d) => Some(d),
            _ => None,
        }
    }

    pub(crate) fn as_dir_mut(&mut self) -> Option<&mut Entries> {
        match &mut self.node_type {
            NodeType::Directory(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symlink(&self) -> Option<&Symlink> {
        match &self.node_type {
            NodeType::Symlink(s) => Some(s),
            _ => None,
        }
    }
}

/// Checks a single path component for use as an entry name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("file.txt"));
        assert!(is_valid_name("Folder 6"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a/b"));
    }

    #[test]
    fn test_symlink_invalidate_is_permanent() {
        let mut link = Symlink::new("/a".to_string(), ROOT_ID);
        assert!(!link.is_broken());
        link.invalidate();
        assert!(link.is_broken());
        assert_eq!(link.target(), "/a");
    }
}
