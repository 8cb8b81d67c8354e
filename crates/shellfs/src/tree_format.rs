//! Box-drawing rendering of a subtree.
//!
//! ```
//! use shellfs::FS;
//!
//! let mut fs = FS::new();
//! let root = fs.root();
//! let docs = fs.create_dir(root, "docs").unwrap();
//! fs.create_file(docs, "a.txt", "").unwrap();
//! fs.create_file(root, "notes", "").unwrap();
//!
//! assert_eq!(
//!     fs.tree(root).unwrap().to_string(),
//!     "/\n├─┬ docs/\n│ └── a.txt\n└── notes\n"
//! );
//! ```

use std::fmt;

use crate::error::Result;
use crate::fs::FS;
use crate::node::{NodeID, NodeType};

/// One labelled entry of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Renders `root` and everything below it, one entry per line.
#[must_use]
pub fn format_tree(root: &TreeNode) -> String {
    let mut out = String::new();
    out.push_str(&root.label);
    out.push('\n');
    format_children(&mut out, &root.children, "");
    out
}

fn format_children(out: &mut String, children: &[TreeNode], prefix: &str) {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let (connector, continuation) = match (last, child.children.is_empty()) {
            (false, true) => ("├──", '│'),
            (false, false) => ("├─┬", '│'),
            (true, true) => ("└──", ' '),
            (true, false) => ("└─┬", ' '),
        };

        out.push_str(prefix);
        out.push_str(connector);
        out.push(' ');
        out.push_str(&child.label);
        out.push('\n');

        if !child.children.is_empty() {
            let nested = format!("{prefix}{continuation} ");
            format_children(out, &child.children, &nested);
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_tree(self))
    }
}

impl FS {
    /// Builds the display tree of `id`. Directories are labelled with a
    /// trailing `/`, links with their stored target. Links are not
    /// descended into.
    pub fn tree(&self, id: NodeID) -> Result<TreeNode> {
        let node = self.node(id)?;
        let label = match node.node_type() {
            _ if id.is_root() => "/".to_string(),
            NodeType::File(_) => node.name().to_string(),
            NodeType::Directory(_) => format!("{}/", node.name()),
            NodeType::Symlink(link) if link.is_broken() => {
                format!("{} -> {} (broken)", node.name(), link.target())
            }
            NodeType::Symlink(link) => format!("{} -> {}", node.name(), link.target()),
        };

        let mut tree = TreeNode::new(label);
        if let Some(entries) = node.as_dir() {
            for (_, child) in entries.iter() {
                tree.children.push(self.tree(child)?);
            }
        }
        Ok(tree)
    }
}
