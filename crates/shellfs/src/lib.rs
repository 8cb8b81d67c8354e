//! An in-memory hierarchical filesystem addressed by Unix-style paths.
//!
//! Nodes are files, directories and symbolic links stored in an arena
//! owned by [`FS`]. Paths are resolved against a starting directory with
//! `.` and `..` handled and symlinks followed, copies and moves duplicate
//! whole subtrees, and removing a node breaks every link that pointed into
//! it. [`Session`] adds a working directory on top.
//!
//! ```
//! use shellfs::Session;
//!
//! let mut session = Session::new();
//! session.mkdir("docs").unwrap();
//! session.create_file("docs/readme", "hello").unwrap();
//! session.link("latest", "docs/readme").unwrap();
//!
//! assert_eq!(session.cat("latest").unwrap(), "hello");
//! assert_eq!(session.absolute_path("docs/readme").unwrap(), "/docs/readme/");
//! ```

pub mod config;
pub mod copy;
pub mod dir;
pub mod error;
pub mod fs;
pub mod node;
pub mod path;
pub mod persistence;
pub mod resolve;
pub mod session;
pub mod symlink;
pub mod tree_format;

pub use config::Config;
pub use copy::MoveOutcome;
pub use diagnostics::init_diagnostics;
pub use dir::Entries;
pub use error::{EntryKind, Error, Result};
pub use fs::FS;
pub use node::{Node, NodeID, NodeType, Symlink};
pub use persistence::Snapshot;
pub use session::Session;
pub use tree_format::{TreeNode, format_tree};

#[cfg(test)]
mod tests;
