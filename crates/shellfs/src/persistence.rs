//! Whole-tree snapshots.
//!
//! A `Snapshot` is a plain serde tree, independent of node handles. Links
//! carry their anchor directory as a path and are re-anchored and
//! re-registered on restore.

use std::path::Path;

use diagnostics::{log_debug, log_info};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fs::FS;
use crate::node::{NodeID, NodeType, Symlink, is_valid_name};
use crate::path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Snapshot {
    File {
        name: String,
        #[serde(default)]
        content: String,
    },
    Directory {
        name: String,
        #[serde(default)]
        children: Vec<Snapshot>,
    },
    Symlink {
        name: String,
        target: String,
        /// Path of the directory the target is resolved from. `None` when
        /// that directory had been removed.
        #[serde(default)]
        anchor: Option<String>,
        #[serde(default)]
        broken: bool,
    },
}

impl Snapshot {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Snapshot::File { name, .. }
            | Snapshot::Directory { name, .. }
            | Snapshot::Symlink { name, .. } => name,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}

/// A restored link waiting for its anchor to be looked up.
struct PendingLink {
    id: NodeID,
    anchor: Option<String>,
}

impl FS {
    /// Exports the whole tree from the root.
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.snapshot_node(self.root())
    }

    fn snapshot_node(&self, id: NodeID) -> Result<Snapshot> {
        let node = self.node(id)?;
        let name = node.name().to_string();
        Ok(match node.node_type() {
            NodeType::File(content) => Snapshot::File {
                name,
                content: content.clone(),
            },
            NodeType::Directory(entries) => Snapshot::Directory {
                name,
                children: entries
                    .iter()
                    .map(|(_, child)| self.snapshot_node(child))
                    .collect::<Result<Vec<_>>>()?,
            },
            NodeType::Symlink(link) => Snapshot::Symlink {
                name,
                target: link.target().to_string(),
                anchor: self.display_path(link.anchor()).ok(),
                broken: link.is_broken(),
            },
        })
    }

    /// Rebuilds a filesystem from a snapshot with the default configuration.
    pub fn restore(snapshot: &Snapshot) -> Result<Self> {
        Self::restore_with_config(snapshot, Config::default())
    }

    /// Rebuilds a filesystem from a snapshot.
    ///
    /// The root must be a directory, every name must be valid and unique
    /// within its directory. A link whose anchor is gone keeps working
    /// when its target is absolute and is restored broken otherwise.
    pub fn restore_with_config(snapshot: &Snapshot, config: Config) -> Result<Self> {
        let Snapshot::Directory { children, .. } = snapshot else {
            return Err(Error::snapshot("root must be a directory"));
        };

        let mut fs = FS::with_config(config);
        let root = fs.root();
        let mut pending = Vec::new();
        for child in children {
            fs.restore_node(root, child, &mut pending)?;
        }

        for PendingLink { id, anchor } in pending {
            let anchor_dir = anchor
                .as_deref()
                .and_then(|p| fs.resolve(p, root, true).ok())
                .filter(|dir| fs.is_dir(*dir).unwrap_or(false));
            if let NodeType::Symlink(link) = &mut fs.node_mut(id)?.node_type {
                match anchor_dir {
                    Some(dir) => link.reanchor(dir),
                    None if path::is_absolute(link.target()) => link.reanchor(root),
                    None => {
                        log_debug!("Restored link {target} lost its anchor", target: link.target());
                        link.invalidate();
                    }
                }
            }
            _ = fs.register_backlink(id);
        }

        log_info!("Restored snapshot with {count} nodes", count: fs.node_count());
        Ok(fs)
    }

    fn restore_node(
        &mut self,
        dir: NodeID,
        snapshot: &Snapshot,
        pending: &mut Vec<PendingLink>,
    ) -> Result<()> {
        let name = snapshot.name();
        if !is_valid_name(name) {
            return Err(Error::snapshot(format!("invalid name '{name}'")));
        }
        if self.entries(dir)?.contains(name) {
            return Err(Error::snapshot(format!(
                "duplicate entry '{name}' in {}",
                self.display_path(dir)?
            )));
        }

        match snapshot {
            Snapshot::File { content, .. } => {
                _ = self.create_file(dir, name, content)?;
            }
            Snapshot::Directory { children, .. } => {
                let id = self.create_dir(dir, name)?;
                for child in children {
                    self.restore_node(id, child, pending)?;
                }
            }
            Snapshot::Symlink {
                target,
                anchor,
                broken,
                ..
            } => {
                // Anchored at the root until the whole tree exists
                let link = Symlink::new(target.clone(), self.root()).with_broken(*broken);
                let id = self.create_node(dir, name, NodeType::Symlink(link))?;
                pending.push(PendingLink {
                    id,
                    anchor: anchor.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FS {
        let mut fs = FS::new();
        let root = fs.root();
        let a = fs.create_dir(root, "a").unwrap();
        fs.create_file(a, "f", "hello").unwrap();
        fs.create_file(root, "Z", "").unwrap();
        fs.create_symlink(root, "abs", "/a/f", a).unwrap();
        fs.create_symlink(root, "rel", "f", a).unwrap();
        fs
    }

    #[test]
    fn test_snapshot_shape() {
        let fs = sample();
        let Snapshot::Directory { name, children } = fs.snapshot().unwrap() else {
            panic!("root is a directory");
        };
        assert_eq!(name, "");
        let names: Vec<_> = children.iter().map(Snapshot::name).collect();
        assert_eq!(names, vec!["a", "abs", "rel", "Z"]);
        assert_eq!(
            children[2],
            Snapshot::Symlink {
                name: "rel".to_string(),
                target: "f".to_string(),
                anchor: Some("/a".to_string()),
                broken: false,
            }
        );
    }

    #[test]
    fn test_restore_relinks() {
        let fs = sample();
        let restored = FS::restore(&fs.snapshot().unwrap()).unwrap();
        let root = restored.root();

        let f = restored.resolve("/a/f", root, true).unwrap();
        assert_eq!(restored.read_file(f).unwrap(), "hello");
        assert_eq!(restored.resolve("rel", root, true).unwrap(), f);
        assert_eq!(restored.backlinks(f).unwrap().len(), 2);
        assert_eq!(restored.snapshot().unwrap(), fs.snapshot().unwrap());
    }

    #[test]
    fn test_json_text() {
        let snapshot = Snapshot::from_json(
            r#"{"type": "directory", "name": "", "children": [
                {"type": "file", "name": "notes", "content": "x"},
                {"type": "symlink", "name": "n", "target": "/notes"}
            ]}"#,
        )
        .unwrap();
        let fs = FS::restore(&snapshot).unwrap();
        let root = fs.root();
        let notes = fs.resolve("n", root, true).unwrap();
        assert_eq!(fs.read_file(notes).unwrap(), "x");

        let again = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(again, snapshot);
    }

    #[test]
    fn test_lost_anchor() {
        let mut fs = sample();
        let root = fs.root();
        let a = fs.resolve("/a", root, true).unwrap();
        fs.remove(a).unwrap();

        let snapshot = fs.snapshot().unwrap();
        let Snapshot::Directory { children, .. } = &snapshot else {
            panic!("root is a directory");
        };
        assert!(
            children
                .iter()
                .all(|c| !matches!(c, Snapshot::Symlink { anchor: Some(_), .. }))
        );

        // Both links were invalidated by the removal
        let restored = FS::restore(&snapshot).unwrap();
        let abs = restored.resolve_entry("abs", root).unwrap();
        assert!(restored.node(abs).unwrap().as_symlink().unwrap().is_broken());
    }

    #[test]
    fn test_lost_anchor_of_valid_links() {
        let snapshot = Snapshot::Directory {
            name: String::new(),
            children: vec![
                Snapshot::File {
                    name: "t".to_string(),
                    content: String::new(),
                },
                Snapshot::Symlink {
                    name: "abs".to_string(),
                    target: "/t".to_string(),
                    anchor: None,
                    broken: false,
                },
                Snapshot::Symlink {
                    name: "rel".to_string(),
                    target: "t".to_string(),
                    anchor: Some("/gone".to_string()),
                    broken: false,
                },
            ],
        };
        let fs = FS::restore(&snapshot).unwrap();
        let root = fs.root();
        let t = fs.resolve("t", root, false).unwrap();
        assert_eq!(fs.resolve("abs", root, true).unwrap(), t);
        assert_eq!(fs.resolve("rel", root, true), Err(Error::broken_link("t")));
    }

    #[test]
    fn test_invalid_snapshots() {
        let file = |name: &str| Snapshot::File {
            name: name.to_string(),
            content: String::new(),
        };
        assert_eq!(
            FS::restore(&file("root")).err(),
            Some(Error::snapshot("root must be a directory"))
        );

        let dup = Snapshot::Directory {
            name: String::new(),
            children: vec![file("x"), file("x")],
        };
        assert_eq!(
            FS::restore(&dup).err(),
            Some(Error::snapshot("duplicate entry 'x' in /"))
        );

        let bad = Snapshot::Directory {
            name: String::new(),
            children: vec![file("a/b")],
        };
        assert_eq!(
            FS::restore(&bad).err(),
            Some(Error::snapshot("invalid name 'a/b'"))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tree.json");
        let snapshot = sample().snapshot().unwrap();

        snapshot.save(&file).unwrap();
        assert_eq!(Snapshot::load(&file).unwrap(), snapshot);
        assert!(matches!(
            Snapshot::load(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
