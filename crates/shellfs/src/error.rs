use crate::node::NodeID;

pub type Result<T> = std::result::Result<T, Error>;

/// What a failed lookup was expecting to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Entry,
    Directory,
    File,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Entry => write!(f, "file or directory"),
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::File => write!(f, "file"),
        }
    }
}

/// Represents errors that can occur in filesystem operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path} - No such {kind} exists")]
    NotFound { path: String, kind: EntryKind },

    #[error("{name} - File already exists")]
    AlreadyExists { name: String },

    #[error("Cannot copy or move root directory")]
    CannotCopyRoot,

    #[error("Cannot copy or move file or folder to self")]
    CannotCopyToSelf,

    #[error("Copy or move destination must be directory")]
    DestinationMustBeDirectory,

    #[error("{path} - Broken link")]
    BrokenLink { path: String },

    #[error("{path} - '.', '..' and '/' may not be removed")]
    InvalidRemovePath { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Not a file: {path}")]
    NotAFile { path: String },

    #[error("Too many symbolic links: {path}")]
    SymlinkLoop { path: String },

    #[error("Invalid name: '{name}'")]
    InvalidName { name: String },

    #[error("Node {id} is no longer attached")]
    Detached { id: NodeID },

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found<S: Into<String>>(path: S, kind: EntryKind) -> Self {
        Error::NotFound {
            path: path.into(),
            kind,
        }
    }

    pub fn already_exists<S: Into<String>>(name: S) -> Self {
        Error::AlreadyExists { name: name.into() }
    }

    pub fn broken_link<S: Into<String>>(path: S) -> Self {
        Error::BrokenLink { path: path.into() }
    }

    pub fn invalid_remove_path<S: Into<String>>(path: S) -> Self {
        Error::InvalidRemovePath { path: path.into() }
    }

    pub fn not_a_directory<S: Into<String>>(path: S) -> Self {
        Error::NotADirectory { path: path.into() }
    }

    pub fn not_a_file<S: Into<String>>(path: S) -> Self {
        Error::NotAFile { path: path.into() }
    }

    pub fn symlink_loop<S: Into<String>>(path: S) -> Self {
        Error::SymlinkLoop { path: path.into() }
    }

    pub fn invalid_name<S: Into<String>>(name: S) -> Self {
        Error::InvalidName { name: name.into() }
    }

    pub fn detached(id: NodeID) -> Self {
        Error::Detached { id }
    }

    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        Error::Snapshot(msg.into())
    }

    /// True for lookup failures that a symlink hop should report as a broken link.
    pub(crate) fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::NotADirectory { .. }
                | Error::NotAFile { .. }
                | Error::Detached { .. }
        )
    }
}

// Typed comparisons in tests; ambient errors compare by message.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        use Error::*;
        match (self, other) {
            (NotFound { path: a, kind: ka }, NotFound { path: b, kind: kb }) => a == b && ka == kb,
            (AlreadyExists { name: a }, AlreadyExists { name: b }) => a == b,
            (CannotCopyRoot, CannotCopyRoot) => true,
            (CannotCopyToSelf, CannotCopyToSelf) => true,
            (DestinationMustBeDirectory, DestinationMustBeDirectory) => true,
            (BrokenLink { path: a }, BrokenLink { path: b }) => a == b,
            (InvalidRemovePath { path: a }, InvalidRemovePath { path: b }) => a == b,
            (NotADirectory { path: a }, NotADirectory { path: b }) => a == b,
            (NotAFile { path: a }, NotAFile { path: b }) => a == b,
            (SymlinkLoop { path: a }, SymlinkLoop { path: b }) => a == b,
            (InvalidName { name: a }, InvalidName { name: b }) => a == b,
            (Detached { id: a }, Detached { id: b }) => a == b,
            (Snapshot(a), Snapshot(b)) => a == b,
            (Config(a), Config(b)) => a == b,
            (Io(a), Io(b)) => a.to_string() == b.to_string(),
            (Json(a), Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
