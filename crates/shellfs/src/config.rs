//! Filesystem configuration.
//!
//! Every field has a default, so an empty YAML document is a valid
//! configuration. `Config::load` reads the file named by `SHELLFS_CONFIG`
//! when it is set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "SHELLFS_CONFIG";

/// Default maximum length of a symlink chain.
pub const SYMLINK_HOP_LIMIT: u32 = 10;

/// Largest accepted `symlink_hop_limit`. Each hop is resolved recursively,
/// so the limit also bounds stack use.
pub const MAX_SYMLINK_HOP_LIMIT: u32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Symlink hops allowed while resolving one path before failing with
    /// `SymlinkLoop`.
    pub symlink_hop_limit: u32,

    /// Inserted between existing content and appended text.
    pub append_separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symlink_hop_limit: SYMLINK_HOP_LIMIT,
            append_separator: "\n".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yaml_ng::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Reads the file named by `SHELLFS_CONFIG`, or returns the defaults
    /// when the variable is unset.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(self) -> Result<Self> {
        if self.symlink_hop_limit == 0 {
            return Err(Error::Config(
                "symlink_hop_limit must be at least 1".to_string(),
            ));
        }
        if self.symlink_hop_limit > MAX_SYMLINK_HOP_LIMIT {
            return Err(Error::Config(format!(
                "symlink_hop_limit must be at most {MAX_SYMLINK_HOP_LIMIT}, got {}",
                self.symlink_hop_limit
            )));
        }
        Ok(self)
    }
}
