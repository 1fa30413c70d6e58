//! TOML mount configuration.
//!
//! ```toml
//! [[mount]]
//! id = "photos"
//! path = "/srv/photos"
//!
//! [[mount]]
//! id = "docs"
//! path = "/home/amy/docs"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backends::LocalFs;
use crate::error::VfsError;
use crate::mount::validate_id;
use crate::multi::MultiFs;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("mount {0:?} is listed more than once")]
    DuplicateId(String),

    #[error("cannot mount {id:?}: {source}")]
    Mount {
        id: String,
        #[source]
        source: VfsError,
    },
}

/// One local directory to mount.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountConfig {
    /// Mount identifier.
    pub id: String,
    /// Host directory backing the mount. A leading `~` means the home
    /// directory.
    pub path: PathBuf,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MuxConfig {
    #[serde(default, rename = "mount")]
    pub mounts: Vec<MountConfig>,
}

impl MuxConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: MuxConfig = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject identifiers that would fail to mount or shadow each other.
    fn check(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for mount in &self.mounts {
            let id = validate_id(&mount.id).map_err(|source| ConfigError::Mount {
                id: mount.id.clone(),
                source,
            })?;
            if !seen.insert(id.to_string()) {
                return Err(ConfigError::DuplicateId(id.to_string()));
            }
        }
        Ok(())
    }

    /// Mount every entry as a [`LocalFs`].
    ///
    /// Stops at the first entry that fails; earlier entries stay mounted.
    pub fn apply(&self, mux: &MultiFs) -> Result<(), ConfigError> {
        for mount in &self.mounts {
            let path = expand_home(&mount.path);
            mux.mount(&mount.id, LocalFs::new(&path))
                .map_err(|source| ConfigError::Mount {
                    id: mount.id.clone(),
                    source,
                })?;
            tracing::info!(id = %mount.id, path = %path.display(), "mounted from config");
        }
        Ok(())
    }
}

/// Expand a leading `~` to the home directory.
///
/// Paths that are not valid UTF-8 are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}
