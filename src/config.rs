//! Storage configuration
//!
//! Read from `~/.config/shardstore/config.json` by default:
//!
//! ```json
//! {
//!   "storage_root": "/srv/shardstore",
//!   "page_size": 100,
//!   "default_mime_type": "application/octet-stream",
//!   "mime_types": { "toml": "application/toml" }
//! }
//! ```
//!
//! Every field is optional. `SHARDSTORE_ROOT` overrides `storage_root`.

use crate::listing::DEFAULT_PAGE_SIZE;
use crate::mime::{MimeRegistry, DEFAULT_MIME_TYPE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the storage root
pub const ROOT_ENV_VAR: &str = "SHARDSTORE_ROOT";

const APP_DIR: &str = "shardstore";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one sub-directory per bucket
    pub storage_root: PathBuf,
    /// Listing page size used when a caller does not pass a limit
    pub page_size: usize,
    /// Content type for names without a known extension
    pub default_mime_type: String,
    /// Extra or replacement extension mappings
    pub mime_types: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_root: default_storage_root(),
            page_size: DEFAULT_PAGE_SIZE,
            default_mime_type: DEFAULT_MIME_TYPE.to_string(),
            mime_types: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Default config file location (`<config_dir>/shardstore/config.json`)
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from [`Config::default_path`] when `None`.
    ///
    /// A missing file yields defaults. The environment override is applied
    /// last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
            Self::from_json(&content)
                .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };

        if let Some(root) = std::env::var_os(ROOT_ENV_VAR) {
            config.storage_root = PathBuf::from(root);
        }
        Ok(config)
    }

    /// Parse a JSON config document
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        if config.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".into()));
        }
        Ok(config)
    }

    /// Save to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// Mime registry with the configured default and overrides applied
    pub fn mime_registry(&self) -> MimeRegistry {
        self.mime_types.iter().fold(
            MimeRegistry::builtin().with_default(self.default_mime_type.clone()),
            |registry, (ext, mime)| registry.with_override(ext, mime.clone()),
        )
    }
}

fn default_storage_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
