//! Start-up configuration.
//!
//! Loaded once from an optional JSON file and handed to consumers by
//! reference. A missing file yields [`Config::default`].

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Column layout of one resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub columns: Vec<String>,
}

/// A shortcut that jumps to another resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotKey {
    /// Key as accepted by `KeyBinding::parse`, e.g. `Shift-0`.
    pub shortcut: String,
    #[serde(default)]
    pub description: String,
    /// Resource kind to show.
    pub command: String,
}

/// Port-forward defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Local bind address offered by the dialog.
    pub address: String,
    /// Host the forwarder connects to for the remote side.
    pub upstream_host: String,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            upstream_host: "127.0.0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dump_dir: PathBuf,
    pub refresh_secs: u64,
    /// Keyed by canonical resource kind.
    pub views: BTreeMap<String, ViewConfig>,
    /// Keyed by hotkey name.
    pub hotkeys: BTreeMap<String, HotKey>,
    pub forward: ForwardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dump_dir: std::env::temp_dir().join("kview-dumps"),
            refresh_secs: DEFAULT_REFRESH_SECS,
            views: BTreeMap::new(),
            hotkeys: BTreeMap::new(),
            forward: ForwardConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let cfg: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            views = cfg.views.len(),
            hotkeys = cfg.hotkeys.len(),
            "config loaded"
        );
        Ok(cfg)
    }

    /// Explicit column list for `kind`, empty when none is configured.
    pub fn columns(&self, kind: &str) -> &[String] {
        self.views
            .get(kind)
            .map(|v| v.columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}
