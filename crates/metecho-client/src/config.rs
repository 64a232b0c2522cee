use crate::error::{ClientError, Result};
use crate::urls::ApiUrls;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CONFIG_DIR: &str = ".metecho";
pub const CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub urls: ApiUrls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentry_dsn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Config {
    /// `~/.metecho/config.yaml`
    pub fn default_path() -> Result<PathBuf> {
        let home = home::home_dir().ok_or(ClientError::HomeNotFound)?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    /// Write atomically: temp file in the target directory, then rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn require_server(&self) -> Result<&str> {
        self.server_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Config(
                    "no server configured: pass --server or run 'metecho config set-server'"
                        .to_string(),
                )
            })
    }

    /// Overlay command-line / environment values onto the file values.
    pub fn with_overrides(mut self, server: Option<String>, token: Option<String>) -> Self {
        if server.is_some() {
            self.server_url = server;
        }
        if token.is_some() {
            self.token = token;
        }
        self
    }
}
