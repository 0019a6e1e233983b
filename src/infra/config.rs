//! Infrastructure implementation of the `ConfigStore` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::ApiaryConfig;

/// Production `ConfigStore` reading a YAML file on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlConfigStore;

impl YamlConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve the config path: `APIARY_CONFIG` overrides the default
    /// `~/.apiary/config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn path() -> Result<PathBuf> {
        if let Ok(val) = std::env::var("APIARY_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".apiary").join("config.yaml"))
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ApiaryConfig> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(ApiaryConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }
}
