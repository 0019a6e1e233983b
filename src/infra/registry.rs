//! Infrastructure implementation of the `RegistryStore` port.
//!
//! `RegistryManager` provides async commit/load/remove using
//! `tokio::task::spawn_blocking` with atomic write (temp file + rename)
//! to prevent registry corruption.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::RegistryStore;
use crate::domain::DeploymentRecord;

/// Deployment registry file manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryManager;

impl RegistryManager {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Default registry path (`~/.apiary/registry.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".apiary").join("registry.json"))
    }

    /// Path for the on-demand registry a simulation run writes and removes.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn simulation_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".apiary").join("simulation-registry.json"))
    }

    fn commit_sync(record: &DeploymentRecord, path: &Path) -> Result<String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content =
            serde_json::to_string_pretty(record).context("serializing deployment record")?;

        // Atomic write via temp file then rename.
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, path)
            .with_context(|| format!("finalizing registry file {}", path.display()))?;

        Ok(path.display().to_string())
    }

    fn load_sync(path: &Path) -> Result<Option<DeploymentRecord>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading registry file {}", path.display()))?;
        let record: DeploymentRecord = serde_json::from_str(&content)
            .with_context(|| format!("parsing registry file {}", path.display()))?;
        Ok(Some(record))
    }

    fn remove_sync(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("removing registry file {}", path.display()))?;
        }
        Ok(())
    }
}

impl RegistryStore for RegistryManager {
    async fn commit(&self, record: &DeploymentRecord, path: &Path) -> Result<String> {
        let record = record.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::commit_sync(&record, &path))
            .await
            .context("registry commit task panicked")?
    }

    async fn load(&self, path: &Path) -> Result<Option<DeploymentRecord>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::load_sync(&path))
            .await
            .context("registry load task panicked")?
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::remove_sync(&path))
            .await
            .context("registry remove task panicked")?
    }
}
