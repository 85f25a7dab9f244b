//! Loading and saving the persisted [`SplitConfiguration`].

use crate::error::{NoteSplitterError, Result};
use crate::types::SplitConfiguration;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of the settings record inside a vault.
pub const SETTINGS_FILE_NAME: &str = ".note-splitter.json";

pub fn default_settings_path(vault: &Path) -> PathBuf {
    vault.join(SETTINGS_FILE_NAME)
}

/// Reads the settings record; a missing file yields the defaults.
pub async fn load_settings(path: &Path) -> Result<SplitConfiguration> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(SplitConfiguration::default());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&content).map_err(|e| NoteSplitterError::Settings {
        reason: format!("Cannot parse {}: {}", path.display(), e),
    })
}

pub async fn save_settings(path: &Path, config: &SplitConfiguration) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).await?;

    info!("Saved settings to {}", path.display());
    Ok(())
}
