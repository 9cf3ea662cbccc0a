use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::FormPreset;

/// JSON-backed storage of field presets.
///
/// The file is a plain ordered array of records; an absent file means
/// "no presets yet", never an error.
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform data dir, e.g. `~/.local/share/webfill/presets.json`.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("webfill");
        path.push("presets.json");
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Vec<FormPreset>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no preset file");
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read presets from {}", self.path.display()))?;
        let presets: Vec<FormPreset> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed preset file {}", self.path.display()))?;

        info!(path = %self.path.display(), count = presets.len(), "presets loaded");
        Ok(presets)
    }

    pub fn save(&self, presets: &[FormPreset]) -> Result<()> {
        if presets.is_empty() {
            anyhow::bail!("nothing to save: preset list is empty");
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let raw = serde_json::to_string_pretty(presets)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write presets to {}", self.path.display()))?;

        info!(path = %self.path.display(), count = presets.len(), "presets saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "presets_test.rs"]
mod presets_test;
