use anyhow::Result;
use std::path::PathBuf;

use crate::presets::PresetStore;

/// Print the stored presets as JSON; an absent file prints an empty list.
pub fn handle_presets(file: Option<PathBuf>) -> Result<()> {
    let store = PresetStore::new(file.unwrap_or_else(PresetStore::default_path));
    let presets = store.load()?;
    println!("{}", serde_json::to_string_pretty(&presets)?);
    Ok(())
}
