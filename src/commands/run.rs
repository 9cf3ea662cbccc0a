use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

use crate::commands::utils::{self, SessionArgs};
use crate::filler::FillConfig;
use crate::presets::PresetStore;
use crate::runner::{self, FieldSpec};

/// Fill every preset field in order, using a `{item: value}` JSON map for
/// the input values. Fields without a value entry are filled with an empty
/// value (text fields are cleared, selects take the first option).
pub async fn handle_run(
    presets_file: Option<PathBuf>,
    values_file: Option<PathBuf>,
    url: Option<String>,
    session: SessionArgs,
    config: FillConfig,
) -> Result<()> {
    let store = PresetStore::new(presets_file.unwrap_or_else(PresetStore::default_path));
    let presets = store.load()?;
    if presets.is_empty() {
        anyhow::bail!("No presets stored at {}", store.path().display());
    }

    let values: HashMap<String, String> = match &values_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read values from {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Malformed values file {}", path.display()))?
        }
        None => HashMap::new(),
    };

    let fields: Vec<FieldSpec> = presets
        .into_iter()
        .map(|preset| FieldSpec {
            value: values.get(&preset.item).cloned().unwrap_or_default(),
            preset,
        })
        .collect();

    info!("Running {} preset field(s)", fields.len());

    let mut filler = utils::start_session(&session, config).await?;
    if let Some(url) = &url {
        filler.page().goto(url).await?;
    }

    let report = runner::send_all(&mut filler, &fields).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.all_ok() {
        Ok(())
    } else {
        anyhow::bail!("{} field(s) failed", report.failures.len())
    }
}
