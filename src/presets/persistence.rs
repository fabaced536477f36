//! Preset files: load/save with atomic writes

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use super::PresetEntry;
use crate::utils::{get_presets_dir, read_json_file, write_json_atomic};

const PRESET_EXTENSION: &str = "json";

/// Path of a named preset inside the presets directory
pub fn preset_path(name: &str) -> Result<PathBuf> {
    // Names become file names; keep them to a single path component
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        bail!("Invalid preset name: {:?}", name);
    }
    Ok(get_presets_dir()?.join(format!("{}.{}", name, PRESET_EXTENSION)))
}

pub fn save_presets(path: &Path, entries: &[PresetEntry]) -> Result<()> {
    write_json_atomic(path, entries).context("Failed to save filter preset")?;
    info!(path = %path.display(), filters = entries.len(), "preset saved");
    Ok(())
}

pub fn load_presets(path: &Path) -> Result<Vec<PresetEntry>> {
    let entries: Vec<PresetEntry> = read_json_file(path).context("Failed to load filter preset")?;
    info!(path = %path.display(), filters = entries.len(), "preset loaded");
    Ok(entries)
}
