//! Engine configuration loaded from `config.json` in the config directory.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::popup::search::SearchMode;
use crate::utils::{get_config_dir, read_json_file};

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Scans and sorts at least this large run on the rayon pool
    pub parallel_sort_threshold: usize,
    pub default_search_mode: SearchMode,
    /// chrono format for date labels in popups
    pub date_format: String,
    /// chrono format for time-of-day labels in popups
    pub time_format: String,
    /// Append the candidate build time to the popup status line
    pub show_elapsed_time: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            parallel_sort_threshold: 10_000,
            default_search_mode: SearchMode::Contains,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            show_elapsed_time: true,
        }
    }
}

impl FilterConfig {
    /// Load from an explicit path; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = read_json_file(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Reject label formats chrono cannot parse
    pub fn validate(&self) -> Result<()> {
        for (name, format) in [("date_format", &self.date_format), ("time_format", &self.time_format)] {
            if !is_valid_format(format) {
                bail!("Invalid {}: {:?}", name, format);
            }
        }
        Ok(())
    }

    /// Load `config.json` from the config directory, or defaults if there is none
    pub fn load_default() -> Result<Self> {
        let path = get_config_dir()?.join(CONFIG_FILENAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

pub(crate) fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}
