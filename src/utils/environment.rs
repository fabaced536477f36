use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable overriding the configuration directory
pub const HOME_ENV_VAR: &str = "GRID_FILTER_HOME";

const APP_DIR_NAME: &str = "grid-filter";
const PRESETS_DIR_NAME: &str = "presets";

/// Directory holding `config.json` and saved presets
///
/// `$GRID_FILTER_HOME` if set, else the platform config directory
/// (`~/.config/grid-filter` on Linux).
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::config_dir().context("Failed to get platform config directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Directory where named filter presets are stored
pub fn get_presets_dir() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(PRESETS_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn test_config_dir_env_override() {
        // Save original value
        let original = env::var_os(HOME_ENV_VAR);

        // SAFETY: Setting environment variables in tests is safe as long as:
        // 1. No other test reads this variable concurrently
        // 2. We restore the original value afterwards
        unsafe {
            env::set_var(HOME_ENV_VAR, "/tmp/grid-filter-test");
        }

        assert_eq!(get_config_dir().unwrap(), PathBuf::from("/tmp/grid-filter-test"));
        assert_eq!(
            get_presets_dir().unwrap(),
            PathBuf::from("/tmp/grid-filter-test").join("presets")
        );

        // Restore original value
        unsafe {
            match original {
                Some(value) => env::set_var(HOME_ENV_VAR, value),
                None => env::remove_var(HOME_ENV_VAR),
            }
        }
    }
}
