use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;

// Rows files can be large; presets and configs are tiny but share the limit
const MAX_FILE_SIZE_BYTES: u64 = 512 * 1024 * 1024;

/// Reject files above the size limit before reading them
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Open, size-check and deserialize a JSON file
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    // Check size on the open handle to avoid a TOCTOU race
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    validate_file_size(&file, path)?;

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Write pretty JSON atomically (temp file + rename)
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    fs::write(temp_path, json)
        .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
    fs::rename(temp_path, path)
        .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let mut value = BTreeMap::new();
        value.insert("a".to_string(), 1);

        write_json_atomic(&path, &value).unwrap();
        let loaded: BTreeMap<String, i32> = read_json_file(&path).unwrap();

        assert_eq!(loaded, value);
        assert!(!dir.path().join("nested").join("data.json.tmp").exists());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_json_file::<Vec<i32>>(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_read_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json_file::<Vec<i32>>(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
