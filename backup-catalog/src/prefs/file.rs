//! Preference store persisted as a flat TOML table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::PreferenceStore;
use crate::Result;

/// Store backed by a TOML file of string values. Every `put` rewrites the file.
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlFileStore {
    /// Open the store at `path`. A missing file starts out empty.
    pub fn open(path: &Path) -> Result<Self> {
        let values: BTreeMap<String, String> = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        debug!("Loaded {} preference(s) from {}", values.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string(&self.values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for TomlFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogError;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = TomlFileStore::open(&temp_dir.path().join("prefs.toml"))?;
        assert_eq!(store.get("sortFilter")?, None);
        Ok(())
    }

    #[test]
    fn test_values_survive_reopen() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested/prefs.toml");

        let mut store = TomlFileStore::open(&path)?;
        store.put("sortFilter", "1203")?;
        store.put("theme", "dark")?;

        let reopened = TomlFileStore::open(&path)?;
        assert_eq!(reopened.get("sortFilter")?.as_deref(), Some("1203"));
        assert_eq!(reopened.get("theme")?.as_deref(), Some("dark"));
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("prefs.toml");
        std::fs::write(&path, "this is = = not toml")?;

        assert!(matches!(TomlFileStore::open(&path), Err(CatalogError::Toml(_))));
        Ok(())
    }
}
