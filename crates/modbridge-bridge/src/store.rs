//! Configuration persistence

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host persistence hook, called by the menu's save callback
pub trait ConfigStore<C>: Send + Sync {
    fn write_config(&self, config: &C) -> anyhow::Result<()>;
}

/// Stores a configuration as pretty-printed JSON at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored configuration; `None` if nothing was saved yet
    pub fn load<C: DeserializeOwned>(&self) -> anyhow::Result<Option<C>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(config))
    }
}

impl<C: Serialize> ConfigStore<C> for JsonFileStore {
    fn write_config(&self, config: &C) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))?;
        debug!(category = "bridge", path = %self.path.display(), "config written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modbridge_config::KeybindList;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        volume: i32,
        open_menu: KeybindList,
    }

    #[test]
    fn test_write_creates_directories_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("mods/audio/config.json"));
        assert!(store.load::<Sample>().unwrap().is_none());

        let sample = Sample {
            volume: 40,
            open_menu: "LeftShift + F5".parse().unwrap(),
        };
        store.write_config(&sample).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"open_menu\": \"LeftShift + F5\""));
        assert_eq!(store.load::<Sample>().unwrap(), Some(sample));
    }

    #[test]
    fn test_load_reports_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load::<Sample>().unwrap_err();
        assert!(format!("{:#}", err).contains("parsing"));
    }
}
