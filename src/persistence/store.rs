//! Snapshot storage backends

use std::fs;
use std::path::{Path, PathBuf};

use super::SaveData;
use crate::error::Result;

/// Somewhere a snapshot can be loaded from and saved to
pub trait SaveStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<SaveData>>;
    fn save(&mut self, data: &SaveData) -> Result<()>;
}

/// JSON file on disk
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

    fn sibling(&self, extension: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling("bak")
    }
}

impl SaveStore for JsonFileStore {
    fn load(&self) -> Result<Option<SaveData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        match SaveData::from_json(&json) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                // Fall back to the previous save if the current one is corrupt
                let backup = self.backup_path();
                if !backup.exists() {
                    return Err(e);
                }
                log::warn!("Save at {} unreadable ({}), trying backup", self.path.display(), e);
                let json = fs::read_to_string(&backup)?;
                Ok(Some(SaveData::from_json(&json)?))
            }
        }
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        let tmp = self.sibling("tmp");
        fs::write(&tmp, data.to_json()?)?;
        if self.path.exists() {
            let backup = self.backup_path();
            if backup.exists() {
                fs::remove_file(&backup)?;
            }
            fs::rename(&self.path, backup)?;
        }
        fs::rename(&tmp, &self.path)?;
        log::info!("Game saved to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub data: Option<SaveData>,
    pub saves: u32,
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<SaveData>> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        self.data = Some(data.clone());
        self.saves += 1;
        Ok(())
    }
}
