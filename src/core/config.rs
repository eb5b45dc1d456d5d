use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::core::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_path: PathBuf,
    pub in_memory: bool,                        // No files, nothing survives the process

    pub cache_size: usize,                      // redb page cache, bytes

    pub repair_on_open: bool,                   // Rebuild derived indexes at startup
    pub default_stop_words: Vec<String>,        // Seeded only if the store has no list yet
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from("./data"),
            in_memory: false,

            cache_size: 64 * 1024 * 1024,

            repair_on_open: false,
            default_stop_words: ["a", "an", "and", "of", "the"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    pub fn in_memory() -> Self {
        Config {
            in_memory: true,
            ..Config::default()
        }
    }

    pub fn at(storage_path: impl Into<PathBuf>) -> Self {
        Config {
            storage_path: storage_path.into(),
            ..Config::default()
        }
    }

    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}
