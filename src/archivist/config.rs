use crate::error::{ArchiveError, Result};
use crate::query::{SortBy, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for archivist, stored in `<data-dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveConfig {
    /// Results per page when a command does not ask for a limit
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Sort order for searches that do not name one
    #[serde(default)]
    pub default_sort: SortBy,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_LIMIT,
            default_sort: SortBy::default(),
        }
    }
}

impl ArchiveConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ArchiveError::Io)?;
        let config: ArchiveConfig =
            serde_json::from_str(&content).map_err(ArchiveError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(ArchiveError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ArchiveError::Serialization)?;
        fs::write(config_path, content).map_err(ArchiveError::Io)?;
        Ok(())
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if size == 0 || size > MAX_PAGE_LIMIT {
            return Err(ArchiveError::Api(format!(
                "page-size must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        self.page_size = size;
        Ok(())
    }

    pub fn set_default_sort(&mut self, sort: SortBy) {
        self.default_sort = sort;
    }

    pub const KEYS: [&'static str; 2] = ["page-size", "default-sort"];

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "page-size" => Some(self.page_size.to_string()),
            "default-sort" => Some(self.default_sort.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "page-size" => {
                let size = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("page-size must be a number, got '{}'", value))?;
                self.set_page_size(size).map_err(|e| e.to_string())
            }
            "default-sort" => {
                let sort = value.parse::<SortBy>().map_err(|e| e.to_string())?;
                self.set_default_sort(sort);
                Ok(())
            }
            other => Err(format!("Unknown config key: {}", other)),
        }
    }
}
