use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wallcycle_common::{SnapshotStore, WallcycleError, error::ConfigError, Result};

pub const CONFIG_FILE: &str = "ManagerCheckpoint.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    pub root_directory: PathBuf,
    pub save_directory: PathBuf,
    #[serde(default = "default_legal_extensions")]
    pub legal_extensions: Vec<String>,
    #[serde(default = "default_update_period_minutes")]
    pub update_period_minutes: u64,
}

// Default values
fn default_legal_extensions() -> Vec<String> {
    [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp", ".avif"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_update_period_minutes() -> u64 {
    10
}

impl Config {
    pub fn new(root_directory: PathBuf, save_directory: PathBuf) -> Self {
        Self {
            root_directory,
            save_directory,
            legal_extensions: default_legal_extensions(),
            update_period_minutes: default_update_period_minutes(),
        }
    }

    /// Loads `ManagerCheckpoint.json` from `save_directory` and validates it.
    pub fn load(save_directory: &Path) -> Result<Self> {
        Self::load_from_path(&Self::config_path(save_directory))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WallcycleError::Config(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| WallcycleError::Config(ConfigError::JsonParse {
                message: e.to_string(),
            }))?;

        config.validate()?;
        log::info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    pub fn config_path(save_directory: &Path) -> PathBuf {
        save_directory.join(CONFIG_FILE)
    }

    pub fn default_save_directory() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(WallcycleError::Config(ConfigError::NoConfigDir))?
            .join("wallcycle");
        Ok(config_dir)
    }

    /// Prepares `save_directory` for a first run: writes a default
    /// configuration pointing at `root_directory` and empty snapshots.
    /// Files that already exist are kept as they are.
    pub fn initialize(save_directory: &Path, root_directory: &Path) -> Result<Self> {
        let path = Self::config_path(save_directory);

        let config = if path.exists() {
            log::info!("Keeping existing configuration {:?}", path);
            Self::load_from_path(&path)?
        } else {
            let config = Self::new(root_directory.to_path_buf(), save_directory.to_path_buf());
            config.validate()?;
            config.write(&path)?;
            log::info!("Wrote default configuration to {:?}", path);
            config
        };

        config.snapshot_store().initialize()?;
        Ok(config)
    }

    fn write(&self, path: &Path) -> Result<()> {
        let write_error = |e| WallcycleError::Config(ConfigError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        });

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| WallcycleError::Config(ConfigError::JsonParse {
                message: e.to_string(),
            }))?;

        std::fs::write(path, json).map_err(write_error)
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_secs(self.update_period_minutes.saturating_mul(60))
    }

    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.save_directory)
    }

    fn validate(&self) -> Result<()> {
        if !self.root_directory.is_dir() {
            return Err(WallcycleError::Config(ConfigError::InvalidValue {
                field: "root_directory".to_string(),
                value: format!("{:?}", self.root_directory),
            }));
        }

        if self.legal_extensions.iter().all(|ext| ext.trim().trim_start_matches('.').is_empty()) {
            return Err(WallcycleError::Config(ConfigError::InvalidValue {
                field: "legal_extensions".to_string(),
                value: format!("{:?}", self.legal_extensions),
            }));
        }

        if self.update_period_minutes == 0 {
            return Err(WallcycleError::Config(ConfigError::InvalidValue {
                field: "update_period_minutes".to_string(),
                value: self.update_period_minutes.to_string(),
            }));
        }

        Ok(())
    }
}
