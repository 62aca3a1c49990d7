use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::TrackDeltaError;
use crate::comparison::ComparisonConfig;
use crate::render::MapRenderConfig;

const APP_DIR_NAME: &str = "trackdelta";
const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted defaults. Command line flags override whatever is loaded here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub comparison: ComparisonConfig,
    pub render: MapRenderConfig,
}

impl AppConfig {
    pub fn local_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the user's config file, `None` if it is missing or unreadable
    pub fn from_local_file() -> Option<Self> {
        Self::from_file(&Self::local_path()?)
    }

    pub fn from_file(config_path: &Path) -> Option<Self> {
        if !config_path.exists() {
            debug!("No config file at {:?}, using defaults", config_path);
            return None;
        }
        let file = File::open(config_path)
            .map_err(|e| warn!("Could not open config file {:?}: {}", config_path, e))
            .ok()?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| warn!("Could not parse config file {:?}: {}", config_path, e))
            .ok()
    }

    pub fn save(&self) -> Result<(), TrackDeltaError> {
        let config_path = Self::local_path().ok_or(TrackDeltaError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), TrackDeltaError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TrackDeltaError::ConfigIOError { source: e })?;
        }

        let file = File::create(config_path)
            .map_err(|e| TrackDeltaError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| TrackDeltaError::ConfigSerializeError { source: e })
    }
}
