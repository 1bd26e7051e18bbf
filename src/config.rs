//! Configuration Module
//! TOML settings for data locations, boundary geometry and initial filters.

use crate::data::{CrimeType, IPC_2001_2012_FILE, IPC_2013_FILE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "crime_dashboard.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub boundaries: BoundaryConfig,
    pub defaults: DefaultsConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Base directory for relative paths.
    pub data_dir: PathBuf,
    /// CSV sources, concatenated in this order.
    pub sources: Vec<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Datasets"),
            sources: vec![PathBuf::from(IPC_2001_2012_FILE), PathBuf::from(IPC_2013_FILE)],
        }
    }
}

impl DataConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.sources.iter().map(|p| self.resolve(p)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// State boundary GeoJSON; relative paths resolve against `data.data_dir`.
    pub path: Option<PathBuf>,
    /// Feature property holding the state name.
    pub name_property: String,
    /// Data state name -> boundary feature name.
    pub aliases: BTreeMap<String, String>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        let aliases = [
            ("A & N ISLANDS", "Andaman & Nicobar"),
            ("D & N HAVELI", "Dadra and Nagar Haveli and Daman and Diu"),
            ("DAMAN & DIU", "Dadra and Nagar Haveli and Daman and Diu"),
            ("DELHI UT", "Delhi"),
            ("ORISSA", "Odisha"),
            ("PONDICHERRY", "Puducherry"),
            ("UTTARANCHAL", "Uttarakhand"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        Self {
            path: Some(PathBuf::from("india_states.geojson")),
            name_property: "ST_NM".to_string(),
            aliases,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Initial year; the latest year in the data when unset.
    pub year: Option<i32>,
    pub state: String,
    pub crime_type: CrimeType,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            year: None,
            state: "All".to_string(),
            crime_type: CrimeType::Murder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
        }
    }
}

impl AppConfig {
    /// Load `path` if given, else [`DEFAULT_CONFIG_FILE`] when present,
    /// else the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load_file(default_path)
                } else {
                    log::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolved boundary file path, if one is configured.
    pub fn boundary_path(&self) -> Option<PathBuf> {
        self.boundaries.path.as_deref().map(|p| self.data.resolve(p))
    }
}
