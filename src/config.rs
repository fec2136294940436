// Application settings.
//
// Read once at startup from a small TOML file. Every key is optional; a
// missing file means "all defaults".
use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "FLEET_TOWER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "fleet_tower.toml";

/// Where and how to read the fleet sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub input_path: PathBuf,
    /// The trailing space is part of the sheet name in the operations file.
    pub sheet_name: String,
    /// Sheet rows above the data area (title banners and the like).
    pub header_offset: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("frota_agro.xlsx"),
            sheet_name: "Frota Agro ".to_string(),
            header_offset: 1,
        }
    }
}

/// Settings handed to the terminal dashboard. Never read by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub preview_rows: usize,
    pub export_dir: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_rows: 15,
            export_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Load from `$FLEET_TOWER_CONFIG` or `fleet_tower.toml`.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }
}
