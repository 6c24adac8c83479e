//! Configuration file for the dashboard.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "border-dash.toml";

/// Dashboard settings. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DashboardConfig {
    /// Crossing table opened at startup.
    pub data_path: PathBuf,
    pub window_width: f32,
    pub window_height: f32,
    pub dark_mode: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Border_Crossing_Entry_Data.csv"),
            window_width: 1280.0,
            window_height: 860.0,
            dark_mode: true,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("reading config file {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", config_path.display()))
    }

    /// Resolve the configuration for startup.
    ///
    /// An explicitly named file must exist and parse. Without one, the default
    /// file is used when present and built-in defaults otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("border-dash.toml");
        std::fs::write(&path, "data-path = \"data/crossings.parquet\"\ndark-mode = false\n").unwrap();

        let cfg = DashboardConfig::load(&path).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("data/crossings.parquet"));
        assert!(!cfg.dark_mode);
        assert_eq!(cfg.window_width, DashboardConfig::default().window_width);
    }

    #[test]
    fn unknown_types_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "window-width = \"wide\"\n").unwrap();
        assert!(DashboardConfig::load(&path).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = DashboardConfig::resolve(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("nope.toml"));
    }
}
