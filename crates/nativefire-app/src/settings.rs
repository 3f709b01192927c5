//! Settings parser for `<config_dir>/nativefire/config.toml`

use std::path::{Path, PathBuf};

use nativefire_core::prelude::*;
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "nativefire";

/// User settings
///
/// Every section is optional; missing keys take their defaults. Command-line
/// flags override whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub firebase: FirebaseSettings,

    #[serde(default)]
    pub configure: ConfigureSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FirebaseSettings {
    /// Firebase CLI executable (name on PATH or absolute path)
    #[serde(default)]
    pub bin: Option<String>,

    /// Project used when `--project` is not given
    #[serde(default)]
    pub default_project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigureSettings {
    /// Classify the project directory when no platform is passed
    #[serde(default = "default_true")]
    pub auto_detect: bool,

    /// Run Gradle / CocoaPods after build files change
    #[serde(default = "default_true")]
    pub sync_dependencies: bool,
}

impl Default for ConfigureSettings {
    fn default() -> Self {
        Self {
            auto_detect: true,
            sync_dependencies: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

/// Default settings file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings from `path`, or from the default location
///
/// Never fails: a missing or unreadable file yields defaults.
pub fn load_settings(path: Option<&Path>) -> Settings {
    match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(config_path) => load_settings_from(&config_path),
        None => {
            debug!("No config directory available, using defaults");
            Settings::default()
        }
    }
}

pub fn load_settings_from(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}
