// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::DrError;
use crate::utils;

/// Directory marking a project root; holds answer files and project settings.
pub const PROJECT_DIR_NAME: &str = ".datarobot";
/// Settings file name, both in-project and in the home config dir.
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)] // Good practice to catch typos in yaml
pub struct Settings {
  /// Base URL of the DataRobot application serving the API.
  #[serde(default = "default_endpoint")]
  pub endpoint: String,
  /// API key obtained through `dr auth login`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub token: Option<String>,
}

impl Default for Settings {
  fn default() -> Self {
    Settings {
      endpoint: default_endpoint(),
      token: None,
    }
  }
}

fn default_endpoint() -> String {
  "https://app.datarobot.com".to_string()
}

/// Home-directory settings path (e.g. ~/.config/datarobot/settings.yaml on Linux).
pub fn home_settings_path() -> Result<PathBuf, DrError> {
  let dirs = ProjectDirs::from("com", "DataRobot", "datarobot").ok_or(DrError::NoHomeDir)?;
  Ok(dirs.config_dir().join(SETTINGS_FILE_NAME))
}

/// Resolves which settings file to read.
/// Order of preference:
/// 1. Explicit path (--config flag or DATAROBOT_CONFIG environment variable)
/// 2. <repo root>/.datarobot/settings.yaml
/// 3. Home config path
pub fn resolve_settings_path(
  explicit: Option<&Path>,
  start_dir: &Path,
) -> Result<Option<PathBuf>, DrError> {
  Ok(resolve_from(explicit, start_dir, &home_settings_path()?))
}

fn resolve_from(explicit: Option<&Path>, start_dir: &Path, home_path: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit {
    if path.is_file() {
      return Some(path.to_path_buf());
    }
    warn!(
      "Provided settings path does not exist or is not a file: {}",
      path.display()
    );
  }

  if let Some(root) = utils::find_repo_root(start_dir) {
    let repo_path = root.join(PROJECT_DIR_NAME).join(SETTINGS_FILE_NAME);
    if repo_path.is_file() {
      return Some(repo_path);
    }
  }

  if home_path.is_file() {
    return Some(home_path.to_path_buf());
  }

  None
}

/// Loads settings from the resolved file, or defaults when none exists.
pub fn load_settings(explicit: Option<&Path>, start_dir: &Path) -> Result<Settings, DrError> {
  let Some(path) = resolve_settings_path(explicit, start_dir)? else {
    debug!("No settings file found, using defaults.");
    return Ok(Settings::default());
  };
  debug!("Loading settings from {}", path.display());
  read_settings(&path)
}

fn read_settings(path: &Path) -> Result<Settings, DrError> {
  let content = fs::read_to_string(path).map_err(|source| DrError::SettingsRead {
    path: path.to_path_buf(),
    source,
  })?;
  serde_yaml::from_str(&content).map_err(|source| DrError::SettingsParse {
    path: path.to_path_buf(),
    source,
  })
}

/// Where saves land: the explicit path when one was given, the home location otherwise.
pub fn settings_write_path(explicit: Option<&Path>) -> Result<PathBuf, DrError> {
  match explicit {
    Some(path) => Ok(path.to_path_buf()),
    None => home_settings_path(),
  }
}

/// Serializes settings to the write path, creating parent directories as needed.
pub fn save_settings(settings: &Settings, explicit: Option<&Path>) -> Result<PathBuf, DrError> {
  let path = settings_write_path(explicit)?;
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|source| DrError::SettingsWrite {
      path: path.clone(),
      source,
    })?;
  }
  let content = serde_yaml::to_string(settings)?;
  fs::write(&path, content).map_err(|source| DrError::SettingsWrite {
    path: path.clone(),
    source,
  })?;
  Ok(path)
}
