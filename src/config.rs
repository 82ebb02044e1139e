use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, Result};

/// Configuration for git-release.
///
/// Every field has a default matching the conventional two-branch
/// layout, so the tool works without any config file present.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Remote to pull from and push to
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Release branch that receives tags
    #[serde(default = "default_master_branch")]
    pub master_branch: String,

    /// Integration branch, used when its remote-tracking branch exists
    #[serde(default = "default_develop_branch")]
    pub develop_branch: String,

    /// Manifest file carrying the version field
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_master_branch() -> String {
    "master".to_string()
}

fn default_develop_branch() -> String {
    "develop".to_string()
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            master_branch: default_master_branch(),
            develop_branch: default_develop_branch(),
            manifest: default_manifest(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in the current directory
/// 3. `gitrelease.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| ReleaseError::config(format!("{}: {}", path, e)))?
    } else if Path::new("./gitrelease.toml").exists() {
        fs::read_to_string("./gitrelease.toml")
            .map_err(|e| ReleaseError::config(format!("gitrelease.toml: {}", e)))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("gitrelease.toml");
        if path.exists() {
            fs::read_to_string(&path)
                .map_err(|e| ReleaseError::config(format!("{}: {}", path.display(), e)))?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| ReleaseError::config(e.to_string()))
}
