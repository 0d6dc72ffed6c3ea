//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Default HTTP port for the inventory service
pub const DEFAULT_PORT: u16 = 5740;

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `PACKRAT_ROOT_FOLDER` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("PACKRAT_ROOT_FOLDER") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_config_file() {
        if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
            return PathBuf::from(root_folder);
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// HTTP port resolution, same priority order as the root folder:
/// CLI argument, `PACKRAT_PORT`, config file `port` key, compiled default.
pub fn resolve_port(cli_arg: Option<u16>) -> u16 {
    if let Some(port) = cli_arg {
        return port;
    }

    if let Ok(port) = std::env::var("PACKRAT_PORT") {
        if let Ok(port) = port.parse::<u16>() {
            return port;
        }
    }

    if let Ok(config) = load_config_file() {
        if let Some(port) = config.get("port").and_then(|v| v.as_integer()) {
            if (1..=u16::MAX as i64).contains(&port) {
                return port as u16;
            }
        }
    }

    DEFAULT_PORT
}

/// Database file path inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("packrat.db")
}

/// Thumbnail storage directory inside the root folder
pub fn thumbnails_dir(root_folder: &Path) -> PathBuf {
    root_folder.join("thumbnails")
}

/// Load and parse the platform config file
fn load_config_file() -> Result<toml::Value> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Locate the configuration file for the platform
fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/packrat/config.toml first, then /etc/packrat/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("packrat").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/packrat/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("packrat").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("packrat"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/packrat"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("packrat"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/packrat"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("packrat"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\packrat"))
    } else {
        PathBuf::from("./packrat_data")
    }
}
