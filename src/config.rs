use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::errors::VisionTimingError;
use crate::runner::default_images;

pub const DEFAULT_URL: &str = "http://127.0.0.1:11435/api/vision";
pub const DEFAULT_MODE: &str = "full";
pub const DEFAULT_TIMEOUT_MS: u64 = 600_000;
pub const DEFAULT_SOCKET_TIMEOUT_S: u64 = 900;

/// Optional settings read from `config.toml`. Every key may be omitted.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub mode: Option<String>,
    pub timeout_ms: Option<u64>,
    pub socket_timeout_s: Option<u64>,
    pub images: Option<Vec<PathBuf>>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| VisionTimingError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        let config = toml::from_str(&content).map_err(|e| VisionTimingError::ConfigParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Ok(config)
    }

    /// `<config dir>/vision-timing/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vision-timing").join("config.toml"))
    }

    /// An explicit path must exist; the default location is read only if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(VisionTimingError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading default config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Values given on the command line. `None`/empty means "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub url: Option<String>,
    pub mode: Option<String>,
    pub timeout_ms: Option<u64>,
    pub socket_timeout_s: Option<u64>,
    pub images: Vec<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub url: String,
    pub mode: String,
    pub timeout_ms: u64,
    pub socket_timeout: Duration,
    pub images: Vec<PathBuf>,
}

/// Command line wins over the config file, which wins over built-in defaults.
pub fn resolve(cli: CliOverrides, file: FileConfig) -> Result<RunSettings> {
    let socket_timeout_s = cli
        .socket_timeout_s
        .or(file.socket_timeout_s)
        .unwrap_or(DEFAULT_SOCKET_TIMEOUT_S);
    if socket_timeout_s == 0 {
        anyhow::bail!("socket_timeout_s must be at least 1 second");
    }

    let images = if !cli.images.is_empty() {
        cli.images
    } else {
        match file.images {
            Some(images) if !images.is_empty() => images,
            _ => default_images(),
        }
    };

    Ok(RunSettings {
        url: cli.url.or(file.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
        mode: cli
            .mode
            .or(file.mode)
            .unwrap_or_else(|| DEFAULT_MODE.to_string()),
        timeout_ms: cli
            .timeout_ms
            .or(file.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS),
        socket_timeout: Duration::from_secs(socket_timeout_s),
        images,
    })
}
