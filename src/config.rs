//! Optional TOML config file, layered under CLI flags.

use std::path::Path;

use serde::Deserialize;

use crate::client::DEFAULT_BASE_URL;
use crate::error::DebateError;
use crate::events::DEFAULT_MAX_ITERATIONS;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub max_iterations: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, DebateError> {
        let text = std::fs::read_to_string(path).map_err(|source| DebateError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| DebateError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Effective settings for a run. Explicit CLI flags beat file values, which
/// beat built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub max_iterations: u32,
}

impl Settings {
    pub fn resolve(
        flag_base_url: Option<&str>,
        flag_max_iterations: Option<u32>,
        file: &FileConfig,
    ) -> Self {
        Self {
            base_url: flag_base_url
                .map(str::to_string)
                .or_else(|| file.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_iterations: flag_max_iterations
                .or(file.max_iterations)
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
        }
    }
}
