// Operator settings
// Loaded from ~/.config/aidrecon/settings.toml

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ISO 3166-1 alpha-2 code used for coverage highlighting. Upper case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_country: Option<String>,

    /// Base URL of the organisation store API.
    pub api_base: String,

    pub request_timeout_secs: u64,

    pub user_agent: String,

    /// Extra country/region/organisation names (TOML tables).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_tables: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_country: None,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            reference_tables: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("aidrecon/{}", env!("CARGO_PKG_VERSION"))
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aidrecon")
            .join("settings.toml")
    }

    /// Load from the default location. A missing file yields defaults; a
    /// file that exists but does not parse is an error.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = toml::from_str(input)?;
        settings.normalize();
        Ok(settings)
    }

    fn normalize(&mut self) {
        self.home_country = self
            .home_country
            .take()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        let trimmed = self.api_base.trim().trim_end_matches('/');
        self.api_base = if trimmed.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            trimmed.to_string()
        };
    }

    /// Home country code, or `""` when none is configured.
    pub fn home_country_code(&self) -> &str {
        self.home_country.as_deref().unwrap_or("")
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
