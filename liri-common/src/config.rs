//! Configuration loading and resolution
//!
//! Configuration file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`LIRI_MENU_CONFIG`)
//! 3. User config file (`<config_dir>/liri-menu/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file never stops startup: a warning is logged and the
//! compiled defaults are used. A file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LIRI_MENU_CONFIG";

/// Directory name used under the platform config/cache directories
pub const APP_DIR_NAME: &str = "liri-menu";

/// Root of the TOML configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Preferred display language for localized text (falls back to "en")
    pub language: String,
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub page: PageConfig,
    /// Menu sections; `None` selects the built-in section table
    pub sections: Option<Vec<SectionEntry>>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            catalog: CatalogConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            page: PageConfig::default(),
            sections: None,
        }
    }
}

/// Content API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Overrides `https://<project_id>.api.sanity.io`
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            project_id: "ivfy9y3f".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-03-19".to_string(),
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl CatalogConfig {
    /// Base URL of the content API host
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }
}

/// Which storage backs the payload cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    File,
    Memory,
}

/// Payload cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    /// Embedded in every key; bump to invalidate entries written by older payload shapes
    pub version: String,
    pub backend: CacheBackendKind,
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            version: "1.0".to_string(),
            backend: CacheBackendKind::File,
            directory: None,
        }
    }
}

impl CacheConfig {
    /// Cache directory, falling back to the platform cache dir
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_cache_directory)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Fragment server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5780".to_string(),
        }
    }
}

/// Host page mount contract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Mount attributes present on the page; `None` assumes every section root exists
    pub mounts: Option<Vec<String>>,
}

/// Boolean field constraint applied to a section's records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub field: String,
    pub equals: bool,
}

/// One `[[sections]]` table as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub name: String,
    pub mount: String,
    pub record_type: String,
    pub template: String,
    #[serde(default)]
    pub filter: Option<FilterEntry>,
    #[serde(default)]
    pub default_bucket: Option<String>,
}

impl TomlConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(Error::Config("language must not be empty".to_string()));
        }
        if self.cache.ttl_secs == 0 {
            return Err(Error::Config("cache.ttl_secs must be greater than zero".to_string()));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(Error::Config("catalog.timeout_secs must be greater than zero".to_string()));
        }

        if let Some(sections) = &self.sections {
            let mut names = HashSet::new();
            for entry in sections {
                for (field, value) in [
                    ("name", &entry.name),
                    ("mount", &entry.mount),
                    ("record_type", &entry.record_type),
                    ("template", &entry.template),
                ] {
                    if value.trim().is_empty() {
                        return Err(Error::Config(format!(
                            "section '{}' has an empty {}",
                            entry.name, field
                        )));
                    }
                }
                if !names.insert(entry.name.as_str()) {
                    return Err(Error::Config(format!("duplicate section name '{}'", entry.name)));
                }
                if let Some(filter) = &entry.filter {
                    if filter.field.trim().is_empty() {
                        return Err(Error::Config(format!(
                            "section '{}' has a filter with an empty field",
                            entry.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Resolves and loads the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Path of the config file to read, by priority; `None` when no candidate exists
    pub fn config_path(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: User config file
        default_config_path().filter(|p| p.exists())
    }

    /// Load the resolved config, degrading to compiled defaults
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.config_path() else {
            info!("No config file found, using compiled defaults");
            return Ok(TomlConfig::default());
        };

        match load_config_file(&path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(Error::NotFound(_)) | Err(Error::Io(_)) => {
                warn!(path = %path.display(), "Config file unreadable, using compiled defaults");
                Ok(TomlConfig::default())
            }
            Err(e) => Err(e),
        }
    }
}

/// Read and validate a config file
pub fn load_config_file(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Err(Error::NotFound(format!("Config file not found: {}", path.display())));
    }
    let content = std::fs::read_to_string(path)?;
    TomlConfig::from_toml_str(&content)
}

/// `<config_dir>/liri-menu/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// `<cache_dir>/liri-menu`
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./liri_menu_cache"))
}
