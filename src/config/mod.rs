// Configuration module: TOML file with built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

pub mod system_config;

pub use system_config::*;

/// Environment variable overriding the default config path
pub const CONFIG_PATH_ENV: &str = "SCREENER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
    global_config: GlobalConfig,
    loaded: bool,
}

impl ConfigManager {
    /// Create configuration manager with the default path (or `SCREENER_CONFIG`)
    pub fn new() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
        Self::with_path(path)
    }

    /// Create configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
            global_config: GlobalConfig::default(),
            loaded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the configuration file
    pub fn load(&mut self) -> Result<(), ConfigError> {
        let config = self.load_global_config()?;
        Self::validate(&config)?;
        self.global_config = config;
        self.loaded = true;
        Ok(())
    }

    /// Load with fallback to defaults if the file is missing or invalid
    pub fn load_or_default(&mut self) -> &Self {
        if let Err(e) = self.load() {
            log::warn!("Failed to load config, using defaults: {}", e);
            self.global_config = GlobalConfig::default();
            self.loaded = true;
        }
        self
    }

    /// Get global configuration
    pub fn global(&self) -> &GlobalConfig {
        &self.global_config
    }

    /// Get mutable global configuration
    pub fn global_mut(&mut self) -> &mut GlobalConfig {
        &mut self.global_config
    }

    /// Save current configuration
    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.global_config)?;
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    /// Check if configuration is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.loaded = false;
        self.load()
    }

    /// Reject values the poller and HTTP client cannot work with
    pub fn validate(config: &GlobalConfig) -> Result<(), ConfigError> {
        let poller = &config.poller;
        if poller.list_interval_ms == 0 || poller.detail_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll intervals must be positive".to_string()));
        }
        if config.api.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be positive".to_string()));
        }

        let base = Url::parse(&config.api.base_url)
            .map_err(|e| ConfigError::Invalid(format!("api.base_url '{}': {}", config.api.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!("api.base_url '{}' cannot be a base", config.api.base_url)));
        }

        Ok(())
    }

    fn load_global_config(&self) -> Result<GlobalConfig, ConfigError> {
        let content = fs::read_to_string(&self.config_path)
            .map_err(|_| ConfigError::FileNotFound(self.config_path.display().to_string()))?;
        toml::from_str(&content).map_err(ConfigError::from)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Global singleton for configuration
use lazy_static::lazy_static;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

lazy_static! {
    static ref CONFIG: RwLock<ConfigManager> = RwLock::new(ConfigManager::new());
}

/// Get global configuration manager
pub fn get_config() -> RwLockReadGuard<'static, ConfigManager> {
    CONFIG.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Get mutable global configuration manager
pub fn get_config_mut() -> RwLockWriteGuard<'static, ConfigManager> {
    CONFIG.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initialize with custom path, falling back to defaults
pub fn init_config_with_path<P: AsRef<Path>>(path: P) -> GlobalConfig {
    let mut config = get_config_mut();
    *config = ConfigManager::with_path(path);
    config.load_or_default();
    config.global().clone()
}

/// Initialize from the default path
pub fn init_config() -> GlobalConfig {
    let mut config = get_config_mut();
    config.load_or_default();
    config.global().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("flow_screener_config_{}_{}.toml", name, std::process::id()))
    }

    #[test]
    fn test_config_manager_creation() {
        let manager = ConfigManager::with_path("missing.toml");
        assert!(!manager.is_loaded());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let mut manager = ConfigManager::with_path(temp_path("missing"));
        manager.load_or_default();
        assert!(manager.is_loaded());
        assert_eq!(manager.global(), &GlobalConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = temp_path("partial");
        fs::write(&path, "[poller]\nlist_interval_ms = 250\n\n[api]\nbase_url = \"http://screener.local:9000\"\n").unwrap();

        let mut manager = ConfigManager::with_path(&path);
        manager.load().unwrap();
        assert_eq!(manager.global().poller.list_interval_ms, 250);
        assert_eq!(manager.global().poller.detail_interval_ms, 5000);
        assert_eq!(manager.global().api.base_url, "http://screener.local:9000");
        assert_eq!(manager.global().api.list_path, "/api/screener/");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_validation() {
        let mut config = GlobalConfig::default();
        assert!(ConfigManager::validate(&config).is_ok());

        config.poller.list_interval_ms = 0;
        assert!(matches!(ConfigManager::validate(&config), Err(ConfigError::Invalid(_))));

        let mut config = GlobalConfig::default();
        config.api.base_url = "localhost without scheme".to_string();
        assert!(matches!(ConfigManager::validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("save");
        let mut manager = ConfigManager::with_path(&path);
        manager.global_mut().gui.initial_query = "market_type=spot".to_string();
        manager.save().unwrap();

        manager.reload().unwrap();
        assert_eq!(manager.global().gui.initial_query, "market_type=spot");
        let _ = fs::remove_file(&path);
    }
}
