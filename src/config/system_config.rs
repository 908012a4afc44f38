// System-wide configuration structures

use serde::{Deserialize, Serialize};

/// Main global configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub system: SystemConfig,
    pub api: ApiConfig,
    pub poller: PollerConfig,
    pub gui: GuiConfig,
}

/// System configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub name: String,
    pub log_level: String,
    pub log_file: String,
}

/// Backend API endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub list_path: String,
    pub symbol_path: String,
    pub request_timeout_ms: u64,
}

/// Polling intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub list_interval_ms: u64,
    pub detail_interval_ms: u64,
    /// Polling pauses for this long after the last user input
    pub interaction_quiet_ms: u64,
}

/// GUI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub preferences_file: String,
    pub initial_query: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "Flow Screener".to_string(),
            log_level: "info".to_string(),
            log_file: "flow_screener.log".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            list_path: "/api/screener/".to_string(),
            symbol_path: "/api/symbol/".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            list_interval_ms: 1000,
            detail_interval_ms: 5000,
            interaction_quiet_ms: 1500,
        }
    }
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            title: "Flow Screener".to_string(),
            width: 1400.0,
            height: 800.0,
            preferences_file: "screener_prefs.json".to_string(),
            initial_query: "market_type=futures".to_string(),
        }
    }
}
