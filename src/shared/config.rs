use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_REQUEST_TTL_SECS: i64 = 24 * 60 * 60; // 1 day

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub offline: OfflineConfig,
    #[serde(default)]
    pub app_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineConfig {
    /// Maximum age of a queued request before it is discarded instead of replayed.
    pub request_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// How long a successful reachability check counts as "online".
    pub connectivity_window_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            api: ApiConfig {
                base_url: "https://api.celeris.studio".to_string(),
                request_timeout: 30,
            },
            offline: OfflineConfig::default(),
            app_version: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let url = dirs::data_dir()
            .map(|dir| dir.join("celeris").join("offline.db"))
            .map(|path| format!("sqlite://{}?mode=rwc", path.display()))
            .unwrap_or_else(|| "sqlite:data/celeris-offline.db?mode=rwc".to_string());
        Self {
            url,
            max_connections: 5,
        }
    }
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            request_ttl_secs: DEFAULT_REQUEST_TTL_SECS as u64,
            sweep_interval_secs: 10,
            connectivity_window_secs: 30,
        }
    }
}

impl OfflineConfig {
    /// `None` when `request_ttl_secs` does not fit a duration.
    pub fn checked_request_ttl(&self) -> Option<chrono::Duration> {
        i64::try_from(self.request_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }

    /// Out-of-range values fall back to the default TTL; `validate` rejects them.
    pub fn request_ttl(&self) -> chrono::Duration {
        self.checked_request_ttl()
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_REQUEST_TTL_SECS))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn connectivity_window(&self) -> Duration {
        Duration::from_secs(self.connectivity_window_secs)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("CELERIS_DATABASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.database.url = trimmed.to_string();
            }
        }
        if let Some(value) = env_u64("CELERIS_DATABASE_MAX_CONNECTIONS") {
            cfg.database.max_connections = u32::try_from(value).unwrap_or(u32::MAX);
        }

        if let Ok(v) = std::env::var("CELERIS_API_BASE_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                cfg.api.base_url = trimmed.to_string();
            }
        }
        if let Some(value) = env_u64("CELERIS_API_TIMEOUT_SECS") {
            cfg.api.request_timeout = value.max(1);
        }

        if let Some(value) = env_u64("CELERIS_REQUEST_TTL_SECS") {
            cfg.offline.request_ttl_secs = value;
        }
        if let Some(value) = env_u64("CELERIS_SWEEP_INTERVAL_SECS") {
            cfg.offline.sweep_interval_secs = value.max(1);
        }
        if let Some(value) = env_u64("CELERIS_CONNECTIVITY_WINDOW_SECS") {
            cfg.offline.connectivity_window_secs = value;
        }

        if let Ok(v) = std::env::var("CELERIS_APP_VERSION") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.app_version = Some(trimmed.to_string());
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err("API base_url must be an http(s) URL".to_string());
        }
        if self.api.request_timeout == 0 {
            return Err("API request_timeout must be greater than 0".to_string());
        }
        if self.offline.request_ttl_secs == 0 {
            return Err("Offline request_ttl_secs must be greater than 0".to_string());
        }
        if self.offline.checked_request_ttl().is_none() {
            return Err(format!(
                "Offline request_ttl_secs is out of range: {}",
                self.offline.request_ttl_secs
            ));
        }
        if self.offline.sweep_interval_secs == 0 {
            return Err("Offline sweep_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| parse_u64(&v))
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.offline.request_ttl(), chrono::Duration::hours(24));
        assert_eq!(cfg.offline.sweep_interval(), Duration::from_secs(10));
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut cfg = AppConfig::default();
        cfg.offline.request_ttl_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_ttl_beyond_duration_range() {
        let mut cfg = AppConfig::default();
        cfg.offline.request_ttl_secs = u64::MAX;
        assert!(cfg.validate().is_err());
        assert_eq!(cfg.offline.request_ttl(), chrono::Duration::hours(24));

        cfg.offline.request_ttl_secs = i64::MAX as u64;
        assert!(cfg.validate().is_err());
        assert!(cfg.offline.checked_request_ttl().is_none());
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let mut cfg = AppConfig::default();
        cfg.api.base_url = "ftp://example.com".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parse_u64_trims_whitespace() {
        assert_eq!(parse_u64(" 42 "), Some(42));
        assert_eq!(parse_u64("abc"), None);
    }
}
