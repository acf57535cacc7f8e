//! Runtime settings for the CLI and server.
//!
//! Values come from command-line flags with environment fallbacks (see
//! `main.rs`); this module owns defaults and validation.

use crate::geo::geocode::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};
use crate::geo::{GeoError, Geocoder, NominatimGeocoder, OfflineGeocoder, PolygonStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
#[error("Invalid configuration: {}", .0.join("; "))]
pub struct ConfigError(pub Vec<String>);

#[derive(Debug, Clone)]
pub struct Settings {
    pub dataset: PathBuf,
    pub nominatim_url: String,
    pub user_agent: String,
    pub geocoder_timeout: Duration,
    /// Skip network geocoding entirely.
    pub offline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset: default_dataset_path(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocoder_timeout: Duration::from_secs(DEFAULT_GEOCODER_TIMEOUT_SECS),
            offline: false,
        }
    }
}

/// `~/.hoodfinder/neighborhoods.json`, or the working directory without a home.
pub fn default_dataset_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hoodfinder")
        .join("neighborhoods.json")
}

impl Settings {
    /// Report every problem at once rather than the first one found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();

        if !self.dataset.is_file() {
            issues.push(format!("dataset file '{}' does not exist", self.dataset.display()));
        }
        if self.geocoder_timeout.is_zero() {
            issues.push("geocoder timeout must be > 0".into());
        }
        if !self.offline {
            let url = self.nominatim_url.trim();
            if url.is_empty() {
                issues.push("nominatim url must not be empty".into());
            } else if !(url.starts_with("http://") || url.starts_with("https://")) {
                issues.push(format!("nominatim url '{url}' must start with http:// or https://"));
            }
            if self.user_agent.trim().is_empty() {
                issues.push("user agent must not be empty (Nominatim requires one)".into());
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(issues))
        }
    }

    pub fn geocoder(&self) -> Arc<dyn Geocoder + Send + Sync> {
        if self.offline {
            Arc::new(OfflineGeocoder)
        } else {
            Arc::new(NominatimGeocoder::new(
                &self.nominatim_url,
                &self.user_agent,
                self.geocoder_timeout,
            ))
        }
    }

    pub fn load_store(&self) -> Result<PolygonStore, GeoError> {
        PolygonStore::load(&self.dataset)
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();
        if self.host.trim().is_empty() {
            issues.push("host must not be empty".into());
        }
        if self.port == 0 {
            issues.push("port must be > 0".into());
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(issues))
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
