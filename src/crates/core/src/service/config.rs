//! Configuration
//!
//! `MapChatConfig` is read from an optional TOML file, overlaid with environment variables
//! and validated once at startup. Every field has a default, so an empty file (or none at
//! all) is a valid configuration.

use crate::infrastructure::geo::rate_limiter::NOMINATIM_MIN_INTERVAL;
use crate::util::errors::{MapChatError, MapChatResult};
use crate::util::logging::parse_log_level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "MAPCHAT_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "MAPCHAT_GEMINI_BASE_URL";
pub const ENV_NOMINATIM_URL: &str = "MAPCHAT_NOMINATIM_URL";
pub const ENV_OVERPASS_URL: &str = "MAPCHAT_OVERPASS_URL";
pub const ENV_OSRM_URL: &str = "MAPCHAT_OSRM_URL";
pub const ENV_MAX_ITERATIONS: &str = "MAPCHAT_MAX_ITERATIONS";
pub const ENV_BIND: &str = "MAPCHAT_BIND";
pub const ENV_LOG_LEVEL: &str = "MAPCHAT_LOG_LEVEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapChatConfig {
    pub model: ModelConfig,
    pub geo: GeoConfig,
    pub agent: AgentConfig,
    pub server: ServerConfig,
    pub log_level: String,
}

impl Default for MapChatConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            geo: GeoConfig::default(),
            agent: AgentConfig::default(),
            server: ServerConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Server-side key; requests may bring their own.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ModelConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    pub osrm_url: String,
    pub user_agent: String,
    pub nominatim_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            osrm_url: "https://routing.openstreetmap.de".to_string(),
            user_agent: "MapChat/1.0".to_string(),
            nominatim_interval_ms: NOMINATIM_MIN_INTERVAL.as_millis() as u64,
            request_timeout_secs: 15,
        }
    }
}

impl GeoConfig {
    /// Never shorter than the provider's published minimum.
    pub fn nominatim_interval(&self) -> Duration {
        Duration::from_millis(self.nominatim_interval_ms).max(NOMINATIM_MIN_INTERVAL)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model round-trips per chat turn.
    pub max_iterations: usize,
    pub tool_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tool_timeout_secs: 20,
        }
    }
}

impl AgentConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub examples_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            examples_dir: PathBuf::from("data/examples"),
        }
    }
}

impl MapChatConfig {
    /// `~/.config/mapchat/config.toml` (platform equivalent).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mapchat").join("config.toml"))
    }

    /// The file `load` reads: `explicit` if given, otherwise the default location when it
    /// exists.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        }
    }

    /// Load from [`Self::resolve_path`], then apply process environment overrides and
    /// validate. Runs before logging is set up, so it logs nothing itself.
    pub fn load(path: Option<&Path>) -> MapChatResult<Self> {
        let mut config = match Self::resolve_path(path) {
            Some(p) => Self::from_toml(&std::fs::read_to_string(p)?)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> MapChatResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_KEY) {
            self.model.api_key = Some(v);
        }
        if let Some(v) = get(ENV_MODEL) {
            self.model.model = v;
        }
        if let Some(v) = get(ENV_GEMINI_BASE_URL) {
            self.model.base_url = v;
        }
        if let Some(v) = get(ENV_NOMINATIM_URL) {
            self.geo.nominatim_url = v;
        }
        if let Some(v) = get(ENV_OVERPASS_URL) {
            self.geo.overpass_url = v;
        }
        if let Some(v) = get(ENV_OSRM_URL) {
            self.geo.osrm_url = v;
        }
        if let Some(v) = get(ENV_MAX_ITERATIONS) {
            match v.trim().parse() {
                Ok(n) => self.agent.max_iterations = n,
                Err(_) => log::warn!(
                    "Ignoring invalid {}: value={}",
                    ENV_MAX_ITERATIONS,
                    v
                ),
            }
        }
        if let Some(v) = get(ENV_BIND) {
            self.server.bind = v;
        }
        if let Some(v) = get(ENV_LOG_LEVEL) {
            self.log_level = v;
        }
    }

    pub fn validate(&self) -> MapChatResult<()> {
        if self.agent.max_iterations == 0 {
            return Err(MapChatError::config("agent.max_iterations must be at least 1"));
        }
        for (name, value) in [
            ("model.model", &self.model.model),
            ("model.base_url", &self.model.base_url),
            ("geo.nominatim_url", &self.geo.nominatim_url),
            ("geo.overpass_url", &self.geo.overpass_url),
            ("geo.osrm_url", &self.geo.osrm_url),
            ("server.bind", &self.server.bind),
        ] {
            if value.trim().is_empty() {
                return Err(MapChatError::config(format!("{} must not be empty", name)));
            }
        }
        for (name, value) in [
            ("model.timeout_secs", self.model.timeout_secs),
            ("geo.request_timeout_secs", self.geo.request_timeout_secs),
            ("agent.tool_timeout_secs", self.agent.tool_timeout_secs),
        ] {
            if value == 0 {
                return Err(MapChatError::config(format!("{} must be greater than 0", name)));
            }
        }
        if parse_log_level(&self.log_level).is_none() {
            return Err(MapChatError::config(format!(
                "log_level must be one of trace, debug, info, warn, error, off (got \"{}\")",
                self.log_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn explicit_path_is_used_even_when_missing() {
        let path = std::env::temp_dir().join("mapchat-explicit-config.toml");
        assert_eq!(MapChatConfig::resolve_path(Some(&path)), Some(path.clone()));
    }

    #[test]
    fn load_reads_the_resolved_file() {
        let path = std::env::temp_dir().join(format!("mapchat-load-{}.toml", std::process::id()));
        std::fs::write(&path, "[agent]\nmax_iterations = 4\n").unwrap();

        let config = MapChatConfig::load(Some(&path));
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.expect("config loads").agent.max_iterations, 4);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = MapChatConfig::from_toml("").expect("empty toml");
        assert_eq!(config.model.model, "gemini-2.5-pro");
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.geo.user_agent, "MapChat/1.0");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.log_level, "info");
        assert!(!config.model.has_api_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = MapChatConfig::from_toml(
            r#"
            log_level = "debug"

            [agent]
            max_iterations = 4

            [geo]
            osrm_url = "http://localhost:5000"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(config.agent.tool_timeout_secs, 20);
        assert_eq!(config.geo.osrm_url, "http://localhost:5000");
        assert_eq!(config.geo.nominatim_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "secret"),
            (ENV_MAX_ITERATIONS, "3"),
            (ENV_BIND, "0.0.0.0:8080"),
            (ENV_MODEL, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = MapChatConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.model.api_key.as_deref(), Some("secret"));
        assert!(config.model.has_api_key());
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.model.model, "gemini-2.5-pro");
    }

    #[test]
    fn rejects_zero_iterations_and_bad_log_level() {
        let mut config = MapChatConfig::default();
        config.agent.max_iterations = 0;
        assert!(matches!(config.validate(), Err(MapChatError::Config(_))));

        let mut config = MapChatConfig::default();
        config.log_level = "chatty".to_string();
        assert!(matches!(config.validate(), Err(MapChatError::Config(_))));
    }

    #[test]
    fn nominatim_interval_has_a_floor() {
        let mut geo = GeoConfig::default();
        geo.nominatim_interval_ms = 200;
        assert_eq!(geo.nominatim_interval(), NOMINATIM_MIN_INTERVAL);
        geo.nominatim_interval_ms = 2000;
        assert_eq!(geo.nominatim_interval(), Duration::from_millis(2000));
    }
}
