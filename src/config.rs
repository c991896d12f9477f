use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "UNRAVELER_API_KEY";
pub const DEFAULT_LOG_LEVEL: &str = "topic_unraveler=info";
const DEFAULT_CONFIG_FILE: &str = "topic_unraveler.toml";

/// Main configuration structure loaded from topic_unraveler.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Model gateway endpoint and request shaping
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended
    pub base_url: String,
    pub model: String,
    /// Per-request timeout enforced by the HTTP client
    pub timeout_ms: u64,
    /// Optional caller deadline wrapped around the gateway call only
    pub deadline_ms: Option<u64>,
    /// Name of the environment variable holding the bearer credential
    pub api_key_env: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 60_000,
            deadline_ms: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind: SocketAddr::from(([127, 0, 0, 1], 8788)),
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub api_key: Option<String>,
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env(api_key_env: &str) -> Self {
        Self::load_with(api_key_env, |key| std::env::var(key).ok())
    }

    fn load_with(api_key_env: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup(api_key_env)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        }
    }
}

/// Load environment variables from UNRAVELER_ENV_FILE if set, else ./.env.
/// Already-set variables are never overwritten, so calling this twice is harmless.
pub fn load_env_file() {
    if let Ok(env_path) = std::env::var("UNRAVELER_ENV_FILE") {
        let _ = dotenvy::from_path(env_path);
    } else {
        let _ = dotenvy::from_path(".env");
    }
}

/// Tracing filter directive: RUST_LOG when set, otherwise `topic_unraveler=info`.
pub fn log_filter() -> String {
    log_filter_with(|key| std::env::var(key).ok())
}

fn log_filter_with(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("RUST_LOG")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    /// Uses UNRAVELER_CONFIG or defaults to "topic_unraveler.toml", then the user config dir.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`Config::load`], but an explicit path must exist.
    pub fn load_from(explicit: Option<&Path>) -> anyhow::Result<Self> {
        load_env_file();

        let mut config = match explicit {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e)
                })?;
                Self::from_toml_str(&content)?
            }
            None => match Self::locate_config_file() {
                Some(path) => {
                    tracing::debug!("Loading config from {}", path.display());
                    Self::from_toml_str(&std::fs::read_to_string(&path)?)?
                }
                None => {
                    tracing::warn!("Config file {} not found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.runtime = RuntimeConfig::load_from_env(&config.gateway.api_key_env);
        if config.runtime.api_key.is_none() {
            tracing::warn!(
                "{} is not set; model requests will fail with ConfigError",
                config.gateway.api_key_env
            );
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn locate_config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("UNRAVELER_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("topic-unraveler").join("config.toml"))
            .filter(|p| p.exists())
    }

    /// Apply env overrides (env-first). Unparseable numeric values are ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("UNRAVELER_GATEWAY_URL") {
            self.gateway.base_url = url;
        }
        if let Some(model) = lookup("UNRAVELER_MODEL") {
            self.gateway.model = model;
        }
        if let Some(name) = lookup("UNRAVELER_API_KEY_ENV") {
            self.gateway.api_key_env = name;
        }
        if let Some(v) = lookup("UNRAVELER_TIMEOUT_MS") {
            match v.parse::<u64>() {
                Ok(ms) => self.gateway.timeout_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid UNRAVELER_TIMEOUT_MS '{}'", v),
            }
        }
        if let Some(v) = lookup("UNRAVELER_DEADLINE_MS") {
            match v.parse::<u64>() {
                Ok(ms) => self.gateway.deadline_ms = Some(ms),
                Err(_) => tracing::warn!("Ignoring invalid UNRAVELER_DEADLINE_MS '{}'", v),
            }
        }
        if let Some(v) = lookup("UNRAVELER_HTTP_BIND") {
            match v.parse::<SocketAddr>() {
                Ok(bind) => self.server.http_bind = bind,
                Err(_) => tracing::warn!("Ignoring invalid UNRAVELER_HTTP_BIND '{}'", v),
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.gateway.base_url.starts_with("http://")
            && !self.gateway.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "gateway.base_url '{}' must start with http:// or https://",
                self.gateway.base_url
            );
        }
        if self.gateway.model.trim().is_empty() {
            anyhow::bail!("gateway.model must not be empty");
        }
        if self.gateway.timeout_ms == 0 {
            anyhow::bail!("gateway.timeout_ms must be > 0");
        }
        if self.gateway.deadline_ms == Some(0) {
            anyhow::bail!("gateway.deadline_ms must be > 0 when set");
        }
        if self.gateway.api_key_env.trim().is_empty() {
            anyhow::bail!("gateway.api_key_env must name an environment variable");
        }
        Ok(())
    }
}
