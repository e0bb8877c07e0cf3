// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine configuration and loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick a format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse YAML/TOML/JSON into [`AuthConfig`]
//! 4. Apply `TOKENGATE_*` environment overrides
//! 5. Validate
//!
//! ```text
//! TOKENGATE_ISSUER=gateway
//! TOKENGATE_TOKEN_TTL_SECS=600
//! TOKENGATE_DIRECTORY_TIMEOUT_MS=250
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// AuthConfig
// =============================================================================

/// Longest accepted token, session or cache TTL (100 years).
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Configuration for [`AuthEngine`](crate::engine::AuthEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Issuer written into every token.
    pub issuer: String,

    /// Lifetime of issued tokens.
    #[serde(rename = "token_ttl_secs", with = "duration_secs")]
    pub token_ttl: Duration,

    /// Lifetime of the session marker. Longer than `token_ttl` so that
    /// expired tokens can still be refreshed.
    #[serde(rename = "session_ttl_secs", with = "duration_secs")]
    pub session_ttl: Duration,

    /// Clock skew tolerance for expiry checks.
    pub leeway_secs: u64,

    /// Key prefix for session markers in the expiring store.
    pub session_key_prefix: String,

    /// Upper bound for a single directory call.
    #[serde(rename = "directory_timeout_ms", with = "duration_millis")]
    pub directory_timeout: Duration,

    /// Upper bound for a single session store call.
    #[serde(rename = "session_store_timeout_ms", with = "duration_millis")]
    pub session_store_timeout: Duration,

    /// Whether resolved snapshots are cached.
    pub snapshot_cache_enabled: bool,

    /// Lifetime of a cached snapshot.
    #[serde(rename = "snapshot_cache_ttl_secs", with = "duration_secs")]
    pub snapshot_cache_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "tokengate".to_string(),
            token_ttl: Duration::from_secs(5 * 60),
            session_ttl: Duration::from_secs(30 * 60),
            leeway_secs: 0,
            session_key_prefix: "shiro:access:".to_string(),
            directory_timeout: Duration::from_secs(2),
            session_store_timeout: Duration::from_millis(500),
            snapshot_cache_enabled: true,
            snapshot_cache_ttl: Duration::from_secs(60),
        }
    }
}

impl AuthConfig {
    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Sets the session lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway_secs(mut self, leeway: u64) -> Self {
        self.leeway_secs = leeway;
        self
    }

    /// Sets the directory call timeout.
    pub fn with_directory_timeout(mut self, timeout: Duration) -> Self {
        self.directory_timeout = timeout;
        self
    }

    /// Sets the session store call timeout.
    pub fn with_session_store_timeout(mut self, timeout: Duration) -> Self {
        self.session_store_timeout = timeout;
        self
    }

    /// Sets the snapshot cache lifetime.
    pub fn with_snapshot_cache_ttl(mut self, ttl: Duration) -> Self {
        self.snapshot_cache_ttl = ttl;
        self
    }

    /// Disables snapshot caching.
    pub fn without_snapshot_cache(mut self) -> Self {
        self.snapshot_cache_enabled = false;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::validation("issuer", "must not be empty"));
        }
        if self.token_ttl.is_zero() {
            return Err(ConfigError::validation("token_ttl_secs", "must be positive"));
        }
        if self.session_ttl.is_zero() {
            return Err(ConfigError::validation("session_ttl_secs", "must be positive"));
        }
        for (field, ttl) in [
            ("token_ttl_secs", self.token_ttl),
            ("session_ttl_secs", self.session_ttl),
            ("snapshot_cache_ttl_secs", self.snapshot_cache_ttl),
        ] {
            if ttl > MAX_TTL {
                return Err(ConfigError::validation(
                    field,
                    format!("must not exceed {} seconds", MAX_TTL.as_secs()),
                ));
            }
        }
        if self.session_ttl < self.token_ttl {
            warn!(
                token_ttl = ?self.token_ttl,
                session_ttl = ?self.session_ttl,
                "Session TTL is shorter than token TTL; tokens cannot be refreshed"
            );
        }
        if self.directory_timeout.is_zero() {
            return Err(ConfigError::validation("directory_timeout_ms", "must be positive"));
        }
        if self.session_store_timeout.is_zero() {
            return Err(ConfigError::validation(
                "session_store_timeout_ms",
                "must be positive",
            ));
        }
        if self.snapshot_cache_enabled && self.snapshot_cache_ttl.is_zero() {
            return Err(ConfigError::validation(
                "snapshot_cache_ttl_secs",
                "must be positive when the cache is enabled",
            ));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML.
    Yaml,
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat { extension }),
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loader for [`AuthConfig`] files.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with the `TOKENGATE` prefix and env resolution enabled.
    pub fn new() -> Self {
        Self {
            env_prefix: "TOKENGATE".to_string(),
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholder resolution and env overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<AuthConfig> {
        let path = path.as_ref();
        info!("Loading auth configuration from: {}", path.display());

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = self.load_with_source(&content, format, path.to_path_buf())?;
        debug!(issuer = %config.issuer, "Auth configuration loaded");
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<AuthConfig> {
        self.load_with_source(content, format, PathBuf::from("<string>"))
    }

    fn load_with_source(
        &self,
        content: &str,
        format: ConfigFormat,
        source: PathBuf,
    ) -> ConfigResult<AuthConfig> {
        let content = if self.resolve_env_vars {
            resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config: AuthConfig =
            parse_str(&content, format).map_err(|message| ConfigError::parse(source, message))?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut AuthConfig) -> ConfigResult<()> {
        let prefix = &self.env_prefix;

        if let Ok(value) = env::var(format!("{prefix}_ISSUER")) {
            config.issuer = value;
        }
        if let Ok(value) = env::var(format!("{prefix}_SESSION_KEY_PREFIX")) {
            config.session_key_prefix = value;
        }
        if let Some(secs) = self.env_u64("TOKEN_TTL_SECS")? {
            config.token_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = self.env_u64("SESSION_TTL_SECS")? {
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = self.env_u64("DIRECTORY_TIMEOUT_MS")? {
            config.directory_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.env_u64("SESSION_STORE_TIMEOUT_MS")? {
            config.session_store_timeout = Duration::from_millis(ms);
        }

        Ok(())
    }

    fn env_u64(&self, suffix: &str) -> ConfigResult<Option<u64>> {
        let name = format!("{}_{}", self.env_prefix, suffix);
        match env::var(&name) {
            Ok(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidEnvVar {
                    name,
                    message: "expected an unsigned integer".to_string(),
                }),
            Err(_) => Ok(None),
        }
    }
}

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T, String> {
    match format {
        ConfigFormat::Yaml => config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Yaml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
///
/// Unknown variables without a default are kept verbatim.
fn resolve_env_placeholders(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };

        let var_content = &after[..end];
        let (name, default) = match var_content.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (var_content, None),
        };

        match (env::var(name), default) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default),
            (Err(_), None) => {
                warn!("Environment variable '{}' not found", name);
                result.push_str(&rest[start..start + 2 + end + 1]);
            }
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

/// Loads configuration from a file with default loader settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AuthConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================
