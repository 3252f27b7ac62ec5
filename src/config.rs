use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::auth::{DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL, parse_ttl};
use crate::cors::CorsConfig;
use crate::error::{OrgAuthError, Result};
use crate::utils::{get_env_with_prefix, parse_bool_flag};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Signing secrets shorter than this trigger a startup warning.
pub const MIN_SECRET_BYTES: usize = 32;

/// Main configuration for the service
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub dev: DevConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<String>,
    /// Token lifetime, e.g. `"7d"`, `"12h"`, `"3600"`
    #[serde(default = "default_token_ttl")]
    pub token_ttl: String,
    /// Reject logins that don't name an organization domain.
    #[serde(default)]
    pub require_organization_domain: bool,
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    /// Set by `build()` when the secret was generated for this process.
    #[serde(skip)]
    pub ephemeral_secret: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DevConfig {
    /// Allows starting without `JWT_SECRET` (a random secret is generated).
    #[serde(default)]
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl: default_token_ttl(),
            require_organization_domain: false,
            seed_demo_data: true,
            ephemeral_secret: false,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("token_ttl", &self.token_ttl)
            .field("require_organization_domain", &self.require_organization_domain)
            .field("seed_demo_data", &self.seed_demo_data)
            .field("ephemeral_secret", &self.ephemeral_secret)
            .finish()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3002
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_token_ttl() -> String {
    DEFAULT_TOKEN_TTL.to_string()
}

fn default_true() -> bool {
    true
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl AuthConfig {
    /// The signing secret. Only `None` before `ConfigBuilder::build`.
    pub fn secret_bytes(&self) -> Result<&[u8]> {
        self.jwt_secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or_else(|| OrgAuthError::internal("JWT secret not configured"))
    }
}

impl Config {
    /// Things an operator should know about, to be logged once tracing is up.
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.auth.ephemeral_secret {
            warnings.push(
                "JWT_SECRET is not set; using a random per-process secret (dev mode). \
                 Tokens will not survive a restart."
                    .to_string(),
            );
        } else if let Some(secret) = &self.auth.jwt_secret {
            if secret.len() < MIN_SECRET_BYTES {
                warnings.push(format!(
                    "JWT_SECRET is shorter than {} bytes; use a longer random value",
                    MIN_SECRET_BYTES
                ));
            }
        }
        if self.auth.seed_demo_data && !self.dev.enabled {
            warnings.push(
                "Demo accounts are seeded with a well-known password; set SEED_DEMO_DATA=false in production"
                    .to_string(),
            );
        }
        warnings
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.jwt_secret = Some(secret.into());
        self
    }

    pub fn with_token_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.config.auth.token_ttl = ttl.into();
        self
    }

    pub fn with_require_organization_domain(mut self, required: bool) -> Self {
        self.config.auth.require_organization_domain = required;
        self
    }

    pub fn with_seed_demo_data(mut self, enabled: bool) -> Self {
        self.config.auth.seed_demo_data = enabled;
        self
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.config.cors = cors;
        self
    }

    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.config.dev.enabled = enabled;
        self
    }

    /// Load configuration from environment variables with ORGAUTH_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = get_env_with_prefix("PORT").and_then(|p| p.parse().ok()) {
            self.config.server.port = port;
        }
        if let Some(size) = get_env_with_prefix("MAX_BODY_SIZE").and_then(|s| s.parse().ok()) {
            self.config.server.max_body_size = size;
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON").and_then(|v| parse_bool_flag(&v)) {
            self.config.logging.json = json;
        }

        if let Some(secret) = get_env_with_prefix("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.config.auth.jwt_secret = Some(secret);
        }
        if let Some(ttl) = get_env_with_prefix("JWT_EXPIRES_IN") {
            self.config.auth.token_ttl = ttl;
        }
        if let Some(required) =
            get_env_with_prefix("REQUIRE_ORGANIZATION_DOMAIN").and_then(|v| parse_bool_flag(&v))
        {
            self.config.auth.require_organization_domain = required;
        }
        if let Some(seed) = get_env_with_prefix("SEED_DEMO_DATA").and_then(|v| parse_bool_flag(&v)) {
            self.config.auth.seed_demo_data = seed;
        }

        self.config.cors = CorsConfig::from_env();

        if let Some(dev) = get_env_with_prefix("DEV_MODE").and_then(|v| parse_bool_flag(&v)) {
            self.config.dev.enabled = dev;
        }

        self
    }

    /// Validate and finish the configuration.
    ///
    /// # Errors
    ///
    /// - unparseable host:port, or port 0
    /// - unknown log level
    /// - zero body limit
    /// - token lifetime that doesn't parse, is under a second or over 100 years
    /// - CORS credentials combined with wildcards
    /// - no JWT secret outside dev mode
    pub fn build(mut self) -> Result<Config> {
        self.config.server.addr().map_err(|e| {
            OrgAuthError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        if self.config.server.port == 0 {
            return Err(OrgAuthError::bad_request("Server port must be greater than 0"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(OrgAuthError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.config.server.max_body_size == 0 {
            return Err(OrgAuthError::bad_request(
                "Maximum body size must be greater than 0",
            ));
        }

        let ttl = parse_ttl(&self.config.auth.token_ttl)?;
        if ttl.as_secs() == 0 {
            return Err(OrgAuthError::bad_request(
                "Token lifetime must be at least one second",
            ));
        }
        if ttl > MAX_TOKEN_TTL {
            return Err(OrgAuthError::bad_request(format!(
                "Token lifetime must not exceed 100 years: {}",
                self.config.auth.token_ttl
            )));
        }

        self.config
            .cors
            .validate()
            .map_err(OrgAuthError::bad_request)?;

        if self.config.auth.jwt_secret.is_none() {
            if !self.config.dev.enabled {
                return Err(OrgAuthError::bad_request(
                    "JWT_SECRET must be set (or enable DEV_MODE to use a temporary secret)",
                ));
            }
            self.config.auth.jwt_secret = Some(generate_ephemeral_secret());
            self.config.auth.ephemeral_secret = true;
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_ephemeral_secret() -> String {
    let mut bytes = [0u8; MIN_SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
