use crate::utils::{get_env_with_prefix, parse_bool_flag};
use serde::{Deserialize, Serialize};

/// CORS settings for the API.
///
/// The default is the browser-facing setup the login UI needs: any origin,
/// `GET`/`POST`/`OPTIONS`, and the two request headers clients send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// `["*"]` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    /// `["*"]` allows any header.
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,

    #[serde(default)]
    pub exposed_headers: Vec<String>,

    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            allowed_origins: default_allowed_origins(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            exposed_headers: vec!["x-request-id".to_string()],
            allow_credentials: false,
            max_age_seconds: default_max_age(),
        }
    }
}

impl CorsConfig {
    pub fn builder() -> CorsConfigBuilder {
        CorsConfigBuilder::new()
    }

    /// Lock the API down to known front-end origins.
    pub fn restrictive(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins,
            allow_credentials: true,
            ..Self::default()
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    pub fn allows_any_header(&self) -> bool {
        self.allowed_headers.iter().any(|h| h == "*")
    }

    /// Reject combinations browsers (and tower-http) refuse.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.allow_credentials && self.allows_any_origin() {
            return Err("CORS credentials cannot be combined with a wildcard origin".to_string());
        }
        if self.allow_credentials && self.allows_any_header() {
            return Err("CORS credentials cannot be combined with wildcard headers".to_string());
        }
        Ok(())
    }

    /// Overlay `CORS_*` environment variables on the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("CORS_ENABLED").and_then(|v| parse_bool_flag(&v)) {
            config.enabled = enabled;
        }
        if let Some(origins) = get_env_with_prefix("CORS_ALLOWED_ORIGINS") {
            config.allowed_origins = split_list(&origins);
        }
        if let Some(methods) = get_env_with_prefix("CORS_ALLOWED_METHODS") {
            config.allowed_methods = split_list(&methods);
        }
        if let Some(headers) = get_env_with_prefix("CORS_ALLOWED_HEADERS") {
            config.allowed_headers = split_list(&headers);
        }
        if let Some(exposed) = get_env_with_prefix("CORS_EXPOSED_HEADERS") {
            config.exposed_headers = split_list(&exposed);
        }
        if let Some(credentials) =
            get_env_with_prefix("CORS_ALLOW_CREDENTIALS").and_then(|v| parse_bool_flag(&v))
        {
            config.allow_credentials = credentials;
        }
        if let Some(max_age) = get_env_with_prefix("CORS_MAX_AGE").and_then(|v| v.parse().ok()) {
            config.max_age_seconds = max_age;
        }

        config
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[must_use = "builder does nothing until you call build()"]
pub struct CorsConfigBuilder {
    config: CorsConfig,
}

impl CorsConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CorsConfig::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Replace the wildcard default with an explicit list, one origin at a time.
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.allowed_origins.retain(|o| o != "*");
        self.config.allowed_origins.push(origin.into());
        self
    }

    pub fn allow_methods(mut self, methods: Vec<String>) -> Self {
        self.config.allowed_methods = methods;
        self
    }

    pub fn allow_headers(mut self, headers: Vec<String>) -> Self {
        self.config.allowed_headers = headers;
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.config.allow_credentials = allow;
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.config.max_age_seconds = seconds;
        self
    }

    pub fn build(self) -> CorsConfig {
        self.config
    }
}

impl Default for CorsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allowed_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
}

fn default_allowed_headers() -> Vec<String> {
    vec!["content-type".to_string(), "authorization".to_string()]
}

fn default_max_age() -> u64 {
    3600
}
