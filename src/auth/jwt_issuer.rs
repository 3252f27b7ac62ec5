//! Token issuance.
//!
//! ```rust,ignore
//! use orgauth::auth::{JwtIssuer, JwtIssuerConfig, TokenSubject};
//!
//! let issuer = JwtIssuer::new(JwtIssuerConfig::with_secret("a-32-byte-or-longer-secret........"))?;
//! let token = issuer.issue(TokenSubject::from(&user))?;
//! ```

use crate::auth::claims::TokenClaims;
use crate::error::{OrgAuthError, Result};
use crate::store::{Role, UserRecord};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default token lifetime, as written in configuration.
pub const DEFAULT_TOKEN_TTL: &str = "7d";

/// Longest accepted token lifetime: 100 years.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Configuration for token issuance.
#[derive(Clone)]
pub struct JwtIssuerConfig {
    secret: Vec<u8>,
    /// Token lifetime (default: 7 days)
    pub token_ttl: Duration,
}

impl JwtIssuerConfig {
    /// HS256 configuration with the default lifetime.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for JwtIssuerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuerConfig")
            .field("secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Who a token is being issued for.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub organization_id: Option<&'a str>,
    pub role: Role,
}

impl<'a> From<&'a UserRecord> for TokenSubject<'a> {
    fn from(user: &'a UserRecord) -> Self {
        Self {
            user_id: &user.id,
            email: &user.email,
            organization_id: Some(user.organization_id.as_str()),
            role: user.role,
        }
    }
}

/// Signs tokens with the server secret.
#[derive(Clone)]
pub struct JwtIssuer {
    config: JwtIssuerConfig,
    encoding_key: EncodingKey,
}

impl JwtIssuer {
    pub fn new(config: JwtIssuerConfig) -> Result<Self> {
        if config.secret.is_empty() {
            return Err(OrgAuthError::internal("JWT signing secret is empty"));
        }
        let encoding_key = EncodingKey::from_secret(&config.secret);
        Ok(Self {
            config,
            encoding_key,
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.config.token_ttl
    }

    /// Issue a token for `subject` that expires after the configured lifetime.
    pub fn issue(&self, subject: TokenSubject<'_>) -> Result<String> {
        let now = current_timestamp();
        let exp = now
            .checked_add(self.config.token_ttl.as_secs())
            .ok_or_else(|| OrgAuthError::internal("Token expiry overflows the clock"))?;
        let claims = TokenClaims {
            user_id: subject.user_id.to_string(),
            email: subject.email.to_string(),
            organization_id: subject.organization_id.map(String::from),
            role: subject.role,
            iat: now,
            exp,
        };
        self.sign(&claims)
    }

    /// Sign claims exactly as given, timestamps included.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| OrgAuthError::internal(format!("Failed to sign token: {}", e)))
    }
}

/// Parse a lifetime such as `"7d"`, `"12h"`, `"30m"` or `"3600"`.
///
/// Units: `ms`, `s`, `m`, `h`, `d`, `w`, `y` (365 days). A bare number is seconds.
pub fn parse_ttl(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || OrgAuthError::bad_request(format!("Invalid token lifetime: {:?}", value));

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().map_err(|_| invalid())?;

    let seconds_per_unit: u64 = match unit.trim() {
        "" | "s" => 1,
        "ms" => return Ok(Duration::from_millis(amount)),
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        "y" => 365 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtVerifier;

    const SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes!";

    fn subject(org: Option<&str>) -> TokenSubject<'_> {
        TokenSubject {
            user_id: "1",
            email: "admin@company.com",
            organization_id: org,
            role: Role::Admin,
        }
    }

    #[test]
    fn test_issue_is_three_part_url_safe() {
        let issuer = JwtIssuer::new(JwtIssuerConfig::with_secret(SECRET)).unwrap();
        let token = issuer.issue(subject(Some("org-1"))).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
    }

    #[test]
    fn test_issue_sets_expiry_from_ttl() {
        let issuer = JwtIssuer::new(
            JwtIssuerConfig::with_secret(SECRET).token_ttl(Duration::from_secs(3600)),
        )
        .unwrap();
        let token = issuer.issue(subject(Some("org-1"))).unwrap();
        let claims = JwtVerifier::from_secret(SECRET).verify(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.user_id, "1");
        assert_eq!(claims.organization_id.as_deref(), Some("org-1"));
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_issue_with_overflowing_ttl_is_internal_error() {
        let issuer = JwtIssuer::new(
            JwtIssuerConfig::with_secret(SECRET).token_ttl(Duration::from_secs(u64::MAX)),
        )
        .unwrap();

        let err = issuer.issue(subject(Some("org-1"))).unwrap_err();
        assert!(matches!(err, OrgAuthError::Internal(_)));
    }

    #[test]
    fn test_default_ttl_is_seven_days() {
        let config = JwtIssuerConfig::with_secret(SECRET);
        assert_eq!(config.token_ttl, parse_ttl(DEFAULT_TOKEN_TTL).unwrap());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(JwtIssuer::new(JwtIssuerConfig::with_secret(Vec::new())).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", JwtIssuerConfig::with_secret(SECRET));
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("test-secret"));
    }

    #[test]
    fn test_parse_ttl_units() {
        assert_eq!(parse_ttl("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_ttl("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_ttl("30m").unwrap(), Duration::from_secs(1_800));
        assert_eq!(parse_ttl("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_ttl("2w").unwrap(), Duration::from_secs(1_209_600));
        assert_eq!(parse_ttl("1y").unwrap(), Duration::from_secs(31_536_000));
        assert_eq!(parse_ttl("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_ttl("3600").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_ttl(" 1d ").unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_parse_ttl_rejects_garbage() {
        assert!(parse_ttl("").is_err());
        assert!(parse_ttl("d").is_err());
        assert!(parse_ttl("7 days").is_err());
        assert!(parse_ttl("-1d").is_err());
        assert!(parse_ttl("1.5h").is_err());
        assert!(parse_ttl("99999999999999999999y").is_err());
    }
}
