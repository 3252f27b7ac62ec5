use crate::auth::claims::TokenClaims;
use crate::error::OrgAuthError;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};

/// Why a presented token was not accepted.
///
/// The distinction is kept for logs and tests only. Clients see one of two
/// messages, see [`TokenRejection::public_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("no bearer token presented")]
    Missing,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

impl TokenRejection {
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Missing => "Authentication token required",
            Self::Malformed | Self::InvalidSignature | Self::Expired => "Invalid or expired token",
        }
    }
}

impl From<TokenRejection> for OrgAuthError {
    fn from(rejection: TokenRejection) -> Self {
        OrgAuthError::unauthorized(rejection.public_message())
    }
}

/// Verifies HS256 tokens signed with the server secret.
///
/// The algorithm is pinned, `exp` is mandatory and no clock leeway is
/// granted: a token is dead the second its expiry passes.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Check the signature, then the expiry, then decode the claims.
    ///
    /// Nothing in the payload is looked at before the signature checks out.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
                _ => TokenRejection::Malformed,
            })
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}
