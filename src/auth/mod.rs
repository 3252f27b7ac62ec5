//! Authentication: password hashing, bearer tokens and request guards.

pub mod claims;
pub mod extractors;
pub mod guards;
pub mod jwt;
pub mod jwt_issuer;
pub mod password;
pub mod token;

pub use claims::TokenClaims;
pub use extractors::AuthClaims;
pub use guards::{
    Guard, GuardChain, GuardContext, RequireAuthenticated, RequireOrganization, RequireRole,
    guard_middleware,
};
pub use jwt::{JwtVerifier, TokenRejection};
pub use jwt_issuer::{
    DEFAULT_TOKEN_TTL, JwtIssuer, JwtIssuerConfig, MAX_TOKEN_TTL, TokenSubject, parse_ttl,
};
pub use password::{PasswordConfig, PasswordHasher};
pub use token::{TokenExtractor, extract_bearer};
