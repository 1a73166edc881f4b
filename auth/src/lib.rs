//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the identity service:
//! - Password hashing (Argon2id)
//! - JWT encoding and decoding restricted to the HMAC algorithm family
//! - Dual-token issuance and validation (short-lived access token,
//!   long-lived refresh token, each with its own secret)
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{TokenService, TokenSettings};
//!
//! let tokens = TokenService::new(TokenSettings::new(
//!     "access_secret_key_at_least_32_bytes!",
//!     "refresh_secret_key_at_least_32_bytes",
//! ))
//! .unwrap();
//!
//! // Login: mint both tokens
//! let pair = tokens.issue_token_pair("user123", "alice@example.com").unwrap();
//!
//! // Protected request: only the access token is accepted
//! let claims = tokens.validate_access_token(&pair.access_token).unwrap();
//! assert_eq!(claims.email(), "alice@example.com");
//! assert!(tokens.validate_access_token(&pair.refresh_token).is_err());
//!
//! // Refresh: rotate into a brand-new pair
//! let refresh = tokens.validate_refresh_token(&pair.refresh_token).unwrap();
//! let rotated = tokens.issue_token_pair(refresh.subject(), refresh.email()).unwrap();
//! assert!(tokens.validate_access_token(&rotated.access_token).is_ok());
//! ```

pub mod jwt;
pub mod password;
pub mod token_service;

// Re-export commonly used items
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use jwt::RegisteredClaims;
pub use jwt::TokenType;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token_service::TokenError;
pub use token_service::TokenPair;
pub use token_service::TokenService;
pub use token_service::TokenSettings;
