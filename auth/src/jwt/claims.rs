use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Discriminates the two token shapes issued by this crate.
///
/// Serialized into every token as the `token_type` claim so that a
/// refresh token can never be mistaken for an access token, even if
/// both were signed with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims shared by access and refresh tokens.
///
/// Timestamps are Unix seconds (RFC 7519 NumericDate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredClaims {
    /// Subject (identity identifier)
    pub sub: String,

    /// Email of the identity the token was issued to
    pub email: String,

    /// Issued at
    pub iat: i64,

    /// Not before
    pub nbf: i64,

    /// Expiration time
    pub exp: i64,
}

impl RegisteredClaims {
    /// Build claims valid from `issued_at` until `issued_at + ttl`.
    ///
    /// # Arguments
    /// * `subject` - Unique identity identifier
    /// * `email` - Identity email address
    /// * `issued_at` - Instant the token is minted
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with sub, email, iat, nbf and exp set
    ///
    /// # Errors
    /// * `ExpiryOutOfRange` - `issued_at + ttl` is not a representable instant
    pub fn issue(
        subject: impl ToString,
        email: impl ToString,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let now = issued_at.timestamp();
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(JwtError::ExpiryOutOfRange)?;

        Ok(Self {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: now,
            nbf: now,
            exp: expires_at.timestamp(),
        })
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Check if token is not usable yet.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        self.nbf > current_timestamp
    }

    /// Verify that `now` lies within `[nbf, exp]`.
    ///
    /// # Errors
    /// * `TokenNotYetValid` - `now` is before `nbf`
    /// * `TokenExpired` - `now` is after `exp`
    pub fn check_validity_window(&self, now: DateTime<Utc>) -> Result<(), JwtError> {
        let current_timestamp = now.timestamp();

        if self.is_premature(current_timestamp) {
            return Err(JwtError::TokenNotYetValid);
        }
        if self.is_expired(current_timestamp) {
            return Err(JwtError::TokenExpired);
        }

        Ok(())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A claim set that carries a fixed token type tag.
pub trait TokenClaims: Serialize + DeserializeOwned {
    /// Token type this claim shape must carry.
    const TOKEN_TYPE: TokenType;

    fn registered(&self) -> &RegisteredClaims;

    fn token_type(&self) -> TokenType;

    /// Reject claims whose tag does not match the expected shape.
    fn check_token_type(&self) -> Result<(), JwtError> {
        let actual = self.token_type();
        if actual == Self::TOKEN_TYPE {
            Ok(())
        } else {
            Err(JwtError::WrongTokenType {
                expected: Self::TOKEN_TYPE,
                actual,
            })
        }
    }
}

/// Claims of a short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,

    pub token_type: TokenType,
}

impl AccessClaims {
    pub fn new(
        subject: impl ToString,
        email: impl ToString,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            registered: RegisteredClaims::issue(subject, email, issued_at, ttl)?,
            token_type: TokenType::Access,
        })
    }

    pub fn subject(&self) -> &str {
        &self.registered.sub
    }

    pub fn email(&self) -> &str {
        &self.registered.email
    }
}

impl TokenClaims for AccessClaims {
    const TOKEN_TYPE: TokenType = TokenType::Access;

    fn registered(&self) -> &RegisteredClaims {
        &self.registered
    }

    fn token_type(&self) -> TokenType {
        self.token_type
    }
}

/// Claims of a long-lived refresh token. Only good for minting a new pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,

    pub token_type: TokenType,
}

impl RefreshClaims {
    pub fn new(
        subject: impl ToString,
        email: impl ToString,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            registered: RegisteredClaims::issue(subject, email, issued_at, ttl)?,
            token_type: TokenType::Refresh,
        })
    }

    pub fn subject(&self) -> &str {
        &self.registered.sub
    }

    pub fn email(&self) -> &str {
        &self.registered.email
    }
}

impl TokenClaims for RefreshClaims {
    const TOKEN_TYPE: TokenType = TokenType::Refresh;

    fn registered(&self) -> &RegisteredClaims {
        &self.registered
    }

    fn token_type(&self) -> TokenType {
        self.token_type
    }
}
