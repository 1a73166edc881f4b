use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Serialize;

use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::RefreshClaims;
use crate::jwt::TokenClaims;

/// Default lifetime of an access token (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Default lifetime of a refresh token (7 days).
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Minimum secret length in bytes (256 bits for HS256).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Key material and expiry policy for a [`TokenService`].
#[derive(Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenSettings {
    /// Settings with the default expiry policy (15 minutes / 7 days).
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    fn validate(&self) -> Result<(), TokenError> {
        for (name, secret) in [
            ("access", &self.access_secret),
            ("refresh", &self.refresh_secret),
        ] {
            if secret.len() < MIN_SECRET_LENGTH {
                return Err(TokenError::Configuration(format!(
                    "{} secret must be at least {} bytes, got {}",
                    name,
                    MIN_SECRET_LENGTH,
                    secret.len()
                )));
            }
        }

        if self.access_secret == self.refresh_secret {
            return Err(TokenError::Configuration(
                "access and refresh secrets must differ".to_string(),
            ));
        }

        if self.access_ttl <= Duration::zero() {
            return Err(TokenError::Configuration(
                "access token lifetime must be positive".to_string(),
            ));
        }

        if self.refresh_ttl <= self.access_ttl {
            return Err(TokenError::Configuration(
                "refresh token lifetime must exceed access token lifetime".to_string(),
            ));
        }

        // Expiry must stay representable for any token minted from now on
        if Utc::now().checked_add_signed(self.refresh_ttl).is_none() {
            return Err(TokenError::Configuration(
                "refresh token lifetime is out of range".to_string(),
            ));
        }

        Ok(())
    }
}

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token issuance and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid token configuration: {0}")]
    Configuration(String),

    #[error("Failed to issue token: {0}")]
    Issuance(#[source] JwtError),

    /// Signature, algorithm, type and time-window failures all collapse here.
    /// The cause is kept as the error source for logging only.
    #[error("Invalid token")]
    InvalidToken(#[source] JwtError),
}

/// Issues and validates access/refresh token pairs.
///
/// Each token kind has its own secret and lifetime, so a token of one kind
/// never validates as the other. Every operation is a pure function of the
/// claims, the key and the supplied instant; the `*_at` variants take the
/// instant explicitly, the others use the system clock.
pub struct TokenService {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Errors
    /// * `Configuration` - Secrets are too short or identical, or lifetimes are inconsistent
    pub fn new(settings: TokenSettings) -> Result<Self, TokenError> {
        settings.validate()?;

        Ok(Self {
            access: JwtHandler::new(settings.access_secret.as_bytes()),
            refresh: JwtHandler::new(settings.refresh_secret.as_bytes()),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue an access token valid from now for the access lifetime.
    ///
    /// # Errors
    /// * `Issuance` - Signing failed
    pub fn issue_access_token(
        &self,
        identity_id: impl ToString,
        email: &str,
    ) -> Result<String, TokenError> {
        self.issue_access_token_at(identity_id, email, Utc::now())
    }

    pub fn issue_access_token_at(
        &self,
        identity_id: impl ToString,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = AccessClaims::new(identity_id, email, now, self.access_ttl)
            .map_err(TokenError::Issuance)?;
        self.access.encode(&claims).map_err(TokenError::Issuance)
    }

    /// Issue a refresh token valid from now for the refresh lifetime.
    ///
    /// # Errors
    /// * `Issuance` - Signing failed
    pub fn issue_refresh_token(
        &self,
        identity_id: impl ToString,
        email: &str,
    ) -> Result<String, TokenError> {
        self.issue_refresh_token_at(identity_id, email, Utc::now())
    }

    pub fn issue_refresh_token_at(
        &self,
        identity_id: impl ToString,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = RefreshClaims::new(identity_id, email, now, self.refresh_ttl)
            .map_err(TokenError::Issuance)?;
        self.refresh.encode(&claims).map_err(TokenError::Issuance)
    }

    /// Issue both tokens. Either failure aborts the call; no partial pair escapes.
    ///
    /// # Errors
    /// * `Issuance` - Signing either token failed
    pub fn issue_token_pair(
        &self,
        identity_id: impl ToString,
        email: &str,
    ) -> Result<TokenPair, TokenError> {
        self.issue_token_pair_at(identity_id, email, Utc::now())
    }

    pub fn issue_token_pair_at(
        &self,
        identity_id: impl ToString,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let identity_id = identity_id.to_string();
        let access_token = self.issue_access_token_at(&identity_id, email, now)?;
        let refresh_token = self.issue_refresh_token_at(&identity_id, email, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Validate an access token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, non-HMAC algorithm, wrong token type,
    ///   malformed token, or outside its validity window
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.validate_access_token_at(token, Utc::now())
    }

    pub fn validate_access_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, TokenError> {
        validate_with(&self.access, token, now)
    }

    /// Validate a refresh token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Same conditions as [`Self::validate_access_token`]
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.validate_refresh_token_at(token, Utc::now())
    }

    pub fn validate_refresh_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshClaims, TokenError> {
        validate_with(&self.refresh, token, now)
    }
}

fn validate_with<T: TokenClaims>(
    handler: &JwtHandler,
    token: &str,
    now: DateTime<Utc>,
) -> Result<T, TokenError> {
    let claims: T = handler.decode(token).map_err(TokenError::InvalidToken)?;
    claims
        .check_token_type()
        .map_err(TokenError::InvalidToken)?;
    claims
        .registered()
        .check_validity_window(now)
        .map_err(TokenError::InvalidToken)?;

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "access_secret_key_at_least_32_bytes!";
    const REFRESH_SECRET: &str = "refresh_secret_key_at_least_32_bytes";

    fn service() -> TokenService {
        TokenService::new(TokenSettings::new(ACCESS_SECRET, REFRESH_SECRET))
            .expect("Failed to build token service")
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let service = service();

        let token = service
            .issue_access_token("user123", "alice@example.com")
            .expect("Failed to issue token");
        let claims = service
            .validate_access_token(&token)
            .expect("Token validation failed");

        assert_eq!(claims.subject(), "user123");
        assert_eq!(claims.email(), "alice@example.com");
        assert_eq!(
            claims.registered.exp - claims.registered.iat,
            DEFAULT_ACCESS_TTL_SECS
        );
    }

    #[test]
    fn test_issue_and_validate_refresh_token() {
        let service = service();

        let token = service
            .issue_refresh_token("user123", "alice@example.com")
            .expect("Failed to issue token");
        let claims = service
            .validate_refresh_token(&token)
            .expect("Token validation failed");

        assert_eq!(claims.subject(), "user123");
        assert_eq!(claims.email(), "alice@example.com");
        assert_eq!(
            claims.registered.exp - claims.registered.iat,
            DEFAULT_REFRESH_TTL_SECS
        );
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let service = service();
        let pair = service
            .issue_token_pair("user123", "alice@example.com")
            .unwrap();

        let result = service.validate_access_token(&pair.refresh_token);
        assert!(matches!(
            result,
            Err(TokenError::InvalidToken(JwtError::InvalidSignature))
        ));
    }

    #[test]
    fn test_access_token_rejected_as_refresh_token() {
        let service = service();
        let pair = service
            .issue_token_pair("user123", "alice@example.com")
            .unwrap();

        let result = service.validate_refresh_token(&pair.access_token);
        assert!(matches!(
            result,
            Err(TokenError::InvalidToken(JwtError::InvalidSignature))
        ));
    }

    #[test]
    fn test_wrong_token_type_rejected_even_with_matching_key() {
        let service = service();
        // Refresh-shaped claims signed with the access key
        let claims =
            RefreshClaims::new("user123", "a@b.c", Utc::now(), Duration::minutes(5)).unwrap();
        let token = JwtHandler::new(ACCESS_SECRET.as_bytes())
            .encode(&claims)
            .unwrap();

        let result = service.validate_access_token(&token);
        assert!(matches!(
            result,
            Err(TokenError::InvalidToken(JwtError::WrongTokenType { .. }))
        ));
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let service = service();
        let issued_at = Utc::now() - Duration::hours(1);

        let token = service
            .issue_access_token_at("user123", "a@b.c", issued_at)
            .unwrap();

        let result = service.validate_access_token(&token);
        assert!(matches!(
            result,
            Err(TokenError::InvalidToken(JwtError::TokenExpired))
        ));
    }

    #[test]
    fn test_token_valid_until_exactly_expiry() {
        let service = service();
        let now = Utc::now();
        let token = service.issue_access_token_at("user123", "a@b.c", now).unwrap();

        let at_expiry = now + service.access_ttl();
        assert!(service.validate_access_token_at(&token, at_expiry).is_ok());

        let past_expiry = at_expiry + Duration::seconds(1);
        assert!(service
            .validate_access_token_at(&token, past_expiry)
            .is_err());
    }

    #[test]
    fn test_token_not_valid_before_issue() {
        let service = service();
        let now = Utc::now();
        let token = service
            .issue_refresh_token_at("user123", "a@b.c", now + Duration::minutes(10))
            .unwrap();

        let result = service.validate_refresh_token_at(&token, now);
        assert!(matches!(
            result,
            Err(TokenError::InvalidToken(JwtError::TokenNotYetValid))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = service();

        assert!(matches!(
            service.validate_access_token("invalid.token.here"),
            Err(TokenError::InvalidToken(_))
        ));
        assert!(matches!(
            service.validate_refresh_token(""),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_invalid_token_message_hides_cause() {
        let service = service();
        let err = service
            .validate_access_token("invalid.token.here")
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid token");
    }

    #[test]
    fn test_rejects_identical_secrets() {
        let result = TokenService::new(TokenSettings::new(ACCESS_SECRET, ACCESS_SECRET));
        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = TokenService::new(TokenSettings::new("short", REFRESH_SECRET));
        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }

    #[test]
    fn test_rejects_refresh_ttl_not_longer_than_access_ttl() {
        let settings = TokenSettings::new(ACCESS_SECRET, REFRESH_SECRET)
            .with_access_ttl(Duration::hours(1))
            .with_refresh_ttl(Duration::minutes(30));

        let result = TokenService::new(settings);
        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }

    #[test]
    fn test_rejects_out_of_range_ttl() {
        let settings = TokenSettings::new(ACCESS_SECRET, REFRESH_SECRET)
            .with_refresh_ttl(Duration::seconds(9_000_000_000_000_000));

        let result = TokenService::new(settings);
        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }

    #[test]
    fn test_issuance_past_representable_range_fails() {
        let service = service();
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::hours(1);

        // Access expiry still fits, refresh expiry does not
        assert!(service
            .issue_access_token_at("user123", "a@b.c", near_end)
            .is_ok());
        let result = service.issue_token_pair_at("user123", "a@b.c", near_end);
        assert!(matches!(
            result,
            Err(TokenError::Issuance(JwtError::ExpiryOutOfRange))
        ));
    }

    #[test]
    fn test_refresh_after_access_expiry_rotates_pair() {
        let service = service();
        let login_at = Utc::now();
        let pair = service
            .issue_token_pair_at("user123", "alice@example.com", login_at)
            .unwrap();

        let later = login_at + service.access_ttl() + Duration::seconds(1);
        assert!(service
            .validate_access_token_at(&pair.access_token, later)
            .is_err());

        let refresh_claims = service
            .validate_refresh_token_at(&pair.refresh_token, later)
            .expect("Refresh token should still be valid");
        let rotated = service
            .issue_token_pair_at(refresh_claims.subject(), refresh_claims.email(), later)
            .unwrap();

        let claims = service
            .validate_access_token_at(&rotated.access_token, later)
            .unwrap();
        assert_eq!(claims.subject(), "user123");
        assert_eq!(claims.email(), "alice@example.com");
        assert_ne!(rotated.refresh_token, pair.refresh_token);
    }
}
