use std::sync::Arc;

use auth::AccessClaims;
use auth::TokenService;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use chrono::DateTime;
use chrono::Utc;

use super::cookies::cookie_value;
use super::cookies::ACCESS_TOKEN_COOKIE;
use super::handlers::ApiError;
use crate::domain::identity::models::IdentityId;

pub const NO_TOKEN_MESSAGE: &str = "Unauthorized: No token provided";
pub const INVALID_TOKEN_MESSAGE: &str = "Unauthorized: Invalid token";
pub const MISSING_IDENTITY_MESSAGE: &str = "User not found in context";

/// Caller identity attached to the request by [`authenticate`].
///
/// Handlers take it as an extractor. Outside the middleware it rejects with
/// 401; use `Option<AuthenticatedIdentity>` to observe the absence instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub identity_id: IdentityId,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<AccessClaims> for AuthenticatedIdentity {
    type Error = String;

    fn try_from(claims: AccessClaims) -> Result<Self, Self::Error> {
        let identity_id = IdentityId::from_string(claims.subject()).map_err(|e| e.to_string())?;
        let issued_at = claims
            .registered
            .issued_at()
            .ok_or_else(|| "iat out of range".to_string())?;
        let expires_at = claims
            .registered
            .expires_at()
            .ok_or_else(|| "exp out of range".to_string())?;

        Ok(Self {
            identity_id,
            email: claims.email().to_string(),
            issued_at,
            expires_at,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized(MISSING_IDENTITY_MESSAGE.to_string()))
    }
}

/// Middleware that validates the access token and attaches the caller identity.
///
/// The `access_token` cookie wins over an `Authorization: Bearer` header when
/// both are present. Rejected requests never reach the wrapped handler.
pub async fn authenticate(
    State(token_service): State<Arc<TokenService>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();

    let token = cookie_value(&jar, ACCESS_TOKEN_COOKIE)
        .or_else(|| bearer_token(req.headers()))
        .ok_or_else(|| {
            tracing::warn!(path = %path, "Request rejected: no access token");
            ApiError::Unauthorized(NO_TOKEN_MESSAGE.to_string())
        })?;

    let identity = token_service
        .validate_access_token(&token)
        .map_err(|e| e.to_string())
        .and_then(AuthenticatedIdentity::try_from)
        .map_err(|reason| {
            tracing::warn!(path = %path, reason = %reason, "Request rejected: invalid access token");
            ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
        })?;

    tracing::debug!(identity_id = %identity.identity_id, path = %path, "Request authenticated");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
