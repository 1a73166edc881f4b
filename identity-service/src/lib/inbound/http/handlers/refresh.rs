use auth::TokenPair;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::ports::IdentityServicePort;
use crate::inbound::http::cookies::cookie_value;
use crate::inbound::http::cookies::with_session_cookies;
use crate::inbound::http::cookies::REFRESH_TOKEN_COOKIE;
use crate::inbound::http::router::AppState;

/// Exchange a refresh token for a new pair.
///
/// The `refresh_token` cookie is preferred; a JSON body is the fallback for
/// clients that do not keep cookies. Nothing is looked up in the store.
pub async fn refresh<IS: IdentityServicePort>(
    State(state): State<AppState<IS>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, ApiSuccess<RefreshResponseData>), ApiError> {
    let refresh_token = cookie_value(&jar, REFRESH_TOKEN_COOKIE)
        .or_else(|| {
            body.map(|Json(body)| body.refresh_token)
                .filter(|token| !token.is_empty())
        })
        .ok_or_else(|| ApiError::Unauthorized("Refresh token not provided".to_string()))?;

    let claims = state
        .token_service
        .validate_refresh_token(&refresh_token)
        .map_err(|e| {
            tracing::warn!(reason = %e, "Refresh rejected");
            ApiError::Unauthorized("Invalid refresh token".to_string())
        })?;

    let tokens = state
        .token_service
        .issue_token_pair(claims.subject(), claims.email())?;

    tracing::info!(identity_id = %claims.subject(), "Token pair rotated");

    let jar = with_session_cookies(jar, &tokens, &state.token_service, &state.cookies);

    Ok((
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            RefreshResponseData {
                message: "Token refreshed successfully".to_string(),
                tokens,
            },
        ),
    ))
}

#[derive(Clone, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub message: String,
    pub tokens: TokenPair,
}
