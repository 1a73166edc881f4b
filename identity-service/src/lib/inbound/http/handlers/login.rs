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
use crate::inbound::http::cookies::with_session_cookies;
use crate::inbound::http::router::AppState;
use crate::identity::errors::IdentityError;

/// Verify credentials and hand out a fresh token pair, both in the body and
/// as session cookies.
pub async fn login<IS: IdentityServicePort>(
    State(state): State<AppState<IS>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, ApiSuccess<LoginResponseData>), ApiError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let identity = state
        .identity_service
        .login(&body.email, &body.password)
        .await
        .map_err(|e| {
            match &e {
                IdentityError::NotFoundByEmail(_) => {
                    tracing::warn!("Login rejected: unknown email")
                }
                IdentityError::InvalidCredentials => {
                    tracing::warn!("Login rejected: password mismatch")
                }
                _ => {}
            }
            ApiError::from(e)
        })?;

    let tokens = state
        .token_service
        .issue_token_pair(identity.id, identity.email.as_str())?;

    tracing::info!(identity_id = %identity.id, "Login succeeded");

    let jar = with_session_cookies(jar, &tokens, &state.token_service, &state.cookies);

    Ok((
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            LoginResponseData {
                message: "Login successful".to_string(),
                user: identity.username.as_str().to_string(),
                tokens,
            },
        ),
    ))
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub message: String,
    pub user: String,
    pub tokens: TokenPair,
}
