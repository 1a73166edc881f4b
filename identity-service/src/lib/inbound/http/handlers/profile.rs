use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedIdentity;

pub async fn protected() -> &'static str {
    "This is a protected route"
}

/// Echo the identity carried by the access token. No store lookup.
pub async fn profile(identity: AuthenticatedIdentity) -> ApiSuccess<ProfileResponseData> {
    ApiSuccess::new(StatusCode::OK, (&identity).into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub id: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&AuthenticatedIdentity> for ProfileResponseData {
    fn from(identity: &AuthenticatedIdentity) -> Self {
        Self {
            id: identity.identity_id.to_string(),
            email: identity.email.clone(),
            issued_at: identity.issued_at,
            expires_at: identity.expires_at,
        }
    }
}
