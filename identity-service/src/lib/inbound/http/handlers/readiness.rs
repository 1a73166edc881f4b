use std::time::Duration;

use axum::extract::State;

use super::ApiError;
use crate::domain::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

const STORE_PING_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn readiness<IS: IdentityServicePort>(
    State(state): State<AppState<IS>>,
) -> Result<&'static str, ApiError> {
    match tokio::time::timeout(STORE_PING_TIMEOUT, state.identity_service.check_readiness()).await
    {
        Ok(Ok(())) => Ok("OK"),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Readiness check failed");
            Err(ApiError::ServiceUnavailable(
                "Credential store unavailable".to_string(),
            ))
        }
        Err(_) => {
            tracing::error!("Readiness check timed out");
            Err(ApiError::ServiceUnavailable(
                "Credential store unavailable".to_string(),
            ))
        }
    }
}
