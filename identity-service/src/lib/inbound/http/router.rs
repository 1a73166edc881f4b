use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::login::login;
use super::handlers::profile::profile;
use super::handlers::profile::protected;
use super::handlers::readiness::readiness;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::config::CookieConfig;
use crate::domain::identity::ports::IdentityServicePort;

const CORS_MAX_AGE: Duration = Duration::from_secs(300);

pub struct AppState<IS: IdentityServicePort> {
    pub identity_service: Arc<IS>,
    pub token_service: Arc<TokenService>,
    pub cookies: CookieConfig,
}

impl<IS: IdentityServicePort> Clone for AppState<IS> {
    fn clone(&self) -> Self {
        Self {
            identity_service: self.identity_service.clone(),
            token_service: self.token_service.clone(),
            cookies: self.cookies.clone(),
        }
    }
}

pub fn create_router<IS: IdentityServicePort>(
    identity_service: Arc<IS>,
    token_service: Arc<TokenService>,
    cookies: CookieConfig,
    request_timeout: Duration,
) -> Router {
    let state = AppState {
        identity_service,
        token_service,
        cookies,
    };

    let public_routes = Router::new()
        .route("/v1/ready", get(readiness::<IS>))
        .route("/v1/auth/register", post(register::<IS>))
        .route("/v1/auth/login", post(login::<IS>))
        .route("/v1/auth/refresh", post(refresh::<IS>));

    let protected_routes = Router::new()
        .route("/v1/protected", get(protected))
        .route("/v1/user/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(
            state.token_service.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(trace_layer)
        .layer(cors_layer())
        .with_state(state)
}

/// Any http(s) origin may call the API; browsers get no credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            |origin: &HeaderValue, _request_parts| {
                origin
                    .to_str()
                    .map(|origin| origin.starts_with("http://") || origin.starts_with("https://"))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(false)
        .max_age(CORS_MAX_AGE)
}
