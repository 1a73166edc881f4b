use auth::TokenPair;
use auth::TokenService;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

use crate::config::CookieConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// The refresh cookie is only ever sent back to the refresh endpoint.
pub const REFRESH_TOKEN_PATH: &str = "/v1/auth/refresh";

/// Add both session cookies for a freshly issued pair.
///
/// Max-Age follows the token lifetimes so a cookie never outlives its token.
pub fn with_session_cookies(
    jar: CookieJar,
    tokens: &TokenPair,
    token_service: &TokenService,
    config: &CookieConfig,
) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        "/",
        token_service.access_ttl(),
        config.secure,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        REFRESH_TOKEN_PATH,
        token_service.refresh_ttl(),
        config.secure,
    ))
}

/// Non-empty value of the named cookie.
pub fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn session_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    ttl: chrono::Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}
