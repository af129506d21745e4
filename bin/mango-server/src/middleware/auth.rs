//! Admin access gate.
//!
//! The login form sets `admin_token=authenticated`; both gates only check
//! that this cookie is present with exactly that value. The check is a
//! placeholder, not an authentication scheme.

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::config::Config;
use crate::error::ServerError;

pub const ADMIN_COOKIE: &str = "admin_token";
pub const AUTHENTICATED: &str = "authenticated";
pub const LOGIN_PATH: &str = "/admin/login";

/// `true` when the request carries the admin session cookie.
pub fn is_authenticated(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == ADMIN_COOKIE && value == AUTHENTICATED)
}

/// Gate for admin pages: unauthenticated visitors are sent to the login form.
pub async fn require_admin_page(req: Request<Body>, next: Next) -> Response {
    if !is_authenticated(req.headers()) {
        debug!(path = %req.uri().path(), "no admin session; redirecting to login");
        return Redirect::to(LOGIN_PATH).into_response();
    }
    next.run(req).await
}

/// Gate for admin API routes: unauthenticated calls get a 401 JSON body.
pub async fn require_admin_api(req: Request<Body>, next: Next) -> Response {
    if !is_authenticated(req.headers()) {
        debug!(path = %req.uri().path(), "no admin session; rejecting API call");
        return ServerError::Unauthorized("não autorizado".into()).into_response();
    }
    next.run(req).await
}

/// `Set-Cookie` value that opens an admin session.
pub fn session_cookie(config: &Config) -> (axum::http::HeaderName, HeaderValue) {
    let mut cookie = format!(
        "{ADMIN_COOKIE}={AUTHENTICATED}; Max-Age={}; Path=/; SameSite=Strict; HttpOnly",
        config.admin_session_max_age_secs
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    (SET_COOKIE, header_value(cookie))
}

/// `Set-Cookie` value that ends the admin session.
pub fn clear_session_cookie() -> (axum::http::HeaderName, HeaderValue) {
    (
        SET_COOKIE,
        header_value(format!("{ADMIN_COOKIE}=; Max-Age=0; Path=/; SameSite=Strict; HttpOnly")),
    )
}

// Cookie strings are built from ASCII constants and integers only.
fn header_value(cookie: String) -> HeaderValue {
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}
