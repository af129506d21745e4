//! Access-code login and logout.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::auth::{self, LOGIN_PATH};
use crate::schemas::admin::LoginForm;
use crate::state::AppState;

pub const ADMIN_HOME: &str = "/admin";
pub const INVALID_CODE: &str = "Código de acesso inválido";
pub const MISSING_CODE: &str = "Informe o código de acesso.";

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>Mango AI · Administração</title></head>
<body>
  <h1>Área administrativa</h1>
  <form method="post" action="/admin/login">
    <label for="access_code">Código de acesso</label>
    <input id="access_code" name="access_code" type="password" autocomplete="current-password" required>
    <button type="submit">Entrar</button>
  </form>
</body>
</html>
"#;

#[derive(OpenApi)]
#[openapi(paths(login_page, login, logout), components(schemas(LoginForm)))]
pub struct SessionApi;

/// Login form (`GET /admin/login`); already-authenticated visitors go
/// straight to the console.
#[utoipa::path(
    get,
    path = "/admin/login",
    tag = "admin",
    responses(
        (status = 200, description = "Login form", body = String, content_type = "text/html"),
        (status = 303, description = "Already signed in; redirect to /admin"),
    )
)]
pub async fn login_page(headers: HeaderMap) -> Response {
    if auth::is_authenticated(&headers) {
        return Redirect::to(ADMIN_HOME).into_response();
    }
    Html(LOGIN_PAGE).into_response()
}

/// Check the access code and open a session (`POST /admin/login`).
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; session cookie set, redirect to /admin"),
        (status = 400, description = "No access code given"),
        (status = 401, description = "Wrong access code"),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ServerError> {
    let code = form.access_code.trim();
    if code.is_empty() {
        return Err(ServerError::BadRequest(MISSING_CODE.into()));
    }
    if code != state.config.admin_access_code {
        warn!("admin login rejected");
        return Err(ServerError::Unauthorized(INVALID_CODE.into()));
    }

    info!("admin session opened");
    Ok((
        [auth::session_cookie(&state.config)],
        Redirect::to(ADMIN_HOME),
    )
        .into_response())
}

/// Close the session (`POST /admin/logout`).
#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "admin",
    responses((status = 303, description = "Cookie cleared; redirect to /admin/login"))
)]
pub async fn logout() -> Response {
    info!("admin session closed");
    ([auth::clear_session_cookie()], Redirect::to(LOGIN_PATH)).into_response()
}
