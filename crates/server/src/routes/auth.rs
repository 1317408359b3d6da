use std::sync::Arc;

use axum::{Json, extract::{State, Request}, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use uuid::Uuid;

use service::auth::{AuthService, domain::{SigninInput, SignupInput}};
use service::category::CategoryService;
use service::product::ProductService;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
}

#[derive(Serialize)]
pub struct SignupOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct SigninOutput { pub user_id: Uuid, pub email: String, pub name: String, pub token: String }

#[utoipa::path(post, path = "/auth/signup", tag = "auth", request_body = crate::openapi::SignupRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn signup(State(state): State<ServerState>, Json(input): Json<SignupInput>) -> Result<Json<SignupOutput>, JsonApiError> {
    let user = state.auth.signup(input).await?;
    Ok(Json(SignupOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/signin", tag = "auth", request_body = crate::openapi::SigninRequest, responses((status = 200, description = "Signed In"), (status = 401, description = "Unauthorized")))]
pub async fn signin(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<SigninInput>) -> Result<(CookieJar, Json<SigninOutput>), JsonApiError> {
    let session = state.auth.signin(input).await?;
    let user = session.user;

    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);

    let out = SigninOutput { user_id: user.id, email: user.email, name: user.name, token: session.token };
    Ok((jar, Json(out)))
}

fn is_public(path: &str, method: &axum::http::Method) -> bool {
    path == "/health"
        || path == "/auth/signup"
        || path == "/auth/signin"
        || path.starts_with("/api-docs")
        || method == axum::http::Method::OPTIONS
}

/// Global middleware: everything but health, auth, docs and CORS preflight
/// needs a valid `Authorization: Bearer <token>` or the `auth_token` cookie.
/// Verified claims are put into request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    if is_public(&path, req.method()) {
        return Ok(next.run(req).await);
    }

    let authz = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match authz {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => t.trim().to_string(),
            None => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::unauthorized("expected Bearer token"));
            }
        },
        None => match jar.get(AUTH_COOKIE) {
            Some(c) if !c.value().is_empty() => c.value().to_string(),
            _ => {
                tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                return Err(JsonApiError::unauthorized("missing token"));
            }
        },
    };

    let claims = state.auth.verify_token(&token)?;
    tracing::debug!(path = %path, user = %claims.sub, "token accepted");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
