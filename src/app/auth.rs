//! Single-admin authentication backed by a server-side session table.
//!
//! Credentials come from the config file, with the password stored as a
//! sha256 digest. A successful login inserts a random opaque token into
//! the `sessions` table and hands it to the client in an http-only
//! cookie; each request looks the token back up and checks its age
//! against the configured TTL. Logout deletes the row and clears the
//! cookie, so a stolen cookie dies with the session.
//!
//! There is deliberately no rate limiting or lockout: one admin, one
//! credential pair.

use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use cookie::Cookie;
use sha2::{Digest as _, Sha256};

use crate::prelude::*;
use crate::utils::config::AdminConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "admin-session";

/// Proof that the request carries a valid admin session.
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub username: String,
}

/// Add all `auth` routes to the router.
#[rustfmt::skip]
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| {
        r.route("/admin/login", post(login))
            .route("/admin/logout", post(logout))
    })
}

/// Add all `auth` middleware to the router.
pub fn add_middleware(router: AxumRouter, state: SharedAppState) -> AxumRouter {
    /// Middleware layer to add an [`AdminSession`] to the request if a valid session cookie is present.
    async fn session_middleware(
        State(state): State<SharedAppState>, mut cookies: CookieJar, mut request: Request, next: Next,
    ) -> AppResult<(CookieJar, Response)> {
        if let Some(cookie) = cookies.get(SESSION_COOKIE) {
            let ttl = state.config.admin.session_ttl();
            match Session::lookup_valid(&state.db, cookie.value(), Utc::now(), ttl).await? {
                Some(session) if session.username == state.config.admin.username => {
                    request.extensions_mut().insert(AdminSession { username: session.username });
                }
                _ => cookies = cookies.remove(Cookie::from(SESSION_COOKIE)),
            }
        }
        let response = next.run(request).await;
        Ok((cookies, response))
    }
    router.layer(axum::middleware::from_fn_with_state(state, session_middleware))
}

/// Enable extracting an `Option<AdminSession>` in a handler.
impl<S: Send + Sync> axum::extract::OptionalFromRequestParts<S> for AdminSession {
    type Rejection = Infallible;
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AdminSession>().cloned())
    }
}
/// Enable extracting an `AdminSession` in a handler, returning UNAUTHORIZED if not logged in.
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AdminSession {
    type Rejection = AppError;
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AdminSession>().cloned().ok_or(AppError::Unauthorized)
    }
}

/// Check a login attempt against the configured admin identity.
pub fn validate_credentials(config: &AdminConfig, username: &str, password: &str) -> bool {
    let digest = hex::encode(Sha256::digest(password.as_bytes()));
    username == config.username && digest.eq_ignore_ascii_case(&config.password_sha256)
}

#[derive(Debug, serde::Deserialize)]
struct LoginForm {
    username: Option<String>,
    password: Option<String>,
}

#[derive(serde::Serialize)]
struct AuthResponse {
    success: bool,
    message: &'static str,
}

/// Process a login form and start a new session.
async fn login(
    State(state): State<SharedAppState>, Json(form): Json<LoginForm>,
) -> AppResult<impl IntoResponse> {
    let username = form.username.unwrap_or_default();
    let password = form.password.unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Username and password are required".into()));
    }

    if !validate_credentials(&state.config.admin, &username, &password) {
        return Err(AppError::BadCredentials);
    }

    let token = Session::create(&state.db, &username).await?;
    let cookie = session_cookie(&state.config, token);

    let headers = [(header::SET_COOKIE, cookie)];
    Ok((headers, Json(AuthResponse { success: true, message: "Login successful" })))
}

/// End the current session, if any, and clear the cookie.
async fn logout(
    State(state): State<SharedAppState>, cookies: CookieJar,
) -> AppResult<impl IntoResponse> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        Session::delete(&state.db, cookie.value()).await?;
    }

    let cleared = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(cookie::SameSite::Strict)
        .path("/")
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string();

    let headers = [(header::SET_COOKIE, cleared)];
    Ok((headers, Json(AuthResponse { success: true, message: "Logged out successfully" })))
}

fn session_cookie(config: &Config, token: String) -> String {
    Cookie::build((SESSION_COOKIE, token))
        .secure(config.acme.is_some())
        .http_only(true)
        .same_site(cookie::SameSite::Strict)
        .path("/")
        .max_age(cookie::time::Duration::seconds(config.admin.session_ttl().num_seconds()))
        .build()
        .to_string()
}
