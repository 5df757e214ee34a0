use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Cookie;
use chrono::{Days, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::backend::auth::AdminUser;
use crate::state::AppState;

pub mod login;

pub const LOGIN_COOKIE: &str = "sessao_admin";

/// Sent with responses that change (or reveal a change in) the admin
/// session, so that the gate on the admin page reloads itself.
pub const SESSION_CHANGED: &str = "sessao-alterada";

#[derive(Debug)]
pub enum AuthError {
    CookieMissingOrMalformed,
    NoDatabase,
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::CookieMissingOrMalformed => {
                (StatusCode::UNAUTHORIZED, "Cookie missing or malformed")
            }
            AuthError::NoDatabase => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
        };
        (status, [("HX-Trigger", SESSION_CHANGED)], body).into_response()
    }
}

#[derive(Serialize, Deserialize)]
pub struct LoginSession {
    id: String,
    expiry: NaiveDateTime,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar =
            PrivateCookieJar::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::CookieMissingOrMalformed)?;

        let login_cookie = match jar.get(LOGIN_COOKIE) {
            Some(cookie) => cookie,
            None => return Err(AuthError::Unauthorized),
        };

        let login: LoginSession =
            match serde_json::from_str::<LoginSession>(login_cookie.value()) {
                Ok(t) if Utc::now().naive_utc() < t.expiry => t,
                _ => {
                    return Err(AuthError::Unauthorized);
                }
            };

        let admin = state.auth.find(&login.id).map_err(|e| {
            tracing::error!("could not look up admin session: {e}");
            AuthError::NoDatabase
        })?;

        match admin {
            Some(admin) => Ok(admin),
            None => Err(AuthError::Unauthorized),
        }
    }
}

pub fn set_login_cookie(id: String, jar: PrivateCookieJar) -> PrivateCookieJar {
    let session = LoginSession {
        id,
        expiry: Utc::now()
            .naive_utc()
            .checked_add_days(Days::new(7))
            .unwrap_or(NaiveDateTime::MAX),
    };

    match serde_json::to_string(&session) {
        Ok(value) => jar.add(
            Cookie::build((LOGIN_COOKIE, value))
                .path("/")
                .http_only(true),
        ),
        Err(e) => {
            tracing::error!("could not encode login session: {e}");
            jar
        }
    }
}

pub fn clear_login_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(LOGIN_COOKIE).path("/"))
}
