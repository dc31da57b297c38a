use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use super::cookies::{site_cookie, site_cookie_removal};
use super::flash::redirect_with_flash_in;
use crate::auth::session::{self, Claims, SessionError};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Logged-in user, inserted into request extensions by the login guards.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: i32,
    pub username: String,
    pub session_id: Uuid,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            session_id: claims.session_id,
        }
    }
}

/// Decode the session cookie, if any.
pub fn current_user(jar: &CookieJar, security: &SecurityConfig) -> Result<CurrentUser, SessionError> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(SessionError::Missing)?;
    let claims = session::verify(cookie.value_trimmed(), security)?;
    Ok(CurrentUser::from(claims))
}

/// Cookie holding a freshly signed session.
pub fn session_cookie(claims: &Claims, security: &SecurityConfig) -> Result<Cookie<'static>, SessionError> {
    let token = session::issue(claims, security)?;
    Ok(site_cookie(
        SESSION_COOKIE,
        token,
        security.cookie_secure,
        Some(time::Duration::hours(security.session_expiry_hours as i64)),
    ))
}

/// Expire the session cookie, when the request carried one.
pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(site_cookie_removal(SESSION_COOKIE))
}

/// Guard for HTML pages: anonymous visitors are sent to the login form.
pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&jar, &state.config.security) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!("Redirecting to login: {}", err);
            // Only a session that was present can be removed.
            redirect_with_flash_in(end_session(jar), "/login", "Please log in to access this page.")
        }
    }
}

/// Guard for JSON routes: anonymous callers get a 401 envelope.
pub async fn require_api_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&jar, &state.config.security) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => ApiError::unauthorized(match err {
            SessionError::Expired => "Session expired",
            _ => "Login required",
        })
        .into_response(),
    }
}
