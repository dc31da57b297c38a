// handlers/public/auth/session.rs - GET /logout handler

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::middleware::auth::end_session;

/// Drop the browser's session cookie.
///
/// Sessions are stateless signed tokens, so a copy of the token taken
/// before logout stays valid until its `exp`. `SESSION_EXPIRY_HOURS`
/// bounds that window (8 hours in production).
pub async fn logout(jar: CookieJar) -> Response {
    (end_session(jar), Redirect::to("/")).into_response()
}
