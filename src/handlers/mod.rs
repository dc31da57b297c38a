// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session cookie required)
//
// Protected pages sit behind `middleware::require_login`, which redirects
// anonymous visitors to /login; the JSON routes under /api sit behind
// `middleware::require_api_login`, which answers 401 instead.
pub mod public;
pub mod protected;

use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::middleware::Flash;

/// Render a page and drop the flash messages it displayed.
pub(crate) fn page(jar: CookieJar, flash: &Flash, html: String) -> Response {
    (flash.consume(jar), Html(html)).into_response()
}
