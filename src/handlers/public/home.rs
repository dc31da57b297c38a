// handlers/public/home.rs - GET/POST / handler

use axum::{extract::State, response::Response};
use axum_extra::extract::cookie::CookieJar;

use crate::error::PageError;
use crate::handlers::page;
use crate::middleware::{auth::current_user, Flash};
use crate::state::AppState;
use crate::views::pages;

/// Landing page. The first visit creates any missing tables.
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> Result<Response, PageError> {
    state.ensure_schema().await?;

    let user = current_user(&jar, &state.config.security).ok();
    let flash = Flash::from_jar(&jar);
    let username = user.as_ref().map(|u| u.username.as_str());
    let html = pages::index(username, &flash);
    Ok(page(jar, &flash, html))
}
