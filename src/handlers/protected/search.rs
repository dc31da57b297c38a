// handlers/protected/search.rs - GET/POST /search handlers

use axum::{extract::State, response::Response, Extension, Form};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::PageError;
use crate::handlers::page;
use crate::middleware::{redirect_with_flash, CurrentUser, Flash};
use crate::state::AppState;
use crate::views::pages;

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub hshd_num: String,
}

/// Parse a household number typed into the search form.
pub fn parse_household_number(raw: &str) -> Result<i32, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Household Number is required.");
    }
    raw.parse()
        .map_err(|_| "Household Number must be a whole number.")
}

pub async fn search_get(Extension(user): Extension<CurrentUser>, jar: CookieJar) -> Response {
    let flash = Flash::from_jar(&jar);
    let html = pages::search(&user.username, &flash, "", None);
    page(jar, &flash, html)
}

/// Look up one household's transactions and render them under the form.
pub async fn search_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> Result<Response, PageError> {
    let hshd_num = match parse_household_number(&form.hshd_num) {
        Ok(n) => n,
        Err(message) => return Ok(redirect_with_flash("/search", message)),
    };

    let rows = state.reference.household_transactions(hshd_num).await?;
    tracing::debug!(hshd_num, rows = rows.len(), "Household lookup");

    let flash = Flash::from_jar(&jar);
    let html = pages::search(&user.username, &flash, form.hshd_num.trim(), Some(rows.as_slice()));
    Ok(page(jar, &flash, html))
}
