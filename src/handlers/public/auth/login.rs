// handlers/public/auth/login.rs - GET/POST /login handlers

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::auth::{Claims, LoginForm, UserError};
use crate::error::PageError;
use crate::handlers::page;
use crate::middleware::auth::{end_session, session_cookie};
use crate::middleware::{redirect_with_flash, Flash};
use crate::state::AppState;
use crate::views::pages;

/// Show the sign-in form. Visiting it ends any current session.
pub async fn login_get(jar: CookieJar) -> Response {
    let flash = Flash::from_jar(&jar);
    let html = pages::login(&flash, "", None);
    page(end_session(jar), &flash, html)
}

/**
 * POST /login - Authenticate and start a session
 *
 * On success the signed session cookie is set and the browser goes to
 * /dashboard. Unknown users and wrong passwords both flash
 * "Invalid username or password" and return to the form.
 */
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        let flash = Flash::from_jar(&jar);
        let html = pages::login(&flash, &form.username, Some("Username and password are required."));
        return Ok(page(jar, &flash, html));
    }

    let user = match state.credentials.authenticate(&form.username, &form.password).await {
        Ok(user) => user,
        Err(UserError::InvalidCredentials) => {
            return Ok(redirect_with_flash("/login", "Invalid username or password"));
        }
        Err(err) => return Err(err.into()),
    };

    let security = &state.config.security;
    let claims = Claims::new(&user, security.session_expiry_hours);
    let cookie = session_cookie(&claims, security)?;
    info!(user_id = user.id, session_id = %claims.session_id, "User logged in");

    Ok((jar.add(cookie), Redirect::to("/dashboard")).into_response())
}
