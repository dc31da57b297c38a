// handlers/public/auth/register.rs - GET/POST /register handlers

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{RegistrationForm, UserError};
use crate::error::PageError;
use crate::handlers::page;
use crate::middleware::{auth::current_user, redirect_with_flash, Flash};
use crate::state::AppState;
use crate::views::pages;

pub async fn register_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    if current_user(&jar, &state.config.security).is_ok() {
        return Redirect::to("/").into_response();
    }
    let flash = Flash::from_jar(&jar);
    let html = pages::register(&flash, "", "", None);
    page(jar, &flash, html)
}

/**
 * POST /register - Create an account
 *
 * Success redirects to /login with a congratulation flash. A taken
 * username or email redirects back to /register with the matching flash;
 * field validation errors redisplay the form with the entered values.
 */
pub async fn register_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, PageError> {
    let username = form.username.clone();
    let email = form.email.clone();

    match state.credentials.register(form).await {
        Ok(_) => Ok(redirect_with_flash(
            "/login",
            "Congratulations, you are now a registered user!",
        )),
        Err(err @ (UserError::DuplicateUsername | UserError::DuplicateEmail)) => {
            Ok(redirect_with_flash("/register", &err.to_string()))
        }
        Err(UserError::Validation(message)) => {
            let flash = Flash::from_jar(&jar);
            let html = pages::register(&flash, &username, &email, Some(&message));
            Ok(page(jar, &flash, html))
        }
        Err(err) => Err(err.into()),
    }
}
