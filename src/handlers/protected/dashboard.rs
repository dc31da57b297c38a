// handlers/protected/dashboard.rs - GET/POST /dashboard handlers

use axum::{extract::State, response::Response, Extension};
use axum_extra::extract::cookie::CookieJar;
use futures::future::try_join_all;
use tracing::{error, info};

use crate::database::models::Dimension;
use crate::error::{ApiError, PageError};
use crate::handlers::page;
use crate::middleware::{redirect_with_flash, CurrentUser, Flash};
use crate::state::AppState;
use crate::views::pages;

/// Charts for every dimension plus the headline summary.
pub async fn dashboard_get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let store = &state.reference;
    let (buckets, summary) = futures::try_join!(
        try_join_all(Dimension::ALL.map(|d| store.spend_by(d))),
        store.summary(),
    )?;
    let charts: Vec<_> = Dimension::ALL.into_iter().zip(buckets).collect();

    let flash = Flash::from_jar(&jar);
    let html = pages::dashboard(&user.username, &flash, &charts, &summary);
    Ok(page(jar, &flash, html))
}

/**
 * POST /dashboard - Reload the reference tables
 *
 * Runs the ingest pipeline over the configured data directory, then
 * redirects back to GET /dashboard with either the load report or the
 * reason nothing changed.
 */
pub async fn dashboard_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    let dir = state.config.ingest.data_dir.clone();
    info!(user_id = user.user_id, dir = %dir.display(), "Data load requested");

    match state.ingest.run(&dir).await {
        Ok(report) => redirect_with_flash("/dashboard", &report.message()),
        Err(err) => {
            error!("Data load failed: {}", err);
            let reason = ApiError::from(err);
            redirect_with_flash("/dashboard", &format!("Data load failed: {}", reason.message()))
        }
    }
}
