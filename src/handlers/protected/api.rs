// handlers/protected/api.rs - JSON views for scripted consumers
//
// GET /api/spend/:dimension
// GET /api/households/:hshd_num/transactions

use axum::extract::{Path, State};

use crate::database::models::{Dimension, HouseholdTransaction, SpendBucket};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Spend buckets for one dimension (`household-size`, `children`, `income-range`).
pub async fn spend_get(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
) -> ApiResult<Vec<SpendBucket>> {
    let dimension: Dimension = dimension.parse()?;
    let buckets = state.reference.spend_by(dimension).await?;
    Ok(ApiResponse::success(buckets))
}

pub async fn household_transactions_get(
    State(state): State<AppState>,
    Path(hshd_num): Path<String>,
) -> ApiResult<Vec<HouseholdTransaction>> {
    let hshd_num: i32 = hshd_num
        .trim()
        .parse()
        .map_err(|_| ApiError::validation_error("Household number must be a whole number"))?;
    let rows = state.reference.household_transactions(hshd_num).await?;
    Ok(ApiResponse::success(rows))
}
