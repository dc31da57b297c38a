use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Demographic attributes of one household, as found in the extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Household {
    pub hshd_num: i32,
    /// Loyalty flag (`L` column).
    pub loyalty: String,
    pub age_range: String,
    pub marital: String,
    pub income_range: String,
    pub homeowner: String,
    pub hshd_composition: String,
    pub hh_size: String,
    pub children: String,
}
