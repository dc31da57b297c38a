use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_num: i32,
    pub department: String,
    pub commodity: String,
    pub brand_ty: String,
    /// Absent in four-column product extracts.
    pub natural_organic_flag: Option<String>,
}
