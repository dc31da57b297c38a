use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One line of a shopping basket. `hshd_num` and `product_num` are soft
/// references: nothing guarantees the referenced rows exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub basket_num: i64,
    pub hshd_num: i32,
    pub purchase_date: String,
    pub product_num: i32,
    pub spend: f64,
    pub units: i32,
    pub store_r: String,
    pub week_num: i32,
    pub year: i32,
}
