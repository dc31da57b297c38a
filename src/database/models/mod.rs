pub mod household;
pub mod product;
pub mod report;
pub mod transaction;
pub mod user;

pub use household::Household;
pub use product::Product;
pub use report::{DashboardSummary, Dimension, HouseholdTransaction, SpendBucket, UnknownDimension};
pub use transaction::Transaction;
pub use user::{NewUser, User};
