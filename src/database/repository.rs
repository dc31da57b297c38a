use async_trait::async_trait;
use serde::Serialize;

use super::manager::DatabaseError;
use super::models::{
    DashboardSummary, Dimension, Household, HouseholdTransaction, NewUser, Product, SpendBucket,
    Transaction, User,
};

/// Persistence contract for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn username_exists(&self, username: &str) -> Result<bool, DatabaseError>;

    async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError>;

    /// Insert a user. A taken username or email surfaces as
    /// `DatabaseError::UniqueViolation` naming the violated constraint.
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;
}

/// Parsed contents of one ingest run. `None` leaves that table untouched.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub households: Option<Vec<Household>>,
    pub products: Option<Vec<Product>>,
    pub transactions: Option<Vec<Transaction>>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.households.is_none() && self.products.is_none() && self.transactions.is_none()
    }
}

/// What a replace left behind in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceOutcome {
    pub households: Option<u64>,
    pub products: Option<u64>,
    pub transactions: Option<u64>,
    /// Transactions whose household number has no household row.
    pub orphan_households: u64,
    /// Transactions whose product number has no product row.
    pub orphan_products: u64,
}

/// Storage for the three reference tables and the queries over them.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Create missing tables. Safe to call repeatedly.
    async fn initialize(&self) -> Result<(), DatabaseError>;

    /// Replace every table present in `snapshot` atomically: either all of
    /// them take the new rows or none changes.
    async fn replace_snapshot(&self, snapshot: Snapshot) -> Result<ReplaceOutcome, DatabaseError>;

    async fn spend_by(&self, dimension: Dimension) -> Result<Vec<SpendBucket>, DatabaseError>;

    async fn summary(&self) -> Result<DashboardSummary, DatabaseError>;

    async fn household_transactions(
        &self,
        hshd_num: i32,
    ) -> Result<Vec<HouseholdTransaction>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
