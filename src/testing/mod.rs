//! In-memory stores and CSV fixtures shared by unit and integration tests.
//!
//! Compiled for `cargo test` and behind the `test-support` feature so that
//! `tests/` can build an application without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::database::models::{
    DashboardSummary, Dimension, Household, HouseholdTransaction, NewUser, Product, SpendBucket,
    Transaction, User,
};
use crate::database::schema::{USERS_EMAIL_KEY, USERS_USERNAME_KEY};
use crate::database::{DatabaseError, ReferenceStore, ReplaceOutcome, Snapshot, UserRepository};
use crate::state::AppState;

pub mod fixtures {
    pub const HOUSEHOLDS_CSV: &str = "\
HSHD_NUM,L,AGE_RANGE,MARITAL,INCOME_RANGE,HOMEOWNER,HSHD_COMPOSITION,HH_SIZE,CHILDREN
100,A,45-54,Married,35-49K,Y,Married-no children,2,N
101,Y,25-34,Single,50-74K,N,1 Adult,1,N
102,Y,35-44,Married,35-49K,Y,2 Adults and Kids,4,Y
103,N,65+,Single,75-99K,Y,1 Adult,1,N
";

    pub const PRODUCTS_CSV: &str = "\
PRODUCT_NUM,DEPARTMENT,COMMODITY,BRAND_TY,NATURAL_ORGANIC_FLAG
500,FOOD,PRODUCE,NATIONAL,N
501,NON-FOOD,HOUSEHOLD,PRIVATE,N
502,PHARMA,VITAMINS,NATIONAL,Y
";

    pub const TRANSACTIONS_CSV: &str = "\
BASKET_NUM,HSHD_NUM,PURCHASE_,PRODUCT_NUM,SPEND,UNITS,STORE_R,WEEK_NUM,YEAR
1,100,2023-01-01,500,12.50,2,S1,1,2023
2,101,2023-01-02,501,3.25,1,S1,1,2023
3,102,2023-01-03,502,10.00,1,S2,1,2023
3,102,2023-01-03,500,7.75,3,S2,1,2023
4,102,2023-01-10,501,4.50,2,S2,2,2023
";

    pub const TRANSACTION_ROWS: usize = 5;
}

#[derive(Default)]
struct Tables {
    households: Vec<Household>,
    products: Vec<Product>,
    transactions: Vec<Transaction>,
}

/// Reference store that keeps the three tables in memory.
#[derive(Default)]
pub struct MemoryReferenceStore {
    tables: Mutex<Tables>,
    replace_calls: AtomicUsize,
}

impl MemoryReferenceStore {
    pub fn transaction_count(&self) -> usize {
        self.tables.lock().unwrap().transactions.len()
    }

    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReferenceStore for MemoryReferenceStore {
    async fn initialize(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn replace_snapshot(&self, snapshot: Snapshot) -> Result<ReplaceOutcome, DatabaseError> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);

        // Mirror the household primary key so duplicate rows reject the whole snapshot.
        if let Some(rows) = &snapshot.households {
            let mut seen = HashSet::new();
            if let Some(dup) = rows.iter().find(|h| !seen.insert(h.hshd_num)) {
                return Err(DatabaseError::UniqueViolation(format!("household_pkey ({})", dup.hshd_num)));
            }
        }

        let mut tables = self.tables.lock().unwrap();
        let mut outcome = ReplaceOutcome::default();
        if let Some(rows) = snapshot.households {
            outcome.households = Some(rows.len() as u64);
            tables.households = rows;
        }
        if let Some(rows) = snapshot.products {
            outcome.products = Some(rows.len() as u64);
            tables.products = rows;
        }
        if let Some(rows) = snapshot.transactions {
            outcome.transactions = Some(rows.len() as u64);
            tables.transactions = rows;
        }

        let households: HashSet<i32> = tables.households.iter().map(|h| h.hshd_num).collect();
        let products: HashSet<i32> = tables.products.iter().map(|p| p.product_num).collect();
        outcome.orphan_households = tables
            .transactions
            .iter()
            .filter(|t| !households.contains(&t.hshd_num))
            .count() as u64;
        outcome.orphan_products = tables
            .transactions
            .iter()
            .filter(|t| !products.contains(&t.product_num))
            .count() as u64;

        Ok(outcome)
    }

    async fn spend_by(&self, dimension: Dimension) -> Result<Vec<SpendBucket>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let households: HashMap<i32, &Household> =
            tables.households.iter().map(|h| (h.hshd_num, h)).collect();

        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for t in &tables.transactions {
            if let Some(h) = households.get(&t.hshd_num) {
                let key = match dimension {
                    Dimension::HouseholdSize => &h.hh_size,
                    Dimension::Children => &h.children,
                    Dimension::IncomeRange => &h.income_range,
                };
                *totals.entry(key.clone()).or_default() += t.spend;
            }
        }

        Ok(totals
            .into_iter()
            .map(|(category, total_spend)| SpendBucket { category, total_spend })
            .collect())
    }

    async fn summary(&self) -> Result<DashboardSummary, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let households: HashSet<i32> = tables.households.iter().map(|h| h.hshd_num).collect();

        let mut seen = HashSet::new();
        let mut total_spend = 0.0;
        for t in tables.transactions.iter().filter(|t| households.contains(&t.hshd_num)) {
            seen.insert(t.hshd_num);
            total_spend += t.spend;
        }

        Ok(DashboardSummary {
            households: seen.len() as i64,
            total_spend,
        })
    }

    async fn household_transactions(
        &self,
        hshd_num: i32,
    ) -> Result<Vec<HouseholdTransaction>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let products: HashMap<i32, &Product> =
            tables.products.iter().map(|p| (p.product_num, p)).collect();

        let mut rows: Vec<HouseholdTransaction> = tables
            .transactions
            .iter()
            .filter(|t| t.hshd_num == hshd_num)
            .filter_map(|t| {
                products.get(&t.product_num).map(|p| HouseholdTransaction {
                    hshd_num: t.hshd_num,
                    basket_num: t.basket_num,
                    purchase_date: t.purchase_date.clone(),
                    product_num: t.product_num,
                    department: p.department.clone(),
                    commodity: p.commodity.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.hshd_num, a.basket_num, &a.purchase_date, a.product_num)
                .cmp(&(b.hshd_num, b.basket_num, &b.purchase_date, b.product_num))
        });
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// User repository backed by a vector, enforcing the same unique keys.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DatabaseError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation(USERS_USERNAME_KEY.to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation(USERS_EMAIL_KEY.to_string()));
        }

        let row = User {
            id: users.len() as i32 + 1,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(row.clone());
        Ok(row)
    }
}

/// Development config with the cheapest bcrypt cost and `data_dir` pointed
/// at `data_dir`.
pub fn test_config(data_dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    config.ingest.data_dir = data_dir.to_path_buf();
    config
}

/// Application state over fresh in-memory stores.
pub fn memory_state(config: AppConfig) -> (AppState, Arc<MemoryReferenceStore>) {
    let reference = Arc::new(MemoryReferenceStore::default());
    let users = Arc::new(MemoryUserRepository::default());
    let state = AppState::new(config, users, reference.clone());
    (state, reference)
}
