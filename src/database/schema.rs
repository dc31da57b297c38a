use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Column widths of `users.username` and `users.email`, in characters.
pub const USERNAME_MAX_CHARS: usize = 64;
pub const EMAIL_MAX_CHARS: usize = 120;

/// Idempotent DDL for the four persisted tables.
///
/// `transaction` keeps soft references to `household` and `product`: a
/// partial upload may replace one side without the other.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(64) NOT NULL,
        email VARCHAR(120) NOT NULL,
        password_hash VARCHAR(128) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT users_username_key UNIQUE (username),
        CONSTRAINT users_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS household (
        hshd_num INTEGER PRIMARY KEY,
        loyalty TEXT NOT NULL,
        age_range TEXT NOT NULL,
        marital TEXT NOT NULL,
        income_range TEXT NOT NULL,
        homeowner TEXT NOT NULL,
        hshd_composition TEXT NOT NULL,
        hh_size TEXT NOT NULL,
        children TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product (
        product_num INTEGER PRIMARY KEY,
        department TEXT NOT NULL,
        commodity TEXT NOT NULL,
        brand_ty TEXT NOT NULL,
        natural_organic_flag TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "transaction" (
        id BIGSERIAL PRIMARY KEY,
        basket_num BIGINT NOT NULL,
        hshd_num INTEGER NOT NULL,
        purchase_date TEXT NOT NULL,
        product_num INTEGER NOT NULL,
        spend DOUBLE PRECISION NOT NULL,
        units INTEGER NOT NULL,
        store_r TEXT NOT NULL,
        week_num INTEGER NOT NULL,
        year INTEGER NOT NULL
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS transaction_hshd_num_idx ON "transaction" (hshd_num)"#,
    r#"CREATE INDEX IF NOT EXISTS transaction_product_num_idx ON "transaction" (product_num)"#,
];

/// Create any missing tables and indexes.
pub async fn initialize(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Database schema ready ({} statements)", STATEMENTS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_is_idempotent() {
        assert!(STATEMENTS.iter().all(|s| s.contains("IF NOT EXISTS")));
    }

    #[test]
    fn unique_constraint_names_match_ddl() {
        assert!(STATEMENTS[0].contains(USERS_USERNAME_KEY));
        assert!(STATEMENTS[0].contains(USERS_EMAIL_KEY));
    }
}
