use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    DashboardSummary, Dimension, Household, HouseholdTransaction, Product, SpendBucket, Transaction,
};
use super::repository::{ReferenceStore, ReplaceOutcome, Snapshot};
use super::schema;

/// Advisory lock key serializing concurrent snapshot replacements.
const REPLACE_LOCK_KEY: i64 = 0x5350_454e_445f_4442;

/// Postgres allows at most 65535 bind parameters per statement.
const MAX_BIND_PARAMS: usize = 65_535;

type PgTx<'a> = sqlx::Transaction<'a, Postgres>;

/// Reference tables (`household`, `product`, `transaction`) in Postgres.
#[derive(Clone)]
pub struct PgReferenceStore {
    pool: PgPool,
}

impl PgReferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn replace_households(tx: &mut PgTx<'_>, rows: &[Household]) -> Result<u64, DatabaseError> {
        let deleted = sqlx::query("DELETE FROM household").execute(&mut **tx).await?;
        debug!("Deleted {} household rows", deleted.rows_affected());

        let mut inserted = 0;
        for chunk in rows.chunks(MAX_BIND_PARAMS / 9) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO household (hshd_num, loyalty, age_range, marital, income_range, \
                 homeowner, hshd_composition, hh_size, children) ",
            );
            qb.push_values(chunk, |mut b, h| {
                b.push_bind(h.hshd_num)
                    .push_bind(&h.loyalty)
                    .push_bind(&h.age_range)
                    .push_bind(&h.marital)
                    .push_bind(&h.income_range)
                    .push_bind(&h.homeowner)
                    .push_bind(&h.hshd_composition)
                    .push_bind(&h.hh_size)
                    .push_bind(&h.children);
            });
            inserted += qb.build().execute(&mut **tx).await?.rows_affected();
        }
        Ok(inserted)
    }

    async fn replace_products(tx: &mut PgTx<'_>, rows: &[Product]) -> Result<u64, DatabaseError> {
        let deleted = sqlx::query("DELETE FROM product").execute(&mut **tx).await?;
        debug!("Deleted {} product rows", deleted.rows_affected());

        let mut inserted = 0;
        for chunk in rows.chunks(MAX_BIND_PARAMS / 5) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO product (product_num, department, commodity, brand_ty, natural_organic_flag) ",
            );
            qb.push_values(chunk, |mut b, p| {
                b.push_bind(p.product_num)
                    .push_bind(&p.department)
                    .push_bind(&p.commodity)
                    .push_bind(&p.brand_ty)
                    .push_bind(&p.natural_organic_flag);
            });
            inserted += qb.build().execute(&mut **tx).await?.rows_affected();
        }
        Ok(inserted)
    }

    async fn replace_transactions(
        tx: &mut PgTx<'_>,
        rows: &[Transaction],
    ) -> Result<u64, DatabaseError> {
        let deleted = sqlx::query(r#"DELETE FROM "transaction""#).execute(&mut **tx).await?;
        debug!("Deleted {} transaction rows", deleted.rows_affected());

        let mut inserted = 0;
        for chunk in rows.chunks(MAX_BIND_PARAMS / 9) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO "transaction" (basket_num, hshd_num, purchase_date, product_num, "#,
            );
            qb.push("spend, units, store_r, week_num, year) ");
            qb.push_values(chunk, |mut b, t| {
                b.push_bind(t.basket_num)
                    .push_bind(t.hshd_num)
                    .push_bind(&t.purchase_date)
                    .push_bind(t.product_num)
                    .push_bind(t.spend)
                    .push_bind(t.units)
                    .push_bind(&t.store_r)
                    .push_bind(t.week_num)
                    .push_bind(t.year);
            });
            inserted += qb.build().execute(&mut **tx).await?.rows_affected();
        }
        Ok(inserted)
    }

    async fn count_orphans(tx: &mut PgTx<'_>) -> Result<(u64, u64), DatabaseError> {
        let (households, products): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM "transaction" t
                  WHERE NOT EXISTS (SELECT 1 FROM household h WHERE h.hshd_num = t.hshd_num)),
                (SELECT COUNT(*) FROM "transaction" t
                  WHERE NOT EXISTS (SELECT 1 FROM product p WHERE p.product_num = t.product_num))
            "#,
        )
        .fetch_one(&mut **tx)
        .await?;

        Ok((households.max(0) as u64, products.max(0) as u64))
    }
}

#[async_trait]
impl ReferenceStore for PgReferenceStore {
    async fn initialize(&self) -> Result<(), DatabaseError> {
        schema::initialize(&self.pool).await
    }

    async fn replace_snapshot(&self, snapshot: Snapshot) -> Result<ReplaceOutcome, DatabaseError> {
        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REPLACE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let mut outcome = ReplaceOutcome::default();
        if let Some(rows) = &snapshot.households {
            outcome.households = Some(Self::replace_households(&mut tx, rows).await?);
        }
        if let Some(rows) = &snapshot.products {
            outcome.products = Some(Self::replace_products(&mut tx, rows).await?);
        }
        if let Some(rows) = &snapshot.transactions {
            outcome.transactions = Some(Self::replace_transactions(&mut tx, rows).await?);
        }

        let (orphan_households, orphan_products) = Self::count_orphans(&mut tx).await?;
        outcome.orphan_households = orphan_households;
        outcome.orphan_products = orphan_products;

        tx.commit().await?;
        info!(?outcome, "Reference snapshot committed");
        Ok(outcome)
    }

    async fn spend_by(&self, dimension: Dimension) -> Result<Vec<SpendBucket>, DatabaseError> {
        // The column comes from the enum, never from request input.
        let column = dimension.column();
        let query = format!(
            r#"
            SELECT h.{column} AS category, SUM(t.spend) AS total_spend
            FROM household h
            JOIN "transaction" t ON h.hshd_num = t.hshd_num
            GROUP BY h.{column}
            ORDER BY h.{column}
            "#
        );

        let buckets = sqlx::query_as::<_, SpendBucket>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(buckets)
    }

    async fn summary(&self) -> Result<DashboardSummary, DatabaseError> {
        let summary = sqlx::query_as::<_, DashboardSummary>(
            r#"
            SELECT COUNT(DISTINCT h.hshd_num) AS households,
                   COALESCE(SUM(t.spend), 0)::DOUBLE PRECISION AS total_spend
            FROM household h
            JOIN "transaction" t ON h.hshd_num = t.hshd_num
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    async fn household_transactions(
        &self,
        hshd_num: i32,
    ) -> Result<Vec<HouseholdTransaction>, DatabaseError> {
        let rows = sqlx::query_as::<_, HouseholdTransaction>(
            r#"
            SELECT t.hshd_num, t.basket_num, t.purchase_date, t.product_num,
                   p.department, p.commodity
            FROM "transaction" t
            JOIN product p ON p.product_num = t.product_num
            WHERE t.hshd_num = $1
            ORDER BY t.hshd_num, t.basket_num, t.purchase_date, t.product_num
            "#,
        )
        .bind(hshd_num)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
