use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{OrdersRepository, RepositoryError};
use crate::domain::order::factory::{from_storage_row, to_storage_row};
use crate::domain::order::{Order, OrderRecord};

// ============================================================================
// PostgreSQL Orders Repository
// ============================================================================
//
// One statement per operation, no explicit transactions. Items are stored
// as a JSON array in a TEXT column. The amount is DOUBLE PRECISION so any
// value `Money` accepts is read back unchanged.
//
// ============================================================================

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        id           TEXT PRIMARY KEY,
        customer_id  TEXT NOT NULL,
        items        TEXT NOT NULL,
        total_amount DOUBLE PRECISION NOT NULL,
        status       TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL
    )
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS orders_created_at_idx ON orders (created_at DESC)";

const SELECT_COLUMNS: &str =
    "SELECT id, customer_id, items, total_amount, status, created_at FROM orders";

pub struct PgOrdersRepository {
    pool: PgPool,
}

impl PgOrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(unavailable)?;
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    items: String,
    total_amount: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            items: row.items,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

fn unavailable(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Unavailable(e.to_string())
}

fn to_domain(row: OrderRow) -> Result<Order, RepositoryError> {
    let id = row.id.clone();
    from_storage_row(row.into()).map_err(|e| RepositoryError::Corrupt {
        id,
        reason: e.to_string(),
    })
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn create(&self, order: Order) -> Result<Order, RepositoryError> {
        let record = to_storage_row(&order).map_err(|e| RepositoryError::Corrupt {
            id: order.id().to_string(),
            reason: e.to_string(),
        })?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, customer_id, items, total_amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, customer_id, items, total_amount, status, created_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.customer_id)
        .bind(&record.items)
        .bind(record.total_amount)
        .bind(&record.status)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::DuplicateId(record.id.clone())
            }
            other => unavailable(other),
        })?;

        tracing::debug!(order_id = %row.id, "Order row inserted");
        to_domain(row)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        row.map(to_domain).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        rows.into_iter().map(to_domain).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
