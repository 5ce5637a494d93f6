use async_trait::async_trait;
use common::{Money, OrderId, OrderNumber, UserId};
use domain::{HistoryEntry, Order, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{OrderFilter, OrderStore, Version, VersionedOrder},
};

const ORDER_COLUMNS: &str = "id, order_number, user_id, status, items, total_amount_cents, \
     delivery_address, delivery_notes, created_at, confirmed_at, shipped_at, delivered_at, \
     cancelled_at, cancellation_reason, version";

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<VersionedOrder> {
        let status: String = row.try_get("status")?;
        let status: OrderStatus = serde_json::from_value(serde_json::Value::String(status))?;

        let items_json: serde_json::Value = row.try_get("items")?;
        let items = serde_json::from_value(items_json)?;

        let order = Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_number: OrderNumber::new(row.try_get::<String, _>("order_number")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            status,
            items,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            delivery_address: row.try_get("delivery_address")?,
            delivery_notes: row.try_get("delivery_notes")?,
            created_at: row.try_get("created_at")?,
            confirmed_at: row.try_get("confirmed_at")?,
            shipped_at: row.try_get("shipped_at")?,
            delivered_at: row.try_get("delivered_at")?,
            cancelled_at: row.try_get("cancelled_at")?,
            cancellation_reason: row.try_get("cancellation_reason")?,
        };

        Ok(VersionedOrder {
            order,
            version: Version::new(row.try_get("version")?),
        })
    }

    fn row_to_history(row: PgRow) -> Result<HistoryEntry> {
        let status: String = row.try_get("status")?;
        let status: OrderStatus = serde_json::from_value(serde_json::Value::String(status))?;

        Ok(HistoryEntry {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            status,
            notes: row.try_get("notes")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn append_history(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &HistoryEntry,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_history (order_id, status, notes, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.order_id.as_uuid())
        .bind(entry.status.as_str())
        .bind(&entry.notes)
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order, entry: &HistoryEntry) -> Result<Version> {
        let items_json = serde_json::to_value(&order.items)?;
        let version = Version::first();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, user_id, status, items, total_amount_cents,
                delivery_address, delivery_notes, created_at, confirmed_at, shipped_at,
                delivered_at, cancelled_at, cancellation_reason, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.order_number.as_str())
        .bind(order.user_id.as_uuid())
        .bind(order.status.as_str())
        .bind(items_json)
        .bind(order.total_amount.cents())
        .bind(&order.delivery_address)
        .bind(&order.delivery_notes)
        .bind(order.created_at)
        .bind(order.confirmed_at)
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.cancelled_at)
        .bind(&order.cancellation_reason)
        .bind(version.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_order_number_key")
            {
                return StoreError::DuplicateOrderNumber(order.order_number.clone());
            }
            StoreError::Database(e)
        })?;

        Self::append_history(&mut tx, entry).await?;
        tx.commit().await?;

        Ok(version)
    }

    async fn get(&self, id: OrderId) -> Result<Option<VersionedOrder>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn get_by_number(&self, number: &OrderNumber) -> Result<Option<VersionedOrder>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn update(
        &self,
        order: &Order,
        expected: Version,
        entry: &HistoryEntry,
    ) -> Result<Version> {
        let items_json = serde_json::to_value(&order.items)?;
        let next = expected.next();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, items = $2, total_amount_cents = $3, delivery_address = $4,
                delivery_notes = $5, confirmed_at = $6, shipped_at = $7, delivered_at = $8,
                cancelled_at = $9, cancellation_reason = $10, version = $11
            WHERE id = $12 AND version = $13
            "#,
        )
        .bind(order.status.as_str())
        .bind(items_json)
        .bind(order.total_amount.cents())
        .bind(&order.delivery_address)
        .bind(&order.delivery_notes)
        .bind(order.confirmed_at)
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.cancelled_at)
        .bind(&order.cancellation_reason)
        .bind(next.as_i64())
        .bind(order.id.as_uuid())
        .bind(expected.as_i64())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing row from a stale version.
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
                    .bind(order.id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await?;

            return match actual {
                Some(actual) => Err(StoreError::VersionConflict {
                    order_id: order.id,
                    expected: expected.as_i64(),
                    actual,
                }),
                None => Err(StoreError::NotFound(order.id)),
            };
        }

        Self::append_history(&mut tx, entry).await?;
        tx.commit().await?;

        Ok(next)
    }

    async fn history(&self, id: OrderId) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, status, notes, created_by, created_at
            FROM order_history
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_history).collect()
    }

    async fn query(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        if filter.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        if filter.user_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND user_id = ${param_count}"));
        }
        if filter.created_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at >= ${param_count}"));
        }
        if filter.created_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at <= ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at DESC");

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(status) = filter.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(user_id) = filter.user_id {
            sqlx_query = sqlx_query.bind(user_id.as_uuid());
        }
        if let Some(from) = filter.created_from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = filter.created_to {
            sqlx_query = sqlx_query.bind(to);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| Self::row_to_order(row).map(|v| v.order))
            .collect()
    }
}
