use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, Sqlite, Transaction};
use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::persistence::core::{
    AtomicScope, OrderItemRecordStore, OrderItemRow, OrderRecordStore, OrderRow, StorageError,
};

// ============================================================================
// SQLite Record Store
// ============================================================================
//
// One store type backs both the order and the item record stores, so both
// share the same transaction as their scope.
//
// Tables:
//   orders       (id PK, customer_id, total)
//   order_items  ((order_id, id) PK, name, price, product_id, quantity)
//
// Money is stored as decimal TEXT. Row order is rowid order, i.e. insertion
// order; UPDATE keeps a row's rowid.
//
// Reads outside a scope still run their SELECTs in one transaction, so an
// order row and its items always come from the same committed snapshot.
//
// ============================================================================

const CREATE_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS orders (
    id TEXT NOT NULL PRIMARY KEY,
    customer_id TEXT NOT NULL,
    total TEXT NOT NULL
)";

const CREATE_ORDER_ITEMS_TABLE: &str = "CREATE TABLE IF NOT EXISTS order_items (
    order_id TEXT NOT NULL REFERENCES orders (id),
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    price TEXT NOT NULL,
    product_id TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    PRIMARY KEY (order_id, id)
)";

const SELECT_ITEMS: &str = "SELECT order_id, id, name, price, product_id, quantity FROM order_items";

/// Shared transaction handle; statements lock it one at a time
pub struct SqliteScope {
    tx: Mutex<Transaction<'static, Sqlite>>,
}

#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Open the pool described by `config` and make sure the tables exist.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives exactly as long as its connection
        let (options, pool_options) = if config.is_in_memory() {
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (options, pool_options)
        } else {
            // WAL lets readers keep their snapshot while a writer commits
            let options = options
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));
            (options, SqlitePoolOptions::new().max_connections(config.max_connections))
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::from_pool(pool);
        store.ensure_schema().await?;

        tracing::info!(
            database_url = %config.database_url,
            in_memory = config.is_in_memory(),
            "Order store connected"
        );

        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_ORDER_ITEMS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

// ============================================================================
// Row Decoding
// ============================================================================

fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw)
        .map_err(|e| StorageError::CorruptRow(format!("{} = {:?}: {}", column, raw, e)))
}

fn decode_item(row: &SqliteRow) -> Result<OrderItemRow, StorageError> {
    let price: String = row.try_get("price")?;

    Ok(OrderItemRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price: parse_decimal(&price, "order_items.price")?,
        product_id: row.try_get("product_id")?,
        quantity: row.try_get("quantity")?,
        order_id: row.try_get("order_id")?,
    })
}

fn decode_order(row: &SqliteRow, items: Vec<OrderItemRow>) -> Result<OrderRow, StorageError> {
    let total: String = row.try_get("total")?;

    Ok(OrderRow {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        total: parse_decimal(&total, "orders.total")?,
        items,
    })
}

// ============================================================================
// Atomic Scope
// ============================================================================

#[async_trait]
impl AtomicScope for SqliteOrderStore {
    type Scope = SqliteScope;

    async fn begin(&self) -> Result<SqliteScope, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(SqliteScope { tx: Mutex::new(tx) })
    }

    async fn commit(&self, scope: SqliteScope) -> Result<(), StorageError> {
        scope.tx.into_inner().commit().await?;
        Ok(())
    }

    async fn rollback(&self, scope: SqliteScope) -> Result<(), StorageError> {
        scope.tx.into_inner().rollback().await?;
        Ok(())
    }
}

// ============================================================================
// Item Records
// ============================================================================

async fn insert_item_row(
    tx: &mut Transaction<'static, Sqlite>,
    row: &OrderItemRow,
) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO order_items (order_id, id, name, price, product_id, quantity)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(row.order_id.as_str())
    .bind(row.id.as_str())
    .bind(row.name.as_str())
    .bind(row.price.to_string())
    .bind(row.product_id.as_str())
    .bind(row.quantity)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl OrderItemRecordStore for SqliteOrderStore {
    async fn find_items_by_order(
        &self,
        scope: &SqliteScope,
        order_id: &str,
    ) -> Result<Vec<OrderItemRow>, StorageError> {
        let mut tx = scope.tx.lock().await;
        let rows = sqlx::query(&format!("{} WHERE order_id = ? ORDER BY rowid", SELECT_ITEMS))
            .bind(order_id)
            .fetch_all(&mut **tx)
            .await?;

        rows.iter().map(decode_item).collect()
    }

    async fn insert_item(&self, scope: &SqliteScope, row: &OrderItemRow) -> Result<(), StorageError> {
        let mut tx = scope.tx.lock().await;
        insert_item_row(&mut tx, row).await
    }

    async fn update_item(&self, scope: &SqliteScope, row: &OrderItemRow) -> Result<(), StorageError> {
        let mut tx = scope.tx.lock().await;
        sqlx::query(
            "UPDATE order_items SET name = ?, price = ?, product_id = ?, quantity = ?
             WHERE order_id = ? AND id = ?",
        )
        .bind(row.name.as_str())
        .bind(row.price.to_string())
        .bind(row.product_id.as_str())
        .bind(row.quantity)
        .bind(row.order_id.as_str())
        .bind(row.id.as_str())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn delete_item(
        &self,
        scope: &SqliteScope,
        order_id: &str,
        item_id: &str,
    ) -> Result<(), StorageError> {
        let mut tx = scope.tx.lock().await;
        sqlx::query("DELETE FROM order_items WHERE order_id = ? AND id = ?")
            .bind(order_id)
            .bind(item_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Order Records
// ============================================================================

#[async_trait]
impl OrderRecordStore for SqliteOrderStore {
    async fn insert_order(&self, scope: &SqliteScope, row: &OrderRow) -> Result<(), StorageError> {
        let mut tx = scope.tx.lock().await;

        sqlx::query("INSERT INTO orders (id, customer_id, total) VALUES (?, ?, ?)")
            .bind(row.id.as_str())
            .bind(row.customer_id.as_str())
            .bind(row.total.to_string())
            .execute(&mut **tx)
            .await?;

        for item in &row.items {
            insert_item_row(&mut tx, item).await?;
        }

        Ok(())
    }

    async fn order_exists(&self, scope: &SqliteScope, order_id: &str) -> Result<bool, StorageError> {
        let mut tx = scope.tx.lock().await;
        let found = sqlx::query("SELECT 1 FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(found.is_some())
    }

    async fn update_order_fields(
        &self,
        scope: &SqliteScope,
        order_id: &str,
        customer_id: &str,
        total: Decimal,
    ) -> Result<(), StorageError> {
        let mut tx = scope.tx.lock().await;
        sqlx::query("UPDATE orders SET customer_id = ?, total = ? WHERE id = ?")
            .bind(customer_id)
            .bind(total.to_string())
            .bind(order_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<OrderRow>, StorageError> {
        let mut tx = self.pool.begin().await?;

        let Some(order) = sqlx::query("SELECT id, customer_id, total FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.commit().await?;
            return Ok(None);
        };

        let items = sqlx::query(&format!("{} WHERE order_id = ? ORDER BY rowid", SELECT_ITEMS))
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let items = items.iter().map(decode_item).collect::<Result<Vec<_>, _>>()?;
        decode_order(&order, items).map(Some)
    }

    async fn scan_orders(&self) -> Result<Vec<OrderRow>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let orders = sqlx::query("SELECT id, customer_id, total FROM orders ORDER BY rowid")
            .fetch_all(&mut *tx)
            .await?;
        let items = sqlx::query(&format!("{} ORDER BY rowid", SELECT_ITEMS))
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let mut items_by_order: HashMap<String, Vec<OrderItemRow>> = HashMap::new();
        for row in &items {
            let item = decode_item(row)?;
            items_by_order.entry(item.order_id.clone()).or_default().push(item);
        }

        orders
            .iter()
            .map(|order| -> Result<OrderRow, StorageError> {
                let id: String = order.try_get("id")?;
                let items = items_by_order.remove(&id).unwrap_or_default();
                decode_order(order, items)
            })
            .collect()
    }
}
