use std::sync::Arc;

use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use order_store::{Order, OrderItem, OrderRepository, SqliteOrderStore, StoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_store=debug"))
        )
        .init();

    tracing::info!("🚀 Starting order store demo");

    // === 1. Open the store ===
    let config = StoreConfig::from_env()?;
    tracing::info!(database_url = %config.database_url, "Connecting to order store...");
    let store = Arc::new(SqliteOrderStore::connect(&config).await?);
    let repository = OrderRepository::new(store);

    // === 2. Create an order ===
    let order_id = Uuid::new_v4().to_string();
    let customer_id = Uuid::new_v4().to_string();

    let order = Order::new(
        order_id.clone(),
        customer_id.clone(),
        vec![OrderItem::new("1", "Product 1", Decimal::from(10), "p1", 2)?],
    )?;
    repository.create(&order).await?;

    // === 3. Replace the items and bump a quantity ===
    let mut order = Order::new(
        order_id.clone(),
        customer_id,
        vec![
            OrderItem::new("2", "Product 2", Decimal::from(20), "p2", 1)?,
            OrderItem::new("3", "Product 3", Decimal::new(3050, 2), "p3", 3)?,
        ],
    )?;
    repository.update(&order).await?;

    order.change_item_quantity("2", 4)?;
    repository.update(&order).await?;

    // === 4. Read it back ===
    let stored = repository
        .find(&order_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("order {} vanished", order_id))?;

    tracing::info!(
        order_id = %stored.id(),
        total = %stored.total(),
        matches = (stored == order),
        "📦 Order reloaded"
    );
    println!("{}", serde_json::to_string_pretty(&stored)?);

    let all = repository.find_all().await?;
    tracing::info!(order_count = all.len(), "🎉 Demo complete!");

    Ok(())
}
