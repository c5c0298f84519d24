//! Persistence for the sales order aggregate.
//!
//! An [`Order`](domain::order::Order) owns a non-empty list of
//! [`OrderItem`](domain::order::OrderItem)s. The
//! [`OrderRepository`](domain::order::OrderRepository) stores it through the
//! record store traits in [`persistence`]. On `update` it reconciles the stored
//! items against the new item list by identity and applies the resulting
//! inserts, updates and deletes in one transaction, together with the
//! recomputed order total.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use order_store::{Order, OrderItem, OrderRepository, SqliteOrderStore, StoreConfig};
//!
//! let store = SqliteOrderStore::connect(&StoreConfig::in_memory()).await?;
//! let repository = OrderRepository::new(Arc::new(store));
//!
//! let item = OrderItem::new("1", "Product 1", 10.into(), "p1", 2)?;
//! repository.create(&Order::new("123", "c1", vec![item])?).await?;
//! let order = repository.find("123").await?;
//! ```

pub mod config;
pub mod domain;
pub mod persistence;

pub use config::{ConfigError, StoreConfig};
pub use domain::order::{
    reconcile, ItemChangeSet, Order, OrderError, OrderItem, OrderRepository, RepositoryError,
};
pub use persistence::{SqliteOrderStore, StorageError};
