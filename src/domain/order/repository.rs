use std::sync::Arc;

use futures_util::future::try_join_all;
use futures_util::try_join;

use crate::persistence::{
    AtomicScope, OrderItemRecordStore, OrderItemRow, OrderRecordStore, OrderRow, StorageError,
};

use super::aggregate::Order;
use super::errors::RepositoryError;
use super::reconciliation::{reconcile, ItemChangeSet};

// ============================================================================
// Order Repository
// ============================================================================
//
// Orchestrates: Order → Rows → Record Stores, one atomic scope per write.
//
//   create:  insert order row + item rows
//   update:  existence check → load saved items → reconcile →
//            (deletes ‖ updates ‖ inserts) → rewrite order row
//   find:    order row + items → fresh aggregate
//
// Reads build a new aggregate every time; there is no identity map.
//
// ============================================================================

type Scope<S> = <S as AtomicScope>::Scope;

pub struct OrderRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for OrderRepository<S> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<S> OrderRepository<S>
where
    S: AtomicScope + OrderRecordStore + OrderItemRecordStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Persist a new order and all of its items atomically.
    pub async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let scope = self.store.begin().await?;
        let result = self.apply_create(&scope, order).await;
        self.finish(scope, result, order.id()).await?;

        tracing::info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            item_count = order.items().len(),
            total = %order.total(),
            "✅ Order created"
        );

        Ok(())
    }

    /// Make the stored order match `order`: its items are reconciled by
    /// identity and the order row is rewritten with the recomputed total.
    pub async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        let scope = self.store.begin().await?;
        let result = self.apply_update(&scope, order).await;
        let changes = self.finish(scope, result, order.id()).await?;

        tracing::info!(
            order_id = %order.id(),
            created = changes.to_create.len(),
            updated = changes.to_update.len(),
            deleted = changes.to_delete.len(),
            total = %order.total(),
            "✅ Order updated"
        );

        Ok(())
    }

    /// `None` for an empty id or an unknown order.
    pub async fn find(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        if id.is_empty() {
            return Ok(None);
        }

        let Some(row) = self.store.find_order(id).await? else {
            tracing::debug!(order_id = %id, "Order not found");
            return Ok(None);
        };

        let order = row.to_order()?;
        tracing::debug!(order_id = %id, item_count = order.items().len(), "Loaded order");
        Ok(Some(order))
    }

    /// Every stored order, in insertion order.
    pub async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = self
            .store
            .scan_orders()
            .await?
            .iter()
            .map(OrderRow::to_order)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(order_count = orders.len(), "Loaded all orders");
        Ok(orders)
    }

    async fn apply_create(&self, scope: &Scope<S>, order: &Order) -> Result<(), RepositoryError> {
        self.store
            .insert_order(scope, &OrderRow::from_order(order))
            .await
            .map_err(|e| match e {
                StorageError::DuplicateKey(_) => RepositoryError::DuplicateOrder(order.id().to_string()),
                other => RepositoryError::Storage(other),
            })
    }

    async fn apply_update(
        &self,
        scope: &Scope<S>,
        order: &Order,
    ) -> Result<ItemChangeSet, RepositoryError> {
        if !self.store.order_exists(scope, order.id()).await? {
            return Err(RepositoryError::OrderNotFound(order.id().to_string()));
        }

        let saved = self
            .store
            .find_items_by_order(scope, order.id())
            .await?
            .iter()
            .map(OrderItemRow::to_item)
            .collect::<Result<Vec<_>, _>>()?;

        let changes = reconcile(&saved, order.items());

        tracing::debug!(
            order_id = %order.id(),
            saved = saved.len(),
            desired = order.items().len(),
            statements = changes.len(),
            "Reconciled order items"
        );

        let update_rows: Vec<OrderItemRow> = changes
            .to_update
            .iter()
            .map(|item| OrderItemRow::from_item(item, order.id()))
            .collect();
        let create_rows: Vec<OrderItemRow> = changes
            .to_create
            .iter()
            .map(|item| OrderItemRow::from_item(item, order.id()))
            .collect();

        // Disjoint identities, so the three batches may interleave freely
        try_join!(
            try_join_all(
                changes
                    .to_delete
                    .iter()
                    .map(|item| self.store.delete_item(scope, order.id(), item.id()))
            ),
            try_join_all(update_rows.iter().map(|row| self.store.update_item(scope, row))),
            try_join_all(create_rows.iter().map(|row| self.store.insert_item(scope, row))),
        )?;

        self.store
            .update_order_fields(scope, order.id(), order.customer_id(), order.total())
            .await?;

        Ok(changes)
    }

    /// Commit on success; on failure roll back and hand back the original error.
    async fn finish<T>(
        &self,
        scope: Scope<S>,
        result: Result<T, RepositoryError>,
        order_id: &str,
    ) -> Result<T, RepositoryError> {
        match result {
            Ok(value) => {
                self.store.commit(scope).await?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(order_id = %order_id, error = %err, "Rolling back order write");

                if let Err(rollback_err) = self.store.rollback(scope).await {
                    tracing::error!(
                        order_id = %order_id,
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }

                Err(err)
            }
        }
    }
}
