//! # Order Repository
//!
//! Checkout and admin operations on the orders collection.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CHECKOUT                                                           │
//! │     └── create() → Order { status: pending,                           │
//! │                            payment: pending | awaiting_confirmation } │
//! │                                                                         │
//! │  2. ADMIN: CONFIRM E-TRANSFER                                          │
//! │     └── update_payment_status(confirmed) → status auto-advances        │
//! │         pending → confirmed                                            │
//! │                                                                         │
//! │  3. ADMIN: FULFIL                                                      │
//! │     └── update_status(preparing / shipped / delivered / cancelled)     │
//! │                                                                         │
//! │  Orders are never deleted.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use mehfil_core::lifecycle::order::{apply_payment_status, apply_status, place_order};
use mehfil_core::{
    CoreResult, LegacyOrder, NewOrder, Order, OrderStatus, PaymentStatus, TransitionPolicy,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::RepoContext;
use crate::store::{load_records, save_records, Collection, RecordStore};

/// Either stored shape. Browser-era orders are rewritten in cents the
/// next time the collection is saved.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredOrder {
    Current(Order),
    Legacy(LegacyOrder),
}

impl From<StoredOrder> for Order {
    fn from(stored: StoredOrder) -> Self {
        match stored {
            StoredOrder::Current(order) => order,
            StoredOrder::Legacy(legacy) => legacy.into(),
        }
    }
}

/// Repository for the orders collection.
pub struct OrderRepository<S> {
    ctx: RepoContext<S>,
    policy: TransitionPolicy,
}

impl<S: RecordStore> OrderRepository<S> {
    pub(crate) fn new(ctx: RepoContext<S>, policy: TransitionPolicy) -> Self {
        OrderRepository { ctx, policy }
    }

    async fn load(&self) -> DbResult<Vec<Order>> {
        let stored: Vec<StoredOrder> =
            load_records(self.ctx.store.as_ref(), Collection::Orders).await?;
        Ok(stored.into_iter().map(Order::from).collect())
    }

    /// Records a checkout. The total is stored exactly as submitted.
    pub async fn create(&self, new: NewOrder) -> DbResult<Order> {
        let _guard = self.ctx.locks.for_collection(Collection::Orders).lock().await;

        let mut orders = self.load().await?;
        let order = place_order(new, Uuid::new_v4().to_string(), self.ctx.clock.now());
        orders.push(order.clone());
        save_records(self.ctx.store.as_ref(), Collection::Orders, &orders).await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total_amount,
            payment_method = %order.payment_method,
            "Order created"
        );
        Ok(order)
    }

    /// All orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let mut orders = self.load().await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// One customer's orders, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let mut orders = self.list().await?;
        orders.retain(|order| order.user_id == user_id);
        Ok(orders)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        Ok(self.load().await?.into_iter().find(|order| order.id == id))
    }

    /// Sets the fulfilment status (subject to the configured policy).
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        let policy = self.policy;
        let order = self
            .mutate(id, |order, now| apply_status(order, status, policy, now))
            .await?;

        info!(order_id = %id, status = %order.status, "Order status updated");
        Ok(order)
    }

    /// Sets the payment status; confirming a pending order also confirms it.
    pub async fn update_payment_status(
        &self,
        id: &str,
        payment_status: PaymentStatus,
    ) -> DbResult<Order> {
        let order = self
            .mutate(id, |order, now| {
                apply_payment_status(order, payment_status, now);
                Ok(())
            })
            .await?;

        info!(
            order_id = %id,
            payment_status = %order.payment_status,
            status = %order.status,
            "Order payment status updated"
        );
        Ok(order)
    }

    /// Locked load → locate → change → save. Nothing is saved if the
    /// order is missing or the change is rejected.
    async fn mutate<F>(&self, id: &str, change: F) -> DbResult<Order>
    where
        F: FnOnce(&mut Order, DateTime<Utc>) -> CoreResult<()>,
    {
        let _guard = self.ctx.locks.for_collection(Collection::Orders).lock().await;

        let mut orders = self.load().await?;
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| DbError::not_found("Order", id))?;

        change(order, self.ctx.clock.now())?;
        let updated = order.clone();

        save_records(self.ctx.store.as_ref(), Collection::Orders, &orders).await?;
        debug!(order_id = %id, "Orders collection saved");
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::Repositories;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use mehfil_core::{CoreError, LineItem, ManualClock, Money, PaymentMethod};
    use std::sync::Arc;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn repos(clock: &ManualClock) -> Repositories<MemoryStore> {
        Repositories::new(MemoryStore::new()).with_clock(Arc::new(clock.clone()))
    }

    fn checkout(user_id: &str, method: PaymentMethod) -> NewOrder {
        NewOrder {
            user_id: user_id.to_string(),
            user_name: "Hina".to_string(),
            user_email: "hina@example.com".to_string(),
            items: vec![LineItem {
                product_id: "cardamom-latte-kit".to_string(),
                name: "Cardamom Latte Kit".to_string(),
                image: None,
                unit_price: Money::from_cents(1800),
                quantity: 2,
            }],
            payment_method: method,
            total_amount: Money::from_cents(3600),
        }
    }

    #[tokio::test]
    async fn test_etransfer_checkout_then_confirm() {
        let clock = ManualClock::new(start());
        let orders = repos(&clock).orders();

        let order = orders.create(checkout("u1", PaymentMethod::Etransfer)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::AwaitingConfirmation);

        clock.advance(Duration::hours(5));
        let confirmed = orders
            .update_payment_status(&order.id, PaymentStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.updated_at, start() + Duration::hours(5));
        assert_eq!(confirmed.created_at, start());

        let stored = orders.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored, confirmed);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let clock = ManualClock::new(start());
        let orders = repos(&clock).orders();

        let err = orders.update_status("missing", OrderStatus::Shipped).await.unwrap_err();
        assert!(err.is_not_found());

        let err = orders
            .update_payment_status("missing", PaymentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(orders.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_by_user() {
        let clock = ManualClock::new(start());
        let orders = repos(&clock).orders();

        let first = orders.create(checkout("u1", PaymentMethod::Paypal)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = orders.create(checkout("u2", PaymentMethod::Paypal)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let third = orders.create(checkout("u1", PaymentMethod::Paypal)).await.unwrap();

        let all: Vec<String> = orders.list().await.unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(all, vec![third.id.clone(), second.id, first.id.clone()]);

        let mine: Vec<String> = orders
            .list_by_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(mine, vec![third.id, first.id]);
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_and_saves_nothing() {
        let clock = ManualClock::new(start());
        let orders = repos(&clock).with_order_policy(TransitionPolicy::Strict).orders();

        let order = orders.create(checkout("u1", PaymentMethod::Paypal)).await.unwrap();
        let err = orders.update_status(&order.id, OrderStatus::Delivered).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidOrderTransition { .. })));

        let stored = orders.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_concurrent_updates_both_land() {
        let clock = ManualClock::new(start());
        let repos = repos(&clock);
        let a = repos.orders().create(checkout("u1", PaymentMethod::Paypal)).await.unwrap();
        let b = repos.orders().create(checkout("u2", PaymentMethod::Paypal)).await.unwrap();

        let first = {
            let orders = repos.orders();
            let id = a.id.clone();
            tokio::spawn(async move { orders.update_status(&id, OrderStatus::Shipped).await })
        };
        let second = {
            let orders = repos.orders();
            let id = b.id.clone();
            tokio::spawn(async move { orders.update_status(&id, OrderStatus::Cancelled).await })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let orders = repos.orders();
        assert_eq!(orders.get_by_id(&a.id).await.unwrap().unwrap().status, OrderStatus::Shipped);
        assert_eq!(orders.get_by_id(&b.id).await.unwrap().unwrap().status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_sqlite_backed_orders() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.repositories().orders();

        let order = orders.create(checkout("u1", PaymentMethod::Paypal)).await.unwrap();
        orders.update_status(&order.id, OrderStatus::Preparing).await.unwrap();

        let fresh = db.repositories().orders();
        let stored = fresh.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Preparing);
        assert_eq!(stored.total_amount.cents(), 3600);
    }

    #[tokio::test]
    async fn test_browser_orders_stay_readable() {
        let clock = ManualClock::new(start());
        let repos = repos(&clock);
        let browser = r#"[{
            "id": "o-1", "userId": "u1", "userName": "Hina", "userEmail": "hina@example.com",
            "items": [{"id": 3, "name": "Cardamom Syrup", "price": 8.99,
                       "image": "/images/products/syrup.jpg", "quantity": 2}],
            "paymentMethod": "etransfer", "totalAmount": 17.98,
            "status": "pending", "paymentStatus": "awaiting_confirmation",
            "createdAt": "2025-03-01T10:00:00.000Z", "updatedAt": "2025-03-01T10:00:00.000Z"
        }]"#;
        repos
            .store()
            .save_collection(Collection::Orders, browser.to_string())
            .await
            .unwrap();

        let orders = repos.orders();
        let listed = orders.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total_amount.cents(), 1798);
        assert_eq!(listed[0].items[0].product_id, "3");

        orders.create(checkout("u2", PaymentMethod::Paypal)).await.unwrap();
        let confirmed = orders
            .update_payment_status("o-1", PaymentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.total_amount.cents(), 1798);

        let raw = repos
            .store()
            .load_collection(Collection::Orders)
            .await
            .unwrap()
            .unwrap();
        assert!(!raw.contains("17.98"));
        assert_eq!(orders.list_by_user("u1").await.unwrap().len(), 1);
    }
}
