//! # Order Commands
//!
//! Checkout plus the admin order screen.

use mehfil_core::validation::validate_new_order;
use mehfil_core::{NewOrder, Order, OrderStatus, PaymentStatus};
use mehfil_db::RecordStore;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Records a checkout after checking its items and owner.
pub async fn create_order<S: RecordStore>(
    state: &AppState<S>,
    new: NewOrder,
) -> Result<Order, ApiError> {
    debug!(user_id = %new.user_id, items = new.items.len(), "create_order command");
    validate_new_order(&new)?;
    Ok(state.repos().orders().create(new).await?)
}

/// Every order, or one customer's, newest first.
pub async fn list_orders<S: RecordStore>(
    state: &AppState<S>,
    user_id: Option<&str>,
) -> Result<Vec<Order>, ApiError> {
    let orders = state.repos().orders();
    match user_id {
        Some(user_id) => Ok(orders.list_by_user(user_id).await?),
        None => Ok(orders.list().await?),
    }
}

pub async fn get_order<S: RecordStore>(state: &AppState<S>, id: &str) -> Result<Order, ApiError> {
    state
        .repos()
        .orders()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))
}

/// Admin status change. `status` is the stored name, e.g. `shipped`.
pub async fn update_order_status<S: RecordStore>(
    state: &AppState<S>,
    id: &str,
    status: &str,
) -> Result<Order, ApiError> {
    let status: OrderStatus = status.parse()?;
    debug!(order_id = %id, status = %status, "update_order_status command");
    Ok(state.repos().orders().update_status(id, status).await?)
}

/// Admin payment change, e.g. confirming an e-transfer.
pub async fn update_payment_status<S: RecordStore>(
    state: &AppState<S>,
    id: &str,
    payment_status: &str,
) -> Result<Order, ApiError> {
    let payment_status: PaymentStatus = payment_status.parse()?;
    debug!(order_id = %id, payment_status = %payment_status, "update_payment_status command");
    Ok(state
        .repos()
        .orders()
        .update_payment_status(id, payment_status)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::{ErrorCode, Outcome};
    use mehfil_core::{LineItem, Money, PaymentMethod, TransitionPolicy};
    use mehfil_db::MemoryStore;

    fn state(policy: TransitionPolicy) -> AppState<MemoryStore> {
        let config = AppConfig {
            order_transitions: policy,
            ..AppConfig::default()
        };
        AppState::with_store(MemoryStore::new(), &config)
    }

    fn checkout(method: PaymentMethod) -> NewOrder {
        let items = vec![LineItem {
            product_id: "karak-chai-blend".into(),
            name: "Karak Chai Blend 250g".into(),
            image: Some("/images/karak.jpg".into()),
            unit_price: Money::from_cents(1499),
            quantity: 2,
        }];
        NewOrder {
            user_id: "u-1".into(),
            user_name: "Sana Malik".into(),
            user_email: "sana@example.com".into(),
            total_amount: mehfil_core::cart_total(&items),
            items,
            payment_method: method,
        }
    }

    #[tokio::test]
    async fn test_etransfer_confirmation_advances_order() {
        let state = state(TransitionPolicy::Permissive);
        let order = create_order(&state, checkout(PaymentMethod::Etransfer)).await.unwrap();
        assert_eq!(order.total_amount.cents(), 2998);
        assert_eq!(order.payment_status, PaymentStatus::AwaitingConfirmation);

        let order = update_payment_status(&state, &order.id, "confirmed").await.unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_permissive_allows_any_jump() {
        let state = state(TransitionPolicy::Permissive);
        let order = create_order(&state, checkout(PaymentMethod::Paypal)).await.unwrap();

        let order = update_order_status(&state, &order.id, "delivered").await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        let order = update_order_status(&state, &order.id, "pending").await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_strict_rejects_skipping_ahead() {
        let state = state(TransitionPolicy::Strict);
        let order = create_order(&state, checkout(PaymentMethod::Paypal)).await.unwrap();

        let err = update_order_status(&state, &order.id, "shipped").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        let order = update_order_status(&state, &order.id, "confirmed").await.unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_failures_become_outcomes() {
        let state = state(TransitionPolicy::Permissive);

        let outcome: Outcome<Order> = update_order_status(&state, "missing", "shipped").await.into();
        assert!(!outcome.success);
        assert_eq!(outcome.error.unwrap().code, ErrorCode::NotFound);

        let order = create_order(&state, checkout(PaymentMethod::Paypal)).await.unwrap();
        let outcome: Outcome<Order> = update_order_status(&state, &order.id, "teleported").await.into();
        assert_eq!(outcome.error.unwrap().code, ErrorCode::ValidationError);

        let err = get_order(&state, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_empty_checkout_rejected() {
        let state = state(TransitionPolicy::Permissive);
        let mut new = checkout(PaymentMethod::Paypal);
        new.items.clear();

        let err = create_order(&state, new).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_orders(&state, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_user() {
        let state = state(TransitionPolicy::Permissive);
        create_order(&state, checkout(PaymentMethod::Paypal)).await.unwrap();
        let mut other = checkout(PaymentMethod::Paypal);
        other.user_id = "u-2".into();
        create_order(&state, other).await.unwrap();

        assert_eq!(list_orders(&state, None).await.unwrap().len(), 2);
        let mine = list_orders(&state, Some("u-2")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, "u-2");
    }
}
