//! Order lifecycle: creation at checkout, admin status changes, and the
//! payment-confirmation auto-advance.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::lifecycle::TransitionPolicy;
use crate::types::{NewOrder, Order, OrderStatus, PaymentStatus};

/// Builds the order record for a checkout submission.
///
/// Status starts `pending`; payment status depends on the method
/// (e-transfers wait for confirmation). The total is taken as submitted.
pub fn place_order(new: NewOrder, id: String, now: DateTime<Utc>) -> Order {
    Order {
        id,
        user_id: new.user_id,
        user_name: new.user_name,
        user_email: new.user_email,
        items: new.items,
        payment_method: new.payment_method,
        total_amount: new.total_amount,
        status: OrderStatus::Pending,
        payment_status: new.payment_method.initial_payment_status(),
        created_at: now,
        updated_at: now,
    }
}

/// Strict transition table: one step forward, or cancel before delivery.
pub fn is_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Confirmed, Preparing)
            | (Preparing, Shipped)
            | (Shipped, Delivered)
            | (Pending | Confirmed | Preparing | Shipped, Cancelled)
    )
}

/// Sets the fulfilment status.
///
/// Under [`TransitionPolicy::Permissive`] any status may follow any other.
pub fn apply_status(
    order: &mut Order,
    status: OrderStatus,
    policy: TransitionPolicy,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    if policy == TransitionPolicy::Strict && !is_allowed(order.status, status) {
        return Err(CoreError::InvalidOrderTransition {
            order_id: order.id.clone(),
            from: order.status.to_string(),
            to: status.to_string(),
        });
    }

    order.status = status;
    order.updated_at = now;
    Ok(())
}

/// Sets the payment status.
///
/// Confirming payment on an order that is still `pending` also moves it to
/// `confirmed`. That is the only change one axis makes to the other.
pub fn apply_payment_status(order: &mut Order, payment_status: PaymentStatus, now: DateTime<Utc>) {
    order.payment_status = payment_status;
    if payment_status == PaymentStatus::Confirmed && order.status == OrderStatus::Pending {
        order.status = OrderStatus::Confirmed;
    }
    order.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{LineItem, PaymentMethod};
    use chrono::{Duration, TimeZone};

    fn checkout(method: PaymentMethod) -> NewOrder {
        NewOrder {
            user_id: "u1".to_string(),
            user_name: "Bilal".to_string(),
            user_email: "bilal@example.com".to_string(),
            items: vec![LineItem {
                product_id: "beans-1kg".to_string(),
                name: "Karachi Roast 1kg".to_string(),
                image: Some("/images/karachi.jpg".to_string()),
                unit_price: Money::from_cents(2899),
                quantity: 1,
            }],
            payment_method: method,
            total_amount: Money::from_cents(2899),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_etransfer_order_awaits_confirmation() {
        let order = place_order(checkout(PaymentMethod::Etransfer), "o1".to_string(), now());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::AwaitingConfirmation);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn test_confirming_payment_advances_pending_order() {
        let mut order = place_order(checkout(PaymentMethod::Etransfer), "o1".to_string(), now());
        let later = now() + Duration::hours(3);

        apply_payment_status(&mut order, PaymentStatus::Confirmed, later);

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Confirmed);
        assert_eq!(order.updated_at, later);
    }

    #[test]
    fn test_confirming_payment_leaves_later_status_alone() {
        let mut order = place_order(checkout(PaymentMethod::Paypal), "o1".to_string(), now());
        order.status = OrderStatus::Shipped;

        apply_payment_status(&mut order, PaymentStatus::Confirmed, now());
        assert_eq!(order.status, OrderStatus::Shipped);

        apply_payment_status(&mut order, PaymentStatus::Failed, now());
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[test]
    fn test_permissive_allows_any_jump() {
        let mut order = place_order(checkout(PaymentMethod::Paypal), "o1".to_string(), now());

        apply_status(&mut order, OrderStatus::Delivered, TransitionPolicy::Permissive, now()).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        apply_status(&mut order, OrderStatus::Pending, TransitionPolicy::Permissive, now()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_strict_rejects_skips_and_reopening() {
        let mut order = place_order(checkout(PaymentMethod::Paypal), "o1".to_string(), now());

        let err = apply_status(&mut order, OrderStatus::Delivered, TransitionPolicy::Strict, now())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidOrderTransition { .. }));
        assert_eq!(order.status, OrderStatus::Pending);

        apply_status(&mut order, OrderStatus::Cancelled, TransitionPolicy::Strict, now()).unwrap();
        assert!(apply_status(&mut order, OrderStatus::Pending, TransitionPolicy::Strict, now()).is_err());
    }

    #[test]
    fn test_strict_table() {
        assert!(is_allowed(OrderStatus::Pending, OrderStatus::Confirmed));
        assert!(is_allowed(OrderStatus::Shipped, OrderStatus::Delivered));
        assert!(is_allowed(OrderStatus::Preparing, OrderStatus::Cancelled));
        assert!(is_allowed(OrderStatus::Delivered, OrderStatus::Delivered));
        assert!(!is_allowed(OrderStatus::Delivered, OrderStatus::Cancelled));
        assert!(!is_allowed(OrderStatus::Confirmed, OrderStatus::Pending));
    }
}
