//! # Subscription Commands
//!
//! Signup, the admin subscription screen, and payment processing.

use chrono::{DateTime, Utc};
use mehfil_core::format::{format_billing, format_date};
use mehfil_core::lifecycle::subscription::is_overdue;
use mehfil_core::validation::validate_new_subscription;
use mehfil_core::{NewSubscription, Subscription, SubscriptionStatus};
use mehfil_db::RecordStore;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Which subscriptions to list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubscriptionFilter {
    #[default]
    All,
    /// Active and due now or earlier
    Due,
    /// Active and due within the next week
    Upcoming,
    /// Active and strictly past due
    Overdue,
    User(String),
}

/// One row of the admin subscription table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub id: String,
    pub customer: String,
    pub email: String,
    pub status: SubscriptionStatus,
    pub status_label: &'static str,
    /// e.g. `$25.00 / Monthly`
    pub billing: String,
    pub next_due: String,
    pub last_payment: String,
    pub overdue: bool,
}

impl SubscriptionSummary {
    pub fn new(sub: &Subscription, now: DateTime<Utc>) -> Self {
        SubscriptionSummary {
            id: sub.id.clone(),
            customer: sub.user_name.clone(),
            email: sub.user_email.clone(),
            status: sub.status,
            status_label: sub.status.label(),
            billing: format_billing(sub),
            next_due: format_date(Some(&sub.next_due_date)),
            last_payment: format_date(sub.last_payment_date.as_ref()),
            overdue: is_overdue(sub, now),
        }
    }
}

/// Signs a customer up after checking the products and owner.
pub async fn create_subscription<S: RecordStore>(
    state: &AppState<S>,
    new: NewSubscription,
) -> Result<Subscription, ApiError> {
    debug!(user_id = %new.user_id, frequency = %new.frequency, "create_subscription command");
    validate_new_subscription(&new)?;
    Ok(state.repos().subscriptions().create(new).await?)
}

pub async fn list_subscriptions<S: RecordStore>(
    state: &AppState<S>,
    filter: &SubscriptionFilter,
) -> Result<Vec<Subscription>, ApiError> {
    let subs = state.repos().subscriptions();
    let list = match filter {
        SubscriptionFilter::All => subs.list().await?,
        SubscriptionFilter::Due => subs.list_due().await?,
        SubscriptionFilter::Upcoming => subs.list_upcoming().await?,
        SubscriptionFilter::Overdue => subs.list_overdue().await?,
        SubscriptionFilter::User(user_id) => subs.list_by_user(user_id).await?,
    };
    Ok(list)
}

/// [`list_subscriptions`] shaped for display.
pub async fn subscription_table<S: RecordStore>(
    state: &AppState<S>,
    filter: &SubscriptionFilter,
) -> Result<Vec<SubscriptionSummary>, ApiError> {
    let now = state.repos().now();
    Ok(list_subscriptions(state, filter)
        .await?
        .iter()
        .map(|sub| SubscriptionSummary::new(sub, now))
        .collect())
}

pub async fn get_subscription<S: RecordStore>(
    state: &AppState<S>,
    id: &str,
) -> Result<Subscription, ApiError> {
    state
        .repos()
        .subscriptions()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscription", id))
}

/// Pause, resume, activate or cancel. `status` is the stored name.
pub async fn update_subscription_status<S: RecordStore>(
    state: &AppState<S>,
    id: &str,
    status: &str,
    reason: Option<String>,
) -> Result<Subscription, ApiError> {
    let status: SubscriptionStatus = status.parse()?;
    debug!(subscription_id = %id, status = %status, "update_subscription_status command");
    Ok(state
        .repos()
        .subscriptions()
        .update_status(id, status, reason)
        .await?)
}

pub async fn cancel_subscription<S: RecordStore>(
    state: &AppState<S>,
    id: &str,
    reason: Option<String>,
) -> Result<Subscription, ApiError> {
    Ok(state
        .repos()
        .subscriptions()
        .update_status(id, SubscriptionStatus::Cancelled, reason)
        .await?)
}

/// Records a payment now and moves the due date one interval past it.
pub async fn process_subscription_payment<S: RecordStore>(
    state: &AppState<S>,
    id: &str,
) -> Result<Subscription, ApiError> {
    debug!(subscription_id = %id, "process_subscription_payment command");
    Ok(state.repos().subscriptions().process_payment(id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ErrorCode;
    use chrono::{Duration, TimeZone};
    use mehfil_core::{Frequency, LineItem, ManualClock, Money, PaymentMethod, PaymentStatus};
    use mehfil_db::MemoryStore;
    use std::sync::Arc;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
    }

    fn state(clock: &ManualClock) -> AppState<MemoryStore> {
        AppState::with_store(MemoryStore::new(), &AppConfig::default())
            .with_clock(Arc::new(clock.clone()))
    }

    fn signup(method: PaymentMethod, frequency: Frequency) -> NewSubscription {
        NewSubscription {
            user_id: "u-1".into(),
            user_name: "Omar Farooq".into(),
            user_email: "omar@example.com".into(),
            products: vec![LineItem {
                product_id: "house-espresso-beans".into(),
                name: "House Espresso Beans 1kg".into(),
                image: None,
                unit_price: Money::from_cents(2500),
                quantity: 1,
            }],
            frequency,
            payment_method: method,
        }
    }

    #[tokio::test]
    async fn test_weekly_payment_anchors_on_payment_time() {
        let clock = ManualClock::new(start());
        let state = state(&clock);

        let sub = create_subscription(&state, signup(PaymentMethod::Paypal, Frequency::Weekly))
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.next_due_date, start() + Duration::days(7));

        clock.advance(Duration::days(9));
        let overdue = list_subscriptions(&state, &SubscriptionFilter::Overdue).await.unwrap();
        assert_eq!(overdue.len(), 1);

        let paid = process_subscription_payment(&state, &sub.id).await.unwrap();
        assert_eq!(paid.last_payment_date, Some(start() + Duration::days(9)));
        assert_eq!(paid.next_due_date, start() + Duration::days(16));
        assert!(list_subscriptions(&state, &SubscriptionFilter::Due).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_etransfer_waits_for_first_payment() {
        let clock = ManualClock::new(start());
        let state = state(&clock);

        let sub = create_subscription(&state, signup(PaymentMethod::Etransfer, Frequency::Monthly))
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PendingPayment);

        let err = update_subscription_status(&state, &sub.id, "paused", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        let paid = process_subscription_payment(&state, &sub.id).await.unwrap();
        assert_eq!(paid.status, SubscriptionStatus::Active);
        assert_eq!(paid.payment_status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_cancel_is_terminal() {
        let clock = ManualClock::new(start());
        let state = state(&clock);
        let sub = create_subscription(&state, signup(PaymentMethod::Paypal, Frequency::Biweekly))
            .await
            .unwrap();

        let paused = update_subscription_status(&state, &sub.id, "paused", None).await.unwrap();
        assert_eq!(paused.status, SubscriptionStatus::Paused);

        let cancelled = cancel_subscription(&state, &sub.id, Some("  Moving away ".into()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Moving away"));
        assert_eq!(cancelled.cancelled_at, Some(start()));

        let err = update_subscription_status(&state, &sub.id, "active", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        let err = process_subscription_payment(&state, &sub.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[tokio::test]
    async fn test_subscription_table_rows() {
        let clock = ManualClock::new(start());
        let state = state(&clock);
        create_subscription(&state, signup(PaymentMethod::Paypal, Frequency::Monthly))
            .await
            .unwrap();

        let rows = subscription_table(&state, &SubscriptionFilter::User("u-1".into()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].billing, "$25.00 / Monthly");
        assert_eq!(rows[0].next_due, "November 19, 2026");
        assert_eq!(rows[0].last_payment, "N/A");
        assert_eq!(rows[0].status_label, "Active");
        assert!(!rows[0].overdue);

        clock.advance(Duration::days(25));
        let upcoming = subscription_table(&state, &SubscriptionFilter::Upcoming).await.unwrap();
        assert_eq!(upcoming.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_and_statuses() {
        let clock = ManualClock::new(start());
        let state = state(&clock);

        let err = process_subscription_payment(&state, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = get_subscription(&state, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = update_subscription_status(&state, "missing", "frozen", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
