//! # Subscription Lifecycle
//!
//! Signup, pause/resume/cancel, payment processing, and the due-date rules.
//!
//! ## Due Dates
//! ```text
//!   anchor event                     next_due_date
//!   ─────────────────────────────    ─────────────────────────────
//!   signup at T                  ──► T + frequency
//!   payment processed at P       ──► P + frequency   (not due + frequency)
//!
//!   weekly +7d · biweekly +14d · monthly +1 month
//!   quarterly +3 months · yearly +12 months          (legacy records)
//! ```
//!
//! Month steps land on the same day of the month, or the last day of a
//! shorter month (Jan 31 + 1 month = Feb 28/29).

use chrono::{DateTime, Duration, Months, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{
    Frequency, NewSubscription, PaymentMethod, PaymentStatus, Subscription, SubscriptionPlan,
    SubscriptionStatus,
};
use crate::UPCOMING_WINDOW_DAYS;

// =============================================================================
// Due-Date Arithmetic
// =============================================================================

impl Frequency {
    /// The due date one interval after `anchor`.
    ///
    /// Saturates at the largest representable instant instead of failing.
    pub fn next_due_date(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        let next = match self {
            Frequency::Weekly => anchor.checked_add_signed(Duration::days(7)),
            Frequency::Biweekly => anchor.checked_add_signed(Duration::days(14)),
            Frequency::Monthly => anchor.checked_add_months(Months::new(1)),
            Frequency::Quarterly => anchor.checked_add_months(Months::new(3)),
            Frequency::Yearly => anchor.checked_add_months(Months::new(12)),
        };
        next.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

// =============================================================================
// Signup
// =============================================================================

/// Builds the subscription record for a signup at `now`.
///
/// PayPal signups are active immediately. E-transfer signups wait in
/// `pending_payment` until the first deposit is processed.
pub fn start_subscription(new: NewSubscription, id: String, now: DateTime<Utc>) -> Subscription {
    let status = match new.payment_method {
        PaymentMethod::Paypal => SubscriptionStatus::Active,
        PaymentMethod::Etransfer => SubscriptionStatus::PendingPayment,
    };

    Subscription {
        id,
        user_id: new.user_id,
        user_name: new.user_name,
        user_email: new.user_email,
        plan: SubscriptionPlan::Products { items: new.products },
        frequency: new.frequency,
        payment_method: new.payment_method,
        payment_status: new.payment_method.initial_payment_status(),
        status,
        start_date: now,
        next_due_date: new.frequency.next_due_date(now),
        last_payment_date: None,
        cancellation_reason: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Status Changes
// =============================================================================

/// Whether `from → to` is a legal status change. Same-status is allowed
/// (and is a no-op in [`change_status`]).
pub fn is_allowed(from: SubscriptionStatus, to: SubscriptionStatus) -> bool {
    use SubscriptionStatus::*;

    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (PendingPayment, Active)
            | (Active, Paused)
            | (Paused, Active)
            | (PendingPayment | Active | Paused, Cancelled)
    )
}

/// Pauses, resumes, activates or cancels a subscription.
///
/// Cancelling records `reason` (blank reasons are dropped) and the time.
/// Setting the current status again changes nothing, not even `updated_at`.
pub fn change_status(
    sub: &mut Subscription,
    status: SubscriptionStatus,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    if sub.status == status {
        return Ok(());
    }
    if !is_allowed(sub.status, status) {
        return Err(CoreError::InvalidSubscriptionTransition {
            subscription_id: sub.id.clone(),
            from: sub.status.to_string(),
            to: status.to_string(),
        });
    }

    if status == SubscriptionStatus::Cancelled {
        sub.cancellation_reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        sub.cancelled_at = Some(now);
    }

    sub.status = status;
    sub.updated_at = now;
    Ok(())
}

/// Records a payment received at `now` and moves the due date to one
/// interval after it.
///
/// The first payment on a `pending_payment` subscription activates it.
/// Cancelled subscriptions cannot take payments.
pub fn process_payment(sub: &mut Subscription, now: DateTime<Utc>) -> CoreResult<()> {
    if sub.status == SubscriptionStatus::Cancelled {
        return Err(CoreError::InvalidSubscriptionTransition {
            subscription_id: sub.id.clone(),
            from: sub.status.to_string(),
            to: "paid".to_string(),
        });
    }

    if sub.status == SubscriptionStatus::PendingPayment {
        sub.status = SubscriptionStatus::Active;
    }
    sub.payment_status = PaymentStatus::Confirmed;
    sub.last_payment_date = Some(now);
    sub.next_due_date = sub.frequency.next_due_date(now);
    sub.updated_at = now;
    Ok(())
}

// =============================================================================
// Due / Upcoming / Overdue
// =============================================================================

/// Active and due at or before `now`.
pub fn is_due(sub: &Subscription, now: DateTime<Utc>) -> bool {
    sub.status == SubscriptionStatus::Active && sub.next_due_date <= now
}

/// Active and due within the next [`UPCOMING_WINDOW_DAYS`] days (exclusive
/// of `now`, inclusive of the window end).
pub fn is_upcoming(sub: &Subscription, now: DateTime<Utc>) -> bool {
    let window_end = now
        .checked_add_signed(Duration::days(UPCOMING_WINDOW_DAYS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    sub.status == SubscriptionStatus::Active
        && sub.next_due_date > now
        && sub.next_due_date <= window_end
}

/// Active and strictly past due.
pub fn is_overdue(sub: &Subscription, now: DateTime<Utc>) -> bool {
    sub.status == SubscriptionStatus::Active && sub.next_due_date < now
}

// =============================================================================
// Unit Tests
// =============================================================================
