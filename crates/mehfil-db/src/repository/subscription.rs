//! # Subscription Repository
//!
//! Signup, status changes, payment processing and the due/upcoming lists.
//!
//! ## Stored Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cafe_mehfil_subscriptions may hold two record shapes:                  │
//! │                                                                         │
//! │  current   { plan: { kind: "products", items: [...] }, paymentMethod,  │
//! │              paymentStatus, ... }                                       │
//! │  legacy    { amount: 25, frequency: "quarterly", status, ... }         │
//! │                                                                         │
//! │  Both load as Subscription (legacy → FlatAmount plan). Every save      │
//! │  writes the current shape, so legacy records migrate on the first      │
//! │  write to the collection.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use mehfil_core::lifecycle::subscription::{
    change_status, is_due, is_overdue, is_upcoming, process_payment, start_subscription,
};
use mehfil_core::{CoreResult, LegacySubscription, NewSubscription, Subscription, SubscriptionStatus};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::RepoContext;
use crate::store::{load_records, save_records, Collection, RecordStore};

/// Either stored shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSubscription {
    Current(Subscription),
    Legacy(LegacySubscription),
}

impl From<StoredSubscription> for Subscription {
    fn from(stored: StoredSubscription) -> Self {
        match stored {
            StoredSubscription::Current(sub) => sub,
            StoredSubscription::Legacy(legacy) => legacy.into(),
        }
    }
}

/// Repository for the subscriptions collection.
pub struct SubscriptionRepository<S> {
    ctx: RepoContext<S>,
}

impl<S: RecordStore> SubscriptionRepository<S> {
    pub(crate) fn new(ctx: RepoContext<S>) -> Self {
        SubscriptionRepository { ctx }
    }

    async fn load(&self) -> DbResult<Vec<Subscription>> {
        let stored: Vec<StoredSubscription> =
            load_records(self.ctx.store.as_ref(), Collection::Subscriptions).await?;
        Ok(stored.into_iter().map(Subscription::from).collect())
    }

    /// Signs a customer up. The first due date is one interval after now.
    pub async fn create(&self, new: NewSubscription) -> DbResult<Subscription> {
        let _guard = self
            .ctx
            .locks
            .for_collection(Collection::Subscriptions)
            .lock()
            .await;

        let mut subs = self.load().await?;
        let sub = start_subscription(new, Uuid::new_v4().to_string(), self.ctx.clock.now());
        subs.push(sub.clone());
        save_records(self.ctx.store.as_ref(), Collection::Subscriptions, &subs).await?;

        info!(
            subscription_id = %sub.id,
            user_id = %sub.user_id,
            frequency = %sub.frequency,
            status = %sub.status,
            next_due = %sub.next_due_date,
            "Subscription created"
        );
        Ok(sub)
    }

    /// All subscriptions, in signup order.
    pub async fn list(&self) -> DbResult<Vec<Subscription>> {
        self.load().await
    }

    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Subscription>> {
        let mut subs = self.load().await?;
        subs.retain(|sub| sub.user_id == user_id);
        Ok(subs)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Subscription>> {
        Ok(self.load().await?.into_iter().find(|sub| sub.id == id))
    }

    /// Active subscriptions due now or earlier.
    pub async fn list_due(&self) -> DbResult<Vec<Subscription>> {
        self.filter_by_time(is_due).await
    }

    /// Active subscriptions due within the upcoming window.
    pub async fn list_upcoming(&self) -> DbResult<Vec<Subscription>> {
        self.filter_by_time(is_upcoming).await
    }

    /// Active subscriptions strictly past due.
    pub async fn list_overdue(&self) -> DbResult<Vec<Subscription>> {
        self.filter_by_time(is_overdue).await
    }

    async fn filter_by_time(
        &self,
        predicate: fn(&Subscription, DateTime<Utc>) -> bool,
    ) -> DbResult<Vec<Subscription>> {
        let now = self.ctx.clock.now();
        let mut subs = self.load().await?;
        subs.retain(|sub| predicate(sub, now));
        Ok(subs)
    }

    /// Pauses, resumes, activates or cancels. `reason` is kept on cancel.
    pub async fn update_status(
        &self,
        id: &str,
        status: SubscriptionStatus,
        reason: Option<String>,
    ) -> DbResult<Subscription> {
        let sub = self
            .mutate(id, |sub, now| change_status(sub, status, reason, now))
            .await?;

        info!(subscription_id = %id, status = %sub.status, "Subscription status updated");
        Ok(sub)
    }

    /// Records a payment now and moves the due date one interval past it.
    pub async fn process_payment(&self, id: &str) -> DbResult<Subscription> {
        let sub = self.mutate(id, process_payment).await?;

        info!(
            subscription_id = %id,
            next_due = %sub.next_due_date,
            "Subscription payment processed"
        );
        Ok(sub)
    }

    /// Locked load → locate → change → save.
    async fn mutate<F>(&self, id: &str, change: F) -> DbResult<Subscription>
    where
        F: FnOnce(&mut Subscription, DateTime<Utc>) -> CoreResult<()>,
    {
        let _guard = self
            .ctx
            .locks
            .for_collection(Collection::Subscriptions)
            .lock()
            .await;

        let mut subs = self.load().await?;
        let sub = subs
            .iter_mut()
            .find(|sub| sub.id == id)
            .ok_or_else(|| DbError::not_found("Subscription", id))?;

        change(sub, self.ctx.clock.now())?;
        let updated = sub.clone();

        save_records(self.ctx.store.as_ref(), Collection::Subscriptions, &subs).await?;
        debug!(subscription_id = %id, "Subscriptions collection saved");
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
