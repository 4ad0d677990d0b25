//! # Repository Module
//!
//! Typed access to the storefront collections on top of any [`RecordStore`].
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_status("o-17", Shipped)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock(orders)            ◄── one tokio Mutex per collection             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load whole collection ─► locate "o-17" ─► apply lifecycle rule         │
//! │       │                       │                                         │
//! │       │                       └── missing? NotFound, nothing saved     │
//! │       ▼                                                                 │
//! │  save whole collection                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unlock                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two admins changing different orders at the same moment both land:
//! the second waits for the first save and then loads the collection
//! with the first change already in it. Reads take no lock and see the
//! last saved snapshot.
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`] - Checkout, status and payment updates
//! - [`SubscriptionRepository`] - Signup, status changes, payments, due lists
//! - [`UserRepository`] - Signup, login, admin-created accounts

pub mod order;
pub mod subscription;
pub mod user;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mehfil_core::{Clock, SystemClock, TransitionPolicy};
use tokio::sync::Mutex;

use crate::store::{Collection, RecordStore};

pub use order::OrderRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;

/// Serializes writers per collection.
#[derive(Debug, Default)]
pub(crate) struct CollectionLocks {
    orders: Mutex<()>,
    subscriptions: Mutex<()>,
    users: Mutex<()>,
}

impl CollectionLocks {
    pub(crate) fn for_collection(&self, collection: Collection) -> &Mutex<()> {
        match collection {
            Collection::Orders => &self.orders,
            Collection::Subscriptions => &self.subscriptions,
            Collection::Users => &self.users,
        }
    }
}

/// Everything a repository needs: the store, the clock, the locks.
///
/// Clones share all three, so every clone serializes against the others.
pub(crate) struct RepoContext<S> {
    pub(crate) store: Arc<S>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) locks: Arc<CollectionLocks>,
}

impl<S> Clone for RepoContext<S> {
    fn clone(&self) -> Self {
        RepoContext {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            locks: Arc::clone(&self.locks),
        }
    }
}

/// Entry point to the repositories for one store.
///
/// ## Example
/// ```rust,ignore
/// let repos = Repositories::new(MemoryStore::new())
///     .with_clock(Arc::new(ManualClock::new(start)))
///     .with_order_policy(TransitionPolicy::Strict);
///
/// let order = repos.orders().create(new_order).await?;
/// ```
pub struct Repositories<S> {
    ctx: RepoContext<S>,
    order_policy: TransitionPolicy,
}

impl<S> Clone for Repositories<S> {
    fn clone(&self) -> Self {
        Repositories {
            ctx: self.ctx.clone(),
            order_policy: self.order_policy,
        }
    }
}

impl<S: RecordStore> Repositories<S> {
    /// Wraps a store with the system clock and permissive order transitions.
    pub fn new(store: S) -> Self {
        Repositories {
            ctx: RepoContext {
                store: Arc::new(store),
                clock: Arc::new(SystemClock),
                locks: Arc::new(CollectionLocks::default()),
            },
            order_policy: TransitionPolicy::default(),
        }
    }

    /// Replaces the clock (tests pass a `ManualClock`).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.ctx.clock = clock;
        self
    }

    /// Sets how order status changes are checked.
    pub fn with_order_policy(mut self, policy: TransitionPolicy) -> Self {
        self.order_policy = policy;
        self
    }

    pub fn order_policy(&self) -> TransitionPolicy {
        self.order_policy
    }

    /// Current time from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.ctx.clock.now()
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.ctx.store
    }

    pub fn orders(&self) -> OrderRepository<S> {
        OrderRepository::new(self.ctx.clone(), self.order_policy)
    }

    pub fn subscriptions(&self) -> SubscriptionRepository<S> {
        SubscriptionRepository::new(self.ctx.clone())
    }

    pub fn users(&self) -> UserRepository<S> {
        UserRepository::new(self.ctx.clone())
    }
}
