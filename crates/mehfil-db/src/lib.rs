//! # mehfil-db: Persistence Layer for Cafe Mehfil
//!
//! Stores the storefront's three collections (orders, subscriptions,
//! users) and exposes typed repositories over them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cafe Mehfil Data Flow                            │
//! │                                                                         │
//! │  Console command (order-status o-17 shipped)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     mehfil-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ Repositories  │    │  RecordStore  │    │  Migrations  │  │   │
//! │  │   │               │    │               │    │  (embedded)  │  │   │
//! │  │   │ OrderRepo     │───►│ Database      │    │              │  │   │
//! │  │   │ Subscription  │    │ (SQLite)      │    │ 001_record_  │  │   │
//! │  │   │ UserRepo      │    │ MemoryStore   │    │ collections  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │          │                                                      │   │
//! │  │          ▼                                                      │   │
//! │  │   mehfil-core lifecycle rules (pure)                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: one row per collection, payload = JSON array          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The collection key-value contract and an in-memory store
//! - [`pool`] - SQLite connection pool and the SQLite-backed store
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Orders, subscriptions, users
//! - [`password`] - argon2 hashing for account passwords
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mehfil_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("mehfil.db")).await?;
//! let repos = db.repositories();
//!
//! let due = repos.subscriptions().list_due().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::{Collection, MemoryStore, RecordStore};

// Repository re-exports for convenience
pub use repository::{OrderRepository, Repositories, SubscriptionRepository, UserRepository};
