//! # mehfil-core: Pure Business Logic for Cafe Mehfil
//!
//! Everything the storefront decides, as pure functions: catering quotes,
//! order and subscription lifecycles, validation, money.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cafe Mehfil Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Storefront pages / mehfil CLI                    │   │
//! │  │   Catering ──► Checkout ──► Account ──► Admin ──► Subscriptions │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/console (command layer)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mehfil-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌────────────┐   │   │
//! │  │   │  quote   │  │ pricing  │  │ lifecycle │  │ validation │   │   │
//! │  │   │  engine  │  │  table   │  │ order/sub │  │   rules    │   │   │
//! │  │   └──────────┘  └──────────┘  └───────────┘  └────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                mehfil-db (record store layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quote`] - Catering quote engine
//! - [`pricing`] - Overridable pricing table the engine reads
//! - [`lifecycle`] - Order and subscription status machines, due dates
//! - [`types`] - Domain types (Order, Subscription, User, ...)
//! - [`money`] - Integer-cent money with round-up conversion from dollars
//! - [`clock`] - Injected source of "now"
//! - [`validation`] - Input checks for write paths
//! - [`format`] - Display helpers
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use mehfil_core::pricing::PricingConfig;
//! use mehfil_core::quote::{calculate_quote, FulfillmentMethod, QuoteInput};
//!
//! let input = QuoteInput {
//!     fulfillment_method: FulfillmentMethod::Delivery,
//!     distance_one_way_km: 10.0,
//!     ..QuoteInput::default()
//! };
//! let quote = calculate_quote(&PricingConfig::default(), &input);
//!
//! // 20 km round trip at 10 km/L and $1.50/L is $3.00, billed as $5.00
//! assert_eq!(quote.delivery_fee.cents(), 500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod quote;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::TransitionPolicy;
pub use money::Money;
pub use pricing::PricingConfig;
pub use quote::{calculate_quote, calculate_quote_checked, QuoteInput, QuoteResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How far ahead "upcoming" subscription payments look.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Longest display name accepted.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum quantity of a single line item.
///
/// Catches a typed 1000 where 10 was meant; catering volumes go through
/// the quote engine, not the cart.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum distinct line items in one order or subscription.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Email of the administrator account created on first start.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@cafemehfil.com";
