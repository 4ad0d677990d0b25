//! # Domain Types
//!
//! Core domain types used throughout the Mehfil storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │      User       │   │      Order      │   │    Subscription      │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)           │  │
//! │  │  email (unique) │   │  owner          │   │  owner               │  │
//! │  │  role           │   │  items          │   │  plan (products |    │  │
//! │  └─────────────────┘   │  total_amount   │   │        flat amount)  │  │
//! │                        │  status         │   │  frequency           │  │
//! │                        │  payment_status │   │  status, due dates   │  │
//! │                        └─────────────────┘   └──────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │  OrderStatus    │   │ PaymentStatus   │   │ SubscriptionStatus   │  │
//! │  │  pending ...    │   │ pending         │   │ pending_payment      │  │
//! │  │  delivered      │   │ awaiting_conf.  │   │ active ⇄ paused      │  │
//! │  │  cancelled      │   │ confirmed/failed│   │ cancelled (terminal) │  │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stored records use camelCase keys so they stay readable next to the
//! records the browser storefront already wrote.
//!
//! Lifecycle behaviour (transitions, due dates) lives in [`crate::lifecycle`];
//! this module only defines shapes and labels.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Generates `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// serde names are listed explicitly.
macro_rules! string_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Stored/wire name of this value.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(ValidationError::InvalidFormat {
                        field: $field.to_string(),
                        reason: format!("unknown value '{}'", other),
                    }),
                }
            }
        }
    };
}

// =============================================================================
// User
// =============================================================================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

string_enum!(UserRole, "role", { User => "user", Admin => "admin" });

/// A storefront account, as seen by everything except the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Unique at creation time only.
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How the customer pays. No gateway is called for either method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// PayPal checkout.
    Paypal,
    /// Manual bank transfer, confirmed by an administrator.
    Etransfer,
}

string_enum!(PaymentMethod, "payment method", { Paypal => "paypal", Etransfer => "etransfer" });

impl PaymentMethod {
    /// Payment status a new order or subscription starts with.
    ///
    /// E-transfers wait for a human to confirm the deposit.
    pub const fn initial_payment_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Paypal => PaymentStatus::Pending,
            PaymentMethod::Etransfer => PaymentStatus::AwaitingConfirmation,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::Etransfer => "E-Transfer",
        }
    }
}

/// Payment axis of an order or subscription, independent of its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    AwaitingConfirmation,
    Confirmed,
    Failed,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    AwaitingConfirmation => "awaiting_confirmation",
    Confirmed => "confirmed",
    Failed => "failed",
});

impl PaymentStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::AwaitingConfirmation => "Awaiting Confirmation",
            PaymentStatus::Confirmed => "Confirmed",
            PaymentStatus::Failed => "Failed",
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// A product in a cart, order or subscription.
///
/// Snapshot of the product at the time it was added; later price changes
/// on the shop page do not touch existing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    /// Image path shown next to the item.
    #[serde(default)]
    pub image: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
}

impl LineItem {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Sum of line totals, as shown on the cart and checkout pages.
pub fn cart_total(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::line_total).sum()
}

// =============================================================================
// Order
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Preparing => "preparing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Every status, in lifecycle order (the admin dropdown order).
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// A checkout submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    /// Fixed at checkout; never recomputed from `items`.
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Everything the checkout page knows when the customer submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    pub total_amount: Money,
}

// =============================================================================
// Subscription
// =============================================================================

/// Billing frequency.
///
/// `Quarterly` and `Yearly` only appear on records created by the older
/// donation-style subscriptions; new signups pick one of the first three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

string_enum!(Frequency, "frequency", {
    Weekly => "weekly",
    Biweekly => "biweekly",
    Monthly => "monthly",
    Quarterly => "quarterly",
    Yearly => "yearly",
});

impl Frequency {
    /// Frequencies offered to new subscribers.
    pub const OFFERED: [Frequency; 3] = [Frequency::Weekly, Frequency::Biweekly, Frequency::Monthly];

    pub const fn is_legacy(&self) -> bool {
        matches!(self, Frequency::Quarterly | Frequency::Yearly)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Bi-weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }
}

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// E-transfer signup waiting for the first deposit to be confirmed.
    PendingPayment,
    Active,
    Paused,
    /// Terminal.
    Cancelled,
}

string_enum!(SubscriptionStatus, "subscription status", {
    PendingPayment => "pending_payment",
    Active => "active",
    Paused => "paused",
    Cancelled => "cancelled",
});

impl SubscriptionStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::PendingPayment => "Pending Payment",
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Paused => "Paused",
            SubscriptionStatus::Cancelled => "Cancelled",
        }
    }
}

/// What a subscription delivers each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubscriptionPlan {
    /// Canonical shape: a basket of products re-sent every cycle.
    Products { items: Vec<LineItem> },
    /// Older shape: a fixed dollar amount per cycle. Only produced by
    /// [`LegacySubscription`] conversion.
    FlatAmount { amount: Money },
}

impl SubscriptionPlan {
    /// Amount charged each billing cycle.
    pub fn amount_per_cycle(&self) -> Money {
        match self {
            SubscriptionPlan::Products { items } => cart_total(items),
            SubscriptionPlan::FlatAmount { amount } => *amount,
        }
    }
}

/// A recurring purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub plan: SubscriptionPlan,
    pub frequency: Frequency,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: SubscriptionStatus,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    /// Always `frequency` applied to the last anchor event (creation or
    /// last processed payment).
    #[ts(as = "String")]
    pub next_due_date: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Everything the subscriptions page knows when the customer signs up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub products: Vec<LineItem>,
    pub frequency: Frequency,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Legacy Subscription Shape
// =============================================================================

/// The flat-amount subscription record written by the first storefront
/// release (`amount` in dollars, no payment method, no plan).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySubscription {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub next_due_date: DateTime<Utc>,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LegacySubscription> for Subscription {
    /// Legacy signups activated immediately without a payment step, which
    /// is the PayPal path; a recorded payment means it was confirmed.
    fn from(legacy: LegacySubscription) -> Self {
        let payment_status = if legacy.last_payment_date.is_some() {
            PaymentStatus::Confirmed
        } else {
            PaymentStatus::Pending
        };

        Subscription {
            id: legacy.id,
            user_id: legacy.user_id,
            user_name: legacy.user_name,
            user_email: legacy.user_email,
            plan: SubscriptionPlan::FlatAmount {
                amount: Money::from_stored_dollars(legacy.amount),
            },
            frequency: legacy.frequency,
            payment_method: PaymentMethod::Paypal,
            payment_status,
            status: legacy.status,
            start_date: legacy.start_date,
            next_due_date: legacy.next_due_date,
            last_payment_date: legacy.last_payment_date,
            cancellation_reason: None,
            cancelled_at: None,
            created_at: legacy.created_at,
            updated_at: legacy.updated_at,
        }
    }
}

// =============================================================================
// Browser Order Shape
// =============================================================================

/// Product ID as the shop page wrote it: a number for catalogue items,
/// a string for anything added later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyProductId {
    Number(i64),
    Text(String),
}

impl fmt::Display for LegacyProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyProductId::Number(n) => write!(f, "{n}"),
            LegacyProductId::Text(s) => f.write_str(s),
        }
    }
}

/// A cart line as the browser storefront saved it: the whole product
/// object (`price` in dollars) plus a quantity. Extra product fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLineItem {
    pub id: LegacyProductId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: i64,
}

impl From<LegacyLineItem> for LineItem {
    fn from(legacy: LegacyLineItem) -> Self {
        LineItem {
            product_id: legacy.id.to_string(),
            name: legacy.name,
            image: legacy.image,
            unit_price: Money::from_stored_dollars(legacy.price),
            quantity: legacy.quantity,
        }
    }
}

/// An order as the browser storefront saved it (`totalAmount` in dollars).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyOrder {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<LegacyLineItem>,
    pub payment_method: PaymentMethod,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LegacyOrder> for Order {
    fn from(legacy: LegacyOrder) -> Self {
        Order {
            id: legacy.id,
            user_id: legacy.user_id,
            user_name: legacy.user_name,
            user_email: legacy.user_email,
            items: legacy.items.into_iter().map(LineItem::from).collect(),
            payment_method: legacy.payment_method,
            total_amount: Money::from_stored_dollars(legacy.total_amount),
            status: legacy.status,
            payment_status: legacy.payment_status,
            created_at: legacy.created_at,
            updated_at: legacy.updated_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
