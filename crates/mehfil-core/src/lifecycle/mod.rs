//! # Lifecycle Rules
//!
//! Status machines for orders and subscriptions, plus due-date arithmetic.
//!
//! ```text
//! Order:        pending → confirmed → preparing → shipped → delivered
//!                  └──────────┴───────────┴──────────┴──► cancelled
//!               (payment confirmed while pending ⇒ confirmed)
//!
//! Subscription: pending_payment ──payment──► active ⇄ paused
//!                     │                         │       │
//!                     └─────────────────────────┴───────┴──► cancelled
//! ```
//!
//! Every function here mutates a record in place and takes "now" as an
//! argument. Loading and saving the record is the caller's job.

pub mod order;
pub mod subscription;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How strictly order status changes are checked.
///
/// Administrators have always been able to set any status from any status,
/// so that stays the default. `Strict` checks the forward-only table in
/// [`order::is_allowed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionPolicy::Permissive => f.write_str("permissive"),
            TransitionPolicy::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(ValidationError::InvalidFormat {
                field: "order transitions".to_string(),
                reason: format!("expected 'permissive' or 'strict', got '{}'", other),
            }),
        }
    }
}
