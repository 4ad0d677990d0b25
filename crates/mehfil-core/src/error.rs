//! # Error Types
//!
//! Domain-specific error types for mehfil-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mehfil-core errors (this file)                                        │
//! │  ├── CoreError        - Lifecycle and account rule violations          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mehfil-db errors (separate crate)                                     │
//! │  └── DbError          - Not found, storage failures                    │
//! │                                                                         │
//! │  Console errors (in app)                                               │
//! │  └── ApiError         - What the storefront sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Storefront   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The quote engine has no error type on purpose: it coerces bad input
//! instead of rejecting it. Only the strict wrapper reports
//! [`ValidationError`]s.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An order status change was rejected by the strict transition table.
    ///
    /// Never produced under the default permissive policy.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidOrderTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// A subscription status change was rejected.
    ///
    /// ## When This Occurs
    /// - Any change away from `cancelled` (terminal)
    /// - Pausing a subscription that was never paid for
    /// - Processing a payment on a cancelled subscription
    #[error("Subscription {subscription_id} cannot move from {from} to {to}")]
    InvalidSubscriptionTransition {
        subscription_id: String,
        from: String,
        to: String,
    },

    /// Email/password pair did not match any account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, non-numeric quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Two fields that must match do not (password confirmation).
    #[error("{field} does not match")]
    Mismatch { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_message() {
        let err = CoreError::InvalidSubscriptionTransition {
            subscription_id: "sub-1".to_string(),
            from: "cancelled".to_string(),
            to: "active".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Subscription sub-1 cannot move from cancelled to active"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Duplicate {
            field: "email".to_string(),
            value: "a@b.com".to_string(),
        };
        assert_eq!(err.to_string(), "email 'a@b.com' already exists");

        let err = ValidationError::Mismatch {
            field: "password confirmation".to_string(),
        };
        assert_eq!(err.to_string(), "password confirmation does not match");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
