//! # Validation Module
//!
//! Input validation for the storefront's write paths.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Signup / login          ──► email, password, confirmation, name        │
//! │  Checkout                ──► line items, owner, total   (strict check)  │
//! │  Subscription signup     ──► products, owner            (strict check)  │
//! │  Catering quote          ──► NOT validated by default:                  │
//! │                              calculate_quote coerces instead;           │
//! │                              calculate_quote_checked calls in here      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mehfil_core::validation::{validate_email, validate_password};
//!
//! assert!(validate_email("ayesha@cafemehfil.com").is_ok());
//! assert!(validate_password("chai").is_err());
//! ```

use crate::error::ValidationError;
use crate::quote::{FulfillmentMethod, QuoteInput};
use crate::types::{LineItem, NewOrder, NewSubscription};
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_ORDER_ITEMS, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, something before it
/// - A dotted domain after it, no whitespace anywhere
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@example.com"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid("domain must look like example.com"));
    }

    Ok(email.to_string())
}

/// Validates a new password.
///
/// Only length is checked; the storefront never imposed character classes.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Checks the "confirm password" field.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> ValidationResult<()> {
    if password != confirmation {
        return Err(ValidationError::Mismatch {
            field: "password confirmation".to_string(),
        });
    }
    Ok(())
}

/// Validates a display name and returns it trimmed.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity (1 to [`MAX_ITEM_QUANTITY`]).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free samples).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Cart / Checkout Validators
// =============================================================================

/// Validates a list of line items.
///
/// ## Rules
/// - At least one item, at most [`MAX_ORDER_ITEMS`]
/// - Every item has a product id and a name
/// - Quantities and prices pass [`validate_quantity`] / [`validate_price_cents`]
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    for item in items {
        if item.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product id".to_string(),
            });
        }
        if item.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "item name".to_string(),
            });
        }
        validate_quantity(item.quantity)?;
        validate_price_cents(item.unit_price.cents())?;
    }

    Ok(())
}

fn validate_owner(user_id: &str, user_name: &str, user_email: &str) -> ValidationResult<()> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user id".to_string(),
        });
    }
    validate_name(user_name)?;
    validate_email(user_email)?;
    Ok(())
}

/// Strict pre-check for a checkout submission.
///
/// The total is only checked for sign; it is deliberately not compared
/// with the item sum, since the checkout page may apply its own pricing.
pub fn validate_new_order(order: &NewOrder) -> ValidationResult<()> {
    validate_owner(&order.user_id, &order.user_name, &order.user_email)?;
    validate_line_items(&order.items)?;
    if order.total_amount.is_negative() {
        return Err(ValidationError::Negative {
            field: "total amount".to_string(),
        });
    }
    Ok(())
}

/// Strict pre-check for a subscription signup.
pub fn validate_new_subscription(sub: &NewSubscription) -> ValidationResult<()> {
    validate_owner(&sub.user_id, &sub.user_name, &sub.user_email)?;
    validate_line_items(&sub.products)
}

// =============================================================================
// Quote Validators
// =============================================================================

fn finite_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a number".to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn whole_number(field: &str, value: f64) -> ValidationResult<()> {
    finite_non_negative(field, value)?;
    if value.fract() != 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        });
    }
    Ok(())
}

/// Rejects quote input that the engine would otherwise coerce.
///
/// Delivery fields are only checked when delivery is selected.
pub fn validate_quote_input(input: &QuoteInput) -> ValidationResult<()> {
    whole_number("attendees", input.attendees)?;
    whole_number("expected drinkers", input.expected_drinkers)?;

    finite_non_negative("cups per drinker", input.cups_per_drinker)?;
    if input.cups_per_drinker == 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "cups per drinker".to_string(),
        });
    }

    if input.fulfillment_method == FulfillmentMethod::Delivery {
        finite_non_negative("distance", input.distance_one_way_km)?;
        finite_non_negative("gas price", input.gas_price_per_litre)?;
        finite_non_negative("vehicle km per litre", input.vehicle_km_per_litre)?;
        if input.vehicle_km_per_litre == 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "vehicle km per litre".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
