//! Display helpers shared by the account, admin and subscription pages.

use chrono::{DateTime, Utc};

use crate::types::Subscription;

/// Long US-style date, e.g. `October 19, 2026`. Missing dates show `N/A`.
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// Billing line for a subscription card, e.g. `$25.00 / Monthly`.
pub fn format_billing(sub: &Subscription) -> String {
    format!("{} / {}", sub.plan.amount_per_cycle(), sub.frequency.label())
}
