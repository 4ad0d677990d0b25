//! # Quote Commands
//!
//! Catering quotes priced with the configured table.

use mehfil_core::{calculate_quote, calculate_quote_checked, QuoteInput, QuoteResult};
use mehfil_db::RecordStore;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Prices a form submission. Never fails; bad numbers are coerced.
pub fn catering_quote<S: RecordStore>(state: &AppState<S>, input: &QuoteInput) -> QuoteResult {
    let result = calculate_quote(state.pricing(), input);
    debug!(cups = result.cups_needed, total = %result.total, "Catering quote computed");
    result
}

/// Like [`catering_quote`] but rejects fractional headcounts, a zero
/// cups-per-drinker and similar input instead of coercing it.
pub fn catering_quote_checked<S: RecordStore>(
    state: &AppState<S>,
    input: &QuoteInput,
) -> Result<QuoteResult, ApiError> {
    Ok(calculate_quote_checked(state.pricing(), input)?)
}

/// Parses a JSON form body. A blank body is the untouched form.
pub fn parse_quote_input(body: &str) -> Result<QuoteInput, ApiError> {
    if body.trim().is_empty() {
        return Ok(QuoteInput::default());
    }

    serde_json::from_str(body)
        .map_err(|e| ApiError::validation(format!("Invalid quote request: {}", e)))
}

/// Parses and prices a JSON form body.
pub fn catering_quote_from_json<S: RecordStore>(
    state: &AppState<S>,
    body: &str,
) -> Result<QuoteResult, ApiError> {
    let input = parse_quote_input(body)?;
    Ok(catering_quote(state, &input))
}
