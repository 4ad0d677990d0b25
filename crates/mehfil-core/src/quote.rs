//! # Catering Quote Engine
//!
//! Turns an order form into an itemized price breakdown.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QuoteInput (coerced: bad numbers → 0, never rejected)                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  drinkers    = min(attendees, expected_drinkers)                        │
//! │  cups        = ceil(drinkers × cups_per_drinker)                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  per cup     = base[size] + upcharge[container]                         │
//! │  drinks      = cups × per cup × multiplier[package]                     │
//! │        │                                                                │
//! │        ▼          (build_your_own / hybrid only)                        │
//! │  ice         = cups × bag × (grams[size] / bag weight) × markup         │
//! │  supplies    = cups × (cup[size] + lid + straw) × markup                │
//! │        │                                                                │
//! │        ▼          (delivery only)                                       │
//! │  fuel        = distance × 2 / km_per_litre × gas price                  │
//! │  delivery    = ceil(fuel / step) × step                                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  total       = round_up(drinks + ice + supplies + delivery)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic runs in `f64`, in the order above, and each displayed
//! figure is rounded up to the cent on its own. The rounded components
//! therefore do not always add up to the rounded total; that is what the
//! catering page has always shown and customers have been quoted.
//!
//! ## Example
//! ```rust
//! use mehfil_core::pricing::PricingConfig;
//! use mehfil_core::quote::{calculate_quote, QuoteInput};
//!
//! let quote = calculate_quote(&PricingConfig::default(), &QuoteInput::default());
//! assert_eq!(quote.cups_needed, 50);
//! assert_eq!(quote.total.cents(), 20000);
//! ```

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::PricingConfig;
use crate::validation::validate_quote_input;

// =============================================================================
// Form Choices
// =============================================================================

/// Cup volume in fluid ounces.
///
/// Serialized as the bare number (`12`); deserializes from `12`, `"12"`,
/// `"12oz"` or `"12 oz"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CupSize {
    #[default]
    Oz12,
    Oz16,
    Oz20,
}

impl CupSize {
    pub const ALL: [CupSize; 3] = [CupSize::Oz12, CupSize::Oz16, CupSize::Oz20];

    pub const fn ounces(&self) -> u32 {
        match self {
            CupSize::Oz12 => 12,
            CupSize::Oz16 => 16,
            CupSize::Oz20 => 20,
        }
    }

    pub fn from_ounces(oz: u32) -> Option<Self> {
        CupSize::ALL.into_iter().find(|size| size.ounces() == oz)
    }

    fn parse(text: &str) -> Option<Self> {
        let digits = text.trim().trim_end_matches("oz").trim();
        digits.parse::<u32>().ok().and_then(CupSize::from_ounces)
    }
}

impl fmt::Display for CupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} oz", self.ounces())
    }
}

impl Serialize for CupSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.ounces())
    }
}

impl<'de> Deserialize<'de> for CupSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CupSizeVisitor;

        impl<'de> Visitor<'de> for CupSizeVisitor {
            type Value = CupSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a cup size of 12, 16 or 20 ounces")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CupSize, E> {
                u32::try_from(v)
                    .ok()
                    .and_then(CupSize::from_ounces)
                    .ok_or_else(|| E::custom(format!("unsupported cup size {}", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CupSize, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("unsupported cup size {}", v)))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<CupSize, E> {
                if v.fract() == 0.0 && v >= 0.0 {
                    self.visit_u64(v as u64)
                } else {
                    Err(E::custom(format!("unsupported cup size {}", v)))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CupSize, E> {
                CupSize::parse(v).ok_or_else(|| E::custom(format!("unsupported cup size '{}'", v)))
            }
        }

        deserializer.deserialize_any(CupSizeVisitor)
    }
}

/// What the drinks are served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    #[default]
    PlasticCup,
    BubbleTeaSealed,
    PlasticCanSealed,
}

impl ContainerType {
    pub const fn label(&self) -> &'static str {
        match self {
            ContainerType::PlasticCup => "Plastic Cup",
            ContainerType::BubbleTeaSealed => "Bubble Tea Sealed",
            ContainerType::PlasticCanSealed => "Plastic Can Sealed",
        }
    }
}

/// How much of the service the customer takes on themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PackageStyle {
    BuildYourOwn,
    Hybrid,
    #[default]
    ReadyMade,
}

impl PackageStyle {
    /// Ice and cups/lids/straws can only be bought with these packages.
    /// Ready-made drinks arrive with both already included.
    pub const fn allows_add_ons(&self) -> bool {
        matches!(self, PackageStyle::BuildYourOwn | PackageStyle::Hybrid)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            PackageStyle::BuildYourOwn => "Build Your Own",
            PackageStyle::Hybrid => "Hybrid",
            PackageStyle::ReadyMade => "Ready Made",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMethod {
    #[default]
    Pickup,
    Delivery,
}

// =============================================================================
// Quote Input
// =============================================================================

/// The catering form as submitted.
///
/// Numeric fields are kept exactly as received (possibly NaN or negative);
/// [`calculate_quote`] coerces them. Keys missing from a JSON/TOML document
/// take the form's initial values ([`QuoteInput::default`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteInput {
    #[serde(deserialize_with = "lenient_number")]
    pub attendees: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub expected_drinkers: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub cups_per_drinker: f64,
    #[serde(rename = "cupSizeOz")]
    #[ts(type = "number")]
    pub cup_size: CupSize,
    pub container_type: ContainerType,
    pub package_style: PackageStyle,
    #[serde(deserialize_with = "lenient_flag")]
    pub include_ice: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub include_cups: bool,
    pub fulfillment_method: FulfillmentMethod,
    #[serde(deserialize_with = "lenient_number")]
    pub distance_one_way_km: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub gas_price_per_litre: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub vehicle_km_per_litre: f64,
}

impl Default for QuoteInput {
    fn default() -> Self {
        QuoteInput {
            attendees: 50.0,
            expected_drinkers: 50.0,
            cups_per_drinker: 1.0,
            cup_size: CupSize::Oz12,
            container_type: ContainerType::PlasticCup,
            package_style: PackageStyle::ReadyMade,
            include_ice: false,
            include_cups: false,
            fulfillment_method: FulfillmentMethod::Pickup,
            distance_one_way_km: 0.0,
            gas_price_per_litre: 1.5,
            vehicle_km_per_litre: 10.0,
        }
    }
}

/// A form field as it may arrive: number, numeric text, or nothing.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(f64),
    Text(String),
    Flag(bool),
}

/// Unparsable or empty values become NaN; the engine coerces from there.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Option::<RawField>::deserialize(deserializer)? {
        Some(RawField::Number(n)) => n,
        Some(RawField::Text(text)) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
        Some(RawField::Flag(_)) | None => f64::NAN,
    })
}

/// Checkbox values: booleans, or the usual truthy spellings.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<RawField>::deserialize(deserializer)? {
        Some(RawField::Flag(flag)) => flag,
        Some(RawField::Number(n)) => n != 0.0 && !n.is_nan(),
        Some(RawField::Text(text)) => matches!(
            text.trim().to_lowercase().as_str(),
            "true" | "on" | "yes" | "1"
        ),
        None => false,
    })
}

// =============================================================================
// Quote Result
// =============================================================================

/// Itemized catering price. Every amount is already rounded up to the cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub cups_needed: u32,
    pub price_per_cup: Money,
    pub drink_subtotal: Money,
    pub ice_total: Money,
    pub cups_addon_total: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

// =============================================================================
// Coercion
// =============================================================================

/// NaN, infinities and negatives become 0.
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Blank, zero or garbage means "one cup each"; a negative count clamps to 0.
fn cups_per_drinker(value: f64) -> f64 {
    if value.is_nan() || value == 0.0 {
        1.0
    } else {
        non_negative(value)
    }
}

/// A vehicle that covers no distance would make fuel infinite; treat it as 1.
fn km_per_litre(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Prices a catering order. Pure and infallible.
pub fn calculate_quote(pricing: &PricingConfig, input: &QuoteInput) -> QuoteResult {
    let attendees = non_negative(input.attendees);
    let expected_drinkers = non_negative(input.expected_drinkers);
    let drinkers = attendees.min(expected_drinkers);
    let cups_needed = (drinkers * cups_per_drinker(input.cups_per_drinker)).ceil();

    let size = input.cup_size;
    let price_per_cup =
        pricing.base_price_by_size.get(size) + pricing.container_upcharge.get(input.container_type);
    let drink_subtotal =
        cups_needed * price_per_cup * pricing.package_multiplier.get(input.package_style);

    let add_ons_allowed = input.package_style.allows_add_ons();

    let ice_total = if add_ons_allowed && input.include_ice {
        let ice = &pricing.ice;
        let per_cup = ice.bag_price * (ice.grams_by_size.get(size) / ice.bag_weight_grams) * ice.markup;
        cups_needed * per_cup
    } else {
        0.0
    };

    let cups_addon_total = if add_ons_allowed && input.include_cups {
        let supplies = &pricing.cups_addon;
        let per_cup = (supplies.cup_cost_by_size.get(size) + supplies.lid_cost + supplies.straw_cost)
            * supplies.markup;
        cups_needed * per_cup
    } else {
        0.0
    };

    let delivery_fee = match input.fulfillment_method {
        FulfillmentMethod::Pickup => 0.0,
        FulfillmentMethod::Delivery => {
            let round_trip_km = non_negative(input.distance_one_way_km) * 2.0;
            let litres_used = round_trip_km / km_per_litre(input.vehicle_km_per_litre);
            let fuel_cost = litres_used * non_negative(input.gas_price_per_litre);
            round_up_to_step(fuel_cost, pricing.delivery.round_step)
        }
    };

    let total = drink_subtotal + ice_total + cups_addon_total + delivery_fee;

    QuoteResult {
        cups_needed: cups_needed as u32,
        price_per_cup: Money::round_up_from_dollars(price_per_cup),
        drink_subtotal: Money::round_up_from_dollars(drink_subtotal),
        ice_total: Money::round_up_from_dollars(ice_total),
        cups_addon_total: Money::round_up_from_dollars(cups_addon_total),
        delivery_fee: Money::round_up_from_dollars(delivery_fee),
        total: Money::round_up_from_dollars(total),
    }
}

/// Rounds up to a multiple of `step`. A non-positive step disables rounding.
fn round_up_to_step(value: f64, step: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        (value / step).ceil() * step
    } else {
        value
    }
}

/// Validating wrapper: rejects the input [`calculate_quote`] would coerce.
///
/// Same math, same result; intended for API callers that would rather
/// hear about a typo than be quoted for zero cups.
pub fn calculate_quote_checked(
    pricing: &PricingConfig,
    input: &QuoteInput,
) -> Result<QuoteResult, ValidationError> {
    validate_quote_input(input)?;
    Ok(calculate_quote(pricing, input))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(input: &QuoteInput) -> QuoteResult {
        calculate_quote(&PricingConfig::default(), input)
    }

    #[test]
    fn test_form_defaults() {
        let result = quote(&QuoteInput::default());

        assert_eq!(result.cups_needed, 50);
        assert_eq!(result.price_per_cup.cents(), 400);
        assert_eq!(result.drink_subtotal.cents(), 20000);
        assert!(result.ice_total.is_zero());
        assert!(result.cups_addon_total.is_zero());
        assert!(result.delivery_fee.is_zero());
        assert_eq!(result.total.cents(), 20000);
    }

    #[test]
    fn test_build_your_own_with_ice() {
        let input = QuoteInput {
            package_style: PackageStyle::BuildYourOwn,
            include_ice: true,
            cup_size: CupSize::Oz16,
            ..QuoteInput::default()
        };
        let result = quote(&input);

        assert_eq!(result.price_per_cup.cents(), 450);
        assert_eq!(result.drink_subtotal.cents(), 22500);
        assert_eq!(result.ice_total.cents(), 1950);
        assert_eq!(result.total.cents(), 24450);
    }

    #[test]
    fn test_ready_made_ignores_add_on_flags() {
        let input = QuoteInput {
            include_ice: true,
            include_cups: true,
            ..QuoteInput::default()
        };
        let result = quote(&input);

        assert!(result.ice_total.is_zero());
        assert!(result.cups_addon_total.is_zero());
        assert_eq!(result.total.cents(), 20000);
    }

    #[test]
    fn test_delivery_fee_rounds_to_step() {
        let input = QuoteInput {
            fulfillment_method: FulfillmentMethod::Delivery,
            distance_one_way_km: 10.0,
            gas_price_per_litre: 1.5,
            vehicle_km_per_litre: 10.0,
            ..QuoteInput::default()
        };
        let result = quote(&input);

        assert_eq!(result.delivery_fee.cents(), 500);
        assert_eq!(result.total.cents(), 20500);
    }

    #[test]
    fn test_pickup_ignores_delivery_fields() {
        let input = QuoteInput {
            distance_one_way_km: 120.0,
            ..QuoteInput::default()
        };
        assert!(quote(&input).delivery_fee.is_zero());
    }

    #[test]
    fn test_components_round_independently() {
        let input = QuoteInput {
            attendees: 37.0,
            expected_drinkers: 40.0,
            cups_per_drinker: 1.5,
            cup_size: CupSize::Oz20,
            container_type: ContainerType::BubbleTeaSealed,
            package_style: PackageStyle::Hybrid,
            include_ice: true,
            include_cups: true,
            fulfillment_method: FulfillmentMethod::Delivery,
            distance_one_way_km: 23.0,
            gas_price_per_litre: 1.62,
            vehicle_km_per_litre: 11.0,
        };
        let result = quote(&input);

        assert_eq!(result.cups_needed, 56);
        assert_eq!(result.price_per_cup.cents(), 600);
        assert_eq!(result.drink_subtotal.cents(), 33600);
        assert_eq!(result.ice_total.cents(), 2731);
        assert_eq!(result.cups_addon_total.cents(), 1596);
        assert_eq!(result.delivery_fee.cents(), 1000);
        assert_eq!(result.total.cents(), 38926);

        let component_sum = result.drink_subtotal
            + result.ice_total
            + result.cups_addon_total
            + result.delivery_fee;
        assert_eq!(component_sum.cents(), 38927);
    }

    #[test]
    fn test_small_supplies_order_rounds_up() {
        let input = QuoteInput {
            attendees: 3.0,
            expected_drinkers: 3.0,
            package_style: PackageStyle::BuildYourOwn,
            include_cups: true,
            ..QuoteInput::default()
        };
        let result = quote(&input);

        assert_eq!(result.drink_subtotal.cents(), 1200);
        assert_eq!(result.cups_addon_total.cents(), 64);
        assert_eq!(result.total.cents(), 1263);
    }

    #[test]
    fn test_single_cup_of_ice_rounds_up() {
        let input = QuoteInput {
            attendees: 1.0,
            expected_drinkers: 1.0,
            package_style: PackageStyle::BuildYourOwn,
            include_ice: true,
            ..QuoteInput::default()
        };
        let result = quote(&input);

        assert_eq!(result.ice_total.cents(), 30);
        assert_eq!(result.total.cents(), 430);
    }

    #[test]
    fn test_drinkers_clamped_to_attendees() {
        let input = QuoteInput {
            attendees: 10.0,
            expected_drinkers: 25.0,
            cups_per_drinker: 1.25,
            container_type: ContainerType::PlasticCanSealed,
            ..QuoteInput::default()
        };
        let result = quote(&input);

        assert_eq!(result.cups_needed, 13);
        assert_eq!(result.price_per_cup.cents(), 550);
        assert_eq!(result.total.cents(), 7150);
    }

    #[test]
    fn test_bad_numbers_are_coerced_not_rejected() {
        let input = QuoteInput {
            attendees: f64::NAN,
            ..QuoteInput::default()
        };
        let result = quote(&input);
        assert_eq!(result.cups_needed, 0);
        assert!(result.total.is_zero());

        let input = QuoteInput {
            cups_per_drinker: 0.0,
            ..QuoteInput::default()
        };
        assert_eq!(quote(&input).cups_needed, 50);

        let input = QuoteInput {
            attendees: -5.0,
            ..QuoteInput::default()
        };
        assert_eq!(quote(&input).cups_needed, 0);

        let input = QuoteInput {
            fulfillment_method: FulfillmentMethod::Delivery,
            distance_one_way_km: 10.0,
            gas_price_per_litre: 1.5,
            vehicle_km_per_litre: 0.0,
            ..QuoteInput::default()
        };
        // 20 km at 1 km/L and $1.50/L = $30
        assert_eq!(quote(&input).delivery_fee.cents(), 3000);
    }

    #[test]
    fn test_same_input_same_result() {
        let input = QuoteInput {
            package_style: PackageStyle::Hybrid,
            include_ice: true,
            include_cups: true,
            ..QuoteInput::default()
        };
        assert_eq!(quote(&input), quote(&input));
    }

    #[test]
    fn test_override_changes_delivery_step() {
        let mut pricing = PricingConfig::default();
        pricing.delivery.round_step = 10.0;
        let input = QuoteInput {
            fulfillment_method: FulfillmentMethod::Delivery,
            distance_one_way_km: 10.0,
            ..QuoteInput::default()
        };

        let result = calculate_quote(&pricing, &input);
        assert_eq!(result.delivery_fee.cents(), 1000);
    }

    #[test]
    fn test_non_positive_step_charges_raw_fuel() {
        let mut pricing = PricingConfig::default();
        pricing.delivery.round_step = 0.0;
        let input = QuoteInput {
            fulfillment_method: FulfillmentMethod::Delivery,
            distance_one_way_km: 10.0,
            ..QuoteInput::default()
        };

        assert_eq!(calculate_quote(&pricing, &input).delivery_fee.cents(), 300);
    }

    #[test]
    fn test_form_json_is_lenient() {
        let json = r#"{
            "attendees": "20",
            "expectedDrinkers": 18,
            "cupsPerDrinker": "",
            "cupSizeOz": "16oz",
            "packageStyle": "build_your_own",
            "includeIce": "on",
            "distanceOneWayKm": null
        }"#;
        let input: QuoteInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.attendees, 20.0);
        assert!(input.cups_per_drinker.is_nan());
        assert_eq!(input.cup_size, CupSize::Oz16);
        assert!(input.include_ice);
        assert!(!input.include_cups);
        assert_eq!(input.gas_price_per_litre, 1.5);

        assert_eq!(quote(&input).cups_needed, 18);
    }

    #[test]
    fn test_unknown_cup_size_rejected_at_parse() {
        let json = r#"{ "cupSizeOz": 32 }"#;
        assert!(serde_json::from_str::<QuoteInput>(json).is_err());
    }

    #[test]
    fn test_checked_wrapper() {
        let input = QuoteInput {
            attendees: -1.0,
            ..QuoteInput::default()
        };
        assert!(calculate_quote_checked(&PricingConfig::default(), &input).is_err());

        let result = calculate_quote_checked(&PricingConfig::default(), &QuoteInput::default()).unwrap();
        assert_eq!(result, quote(&QuoteInput::default()));
    }
}
