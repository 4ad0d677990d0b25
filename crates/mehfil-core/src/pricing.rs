//! # Catering Pricing Table
//!
//! Every rate the quote engine multiplies by. Nothing in
//! [`crate::quote`] hard-codes a dollar figure; it all comes from here.
//!
//! ## Overrides
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [pricing.base_price_by_size]      ◄── only the keys you name change    │
//! │  "20" = 5.75                                                            │
//! │                                                                         │
//! │  [pricing.delivery]                                                     │
//! │  round_step = 10.0                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every table is `#[serde(default)]` with its own storefront defaults, so
//! an override file that names one key leaves every other key untouched.
//! Rates are plain `f64` dollars: the engine runs the storefront's float
//! arithmetic and only converts to [`crate::money::Money`] at the end.

use serde::{Deserialize, Serialize};

use crate::quote::{ContainerType, CupSize, PackageStyle};

/// Defines a per-cup-size rate table with its storefront defaults.
macro_rules! size_table {
    ($(#[$meta:meta])* $name:ident { $oz12:expr, $oz16:expr, $oz20:expr }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            #[serde(rename = "12")]
            pub oz12: f64,
            #[serde(rename = "16")]
            pub oz16: f64,
            #[serde(rename = "20")]
            pub oz20: f64,
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    oz12: $oz12,
                    oz16: $oz16,
                    oz20: $oz20,
                }
            }
        }

        impl $name {
            pub fn get(&self, size: CupSize) -> f64 {
                match size {
                    CupSize::Oz12 => self.oz12,
                    CupSize::Oz16 => self.oz16,
                    CupSize::Oz20 => self.oz20,
                }
            }

            fn values(&self) -> [f64; 3] {
                [self.oz12, self.oz16, self.oz20]
            }
        }
    };
}

size_table!(
    /// Base dollar price of one drink, by cup size.
    BasePrices { 4.00, 4.50, 5.50 }
);

size_table!(
    /// Grams of ice poured into one cup, by cup size.
    IceGrams { 150.0, 200.0, 250.0 }
);

size_table!(
    /// Wholesale cost of one empty cup, by cup size.
    CupCosts { 0.09, 0.09, 0.14 }
);

// =============================================================================
// Keyed Tables
// =============================================================================

/// Additive dollar upcharge per drink, by container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerUpcharges {
    pub plastic_cup: f64,
    pub bubble_tea_sealed: f64,
    pub plastic_can_sealed: f64,
}

impl Default for ContainerUpcharges {
    fn default() -> Self {
        ContainerUpcharges {
            plastic_cup: 0.00,
            bubble_tea_sealed: 0.50,
            plastic_can_sealed: 1.50,
        }
    }
}

impl ContainerUpcharges {
    pub fn get(&self, container: ContainerType) -> f64 {
        match container {
            ContainerType::PlasticCup => self.plastic_cup,
            ContainerType::BubbleTeaSealed => self.bubble_tea_sealed,
            ContainerType::PlasticCanSealed => self.plastic_can_sealed,
        }
    }
}

/// Drink subtotal multiplier, by package style.
///
/// All 1.0 today; kept so package styles can be priced apart later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageMultipliers {
    pub build_your_own: f64,
    pub hybrid: f64,
    pub ready_made: f64,
}

impl Default for PackageMultipliers {
    fn default() -> Self {
        PackageMultipliers {
            build_your_own: 1.0,
            hybrid: 1.0,
            ready_made: 1.0,
        }
    }
}

impl PackageMultipliers {
    pub fn get(&self, style: PackageStyle) -> f64 {
        match style {
            PackageStyle::BuildYourOwn => self.build_your_own,
            PackageStyle::Hybrid => self.hybrid,
            PackageStyle::ReadyMade => self.ready_made,
        }
    }
}

// =============================================================================
// Add-on and Delivery Parameters
// =============================================================================

/// Ice add-on: bagged ice resold by the gram with a markup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceConfig {
    pub bag_price: f64,
    pub bag_weight_grams: f64,
    pub markup: f64,
    pub grams_by_size: IceGrams,
}

impl Default for IceConfig {
    fn default() -> Self {
        IceConfig {
            bag_price: 2.99,
            bag_weight_grams: 2300.0,
            markup: 1.5,
            grams_by_size: IceGrams::default(),
        }
    }
}

/// Cups, lids and straws add-on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CupsAddonConfig {
    pub cup_cost_by_size: CupCosts,
    pub lid_cost: f64,
    pub straw_cost: f64,
    pub markup: f64,
}

impl Default for CupsAddonConfig {
    fn default() -> Self {
        CupsAddonConfig {
            cup_cost_by_size: CupCosts::default(),
            lid_cost: 0.04,
            straw_cost: 0.01,
            markup: 1.5,
        }
    }
}

/// Delivery fees are fuel cost rounded up to a multiple of `round_step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub round_step: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig { round_step: 5.0 }
    }
}

// =============================================================================
// Pricing Config
// =============================================================================

/// The full pricing table the quote engine reads.
///
/// `PricingConfig::default()` is the table published on the catering page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub base_price_by_size: BasePrices,
    pub container_upcharge: ContainerUpcharges,
    pub package_multiplier: PackageMultipliers,
    pub ice: IceConfig,
    pub cups_addon: CupsAddonConfig,
    pub delivery: DeliveryConfig,
}

impl PricingConfig {
    /// Lists the problems with an override that would make quotes
    /// meaningless (negative rates, a zero-weight ice bag).
    ///
    /// Returns an empty list for a usable table. The engine itself never
    /// calls this; the application checks it once at load time.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let mut non_negative = |name: &str, value: f64| {
            if !value.is_finite() || value < 0.0 {
                problems.push(format!("{} must be a non-negative number (got {})", name, value));
            }
        };

        for (size, price) in CupSize::ALL.iter().zip(self.base_price_by_size.values()) {
            non_negative(&format!("base_price_by_size.{}", size.ounces()), price);
        }
        for (size, grams) in CupSize::ALL.iter().zip(self.ice.grams_by_size.values()) {
            non_negative(&format!("ice.grams_by_size.{}", size.ounces()), grams);
        }
        for (size, cost) in CupSize::ALL.iter().zip(self.cups_addon.cup_cost_by_size.values()) {
            non_negative(&format!("cups_addon.cup_cost_by_size.{}", size.ounces()), cost);
        }
        non_negative("container_upcharge.plastic_cup", self.container_upcharge.plastic_cup);
        non_negative("container_upcharge.bubble_tea_sealed", self.container_upcharge.bubble_tea_sealed);
        non_negative("container_upcharge.plastic_can_sealed", self.container_upcharge.plastic_can_sealed);
        non_negative("package_multiplier.build_your_own", self.package_multiplier.build_your_own);
        non_negative("package_multiplier.hybrid", self.package_multiplier.hybrid);
        non_negative("package_multiplier.ready_made", self.package_multiplier.ready_made);
        non_negative("ice.bag_price", self.ice.bag_price);
        non_negative("ice.markup", self.ice.markup);
        non_negative("cups_addon.lid_cost", self.cups_addon.lid_cost);
        non_negative("cups_addon.straw_cost", self.cups_addon.straw_cost);
        non_negative("cups_addon.markup", self.cups_addon.markup);

        if !(self.ice.bag_weight_grams.is_finite() && self.ice.bag_weight_grams > 0.0) {
            problems.push(format!(
                "ice.bag_weight_grams must be positive (got {})",
                self.ice.bag_weight_grams
            ));
        }
        if !(self.delivery.round_step.is_finite() && self.delivery.round_step > 0.0) {
            problems.push(format!(
                "delivery.round_step must be positive (got {})",
                self.delivery.round_step
            ));
        }

        problems
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
