//! Shipping fee calculation.
//!
//! Fee = base fee for the destination city + per-kilogram surcharge. Weight
//! is a proxy: every unit counts as [`DEFAULT_ITEM_WEIGHT_GRAMS`] because
//! products carry no weight field yet. The total weight is rounded up to
//! whole kilograms before the rate applies.

use std::collections::BTreeMap;

use crate::cart::CartLineItem;
use crate::checkout::Address;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Weight assumed for one unit of any product.
pub const DEFAULT_ITEM_WEIGHT_GRAMS: u64 = 500;

/// Surcharge per started kilogram.
pub const DEFAULT_PER_KG_RATE: Money = Money::new(5_000);

/// Base fee for cities missing from the table.
pub const DEFAULT_BASE_FEE: Money = Money::new(30_000);

const DEFAULT_CITY_FEES: &[(&str, i64)] = &[
    ("Hồ Chí Minh", 15_000),
    ("Hà Nội", 25_000),
    ("Đà Nẵng", 20_000),
    ("Cần Thơ", 20_000),
    ("Hải Phòng", 25_000),
];

const CITY_PREFIXES: &[&str] = &["thành phố ", "tp. ", "tp.", "tp ", "tỉnh "];

/// Shipping rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingRates {
    /// Base fee by city name.
    pub city_fees: BTreeMap<String, Money>,
    /// Base fee for unlisted cities.
    pub default_fee: Money,
    /// Surcharge per started kilogram.
    pub per_kg_rate: Money,
    /// Weight proxy per unit.
    pub item_weight_grams: u64,
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            city_fees: DEFAULT_CITY_FEES
                .iter()
                .map(|(city, fee)| (city.to_string(), Money::new(*fee)))
                .collect(),
            default_fee: DEFAULT_BASE_FEE,
            per_kg_rate: DEFAULT_PER_KG_RATE,
            item_weight_grams: DEFAULT_ITEM_WEIGHT_GRAMS,
        }
    }
}

impl ShippingRates {
    /// Base fee for a destination city.
    pub fn base_fee(&self, city: &str) -> Money {
        let wanted = normalize_city(city);
        self.city_fees
            .iter()
            .find(|(name, _)| normalize_city(name) == wanted)
            .map(|(_, fee)| *fee)
            .unwrap_or(self.default_fee)
    }

    /// Proxy weight of the given items.
    pub fn total_weight_grams<'a>(&self, items: impl IntoIterator<Item = &'a CartLineItem>) -> u64 {
        total_units(items).saturating_mul(self.item_weight_grams)
    }

    /// Fee for a number of units shipped to a city. Zero units ship free.
    pub fn fee_for_units(&self, city: &str, units: u64) -> Money {
        if units == 0 {
            return Money::ZERO;
        }
        let grams = units.saturating_mul(self.item_weight_grams);
        let kilograms = i64::try_from(grams.div_ceil(1_000)).unwrap_or(i64::MAX);
        let weight_fee = self.per_kg_rate.saturating_mul(kilograms);
        Money::new(self.base_fee(city).amount().saturating_add(weight_fee.amount()))
    }

    /// Fee for shipping `items` to `address`.
    pub fn calculate_fee<'a>(
        &self,
        address: &Address,
        items: impl IntoIterator<Item = &'a CartLineItem>,
    ) -> Money {
        self.fee_for_units(&address.city, total_units(items))
    }
}

/// Fee using the default rate table.
pub fn calculate_fee<'a>(address: &Address, items: impl IntoIterator<Item = &'a CartLineItem>) -> Money {
    ShippingRates::default().calculate_fee(address, items)
}

fn total_units<'a>(items: impl IntoIterator<Item = &'a CartLineItem>) -> u64 {
    items
        .into_iter()
        .map(|i| u64::try_from(i.quantity).unwrap_or(0))
        .fold(0, u64::saturating_add)
}

/// Lowercase, collapse whitespace and drop administrative prefixes.
fn normalize_city(city: &str) -> String {
    let lowered = city
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    for prefix in CITY_PREFIXES {
        if let Some(rest) = lowered.strip_prefix(*prefix) {
            return rest.trim().to_string();
        }
    }
    lowered
}
