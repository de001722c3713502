//! Catalog and customer records.
//!
//! These are the reference entities the rest of the dataset points into:
//! sessions and transactions carry `product_id` and `user_id` values that
//! must resolve against the records defined here. Field order on each
//! struct is the order the fields appear in the emitted JSON objects.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Top-level product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    /// Stable identifier, `cat_` followed by a zero-padded ordinal.
    pub category_id: String,
    /// Display name.
    pub name: String,
    /// Nested subcategories; every category has at least one.
    pub subcategories: Vec<Subcategory>,
}

/// Subcategory nested inside a [`Category`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Subcategory {
    /// Identifier embedding the parent ordinal, e.g. `sub_003_01`.
    pub subcategory_id: String,
    pub name: String,
    /// Margin fraction in `[0.10, 0.40]`, two decimal places.
    pub profit_margin: f64,
}

/// One entry in a product's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PricePoint {
    pub price: f64,
    /// When this price took effect.
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub date: NaiveDateTime,
}

/// Sellable product.
///
/// `current_stock` and `is_active` are snapshots: the catalog file is
/// rewritten at the end of a run so both reflect the state after all
/// transactions have been applied, not the state at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    /// Stable identifier, `prod_` followed by a zero-padded ordinal.
    pub product_id: String,
    pub name: String,
    /// Parent category; must resolve against the category file.
    pub category_id: String,
    /// Subcategory within `category_id`.
    pub subcategory_id: String,
    /// Current list price, equal to the last entry of `price_history`.
    pub base_price: f64,
    /// Units on hand.
    pub current_stock: u32,
    /// Whether the product can appear in carts. Always `false` when
    /// `current_stock` is zero.
    pub is_active: bool,
    /// Price changes in ascending date order; never empty.
    pub price_history: Vec<PricePoint>,
    /// Date of the first price point.
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub creation_date: NaiveDateTime,
}

impl Product {
    /// Current list price. Falls back to `base_price` if the history is
    /// somehow empty, though generated products always carry one entry.
    pub fn current_price(&self) -> f64 {
        self.price_history.last().map_or(self.base_price, |p| p.price)
    }
}

/// Coarse location attached to a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoData {
    pub city: String,
    /// Two-letter state or region abbreviation.
    pub state: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

/// Registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct User {
    /// Stable identifier, `user_` followed by a zero-padded ordinal.
    pub user_id: String,
    pub geo_data: GeoData,
    /// When the account was created; always before `last_active`.
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub registration_date: NaiveDateTime,
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub last_active: NaiveDateTime,
}
