//! Browsing session records.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of page a [`PageView`] landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Home,
    Search,
    CategoryListing,
    ProductDetail,
    Cart,
    Checkout,
}

/// How the visitor reached the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Referrer {
    Direct,
    SearchEngine,
    SocialMedia,
    EmailCampaign,
}

/// Outcome of a session.
///
/// `Converted` is only valid when the session also produced a transaction;
/// a checkout that could not reserve any stock is downgraded to
/// `AbandonedCart` before the session is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Converted,
    AbandonedCart,
    Browsing,
}

/// Device form factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Mobile,
    Desktop,
    Tablet,
}

impl DeviceType {
    pub const ALL: [DeviceType; 3] = [DeviceType::Mobile, DeviceType::Desktop, DeviceType::Tablet];
}

/// Operating system reported by the device.
///
/// Serialized names keep vendor casing (`iOS`, `macOS`), so the variants
/// carry explicit renames instead of a container-level rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DeviceOs {
    #[serde(rename = "iOS")]
    Ios,
    Android,
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
}

impl DeviceOs {
    pub const ALL: [DeviceOs; 5] = [
        DeviceOs::Ios,
        DeviceOs::Android,
        DeviceOs::Windows,
        DeviceOs::MacOs,
        DeviceOs::Linux,
    ];
}

/// Browser reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Browser {
    Chrome,
    Safari,
    Firefox,
    Edge,
}

impl Browser {
    pub const ALL: [Browser; 4] = [
        Browser::Chrome,
        Browser::Safari,
        Browser::Firefox,
        Browser::Edge,
    ];
}

/// Device the session ran on. Fields are drawn independently, so
/// implausible combinations such as Safari on Linux do occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceProfile {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub os: DeviceOs,
    pub browser: Browser,
}

/// Location a session originated from, with the client address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionGeo {
    pub city: String,
    pub state: String,
    pub country: String,
    pub ip_address: String,
}

/// Single page impression within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageView {
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub timestamp: NaiveDateTime,
    pub page_type: PageType,
    /// Product on the page; `null` for every page type except
    /// `product_detail`, and emitted explicitly rather than omitted.
    pub product_id: Option<String>,
    /// Category binding, set on `product_detail` (the product's category)
    /// and `category_listing` pages; `null` everywhere else.
    pub category_id: Option<String>,
    /// Seconds spent on the page.
    pub view_duration: u32,
}

/// Line in a session cart, keyed by product id in [`Session::cart_contents`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CartEntry {
    pub quantity: u32,
    /// Unit price at the moment the product was first carted.
    pub price: f64,
}

/// One visit by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Session {
    /// Identifier, `sess_` followed by ten hex digits.
    pub session_id: String,
    /// Visiting user; must resolve against the user file.
    pub user_id: String,
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub start_time: NaiveDateTime,
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub end_time: NaiveDateTime,
    /// Whole seconds between start and end.
    pub duration_seconds: u32,
    pub geo_data: SessionGeo,
    pub device_profile: DeviceProfile,
    /// Distinct products seen on `product_detail` pages, sorted.
    pub viewed_products: BTreeSet<String>,
    /// Page impressions in chronological order; the first is always `home`.
    pub page_views: Vec<PageView>,
    /// Cart at session end, only lines with positive quantity.
    pub cart_contents: BTreeMap<String, CartEntry>,
    pub conversion_status: ConversionStatus,
    pub referrer: Referrer,
}
