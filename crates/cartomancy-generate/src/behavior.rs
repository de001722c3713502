//! Browsing session simulation.
//!
//! One invocation builds one session: a page-view timeline partitioned
//! from a random duration, a first-order Markov walk over page types, a
//! speculatively built cart, and a conversion decision. The ledger is
//! only read here; stock moves later, when the checkout stage commits the
//! cart. Two sessions built back-to-back can therefore both see the same
//! available stock, and the commit-time re-check is what resolves that
//! contention.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use fake::Fake;
use fake::faker::internet::en::IPv4;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use cartomancy_core::{
    Browser, CartEntry, Category, ConversionStatus, DeviceOs, DeviceProfile, DeviceType, PageType,
    PageView, Product, Referrer, Session, SessionGeo, User,
};

use crate::inventory::InventoryLedger;
use crate::model::GenerateOptions;
use crate::sampling;

const DURATION_MIN: u32 = 30;
const DURATION_MAX: u32 = 3600;
const VIEW_TARGET_MIN: u32 = 4;
const VIEW_TARGET_MAX: u32 = 14;
/// Product draws to attempt before settling for an unavailable one.
const DETAIL_DRAW_LIMIT: u32 = 5;
const CART_ADD_RATE: f64 = 0.30;
/// Units one cart addition may request.
const MAX_LINE_UNITS: u32 = 3;

const BASE_CONVERSION: f64 = 0.05;
const CART_CONVERSION: f64 = 0.20;
const CHECKOUT_CONVERSION: f64 = 0.45;

const AFTER_CART: [(PageType, f64); 3] = [
    (PageType::Checkout, 0.35),
    (PageType::ProductDetail, 0.40),
    (PageType::Search, 0.25),
];
const AFTER_CHECKOUT: [(PageType, f64); 3] = [
    (PageType::Checkout, 0.20),
    (PageType::Cart, 0.30),
    (PageType::ProductDetail, 0.50),
];
const BROWSE_MOVES: [(PageType, f64); 4] = [
    (PageType::Search, 0.20),
    (PageType::CategoryListing, 0.25),
    (PageType::ProductDetail, 0.40),
    (PageType::Cart, 0.15),
];
const REFERRERS: [(Referrer, f64); 4] = [
    (Referrer::Direct, 0.35),
    (Referrer::SearchEngine, 0.35),
    (Referrer::SocialMedia, 0.20),
    (Referrer::EmailCampaign, 0.10),
];

/// Simulates one session for `user`.
///
/// The returned record already carries its final conversion status except
/// for one case: a `Converted` session whose cart later fails to reserve
/// any stock is downgraded by the checkout stage.
pub fn simulate_session(
    user: &User,
    products: &[Product],
    categories: &[Category],
    ledger: &InventoryLedger,
    options: &GenerateOptions,
    rng: &mut ChaCha8Rng,
) -> Session {
    let session_id = format!("sess_{}", sampling::hex_suffix(rng, 10));
    let duration_seconds = rng.random_range(DURATION_MIN..=DURATION_MAX);
    // The start draw leaves room for the whole visit, so no session (or the
    // transaction stamped with its end) ever runs past the reference date.
    let latest_start = options.reference_date - Duration::seconds(i64::from(duration_seconds));
    let start_time = sampling::datetime_between(rng, options.window_start(), latest_start);
    let end_time = start_time + Duration::seconds(i64::from(duration_seconds));

    let device_profile = DeviceProfile {
        device_type: *sampling::pick(rng, &DeviceType::ALL),
        os: *sampling::pick(rng, &DeviceOs::ALL),
        browser: *sampling::pick(rng, &Browser::ALL),
    };
    let geo_data = SessionGeo {
        city: user.geo_data.city.clone(),
        state: user.geo_data.state.clone(),
        country: user.geo_data.country.clone(),
        ip_address: IPv4().fake_with_rng(rng),
    };

    let slots = view_slots(duration_seconds, rng);
    let mut page_views = Vec::with_capacity(slots.len() - 1);
    let mut viewed_products = BTreeSet::new();
    let mut cart: BTreeMap<String, CartEntry> = BTreeMap::new();
    let mut previous = None;
    let mut did_checkout = false;

    for (slot, bounds) in slots.windows(2).enumerate() {
        let page_type = next_page_type(slot, previous, rng);
        let mut product_id = None;
        let mut category_id = None;

        match page_type {
            PageType::CategoryListing => {
                category_id = Some(sampling::pick(rng, categories).category_id.clone());
            }
            PageType::ProductDetail => {
                let product = pick_detail_product(products, ledger, rng);
                viewed_products.insert(product.product_id.clone());
                if rng.random_bool(CART_ADD_RATE) {
                    add_to_cart(&mut cart, product, ledger, rng);
                }
                product_id = Some(product.product_id.clone());
                category_id = Some(product.category_id.clone());
            }
            PageType::Checkout => did_checkout = true,
            _ => {}
        }

        page_views.push(PageView {
            timestamp: start_time + Duration::seconds(i64::from(bounds[0])),
            page_type,
            product_id,
            category_id,
            view_duration: bounds[1] - bounds[0],
        });
        previous = Some(page_type);
    }

    let has_cart = cart.values().any(|entry| entry.quantity > 0);
    let mut probability = BASE_CONVERSION;
    if has_cart {
        probability = CART_CONVERSION;
    }
    if has_cart && did_checkout {
        probability = CHECKOUT_CONVERSION;
    }
    // The draw is consumed even without a cart; converting still requires one.
    let converted = rng.random_bool(probability) && has_cart;
    let conversion_status = if converted {
        ConversionStatus::Converted
    } else if has_cart {
        ConversionStatus::AbandonedCart
    } else {
        ConversionStatus::Browsing
    };
    let referrer = sampling::sample_weighted(rng, &REFERRERS);

    cart.retain(|_, entry| entry.quantity > 0);

    Session {
        session_id,
        user_id: user.user_id.clone(),
        start_time,
        end_time,
        duration_seconds,
        geo_data,
        device_profile,
        viewed_products,
        page_views,
        cart_contents: cart,
        conversion_status,
        referrer,
    }
}

/// Partitions `duration` into ascending slot boundaries: 0, the duration,
/// and up to 13 deduplicated interior cut points. Consecutive pairs become
/// page views, so colliding cuts simply yield fewer views.
fn view_slots(duration: u32, rng: &mut ChaCha8Rng) -> Vec<u32> {
    let target = rng.random_range(VIEW_TARGET_MIN..=VIEW_TARGET_MAX);
    let mut cuts = BTreeSet::from([0, duration]);
    for _ in 1..target {
        cuts.insert(rng.random_range(1..=duration - 1));
    }
    cuts.into_iter().collect()
}

/// First-order Markov step over page types. The first slot is always the
/// landing page; cart and checkout pages bias the next move toward
/// finishing the purchase.
fn next_page_type(slot: usize, previous: Option<PageType>, rng: &mut ChaCha8Rng) -> PageType {
    if slot == 0 {
        return PageType::Home;
    }
    match previous {
        Some(PageType::Cart) => sampling::sample_weighted(rng, &AFTER_CART),
        Some(PageType::Checkout) => sampling::sample_weighted(rng, &AFTER_CHECKOUT),
        _ => sampling::sample_weighted(rng, &BROWSE_MOVES),
    }
}

/// Draws up to [`DETAIL_DRAW_LIMIT`] products, stopping at the first one
/// the ledger can still sell. If every draw is unavailable the last one is
/// accepted as-is: browsing dead stock is legitimate behavior.
fn pick_detail_product<'a>(
    products: &'a [Product],
    ledger: &InventoryLedger,
    rng: &mut ChaCha8Rng,
) -> &'a Product {
    let mut product = sampling::pick(rng, products);
    for _ in 1..DETAIL_DRAW_LIMIT {
        if ledger.available(&product.product_id, 1) {
            break;
        }
        product = sampling::pick(rng, products);
    }
    product
}

/// Soft reservation: sizes a cart line against the ledger's current view
/// without mutating it. The line keeps the price seen at first add.
fn add_to_cart(
    cart: &mut BTreeMap<String, CartEntry>,
    product: &Product,
    ledger: &InventoryLedger,
    rng: &mut ChaCha8Rng,
) {
    let entry = cart.entry(product.product_id.clone()).or_insert(CartEntry {
        quantity: 0,
        price: product.base_price,
    });
    let remaining = ledger
        .current_stock(&product.product_id)
        .saturating_sub(entry.quantity);
    if remaining > 0 {
        entry.quantity += rng.random_range(1..=remaining.min(MAX_LINE_UNITS));
    }
}
