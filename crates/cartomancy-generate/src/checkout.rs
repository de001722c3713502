//! Checkout: turns carts into transactions and synthesizes orphan orders.
//!
//! This is the only place stock is actually reserved. Cart lines that fail
//! the live reservation are dropped rather than partially filled, and a
//! converted session whose every line fails is downgraded on the spot.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use cartomancy_core::money::round_cents;
use cartomancy_core::{
    ConversionStatus, LineItem, PaymentMethod, Product, Session, Transaction, TransactionStatus,
    User,
};

use crate::inventory::InventoryLedger;
use crate::model::GenerateOptions;
use crate::sampling;

const DISCOUNT_PROB: f64 = 0.20;
const DISCOUNT_RATES: [f64; 4] = [0.05, 0.10, 0.15, 0.20];
/// Line items an orphan order aims for.
const ORPHAN_LINES_MAX: usize = 3;
/// Units a single order line may carry.
const LINE_UNITS_MAX: u32 = 3;

/// Commits a converted session's cart against the ledger.
///
/// Lines are reserved in product-id order. Any line the ledger refuses is
/// dropped; if none survive, the session is downgraded to `AbandonedCart`
/// and no transaction is produced.
pub fn commit_cart(
    session: &mut Session,
    ledger: &mut InventoryLedger,
    rng: &mut ChaCha8Rng,
) -> Option<Transaction> {
    let mut items = Vec::with_capacity(session.cart_contents.len());
    for (product_id, entry) in &session.cart_contents {
        if !ledger.reserve(product_id, entry.quantity) {
            continue;
        }
        items.push(LineItem {
            product_id: product_id.clone(),
            quantity: entry.quantity,
            unit_price: entry.price,
            subtotal: round_cents(f64::from(entry.quantity) * entry.price),
        });
    }
    if items.is_empty() {
        session.conversion_status = ConversionStatus::AbandonedCart;
        return None;
    }

    let (subtotal, discount, total) = discounted_totals(&items, rng);
    Some(Transaction {
        transaction_id: format!("txn_{}", sampling::hex_suffix(rng, 12)),
        session_id: Some(session.session_id.clone()),
        user_id: session.user_id.clone(),
        timestamp: session.end_time,
        items,
        subtotal,
        discount,
        total,
        payment_method: *sampling::pick(rng, &PaymentMethod::ALL),
        status: *sampling::pick(rng, &TransactionStatus::ALL),
    })
}

/// Synthesizes a transaction with no backing session.
///
/// Aims for one to three lines, drawing up to three candidates per line
/// and skipping products the ledger cannot sell. Returns `None` when no
/// line could be reserved at all.
pub fn orphan_transaction(
    user: &User,
    products: &[Product],
    ledger: &mut InventoryLedger,
    options: &GenerateOptions,
    rng: &mut ChaCha8Rng,
) -> Option<Transaction> {
    let target = rng.random_range(1..=ORPHAN_LINES_MAX);
    let mut items = Vec::with_capacity(target);
    for _ in 0..target * 3 {
        if items.len() >= target {
            break;
        }
        let product = sampling::pick(rng, products);
        if !ledger.available(&product.product_id, 1) {
            continue;
        }
        let quantity = rng.random_range(1..=LINE_UNITS_MAX);
        if ledger.reserve(&product.product_id, quantity) {
            items.push(LineItem {
                product_id: product.product_id.clone(),
                quantity,
                unit_price: product.base_price,
                subtotal: round_cents(f64::from(quantity) * product.base_price),
            });
        }
    }
    if items.is_empty() {
        return None;
    }

    let (subtotal, discount, total) = discounted_totals(&items, rng);
    Some(Transaction {
        transaction_id: format!("txn_{}", sampling::hex_suffix(rng, 12)),
        session_id: None,
        user_id: user.user_id.clone(),
        timestamp: sampling::datetime_between(
            rng,
            options.window_start(),
            options.reference_date,
        ),
        items,
        subtotal,
        discount,
        total,
        payment_method: *sampling::pick(rng, &PaymentMethod::ALL),
        status: *sampling::pick(rng, &TransactionStatus::ALL),
    })
}

/// Totals an order from its already-rounded line subtotals and applies an
/// occasional percentage discount.
fn discounted_totals(items: &[LineItem], rng: &mut ChaCha8Rng) -> (f64, f64, f64) {
    let subtotal = round_cents(items.iter().map(|item| item.subtotal).sum());
    let mut discount = 0.0;
    if rng.random_bool(DISCOUNT_PROB) {
        let rate = *sampling::pick(rng, &DISCOUNT_RATES);
        discount = round_cents(subtotal * rate);
    }
    let total = round_cents(subtotal - discount);
    (subtotal, discount, total)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cartomancy_core::timestamp;
    use cartomancy_core::{
        CartEntry, DeviceOs, DeviceProfile, DeviceType, GeoData, PricePoint, Referrer, SessionGeo,
    };

    use crate::model::GenerateOptions;
    use crate::sampling::stream_rng;

    use super::*;

    fn product(id: &str, price: f64, stock: u32) -> Product {
        let listed = timestamp::parse("2024-10-01T08:30:00").unwrap();
        Product {
            product_id: id.to_string(),
            name: "Test Widget".to_string(),
            category_id: "cat_000".to_string(),
            subcategory_id: "sub_000_00".to_string(),
            base_price: price,
            current_stock: stock,
            is_active: stock > 0,
            price_history: vec![PricePoint { price, date: listed }],
            creation_date: listed,
        }
    }

    fn user() -> User {
        User {
            user_id: "user_000000".to_string(),
            geo_data: GeoData {
                city: "Omaha".to_string(),
                state: "NE".to_string(),
                country: "US".to_string(),
            },
            registration_date: timestamp::parse("2024-06-01T09:00:00").unwrap(),
            last_active: timestamp::parse("2024-12-30T18:00:00").unwrap(),
        }
    }

    fn converted_session(cart: BTreeMap<String, CartEntry>) -> Session {
        Session {
            session_id: "sess_0123456789".to_string(),
            user_id: "user_000000".to_string(),
            start_time: timestamp::parse("2024-12-31T10:00:00").unwrap(),
            end_time: timestamp::parse("2024-12-31T10:20:00").unwrap(),
            duration_seconds: 1200,
            geo_data: SessionGeo {
                city: "Omaha".to_string(),
                state: "NE".to_string(),
                country: "US".to_string(),
                ip_address: "10.0.0.1".to_string(),
            },
            device_profile: DeviceProfile {
                device_type: DeviceType::Desktop,
                os: DeviceOs::Linux,
                browser: cartomancy_core::Browser::Firefox,
            },
            viewed_products: cart.keys().cloned().collect(),
            page_views: Vec::new(),
            cart_contents: cart,
            conversion_status: ConversionStatus::Converted,
            referrer: Referrer::Direct,
        }
    }

    #[test]
    fn commit_reserves_lines_in_product_order() {
        let products = vec![product("prod_00000", 10.0, 5), product("prod_00001", 4.0, 5)];
        let mut ledger = InventoryLedger::from_products(&products);
        let mut rng = stream_rng(7, "commit");

        let mut cart = BTreeMap::new();
        cart.insert(
            "prod_00001".to_string(),
            CartEntry { quantity: 2, price: 4.0 },
        );
        cart.insert(
            "prod_00000".to_string(),
            CartEntry { quantity: 3, price: 10.0 },
        );
        let mut session = converted_session(cart);

        let tx = commit_cart(&mut session, &mut ledger, &mut rng).unwrap();
        assert_eq!(tx.session_id.as_deref(), Some("sess_0123456789"));
        assert_eq!(tx.timestamp, session.end_time);
        let ids: Vec<&str> = tx.items.iter().map(|item| item.product_id.as_str()).collect();
        assert_eq!(ids, ["prod_00000", "prod_00001"]);
        assert_eq!(tx.subtotal, 38.0);
        assert!((tx.total - (tx.subtotal - tx.discount)).abs() < 1e-9);
        assert_eq!(ledger.current_stock("prod_00000"), 2);
        assert_eq!(ledger.current_stock("prod_00001"), 3);
        assert_eq!(session.conversion_status, ConversionStatus::Converted);
    }

    #[test]
    fn commit_drops_unreservable_lines() {
        let products = vec![product("prod_00000", 10.0, 1), product("prod_00001", 4.0, 5)];
        let mut ledger = InventoryLedger::from_products(&products);
        let mut rng = stream_rng(7, "partial");

        let mut cart = BTreeMap::new();
        cart.insert(
            "prod_00000".to_string(),
            CartEntry { quantity: 3, price: 10.0 },
        );
        cart.insert(
            "prod_00001".to_string(),
            CartEntry { quantity: 1, price: 4.0 },
        );
        let mut session = converted_session(cart);

        let tx = commit_cart(&mut session, &mut ledger, &mut rng).unwrap();
        assert_eq!(tx.items.len(), 1);
        assert_eq!(tx.items[0].product_id, "prod_00001");
        assert_eq!(ledger.current_stock("prod_00000"), 1);
    }

    #[test]
    fn commit_downgrades_when_nothing_reserves() {
        let products = vec![product("prod_00000", 10.0, 1)];
        let mut ledger = InventoryLedger::from_products(&products);
        let mut rng = stream_rng(7, "downgrade");

        let mut cart = BTreeMap::new();
        cart.insert(
            "prod_00000".to_string(),
            CartEntry { quantity: 2, price: 10.0 },
        );
        let mut session = converted_session(cart);

        assert!(commit_cart(&mut session, &mut ledger, &mut rng).is_none());
        assert_eq!(session.conversion_status, ConversionStatus::AbandonedCart);
        assert_eq!(ledger.current_stock("prod_00000"), 1);
    }

    #[test]
    fn orphan_reserves_stock_and_stays_in_window() {
        let products = vec![product("prod_00000", 25.0, 50), product("prod_00001", 5.0, 50)];
        let mut ledger = InventoryLedger::from_products(&products);
        let options = GenerateOptions::default();
        let mut rng = stream_rng(7, "orphan");

        let before = ledger.total_stock();
        let tx = orphan_transaction(&user(), &products, &mut ledger, &options, &mut rng).unwrap();
        assert!(tx.session_id.is_none());
        assert!(!tx.items.is_empty() && tx.items.len() <= 3);
        assert_eq!(before - ledger.total_stock(), tx.unit_count());
        assert!(tx.timestamp >= options.window_start());
        assert!(tx.timestamp <= options.reference_date);
    }

    #[test]
    fn orphan_gives_up_on_a_dead_catalog() {
        let products = vec![product("prod_00000", 25.0, 0), product("prod_00001", 5.0, 0)];
        let mut ledger = InventoryLedger::from_products(&products);
        let options = GenerateOptions::default();
        let mut rng = stream_rng(7, "dead");

        for _ in 0..10 {
            assert!(
                orphan_transaction(&user(), &products, &mut ledger, &options, &mut rng).is_none()
            );
        }
    }

    #[test]
    fn discounts_are_a_listed_rate_or_zero() {
        let items = vec![LineItem {
            product_id: "prod_00000".to_string(),
            quantity: 4,
            unit_price: 25.0,
            subtotal: 100.0,
        }];
        let mut rng = stream_rng(7, "discount");
        let mut seen_discount = false;
        for _ in 0..200 {
            let (subtotal, discount, total) = discounted_totals(&items, &mut rng);
            assert_eq!(subtotal, 100.0);
            assert!((total - (subtotal - discount)).abs() < 1e-9);
            if discount > 0.0 {
                seen_discount = true;
                assert!([5.0, 10.0, 15.0, 20.0].contains(&discount));
            }
        }
        assert!(seen_discount);
    }
}
