//! Reference entity factories.
//!
//! Categories, products and users are built once per run, held in memory,
//! and written before any session touches them. Products are the only
//! records revisited later: their stock and activity are re-snapshotted
//! from the ledger after all transactions commit.

use chrono::Duration;
use fake::Fake;
use fake::faker::address::en::{CityName, CountryCode, StateAbbr};
use fake::faker::company::en::{Bs, CatchPhrase, CompanyName};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use cartomancy_core::{
    Category, GeoData, PricePoint, Product, Subcategory, User, round_cents,
};

use crate::model::GenerateOptions;
use crate::sampling;

const PRICE_MIN: f64 = 5.0;
const PRICE_MAX: f64 = 500.0;
const MARGIN_MIN: f64 = 0.10;
const MARGIN_MAX: f64 = 0.40;
const STOCK_MIN: u32 = 10;
const STOCK_MAX: u32 = 1000;
/// Share of products drawn active at creation.
const ACTIVE_RATE: f64 = 0.95;
/// Among inactive draws, share that also start with zero stock.
const INACTIVE_ZERO_STOCK_RATE: f64 = 0.70;

pub fn build_categories(options: &GenerateOptions, rng: &mut ChaCha8Rng) -> Vec<Category> {
    let mut categories = Vec::with_capacity(options.categories as usize);
    for index in 0..options.categories {
        let name: String = CompanyName().fake_with_rng(rng);
        let count =
            rng.random_range(options.subcategories_min..=options.subcategories_max);
        let mut subcategories = Vec::with_capacity(count as usize);
        for sub_index in 0..count {
            subcategories.push(Subcategory {
                subcategory_id: format!("sub_{index:03}_{sub_index:02}"),
                name: title_case(&Bs().fake_with_rng::<String, _>(rng)),
                profit_margin: round_cents(rng.random_range(MARGIN_MIN..=MARGIN_MAX)),
            });
        }
        categories.push(Category {
            category_id: format!("cat_{index:03}"),
            name,
            subcategories,
        });
    }
    categories
}

/// Builds products with a short price drift history.
///
/// The first price lands early in the pre-window period (twice the
/// activity timespan back), up to two later drifts of +/-20% land between
/// that point and the reference date, and the emitted `base_price` is the
/// latest entry after sorting.
pub fn build_products(
    options: &GenerateOptions,
    categories: &[Category],
    rng: &mut ChaCha8Rng,
) -> Vec<Product> {
    let creation_start =
        options.reference_date - Duration::days(i64::from(options.timespan_days) * 2);
    let first_price_end =
        creation_start + Duration::days(i64::from(options.timespan_days / 3).max(1));

    let mut products = Vec::with_capacity(options.products as usize);
    for index in 0..options.products {
        let category = sampling::pick(rng, categories);
        let subcategory = sampling::pick(rng, &category.subcategories);

        let initial_price = round_cents(rng.random_range(PRICE_MIN..=PRICE_MAX));
        let first_date = sampling::datetime_between(rng, creation_start, first_price_end);
        let mut price_history = vec![PricePoint {
            price: initial_price,
            date: first_date,
        }];

        let changes = rng.random_range(0..=2);
        let mut last_price = initial_price;
        let mut last_date = first_date;
        for _ in 0..changes {
            let date = sampling::datetime_between(rng, last_date, options.reference_date);
            let price = round_cents(last_price * rng.random_range(0.8..=1.2));
            price_history.push(PricePoint { price, date });
            last_price = price;
            last_date = date;
        }
        price_history.sort_by_key(|point| point.date);
        let current_price = price_history.last().map_or(initial_price, |point| point.price);
        let creation_date = price_history.first().map_or(first_date, |point| point.date);

        let mut stock = rng.random_range(STOCK_MIN..=STOCK_MAX);
        let drawn_active = rng.random_bool(ACTIVE_RATE);
        if !drawn_active && rng.random_bool(INACTIVE_ZERO_STOCK_RATE) {
            stock = 0;
        }

        products.push(Product {
            product_id: format!("prod_{index:05}"),
            name: title_case(&CatchPhrase().fake_with_rng::<String, _>(rng)),
            category_id: category.category_id.clone(),
            subcategory_id: subcategory.subcategory_id.clone(),
            base_price: current_price,
            current_stock: stock,
            is_active: drawn_active && stock > 0,
            price_history,
            creation_date,
        });
    }
    products
}

pub fn build_users(options: &GenerateOptions, rng: &mut ChaCha8Rng) -> Vec<User> {
    let registration_start =
        options.reference_date - Duration::days(i64::from(options.timespan_days) * 3);
    let registration_end =
        options.reference_date - Duration::days(i64::from(options.timespan_days));

    let mut users = Vec::with_capacity(options.users as usize);
    for index in 0..options.users {
        let registration_date =
            sampling::datetime_between(rng, registration_start, registration_end);
        users.push(User {
            user_id: format!("user_{index:06}"),
            geo_data: GeoData {
                city: CityName().fake_with_rng(rng),
                state: StateAbbr().fake_with_rng(rng),
                country: CountryCode().fake_with_rng(rng),
            },
            registration_date,
            last_active: sampling::datetime_between(
                rng,
                registration_date,
                options.reference_date,
            ),
        });
    }
    users
}

/// Uppercases the first letter of every word, lowercasing the rest, with
/// any non-alphabetic character acting as a word boundary.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut boundary = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }
    out
}
