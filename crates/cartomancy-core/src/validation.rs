//! Consistency checks over freshly built reference data.
//!
//! The generator runs [`validate_reference`] once after the catalog and
//! customer base are built, before any session touches them. The checks
//! cover identifier uniqueness, cross-record references and the per-record
//! invariants that simulation code later relies on (ascending price
//! history, active products having stock, and so on).

use std::collections::{BTreeSet, HashMap};

use crate::catalog::{Category, Product, User};
use crate::error::{Error, Result};

/// Validates categories, products and users as one consistent set.
pub fn validate_reference(
    categories: &[Category],
    products: &[Product],
    users: &[User],
) -> Result<()> {
    let subcats = validate_categories(categories)?;
    validate_products(products, &subcats)?;
    validate_users(users)?;
    Ok(())
}

/// Checks the category tree and returns the subcategory ids of each
/// category, keyed by category id, for use in product validation.
fn validate_categories(categories: &[Category]) -> Result<HashMap<String, BTreeSet<String>>> {
    let mut by_category: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut all_subcats = BTreeSet::new();
    for category in categories {
        if by_category.contains_key(&category.category_id) {
            return Err(Error::InvalidRecord(format!(
                "duplicate category id {}",
                category.category_id
            )));
        }
        if category.subcategories.is_empty() {
            return Err(Error::InvalidRecord(format!(
                "category {} has no subcategories",
                category.category_id
            )));
        }
        let mut ids = BTreeSet::new();
        for subcat in &category.subcategories {
            if !all_subcats.insert(subcat.subcategory_id.clone()) {
                return Err(Error::InvalidRecord(format!(
                    "duplicate subcategory id {}",
                    subcat.subcategory_id
                )));
            }
            if !(0.10..=0.40).contains(&subcat.profit_margin) {
                return Err(Error::InvalidRecord(format!(
                    "subcategory {} margin {} outside [0.10, 0.40]",
                    subcat.subcategory_id, subcat.profit_margin
                )));
            }
            ids.insert(subcat.subcategory_id.clone());
        }
        by_category.insert(category.category_id.clone(), ids);
    }
    Ok(by_category)
}

fn validate_products(
    products: &[Product],
    subcats: &HashMap<String, BTreeSet<String>>,
) -> Result<()> {
    let mut seen = BTreeSet::new();
    for product in products {
        let id = &product.product_id;
        if !seen.insert(id.clone()) {
            return Err(Error::InvalidRecord(format!("duplicate product id {id}")));
        }
        let category_subcats = subcats.get(&product.category_id).ok_or_else(|| {
            Error::BrokenReference(format!(
                "product {id} references unknown category {}",
                product.category_id
            ))
        })?;
        if !category_subcats.contains(&product.subcategory_id) {
            return Err(Error::BrokenReference(format!(
                "product {id} references subcategory {} outside category {}",
                product.subcategory_id, product.category_id
            )));
        }
        let first = product.price_history.first().ok_or_else(|| {
            Error::InvalidRecord(format!("product {id} has an empty price history"))
        })?;
        for pair in product.price_history.windows(2) {
            if pair[1].date < pair[0].date {
                return Err(Error::InvalidRecord(format!(
                    "product {id} price history is not in ascending date order"
                )));
            }
        }
        if product.creation_date != first.date {
            return Err(Error::InvalidRecord(format!(
                "product {id} creation date does not match its first price point"
            )));
        }
        if product.is_active && product.current_stock == 0 {
            return Err(Error::InvalidRecord(format!(
                "product {id} is active with zero stock"
            )));
        }
    }
    Ok(())
}

fn validate_users(users: &[User]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for user in users {
        if !seen.insert(user.user_id.clone()) {
            return Err(Error::InvalidRecord(format!(
                "duplicate user id {}",
                user.user_id
            )));
        }
        if user.last_active < user.registration_date {
            return Err(Error::InvalidRecord(format!(
                "user {} was last active before registering",
                user.user_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::{GeoData, PricePoint, Subcategory};

    fn date(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn category() -> Category {
        Category {
            category_id: "cat_001".into(),
            name: "Outdoor".into(),
            subcategories: vec![Subcategory {
                subcategory_id: "sub_001_01".into(),
                name: "Camping".into(),
                profit_margin: 0.25,
            }],
        }
    }

    fn product() -> Product {
        Product {
            product_id: "prod_00001".into(),
            name: "Trail Stove".into(),
            category_id: "cat_001".into(),
            subcategory_id: "sub_001_01".into(),
            base_price: 49.99,
            current_stock: 12,
            is_active: true,
            price_history: vec![
                PricePoint { price: 44.5, date: date(1) },
                PricePoint { price: 49.99, date: date(9) },
            ],
            creation_date: date(1),
        }
    }

    fn user() -> User {
        User {
            user_id: "user_000001".into(),
            geo_data: GeoData {
                city: "Springfield".into(),
                state: "OR".into(),
                country: "US".into(),
            },
            registration_date: date(2),
            last_active: date(20),
        }
    }

    #[test]
    fn accepts_consistent_records() {
        let result = validate_reference(&[category()], &[product()], &[user()]);
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn rejects_unknown_category_reference() {
        let mut bad = product();
        bad.category_id = "cat_999".into();
        let err = validate_reference(&[category()], &[bad], &[user()]).unwrap_err();
        assert!(matches!(err, Error::BrokenReference(_)), "{err}");
    }

    #[test]
    fn rejects_subcategory_from_another_category() {
        let mut other = category();
        other.category_id = "cat_002".into();
        other.subcategories[0].subcategory_id = "sub_002_01".into();
        let mut bad = product();
        bad.subcategory_id = "sub_002_01".into();
        let err = validate_reference(&[category(), other], &[bad], &[user()]).unwrap_err();
        assert!(matches!(err, Error::BrokenReference(_)), "{err}");
    }

    #[test]
    fn rejects_unsorted_price_history() {
        let mut bad = product();
        bad.price_history.reverse();
        bad.creation_date = bad.price_history[0].date;
        let err = validate_reference(&[category()], &[bad], &[user()]).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)), "{err}");
    }

    #[test]
    fn rejects_active_product_without_stock() {
        let mut bad = product();
        bad.current_stock = 0;
        let err = validate_reference(&[category()], &[bad], &[user()]).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)), "{err}");
    }

    #[test]
    fn rejects_duplicate_user_ids() {
        let err = validate_reference(&[category()], &[product()], &[user(), user()]).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)), "{err}");
    }
}
