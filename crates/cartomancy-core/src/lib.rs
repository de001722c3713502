//! Core record contracts and helpers for Cartomancy.
//!
//! This crate defines the serialized shape of every dataset file the
//! generator emits, the timestamp and currency conventions those records
//! share, and validation helpers for the reference entities.

pub mod catalog;
pub mod error;
pub mod money;
pub mod session;
pub mod timestamp;
pub mod transaction;
pub mod validation;

pub use catalog::{Category, GeoData, PricePoint, Product, Subcategory, User};
pub use error::{Error, Result};
pub use money::round_cents;
pub use session::{
    Browser, CartEntry, ConversionStatus, DeviceOs, DeviceProfile, DeviceType, PageType, PageView,
    Referrer, Session, SessionGeo,
};
pub use transaction::{LineItem, PaymentMethod, Transaction, TransactionStatus};
pub use validation::validate_reference;
