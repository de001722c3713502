//! Purchase records.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Payment instrument used at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
    GiftCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::Paypal,
        PaymentMethod::BankTransfer,
        PaymentMethod::GiftCard,
    ];
}

/// Fulfilment state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Processing,
    Shipped,
    Delivered,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 4] = [
        TransactionStatus::Completed,
        TransactionStatus::Processing,
        TransactionStatus::Shipped,
        TransactionStatus::Delivered,
    ];
}

/// One product line inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    pub product_id: String,
    /// Units bought; every unit was reserved against inventory.
    pub quantity: u32,
    pub unit_price: f64,
    /// `quantity * unit_price`, rounded to cents.
    pub subtotal: f64,
}

/// Completed purchase.
///
/// `session_id` is `null` for historical orders synthesized outside any
/// browsing session; those still debit inventory like session checkouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    /// Identifier, `txn_` followed by twelve hex digits.
    pub transaction_id: String,
    pub session_id: Option<String>,
    pub user_id: String,
    #[serde(with = "crate::timestamp")]
    #[schemars(with = "String")]
    pub timestamp: NaiveDateTime,
    /// At least one line; quantities are all positive.
    pub items: Vec<LineItem>,
    /// Sum of line subtotals, rounded to cents.
    pub subtotal: f64,
    /// Absolute discount in currency units, zero when none applied.
    pub discount: f64,
    /// `subtotal - discount`, rounded to cents.
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Total units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
