//! Authoritative per-product stock state.
//!
//! Cart building only reads this ledger; [`InventoryLedger::reserve`] is
//! the single path by which stock decreases. Candidate carts are built
//! speculatively against a snapshot that may be stale by commit time, and
//! the commit-time re-check inside `reserve` is what keeps total units
//! sold within the initial stock of every product.

use std::collections::HashMap;

use cartomancy_core::Product;

#[derive(Debug, Clone, Copy)]
struct Slot {
    stock: u32,
    active: bool,
}

/// Mutable stock/activity ledger keyed by product id.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    slots: HashMap<String, Slot>,
}

impl InventoryLedger {
    /// Seeds the ledger from freshly built products.
    pub fn from_products(products: &[Product]) -> Self {
        let slots = products
            .iter()
            .map(|product| {
                let slot = Slot {
                    stock: product.current_stock,
                    active: product.is_active,
                };
                (product.product_id.clone(), slot)
            })
            .collect();
        Self { slots }
    }

    /// True iff the product exists, is active, and holds at least
    /// `quantity` units. A zero-unit request is never available.
    pub fn available(&self, product_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        match self.slots.get(product_id) {
            Some(slot) => slot.active && slot.stock >= quantity,
            None => false,
        }
    }

    /// Units currently on hand; 0 for unknown products.
    pub fn current_stock(&self, product_id: &str) -> u32 {
        self.slots.get(product_id).map_or(0, |slot| slot.stock)
    }

    /// Commits a reservation. Re-checks availability, then decrements
    /// stock and deactivates the product when it hits zero. Returns false
    /// without mutating anything when the request cannot be met.
    pub fn reserve(&mut self, product_id: &str, quantity: u32) -> bool {
        if !self.available(product_id, quantity) {
            return false;
        }
        if let Some(slot) = self.slots.get_mut(product_id) {
            slot.stock = slot.stock.saturating_sub(quantity);
            if slot.stock == 0 {
                slot.active = false;
            }
            return true;
        }
        false
    }

    /// Number of products still active (and therefore sellable).
    pub fn active_products(&self) -> u64 {
        self.slots.values().filter(|slot| slot.active).count() as u64
    }

    /// Total units on hand across all products.
    pub fn total_stock(&self) -> u64 {
        self.slots.values().map(|slot| u64::from(slot.stock)).sum()
    }

    /// Writes the ledger state back onto the product records, making them
    /// the authoritative post-run snapshot.
    pub fn apply_final_state(&self, products: &mut [Product]) {
        for product in products {
            if let Some(slot) = self.slots.get(&product.product_id) {
                product.current_stock = slot.stock;
                product.is_active = slot.active;
            }
        }
    }
}
