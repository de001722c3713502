//! Currency rounding helper.
//!
//! Prices, discounts and totals are plain `f64` values in the emitted JSON,
//! always carrying at most two decimal places. Every arithmetic step that
//! can introduce extra precision (price drift multipliers, line subtotals,
//! discount rates) goes through [`round_cents`] before the value is stored,
//! so downstream sums compare cleanly against re-derived figures.

/// Rounds a currency amount to whole cents, half away from zero.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round_cents;

    #[test]
    fn rounds_half_away_from_zero() {
        // 0.125 is exact in binary, so the half case is unambiguous.
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-0.125), -0.13);
    }

    #[test]
    fn keeps_exact_cents_untouched() {
        assert_eq!(round_cents(19.99), 19.99);
        assert_eq!(round_cents(0.0), 0.0);
    }

    #[test]
    fn strips_sub_cent_noise() {
        assert_eq!(round_cents(10.0 * 1.1), 11.0);
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
    }
}
