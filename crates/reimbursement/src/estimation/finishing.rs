use serde::{Deserialize, Serialize};

/// Flat bonus for receipt totals ending in one of `cents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingBonus {
    pub cents: Vec<u32>,
    pub amount: f64,
}

impl RoundingBonus {
    pub fn applies(&self, total_receipts: f64) -> bool {
        self.cents.contains(&receipt_cents(total_receipts))
    }
}

/// Cent component of a receipt total, taken after rounding to whole cents.
///
/// Rounds rather than truncating `receipts * 100`; truncation reads `16.99` as 98 cents.
pub fn receipt_cents(total_receipts: f64) -> u32 {
    ((total_receipts * 100.0).round() % 100.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumFloor {
    pub per_day: f64,
}

impl MinimumFloor {
    pub fn minimum(&self, duration_days: u32) -> f64 {
        f64::from(duration_days) * self.per_day
    }
}

/// Rounds half away from zero to two decimals.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
