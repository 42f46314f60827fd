use serde::{Deserialize, Serialize};

/// Lodging component of the multi-day base amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lodging {
    pub per_diem: f64,
    pub receipt_value: f64,
    pub amount: f64,
}

impl Lodging {
    pub fn used_receipts(&self) -> bool {
        self.receipt_value > self.per_diem
    }
}

/// The greater of the per-diem allowance and the receipt value. Never their sum.
pub fn select_lodging(per_diem_rate: f64, duration_days: u32, receipt_value: f64) -> Lodging {
    let per_diem = f64::from(duration_days) * per_diem_rate;

    Lodging {
        per_diem,
        receipt_value,
        amount: per_diem.max(receipt_value),
    }
}
