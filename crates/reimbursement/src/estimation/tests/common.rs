use crate::estimation::{Policy, ReimbursementEngine, ReimbursementEstimate, TripRecord};

pub(super) const CENT_TOLERANCE: f64 = 0.005;

pub(super) fn trip(days: u32, miles: f64, receipts: f64) -> TripRecord {
    TripRecord::new(days, miles, receipts).expect("valid trip")
}

pub(super) fn engine() -> ReimbursementEngine {
    ReimbursementEngine::standard()
}

pub(super) fn estimate(days: u32, miles: f64, receipts: f64) -> ReimbursementEstimate {
    engine().estimate(&trip(days, miles, receipts))
}

pub(super) fn reimburse(days: u32, miles: f64, receipts: f64) -> f64 {
    engine().reimburse(&trip(days, miles, receipts))
}

pub(super) fn assert_amount(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= CENT_TOLERANCE,
        "expected {expected:.2}, got {actual:.2}"
    );
}

/// Policy whose valuation sits far below the per-day minimum.
pub(super) fn frugal_policy() -> Policy {
    let mut policy = Policy::standard();
    policy.per_diem_rate = 0.0;
    for tier in &mut policy.mileage.tiers {
        tier.rate = 0.01;
    }
    policy.mileage.low_efficiency = None;
    policy.single_day.fallback_bonus = 0.0;
    for band in &mut policy.single_day.bands {
        band.bonus = 0.0;
    }
    policy.single_day.fraud_override.flat_amount = 0.0;
    policy.rounding_bonus.cents.clear();
    policy
}
