use super::common::*;
use crate::estimation::{
    calculate_reimbursement, AdjustmentStage, Effect, Pathway, TripError,
};

#[test]
fn short_trip_with_no_receipts_uses_per_diem() {
    let estimate = estimate(2, 100.0, 0.0);

    let valuation = estimate.valuation;
    assert_eq!(valuation.per_diem, Some(194.0));
    assert_eq!(valuation.receipt_value, Some(0.0));
    assert_eq!(valuation.lodging, Some(194.0));
    assert_amount(estimate.amount, 230.53);
}

#[test]
fn five_day_sweet_spot_trip() {
    let estimate = estimate(5, 900.0, 450.0);

    assert_eq!(estimate.pathway, Pathway::MultiDay);
    assert!(estimate.assessment.flags.is_empty());
    assert!(estimate
        .steps_for(AdjustmentStage::TripLength)
        .any(|step| step.effect == Effect::Multiply(1.10)));
    assert_amount(estimate.amount, 1255.79);
}

#[test]
fn five_day_trip_outpays_the_same_trip_over_four_days() {
    let five = reimburse(5, 900.0, 450.0);
    let four = reimburse(4, 900.0, 450.0);

    assert_amount(four, 964.65);
    assert_amount(five, 1255.79);
    let length_bonus_only = four * (1.10 / 1.05) - four;
    assert!(
        five - four > length_bonus_only,
        "five-day gain {:.2} should exceed the length bonus alone {:.2}",
        five - four,
        length_bonus_only
    );
}

#[test]
fn mileage_bonus_is_additive_before_multipliers() {
    let estimate = estimate(8, 2400.0, 800.0);

    let bonus: Vec<_> = estimate
        .steps_for(AdjustmentStage::DurationTier)
        .filter(|step| step.label.starts_with("mileage_bonus"))
        .collect();
    assert_eq!(bonus.len(), 1);
    assert_eq!(bonus[0].effect, Effect::Add(255.0));
    assert_amount(estimate.amount, 2450.17);
}

#[test]
fn long_low_spending_trip_is_discounted_and_flagged() {
    let estimate = estimate(10, 1200.0, 300.0);

    assert!(estimate
        .steps_for(AdjustmentStage::DurationTier)
        .any(|step| step.label == "long_trip_spending: under 50 per day"));
    assert!(estimate
        .steps_for(AdjustmentStage::AnomalyResponse)
        .next()
        .is_some());
    assert_amount(estimate.amount, 987.46);
}

#[test]
fn vacation_receipt_signature_is_heavily_discounted() {
    let estimate = estimate(8, 795.0, 1650.0);

    assert!(estimate
        .steps_for(AdjustmentStage::DurationTier)
        .any(|step| step.effect == Effect::Multiply(0.40)));
    assert_amount(estimate.amount, 567.97);
}

#[test]
fn twelve_day_trips_use_their_own_bucket() {
    assert_amount(reimburse(12, 600.0, 1800.0), 2039.88);
}

#[test]
fn sample_corpus_cases() {
    assert_amount(reimburse(3, 93.0, 1.42), 344.64);
    assert_amount(reimburse(1, 55.0, 3.6), 127.94);
    assert_amount(reimburse(8, 862.0, 1817.85), 1967.71);
    assert_amount(reimburse(7, 1100.0, 700.0), 1971.71);
}

#[test]
fn estimate_records_running_totals_in_order() {
    let estimate = estimate(6, 700.0, 900.0);

    let stages: Vec<_> = estimate.adjustments.iter().map(|step| step.stage).collect();
    let first_tier = stages
        .iter()
        .position(|stage| *stage == AdjustmentStage::DurationTier)
        .expect("tier steps recorded");
    assert!(stages[..first_tier]
        .iter()
        .all(|stage| matches!(
            stage,
            AdjustmentStage::Efficiency
                | AdjustmentStage::TripLength
                | AdjustmentStage::SpendingIntensity
        )));

    let last = estimate.adjustments.last().expect("steps recorded");
    assert_amount(last.total, estimate.amount);
    assert_amount(estimate.amount, 1348.15);
}

#[test]
fn free_function_validates_inputs() {
    assert_eq!(calculate_reimbursement(0, 10.0, 10.0), Err(TripError::ZeroDuration));
    assert!(calculate_reimbursement(3, -5.0, 10.0).is_err());

    let amount = calculate_reimbursement(2, 100.0, 30.0).expect("valid trip");
    assert_amount(amount, 237.66);
}

#[test]
fn estimate_serializes_for_audit() {
    let estimate = estimate(1, 1080.0, 1810.0);
    let json = serde_json::to_value(&estimate).expect("estimate serializes");

    assert_eq!(json["pathway"], "fraud_override");
    assert_eq!(json["trip"]["trip_duration_days"], 1);
    assert!(json["assessment"]["flags"]
        .as_array()
        .expect("flags array")
        .iter()
        .any(|flag| flag == "known_fraud_pattern"));
}
