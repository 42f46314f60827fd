use reimbursement::estimation::{AdjustmentStage, AnomalyFlag, Pathway};
use reimbursement::{calculate_reimbursement, ReimbursementEngine, TripError, TripRecord};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 0.005,
        "expected {expected:.2}, got {actual:.2}"
    );
}

#[test]
fn standard_policy_reproduces_reference_trips() {
    let cases = [
        (2, 100.0, 0.0, 230.53),
        (5, 900.0, 450.0, 1255.79),
        (8, 2400.0, 800.0, 2450.17),
        (10, 1200.0, 300.0, 987.46),
        (12, 600.0, 1800.0, 2039.88),
        (1, 300.0, 150.0, 338.0),
    ];

    for (days, miles, receipts, expected) in cases {
        let amount = calculate_reimbursement(days, miles, receipts).expect("valid trip");
        assert_close(amount, expected);
    }
}

#[test]
fn estimate_explains_the_multi_day_pathway() {
    let engine = ReimbursementEngine::standard();
    let trip = TripRecord::new(5, 900.0, 450.0).expect("valid trip");

    let estimate = engine.estimate(&trip);

    assert_eq!(estimate.pathway, Pathway::MultiDay);
    assert!(!estimate.floor_applied);
    let labels: Vec<_> = estimate
        .steps_for(AdjustmentStage::TripLength)
        .map(|step| step.label.as_str())
        .collect();
    assert_eq!(labels, vec!["five-day trip"]);
    assert_eq!(estimate.steps_for(AdjustmentStage::Efficiency).count(), 1);
    let last = estimate.adjustments.last().expect("at least one adjustment");
    assert_close(last.total, estimate.amount);
}

#[test]
fn vacation_receipt_signature_is_penalised() {
    let engine = ReimbursementEngine::standard();
    let trip = TripRecord::new(8, 795.0, 1650.0).expect("valid trip");

    let estimate = engine.estimate(&trip);

    assert!(estimate
        .assessment
        .has_flag(AnomalyFlag::VacationFakeReceiptsPattern));
    assert_close(estimate.amount, 567.97);
}

#[test]
fn estimates_serialize_for_reporting() {
    let estimate = ReimbursementEngine::standard()
        .estimate(&TripRecord::new(1, 300.0, 150.0).expect("valid trip"));

    let value = serde_json::to_value(&estimate).expect("estimate serializes");

    assert_eq!(value["pathway"], "single_day");
    assert_eq!(value["trip"]["trip_duration_days"], 1);
    assert!(value["adjustments"].as_array().is_some_and(|steps| !steps.is_empty()));
}

#[test]
fn invalid_inputs_are_rejected_before_estimation() {
    assert_eq!(
        calculate_reimbursement(0, 10.0, 10.0),
        Err(TripError::ZeroDuration)
    );
    assert!(matches!(
        calculate_reimbursement(3, -1.0, 10.0),
        Err(TripError::InvalidAmount {
            field: "miles_traveled",
            ..
        })
    ));
    assert!(calculate_reimbursement(3, 10.0, f64::NAN).is_err());
}
