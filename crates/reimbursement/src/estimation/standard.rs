//! Constants of the canonical policy, fitted against the legacy approval history.

use super::adjusters::{EfficiencyPolicy, FactorBand, LengthFactor};
use super::anomaly::{
    AnomalyIndicator, AnomalyPolicy, ConfidencePolicy, IndicatorGroup, IndicatorWeight,
};
use super::domain::AnomalyFlag;
use super::finishing::{MinimumFloor, RoundingBonus};
use super::mileage::{LowEfficiencySupplement, MileageSchedule, MileageTier};
use super::policy::Policy;
use super::predicate::{Bound, DayRange, TripPredicate};
use super::receipts::{
    CostRegion, DurationAwareReceipts, ReceiptBand, ReceiptModel, SweetSpot, TieredReceipts,
};
use super::response::ResponsePolicy;
use super::single_day::{FraudOverride, Plateau, SingleDayBand, SingleDayPolicy};
use super::tiers::{DurationTierTable, Effect, RuleGroup, TierRule};

const PER_DIEM_RATE: f64 = 97.0;

impl Policy {
    pub fn standard() -> Self {
        Self {
            per_diem_rate: PER_DIEM_RATE,
            mileage: standard_mileage(),
            receipts: ReceiptModel::Tiered(standard_receipts()),
            efficiency: standard_efficiency(),
            duration_tiers: standard_duration_tiers(),
            single_day: standard_single_day(),
            anomaly: standard_anomaly(),
            response: standard_response(),
            rounding_bonus: RoundingBonus {
                cents: vec![49, 99],
                amount: 5.0,
            },
            minimum_floor: MinimumFloor { per_day: 50.0 },
        }
    }
}

impl DurationAwareReceipts {
    pub fn standard() -> Self {
        Self {
            sweet_spots: vec![
                SweetSpot {
                    days: DayRange::exactly(1),
                    min_per_day: 80.0,
                    max_per_day: 150.0,
                },
                SweetSpot {
                    days: DayRange::between(2, 3),
                    min_per_day: 100.0,
                    max_per_day: 180.0,
                },
                SweetSpot {
                    days: DayRange::between(4, 7),
                    min_per_day: 120.0,
                    max_per_day: 200.0,
                },
                SweetSpot {
                    days: DayRange::from(8),
                    min_per_day: 140.0,
                    max_per_day: 220.0,
                },
            ],
            region: CostRegion::Standard,
            minimum_per_day: 50.0,
            minimum_rate: 0.40,
            sweet_spot_rate: 0.85,
            standard_rate: 0.75,
            extreme_per_day: 400.0,
            extreme_short_trip_days: 5,
            extreme_short_trip_rate: 0.35,
            extreme_long_trip_rate: 0.50,
            far_above_floor_rate: 0.30,
            far_above_slope: 0.15,
            above_floor_rate: 0.60,
            above_slope: 0.10,
        }
    }
}

fn standard_mileage() -> MileageSchedule {
    MileageSchedule {
        tiers: vec![
            MileageTier {
                up_to: Some(100.0),
                rate: 0.58,
            },
            MileageTier {
                up_to: Some(500.0),
                rate: 0.40,
            },
            MileageTier {
                up_to: None,
                rate: 0.25,
            },
        ],
        low_efficiency: Some(LowEfficiencySupplement {
            below_miles_per_day: 50.0,
            per_day: 10.0,
        }),
    }
}

fn standard_receipts() -> TieredReceipts {
    let band = |when, rate, offset, base| ReceiptBand {
        when,
        rate,
        offset,
        base,
    };

    TieredReceipts {
        bands: vec![
            band(Bound::below(50.0), 0.40, 0.0, 0.0),
            band(Bound::at_most(600.0), 0.75, 0.0, 0.0),
            band(Bound::at_most(800.0), 0.85, 0.0, 0.0),
            band(Bound::at_most(1200.0), 0.60, 800.0, 680.0),
            band(Bound::at_most(2000.0), 0.30, 1200.0, 920.0),
            band(Bound::ANY, 0.10, 2000.0, 1160.0),
        ],
    }
}

fn standard_efficiency() -> EfficiencyPolicy {
    EfficiencyPolicy {
        efficiency: vec![
            FactorBand::new("optimal daily mileage", Bound::between(180.0, 220.0), 1.10),
            FactorBand::new("productive daily mileage", Bound::from_until(120.0, 180.0), 1.02),
            FactorBand::new("strong daily mileage", Bound::from_until(200.0, 250.0), 1.01),
            FactorBand::new("excessive daily mileage", Bound::above(300.0), 0.95),
            FactorBand::new("low daily mileage", Bound::below(100.0), 0.95),
        ],
        length: vec![
            LengthFactor::new("five-day trip", DayRange::exactly(5), 1.10),
            LengthFactor::new("four-day trip", DayRange::exactly(4), 1.05),
            LengthFactor::new("six-day trip", DayRange::exactly(6), 1.05),
            LengthFactor::new("short trip", DayRange::up_to(2), 0.95),
            LengthFactor::new("extended trip", DayRange::between(8, 14), 0.98),
            LengthFactor::new("very long trip", DayRange::from(15), 0.95),
        ],
        spending: vec![
            FactorBand::new("high daily spending", Bound::above(150.0), 0.90),
            FactorBand::new("minimal daily spending", Bound::below(30.0), 0.95),
        ],
    }
}

fn multi_day() -> TripPredicate {
    TripPredicate::days(DayRange::from(2))
}

fn on_days(days: u32) -> TripPredicate {
    TripPredicate::days(DayRange::exactly(days))
}

fn rule(label: &str, when: TripPredicate, factor: f64) -> TierRule {
    TierRule::new(label, when, Effect::Multiply(factor))
}

fn standard_duration_tiers() -> DurationTierTable {
    DurationTierTable::new(vec![
        RuleGroup::new(
            "mileage_bonus",
            vec![
                TierRule::new(
                    "over 1000 miles",
                    multi_day().with_miles(Bound::above(1000.0)),
                    Effect::Add(255.0),
                ),
                TierRule::new(
                    "over 800 miles",
                    multi_day().with_miles(Bound::above(800.0)),
                    Effect::Add(170.0),
                ),
                TierRule::new(
                    "over 600 miles",
                    multi_day().with_miles(Bound::above(600.0)),
                    Effect::Add(100.0),
                ),
                TierRule::new(
                    "over 400 miles",
                    multi_day().with_miles(Bound::above(400.0)),
                    Effect::Add(50.0),
                ),
            ],
        ),
        RuleGroup::new(
            "weekend_penalty",
            vec![rule(
                "six to seven days",
                TripPredicate::days(DayRange::between(6, 7)),
                0.92,
            )],
        ),
        business_combo(),
        duration_receipts(),
        RuleGroup::new(
            "short_long_trip_mileage",
            vec![
                rule(
                    "over 1000 miles",
                    TripPredicate::days(DayRange::between(8, 9)).with_miles(Bound::above(1000.0)),
                    0.85,
                ),
                rule(
                    "over 800 miles",
                    TripPredicate::days(DayRange::between(8, 9)).with_miles(Bound::above(800.0)),
                    1.0,
                ),
                rule(
                    "moderate mileage",
                    TripPredicate::days(DayRange::between(8, 9)),
                    1.15,
                ),
            ],
        ),
        RuleGroup::new(
            "named_signatures",
            vec![rule(
                "vacation with inflated receipts",
                TripPredicate::days(DayRange::between(8, 9))
                    .with_miles(Bound::between(790.0, 800.0))
                    .with_receipts(Bound::between(1600.0, 1700.0))
                    .with_receipts_per_day(Bound::above(200.0)),
                0.40,
            )],
        ),
        RuleGroup::new(
            "long_trip_spending",
            vec![
                rule(
                    "under 25 per day",
                    TripPredicate::days(DayRange::from(8)).with_receipts_per_day(Bound::below(25.0)),
                    0.65,
                ),
                rule(
                    "under 50 per day",
                    TripPredicate::days(DayRange::from(8)).with_receipts_per_day(Bound::below(50.0)),
                    0.75,
                ),
                rule(
                    "ten days under 75 per day",
                    TripPredicate::days(DayRange::from(10))
                        .with_receipts_per_day(Bound::below(75.0)),
                    0.90,
                ),
            ],
        ),
        RuleGroup::new(
            "long_trip_hustle",
            vec![rule(
                "high mileage with real spending",
                TripPredicate::days(DayRange::between(8, 11))
                    .with_miles(Bound::above(800.0))
                    .with_receipts_per_day(Bound::at_least(50.0)),
                1.05,
            )],
        ),
    ])
}

fn business_combo() -> RuleGroup {
    let week = || TripPredicate::days(DayRange::between(6, 8));

    RuleGroup::new(
        "business_combo",
        vec![
            rule(
                "road warrior over 1000 miles",
                week()
                    .with_miles(Bound::above(1000.0))
                    .with_receipts_per_day(Bound::below(200.0)),
                1.35,
            ),
            rule(
                "road warrior over 800 miles",
                week()
                    .with_miles(Bound::above(800.0))
                    .with_receipts_per_day(Bound::below(200.0)),
                1.25,
            ),
            rule("steady travel over 600 miles", week().with_miles(Bound::above(600.0)), 1.15),
        ],
    )
}

/// Main duration x receipts-per-day bucket table.
fn duration_receipts() -> RuleGroup {
    let spend = |days: u32, bound: Bound| on_days(days).with_receipts_per_day(bound);
    let long_spend = |range: DayRange, bound: Bound| {
        TripPredicate::days(range).with_receipts_per_day(bound)
    };

    RuleGroup::new(
        "duration_receipts",
        vec![
            rule("2 days over 400/day", spend(2, Bound::above(400.0)), 1.10),
            rule("2 days over 300/day", spend(2, Bound::above(300.0)), 1.10),
            rule("2 days over 200/day", spend(2, Bound::above(200.0)), 1.05),
            rule("2 days under 100/day", spend(2, Bound::below(100.0)), 1.10),
            rule("2 days", on_days(2), 1.05),
            rule("3 days over 400/day", spend(3, Bound::above(400.0)), 1.20),
            rule("3 days over 300/day", spend(3, Bound::above(300.0)), 1.15),
            rule("3 days over 200/day", spend(3, Bound::above(200.0)), 1.10),
            rule("3 days under 100/day", spend(3, Bound::below(100.0)), 1.05),
            rule("3 days", on_days(3), 1.05),
            rule("4 days over 500/day", spend(4, Bound::above(500.0)), 1.10),
            rule("4 days over 450/day", spend(4, Bound::above(450.0)), 1.25),
            rule("4 days over 350/day", spend(4, Bound::above(350.0)), 1.05),
            rule("4 days over 300/day", spend(4, Bound::above(300.0)), 1.20),
            rule("4 days", on_days(4), 1.05),
            rule("5 days over 500/day", spend(5, Bound::above(500.0)), 1.05),
            rule("5 days over 450/day", spend(5, Bound::above(450.0)), 1.10),
            rule("5 days over 400/day", spend(5, Bound::above(400.0)), 1.15),
            rule("5 days over 350/day", spend(5, Bound::above(350.0)), 1.20),
            rule("5 days over 300/day", spend(5, Bound::above(300.0)), 1.15),
            rule("5 days under 50/day", spend(5, Bound::below(50.0)), 0.90),
            rule("5 days", on_days(5), 1.10),
            rule("6 days under 50/day", spend(6, Bound::below(50.0)), 0.70),
            rule("6 days over 500/day", spend(6, Bound::above(500.0)), 0.75),
            rule("6 days over 400/day", spend(6, Bound::above(400.0)), 0.90),
            rule("6 days from 150/day", spend(6, Bound::at_least(150.0)), 1.10),
            rule("6 days", on_days(6), 1.0),
            rule("7 days from 300/day", spend(7, Bound::at_least(300.0)), 1.35),
            rule("7 days from 200/day", spend(7, Bound::at_least(200.0)), 1.25),
            rule("7 days from 100/day", spend(7, Bound::at_least(100.0)), 1.20),
            rule("7 days under 50/day", spend(7, Bound::below(50.0)), 0.80),
            rule("7 days", on_days(7), 1.10),
            rule("8 days under 75/day", spend(8, Bound::below(75.0)), 0.95),
            rule(
                "8 days 100-200/day",
                spend(8, Bound::from_until(100.0, 200.0)),
                1.20,
            ),
            rule("8 days from 200/day", spend(8, Bound::at_least(200.0)), 1.15),
            rule("8 days", on_days(8), 1.10),
            rule("9 days from 200/day", spend(9, Bound::at_least(200.0)), 1.25),
            rule(
                "9 days 100-200/day",
                spend(9, Bound::from_until(100.0, 200.0)),
                1.30,
            ),
            rule("9 days", on_days(9), 1.10),
            rule("10 days over 300/day", spend(10, Bound::above(300.0)), 0.95),
            rule("10 days from 100/day", spend(10, Bound::at_least(100.0)), 1.35),
            rule("10 days", on_days(10), 1.10),
            rule("11 days from 200/day", spend(11, Bound::at_least(200.0)), 1.25),
            rule("11 days from 100/day", spend(11, Bound::at_least(100.0)), 1.30),
            rule("11 days", on_days(11), 1.05),
            rule(
                "12-13 days from 200/day",
                long_spend(DayRange::between(12, 13), Bound::at_least(200.0)),
                1.40,
            ),
            rule(
                "12-13 days from 100/day",
                long_spend(DayRange::between(12, 13), Bound::at_least(100.0)),
                1.50,
            ),
            rule(
                "12-13 days",
                TripPredicate::days(DayRange::between(12, 13)),
                1.15,
            ),
            rule(
                "14+ days over 140/day",
                long_spend(DayRange::from(14), Bound::above(140.0)),
                1.30,
            ),
            rule(
                "14+ days over 100/day",
                long_spend(DayRange::from(14), Bound::above(100.0)),
                1.15,
            ),
            rule(
                "14+ days under 75/day",
                long_spend(DayRange::from(14), Bound::below(75.0)),
                1.25,
            ),
            rule("14+ days", TripPredicate::days(DayRange::from(14)), 1.0),
        ],
    )
}

fn standard_single_day() -> SingleDayPolicy {
    let receipts = |bound: Bound| TripPredicate::any().with_receipts(bound);

    SingleDayPolicy {
        fraud_override: FraudOverride {
            label: "known fraud signature".to_string(),
            when: TripPredicate::any()
                .with_miles(Bound::between(1070.0, 1090.0))
                .with_receipts(Bound::between(1800.0, 1820.0)),
            mileage_share: 0.3,
            flat_amount: 100.0,
        },
        bands: vec![
            SingleDayBand::new("receipts over 1500", receipts(Bound::above(1500.0)), 950.0),
            SingleDayBand::new("receipts over 1000", receipts(Bound::above(1000.0)), 750.0),
            SingleDayBand::new("receipts over 700", receipts(Bound::above(700.0)), 550.0),
            SingleDayBand::new("receipts over 400", receipts(Bound::above(400.0)), 350.0),
            SingleDayBand::new("receipts at 400", receipts(Bound::at_least(400.0)), 250.0),
            SingleDayBand::new("receipts from 300", receipts(Bound::at_least(300.0)), 400.0),
            SingleDayBand::new("receipts from 100", receipts(Bound::at_least(100.0)), 200.0),
            SingleDayBand::new(
                "mileage over 800",
                TripPredicate::any().with_miles(Bound::above(800.0)),
                400.0,
            ),
        ],
        fallback_bonus: 100.0,
        plateau: Plateau {
            threshold: 1500.0,
            excess_share: 0.2,
            ceiling: 1600.0,
        },
    }
}

fn standard_anomaly() -> AnomalyPolicy {
    use AnomalyFlag::*;

    let indicator = |flag, when, weight| AnomalyIndicator::new(flag, when, IndicatorWeight::Add(weight));
    let any = TripPredicate::any;

    AnomalyPolicy {
        groups: vec![
            IndicatorGroup::new(
                "daily_mileage",
                vec![
                    indicator(
                        ExcessiveDailyMileage,
                        any().with_miles_per_day(Bound::above(600.0)),
                        0.4,
                    ),
                    indicator(
                        HighDailyMileage,
                        any().with_miles_per_day(Bound::above(450.0)),
                        0.2,
                    ),
                ],
            ),
            IndicatorGroup::new(
                "sustained_spending",
                vec![
                    indicator(
                        UnsustainableSpending,
                        TripPredicate::days(DayRange::from(8))
                            .with_receipts_per_day(Bound::above(400.0)),
                        0.3,
                    ),
                    indicator(
                        VeryHighSpending,
                        TripPredicate::days(DayRange::from(4))
                            .with_receipts_per_day(Bound::above(500.0)),
                        0.25,
                    ),
                ],
            ),
            IndicatorGroup::new(
                "daily_spending",
                vec![
                    indicator(
                        ExtremeDailySpending,
                        any().with_receipts_per_day(Bound::above(400.0)),
                        0.4,
                    ),
                    indicator(
                        VeryHighDailySpending,
                        any().with_receipts_per_day(Bound::above(300.0)),
                        0.25,
                    ),
                ],
            ),
            IndicatorGroup::new(
                "expense_ratio",
                vec![
                    indicator(
                        HighExpenseRatio,
                        any().with_expense_ratio(Bound::above(3.0)),
                        0.2,
                    ),
                    indicator(
                        LowExpenseRatio,
                        any().with_expense_ratio(Bound::below(0.2)),
                        0.15,
                    ),
                ],
            ),
            IndicatorGroup::single(
                "vacation_mileage",
                indicator(
                    VacationWithBusinessMileage,
                    TripPredicate::days(DayRange::from(8))
                        .with_receipts_per_day(Bound::below(75.0))
                        .with_miles(Bound::above(1000.0)),
                    0.35,
                ),
            ),
            IndicatorGroup::single(
                "single_day_mileage",
                indicator(
                    ExcessiveSingleDayMileage,
                    on_days(1).with_miles(Bound::above(800.0)),
                    0.3,
                ),
            ),
            IndicatorGroup::single(
                "single_day_expenses",
                indicator(
                    ExcessiveSingleDayExpenses,
                    on_days(1).with_receipts(Bound::above(1200.0)),
                    0.25,
                ),
            ),
            IndicatorGroup::single(
                "known_fraud",
                AnomalyIndicator::new(
                    KnownFraudPattern,
                    any()
                        .with_miles(Bound::between(1070.0, 1090.0))
                        .with_receipts(Bound::between(1800.0, 1820.0)),
                    IndicatorWeight::ForceMaximum,
                ),
            ),
            IndicatorGroup::single(
                "vacation_receipts",
                indicator(
                    VacationFakeReceiptsPattern,
                    any()
                        .with_miles(Bound::between(790.0, 800.0))
                        .with_receipts(Bound::between(1600.0, 1700.0))
                        .with_receipts_per_day(Bound::above(200.0)),
                    0.6,
                ),
            ),
            IndicatorGroup::single(
                "weekend_warrior",
                indicator(
                    WeekendWarriorPattern,
                    TripPredicate::days(DayRange::up_to(3))
                        .with_miles(Bound::above(500.0))
                        .with_receipts_per_day(Bound::below(100.0)),
                    0.2,
                ),
            ),
            IndicatorGroup::single(
                "extended_low_cost",
                indicator(
                    ExtendedLowCostTravel,
                    TripPredicate::days(DayRange::from(10))
                        .with_receipts_per_day(Bound::below(50.0)),
                    0.3,
                ),
            ),
        ],
        confidence: ConfidencePolicy {
            unflagged: 0.5,
            isolated: 0.6,
            isolated_score_below: 0.3,
            corroborated: 0.9,
            corroborated_flags: 3,
            corroborated_score_above: 0.5,
            otherwise: 0.7,
        },
    }
}

fn standard_response() -> ResponsePolicy {
    ResponsePolicy {
        medium_from: 0.6,
        high_from: 0.8,
        low_severity: 0.1,
        medium_severity: 0.2,
        high_severity: 0.4,
        safety_floor: 0.30,
        known_fraud_floor: 0.15,
    }
}
