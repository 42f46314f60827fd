use super::tiers::Effect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Observed trip attributes submitted for reimbursement.
///
/// Fields are private so every instance has passed [`TripRecord::new`]: the duration is at
/// least one day and both amounts are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TripInput", into = "TripInput")]
pub struct TripRecord {
    duration_days: u32,
    miles_traveled: f64,
    total_receipts: f64,
}

impl TripRecord {
    pub fn new(
        duration_days: u32,
        miles_traveled: f64,
        total_receipts: f64,
    ) -> Result<Self, TripError> {
        if duration_days == 0 {
            return Err(TripError::ZeroDuration);
        }
        check_amount("miles_traveled", miles_traveled)?;
        check_amount("total_receipts_amount", total_receipts)?;

        Ok(Self {
            duration_days,
            miles_traveled,
            total_receipts,
        })
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn miles_traveled(&self) -> f64 {
        self.miles_traveled
    }

    pub fn total_receipts(&self) -> f64 {
        self.total_receipts
    }

    pub fn is_single_day(&self) -> bool {
        self.duration_days == 1
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), TripError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TripError::InvalidAmount { field, value })
    }
}

/// Wire shape shared by the regression corpus, the HTTP API, and policy fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripInput {
    pub trip_duration_days: u32,
    pub miles_traveled: f64,
    pub total_receipts_amount: f64,
}

impl TryFrom<TripInput> for TripRecord {
    type Error = TripError;

    fn try_from(input: TripInput) -> Result<Self, Self::Error> {
        TripRecord::new(
            input.trip_duration_days,
            input.miles_traveled,
            input.total_receipts_amount,
        )
    }
}

impl From<TripRecord> for TripInput {
    fn from(trip: TripRecord) -> Self {
        Self {
            trip_duration_days: trip.duration_days,
            miles_traveled: trip.miles_traveled,
            total_receipts_amount: trip.total_receipts,
        }
    }
}

/// Rejection raised while constructing a [`TripRecord`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TripError {
    #[error("trip_duration_days must be at least 1")]
    ZeroDuration,
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Per-day intensities computed once per estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub miles_per_day: f64,
    pub receipts_per_day: f64,
    /// Receipts per mile, with mileage clamped to at least one mile.
    pub expense_ratio: f64,
}

impl DerivedFeatures {
    pub fn derive(trip: &TripRecord) -> Self {
        let (miles_per_day, receipts_per_day) = if trip.duration_days > 0 {
            let days = f64::from(trip.duration_days);
            (trip.miles_traveled / days, trip.total_receipts / days)
        } else {
            (0.0, 0.0)
        };

        Self {
            miles_per_day,
            receipts_per_day,
            expense_ratio: trip.total_receipts / trip.miles_traveled.max(1.0),
        }
    }
}

/// Tags raised by the anomaly detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyFlag {
    ExcessiveDailyMileage,
    HighDailyMileage,
    UnsustainableSpending,
    VeryHighSpending,
    ExtremeDailySpending,
    VeryHighDailySpending,
    HighExpenseRatio,
    LowExpenseRatio,
    VacationWithBusinessMileage,
    ExcessiveSingleDayMileage,
    ExcessiveSingleDayExpenses,
    KnownFraudPattern,
    VacationFakeReceiptsPattern,
    WeekendWarriorPattern,
    ExtendedLowCostTravel,
}

impl AnomalyFlag {
    pub fn label(self) -> &'static str {
        match self {
            AnomalyFlag::ExcessiveDailyMileage => "excessive_daily_mileage",
            AnomalyFlag::HighDailyMileage => "high_daily_mileage",
            AnomalyFlag::UnsustainableSpending => "unsustainable_spending",
            AnomalyFlag::VeryHighSpending => "very_high_spending",
            AnomalyFlag::ExtremeDailySpending => "extreme_daily_spending",
            AnomalyFlag::VeryHighDailySpending => "very_high_daily_spending",
            AnomalyFlag::HighExpenseRatio => "high_expense_ratio",
            AnomalyFlag::LowExpenseRatio => "low_expense_ratio",
            AnomalyFlag::VacationWithBusinessMileage => "vacation_with_business_mileage",
            AnomalyFlag::ExcessiveSingleDayMileage => "excessive_single_day_mileage",
            AnomalyFlag::ExcessiveSingleDayExpenses => "excessive_single_day_expenses",
            AnomalyFlag::KnownFraudPattern => "known_fraud_pattern",
            AnomalyFlag::VacationFakeReceiptsPattern => "vacation_fake_receipts_pattern",
            AnomalyFlag::WeekendWarriorPattern => "weekend_warrior_pattern",
            AnomalyFlag::ExtendedLowCostTravel => "extended_low_cost_travel",
        }
    }
}

impl fmt::Display for AnomalyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Suspicion score, raised flags, and how strongly the flags corroborate each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    pub anomaly_score: f64,
    pub flags: BTreeSet<AnomalyFlag>,
    pub confidence: f64,
}

impl AnomalyAssessment {
    pub fn has_flag(&self, flag: AnomalyFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_known_fraud(&self) -> bool {
        self.has_flag(AnomalyFlag::KnownFraudPattern)
    }
}

/// Calculation branch that produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pathway {
    MultiDay,
    SingleDay,
    FraudOverride,
}

/// Valuation figures before any multiplier or bonus is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub mileage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_diem: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lodging: Option<f64>,
    pub base: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStage {
    Efficiency,
    TripLength,
    SpendingIntensity,
    DurationTier,
    SingleDayBand,
    SingleDayPlateau,
    FraudOverride,
    AnomalyResponse,
    RoundingBonus,
    MinimumFloor,
}

/// One applied rule, recorded with the running total it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentStep {
    pub stage: AdjustmentStage,
    pub label: String,
    pub effect: Effect,
    pub total: f64,
}

/// Estimate output: the rounded amount and the trail of rules that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementEstimate {
    pub trip: TripRecord,
    pub amount: f64,
    pub pathway: Pathway,
    pub features: DerivedFeatures,
    pub valuation: Valuation,
    pub adjustments: Vec<AdjustmentStep>,
    pub assessment: AnomalyAssessment,
    pub floor_applied: bool,
}

impl ReimbursementEstimate {
    pub fn steps_for(&self, stage: AdjustmentStage) -> impl Iterator<Item = &AdjustmentStep> {
        self.adjustments
            .iter()
            .filter(move |step| step.stage == stage)
    }
}
