use super::domain::{AdjustmentStage, AdjustmentStep, DerivedFeatures, TripRecord};
use super::predicate::{Bound, DayRange};
use super::tiers::Effect;
use serde::{Deserialize, Serialize};

/// Multiplier applied when a per-day feature falls inside `when`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorBand {
    pub label: String,
    pub when: Bound,
    pub factor: f64,
}

impl FactorBand {
    pub fn new(label: impl Into<String>, when: Bound, factor: f64) -> Self {
        Self {
            label: label.into(),
            when,
            factor,
        }
    }
}

/// Multiplier keyed on the trip duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthFactor {
    pub label: String,
    pub days: DayRange,
    pub factor: f64,
}

impl LengthFactor {
    pub fn new(label: impl Into<String>, days: DayRange, factor: f64) -> Self {
        Self {
            label: label.into(),
            days,
            factor,
        }
    }
}

/// Efficiency, trip-length, and spending-intensity multipliers for multi-day trips.
///
/// Each list is evaluated first-match-wins; an unmatched list contributes `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyPolicy {
    pub efficiency: Vec<FactorBand>,
    pub length: Vec<LengthFactor>,
    #[serde(default)]
    pub spending: Vec<FactorBand>,
}

/// Multipliers resolved for one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyAdjustment<'a> {
    pub efficiency: Option<&'a FactorBand>,
    pub length: Option<&'a LengthFactor>,
    pub spending: Option<&'a FactorBand>,
}

impl EfficiencyAdjustment<'_> {
    pub fn multiplier(&self) -> f64 {
        self.efficiency.map_or(1.0, |band| band.factor)
            * self.length.map_or(1.0, |band| band.factor)
            * self.spending.map_or(1.0, |band| band.factor)
    }
}

impl EfficiencyPolicy {
    pub fn resolve(&self, trip: &TripRecord, features: &DerivedFeatures) -> EfficiencyAdjustment<'_> {
        EfficiencyAdjustment {
            efficiency: self
                .efficiency
                .iter()
                .find(|band| band.when.contains(features.miles_per_day)),
            length: self
                .length
                .iter()
                .find(|band| band.days.contains(trip.duration_days())),
            spending: self
                .spending
                .iter()
                .find(|band| band.when.contains(features.receipts_per_day)),
        }
    }

    pub(crate) fn apply(
        &self,
        base: f64,
        trip: &TripRecord,
        features: &DerivedFeatures,
        steps: &mut Vec<AdjustmentStep>,
    ) -> f64 {
        let resolved = self.resolve(trip, features);
        let mut total = base;

        let stages = [
            (
                AdjustmentStage::Efficiency,
                resolved.efficiency.map(|band| (band.label.as_str(), band.factor)),
            ),
            (
                AdjustmentStage::TripLength,
                resolved.length.map(|band| (band.label.as_str(), band.factor)),
            ),
            (
                AdjustmentStage::SpendingIntensity,
                resolved.spending.map(|band| (band.label.as_str(), band.factor)),
            ),
        ];

        for (stage, matched) in stages {
            if let Some((label, factor)) = matched {
                total *= factor;
                steps.push(AdjustmentStep {
                    stage,
                    label: label.to_string(),
                    effect: Effect::Multiply(factor),
                    total,
                });
            }
        }

        total
    }
}
