//! Reimbursement estimation pipeline.
//!
//! Multi-day trips are valued from mileage plus lodging, then scaled by the efficiency
//! multipliers and the duration tier table. Single-day trips take a flat-band pathway
//! instead. Both pathways finish with the anomaly response, the rounding bonus, and the
//! per-day floor.

pub mod adjusters;
pub mod anomaly;
pub mod domain;
pub mod finishing;
pub mod lodging;
pub mod mileage;
pub mod policy;
pub mod predicate;
pub mod receipts;
pub mod response;
pub mod single_day;
mod standard;
pub mod tiers;

#[cfg(test)]
mod tests;

pub use domain::{
    AdjustmentStage, AdjustmentStep, AnomalyAssessment, AnomalyFlag, DerivedFeatures, Pathway,
    ReimbursementEstimate, TripError, TripInput, TripRecord, Valuation,
};
pub use policy::{Policy, PolicyError};
pub use predicate::{Bound, DayRange, TripPredicate};
pub use receipts::{CostRegion, ReceiptModel};
pub use tiers::{DurationTierTable, Effect, RuleGroup, TierRule};

use finishing::round_to_cents;
use lodging::select_lodging;
use tracing::debug;

/// Stateless estimator applying an immutable [`Policy`] to trips.
#[derive(Debug, Clone)]
pub struct ReimbursementEngine {
    policy: Policy,
}

impl ReimbursementEngine {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn standard() -> Self {
        Self::new(Policy::standard())
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn estimate(&self, trip: &TripRecord) -> ReimbursementEstimate {
        let policy = &self.policy;
        let features = DerivedFeatures::derive(trip);
        let mileage = policy.mileage.value(trip, &features);
        let mut adjustments = Vec::new();

        let (mut total, pathway, valuation) = if trip.is_single_day() {
            let outcome = policy
                .single_day
                .evaluate(trip, &features, mileage, &mut adjustments);
            let pathway = if outcome.fraud_override {
                Pathway::FraudOverride
            } else {
                Pathway::SingleDay
            };
            let valuation = Valuation {
                mileage,
                receipt_value: None,
                per_diem: None,
                lodging: None,
                base: mileage,
            };
            (outcome.total, pathway, valuation)
        } else {
            let receipt_value = policy.receipts.value(trip);
            let lodging = select_lodging(policy.per_diem_rate, trip.duration_days(), receipt_value);
            let base = mileage + lodging.amount;

            let adjusted = policy
                .efficiency
                .apply(base, trip, &features, &mut adjustments);
            let adjusted = policy
                .duration_tiers
                .apply(adjusted, trip, &features, &mut adjustments);

            let valuation = Valuation {
                mileage,
                receipt_value: Some(receipt_value),
                per_diem: Some(lodging.per_diem),
                lodging: Some(lodging.amount),
                base,
            };
            (adjusted, Pathway::MultiDay, valuation)
        };

        let assessment = policy.anomaly.assess(trip, &features);
        total = policy.response.apply(total, &assessment, &mut adjustments);

        let bonus = &policy.rounding_bonus;
        if bonus.applies(trip.total_receipts()) {
            total += bonus.amount;
            adjustments.push(AdjustmentStep {
                stage: AdjustmentStage::RoundingBonus,
                label: "receipt cents bonus".to_string(),
                effect: Effect::Add(bonus.amount),
                total,
            });
        }

        let mut floor_applied = false;
        if pathway != Pathway::FraudOverride {
            let minimum = policy.minimum_floor.minimum(trip.duration_days());
            if total < minimum {
                adjustments.push(AdjustmentStep {
                    stage: AdjustmentStage::MinimumFloor,
                    label: format!("minimum {:.2} per day", policy.minimum_floor.per_day),
                    effect: Effect::Add(minimum - total),
                    total: minimum,
                });
                total = minimum;
                floor_applied = true;
            }
        }

        let amount = round_to_cents(total);

        debug!(
            days = trip.duration_days(),
            miles = trip.miles_traveled(),
            receipts = trip.total_receipts(),
            ?pathway,
            anomaly_score = assessment.anomaly_score,
            floor_applied,
            amount,
            "estimated reimbursement"
        );

        ReimbursementEstimate {
            trip: *trip,
            amount,
            pathway,
            features,
            valuation,
            adjustments,
            assessment,
            floor_applied,
        }
    }

    pub fn reimburse(&self, trip: &TripRecord) -> f64 {
        self.estimate(trip).amount
    }
}

impl Default for ReimbursementEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Estimates with the standard policy, validating the raw inputs first.
pub fn calculate_reimbursement(
    duration_days: u32,
    miles_traveled: f64,
    total_receipts: f64,
) -> Result<f64, TripError> {
    let trip = TripRecord::new(duration_days, miles_traveled, total_receipts)?;
    Ok(ReimbursementEngine::standard().reimburse(&trip))
}
