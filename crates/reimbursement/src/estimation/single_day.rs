use super::domain::{AdjustmentStage, AdjustmentStep, DerivedFeatures, TripRecord};
use super::predicate::TripPredicate;
use super::tiers::Effect;
use serde::{Deserialize, Serialize};

/// Replacement formula for a single-day trip matching a known fraud signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudOverride {
    pub label: String,
    pub when: TripPredicate,
    pub mileage_share: f64,
    pub flat_amount: f64,
}

/// Flat bonus added to the mileage value when `when` matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleDayBand {
    pub label: String,
    pub when: TripPredicate,
    pub bonus: f64,
}

impl SingleDayBand {
    pub fn new(label: impl Into<String>, when: TripPredicate, bonus: f64) -> Self {
        Self {
            label: label.into(),
            when,
            bonus,
        }
    }
}

/// Amounts above `threshold` keep only `excess_share` of the excess, never exceeding `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plateau {
    pub threshold: f64,
    pub excess_share: f64,
    pub ceiling: f64,
}

impl Plateau {
    pub fn apply(&self, value: f64) -> f64 {
        if value > self.threshold {
            (self.threshold + (value - self.threshold) * self.excess_share).min(self.ceiling)
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleDayPolicy {
    pub fraud_override: FraudOverride,
    pub bands: Vec<SingleDayBand>,
    pub fallback_bonus: f64,
    pub plateau: Plateau,
}

/// Result of the single-day pathway before anomaly handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleDayOutcome {
    pub total: f64,
    pub fraud_override: bool,
}

impl SingleDayPolicy {
    pub fn bonus_for(&self, trip: &TripRecord, features: &DerivedFeatures) -> (&str, f64) {
        self.bands
            .iter()
            .find(|band| band.when.matches(trip, features))
            .map(|band| (band.label.as_str(), band.bonus))
            .unwrap_or(("base bonus", self.fallback_bonus))
    }

    pub(crate) fn evaluate(
        &self,
        trip: &TripRecord,
        features: &DerivedFeatures,
        mileage_value: f64,
        steps: &mut Vec<AdjustmentStep>,
    ) -> SingleDayOutcome {
        let rule = &self.fraud_override;
        if rule.when.matches(trip, features) {
            let scaled = mileage_value * rule.mileage_share;
            let total = scaled + rule.flat_amount;
            steps.push(AdjustmentStep {
                stage: AdjustmentStage::FraudOverride,
                label: format!("{}: mileage share", rule.label),
                effect: Effect::Multiply(rule.mileage_share),
                total: scaled,
            });
            steps.push(AdjustmentStep {
                stage: AdjustmentStage::FraudOverride,
                label: format!("{}: flat amount", rule.label),
                effect: Effect::Add(rule.flat_amount),
                total,
            });
            return SingleDayOutcome {
                total,
                fraud_override: true,
            };
        }

        let (label, bonus) = self.bonus_for(trip, features);
        let banded = mileage_value + bonus;
        steps.push(AdjustmentStep {
            stage: AdjustmentStage::SingleDayBand,
            label: label.to_string(),
            effect: Effect::Add(bonus),
            total: banded,
        });

        let total = self.plateau.apply(banded);
        if total != banded {
            steps.push(AdjustmentStep {
                stage: AdjustmentStage::SingleDayPlateau,
                label: format!("plateau above {:.0}", self.plateau.threshold),
                effect: Effect::Add(total - banded),
                total,
            });
        }

        SingleDayOutcome {
            total,
            fraud_override: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::policy::Policy;

    fn bonus(miles: f64, receipts: f64) -> f64 {
        let policy = Policy::standard().single_day;
        let trip = TripRecord::new(1, miles, receipts).expect("valid trip");
        policy.bonus_for(&trip, &DerivedFeatures::derive(&trip)).1
    }

    #[test]
    fn receipt_bands_are_checked_before_mileage() {
        assert_eq!(bonus(900.0, 1600.0), 950.0);
        assert_eq!(bonus(900.0, 1100.0), 750.0);
        assert_eq!(bonus(900.0, 750.0), 550.0);
        assert_eq!(bonus(900.0, 450.0), 350.0);
        assert_eq!(bonus(900.0, 400.0), 250.0);
        assert_eq!(bonus(900.0, 350.0), 400.0);
        assert_eq!(bonus(900.0, 150.0), 200.0);
    }

    #[test]
    fn mileage_decides_when_receipts_are_small() {
        assert_eq!(bonus(900.0, 50.0), 400.0);
        assert_eq!(bonus(800.0, 50.0), 100.0);
        assert_eq!(bonus(10.0, 0.0), 100.0);
    }

    #[test]
    fn plateau_compresses_and_caps_large_amounts() {
        let plateau = Policy::standard().single_day.plateau;
        assert_eq!(plateau.apply(1400.0), 1400.0);
        assert_eq!(plateau.apply(1500.0), 1500.0);
        assert!((plateau.apply(1750.0) - 1550.0).abs() < 1e-9);
        assert_eq!(plateau.apply(5000.0), 1600.0);
    }

    #[test]
    fn fraud_override_replaces_the_band_formula() {
        let policy = Policy::standard().single_day;
        let trip = TripRecord::new(1, 1080.0, 1810.0).expect("valid trip");
        let features = DerivedFeatures::derive(&trip);
        let mut steps = Vec::new();

        let outcome = policy.evaluate(&trip, &features, 433.0, &mut steps);

        assert!(outcome.fraud_override);
        assert!((outcome.total - (433.0 * 0.3 + 100.0)).abs() < 1e-9);
        assert!(steps
            .iter()
            .all(|step| step.stage == AdjustmentStage::FraudOverride));
    }
}
