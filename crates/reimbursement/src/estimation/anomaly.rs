use super::domain::{AnomalyAssessment, AnomalyFlag, DerivedFeatures, TripRecord};
use super::predicate::TripPredicate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorWeight {
    Add(f64),
    /// Pins the anomaly score at its maximum regardless of other indicators.
    ForceMaximum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyIndicator {
    pub flag: AnomalyFlag,
    pub when: TripPredicate,
    pub weight: IndicatorWeight,
}

impl AnomalyIndicator {
    pub fn new(flag: AnomalyFlag, when: TripPredicate, weight: IndicatorWeight) -> Self {
        Self { flag, when, weight }
    }
}

/// Mutually exclusive indicators; at most one per group fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorGroup {
    pub name: String,
    pub indicators: Vec<AnomalyIndicator>,
}

impl IndicatorGroup {
    pub fn new(name: impl Into<String>, indicators: Vec<AnomalyIndicator>) -> Self {
        Self {
            name: name.into(),
            indicators,
        }
    }

    pub fn single(name: impl Into<String>, indicator: AnomalyIndicator) -> Self {
        Self::new(name, vec![indicator])
    }
}

/// How much the raised flags corroborate each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePolicy {
    pub unflagged: f64,
    pub isolated: f64,
    pub isolated_score_below: f64,
    pub corroborated: f64,
    pub corroborated_flags: usize,
    pub corroborated_score_above: f64,
    pub otherwise: f64,
}

impl ConfidencePolicy {
    pub fn confidence(&self, flag_count: usize, score: f64) -> f64 {
        if flag_count == 0 {
            self.unflagged
        } else if flag_count == 1 && score < self.isolated_score_below {
            self.isolated
        } else if flag_count >= self.corroborated_flags || score > self.corroborated_score_above {
            self.corroborated
        } else {
            self.otherwise
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPolicy {
    pub groups: Vec<IndicatorGroup>,
    pub confidence: ConfidencePolicy,
}

impl AnomalyPolicy {
    pub fn assess(&self, trip: &TripRecord, features: &DerivedFeatures) -> AnomalyAssessment {
        let mut score = 0.0;
        let mut forced = false;
        let mut flags = BTreeSet::new();
        let mut raised = 0usize;

        for group in &self.groups {
            let Some(indicator) = group
                .indicators
                .iter()
                .find(|indicator| indicator.when.matches(trip, features))
            else {
                continue;
            };

            raised += 1;
            flags.insert(indicator.flag);
            match indicator.weight {
                IndicatorWeight::Add(weight) => score += weight,
                IndicatorWeight::ForceMaximum => forced = true,
            }
        }

        let anomaly_score = if forced {
            1.0
        } else {
            f64::clamp(score, 0.0, 1.0)
        };

        AnomalyAssessment {
            anomaly_score,
            confidence: self.confidence.confidence(raised, anomaly_score),
            flags,
        }
    }
}
