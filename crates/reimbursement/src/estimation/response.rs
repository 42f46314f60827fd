use super::domain::{AdjustmentStage, AdjustmentStep, AnomalyAssessment};
use super::tiers::Effect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low confidence",
            ConfidenceTier::Medium => "medium confidence",
            ConfidenceTier::High => "high confidence",
        }
    }
}

/// Proportional discount driven by the anomaly score and the confidence behind it.
///
/// `factor = 1 - score * severity`, floored at `safety_floor`, or at `known_fraud_floor`
/// when the known fraud signature was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponsePolicy {
    pub medium_from: f64,
    pub high_from: f64,
    pub low_severity: f64,
    pub medium_severity: f64,
    pub high_severity: f64,
    pub safety_floor: f64,
    pub known_fraud_floor: f64,
}

impl ResponsePolicy {
    pub fn tier(&self, confidence: f64) -> ConfidenceTier {
        if confidence < self.medium_from {
            ConfidenceTier::Low
        } else if confidence < self.high_from {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::High
        }
    }

    pub fn severity(&self, tier: ConfidenceTier) -> f64 {
        match tier {
            ConfidenceTier::Low => self.low_severity,
            ConfidenceTier::Medium => self.medium_severity,
            ConfidenceTier::High => self.high_severity,
        }
    }

    pub fn factor(&self, assessment: &AnomalyAssessment) -> f64 {
        let severity = self.severity(self.tier(assessment.confidence));
        let factor = 1.0 - assessment.anomaly_score * severity;
        let floor = if assessment.is_known_fraud() {
            self.known_fraud_floor
        } else {
            self.safety_floor
        };
        factor.max(floor)
    }

    pub(crate) fn apply(
        &self,
        total: f64,
        assessment: &AnomalyAssessment,
        steps: &mut Vec<AdjustmentStep>,
    ) -> f64 {
        let factor = self.factor(assessment);
        if factor == 1.0 {
            return total;
        }

        let adjusted = total * factor;
        steps.push(AdjustmentStep {
            stage: AdjustmentStage::AnomalyResponse,
            label: format!(
                "anomaly score {:.2} ({})",
                assessment.anomaly_score,
                self.tier(assessment.confidence).label()
            ),
            effect: Effect::Multiply(factor),
            total: adjusted,
        });
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::AnomalyFlag;
    use crate::estimation::policy::Policy;
    use std::collections::BTreeSet;

    fn assessment(score: f64, confidence: f64, flags: &[AnomalyFlag]) -> AnomalyAssessment {
        AnomalyAssessment {
            anomaly_score: score,
            flags: flags.iter().copied().collect::<BTreeSet<_>>(),
            confidence,
        }
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[test]
    fn confidence_selects_severity() {
        let policy = Policy::standard().response;
        assert_eq!(policy.tier(0.5), ConfidenceTier::Low);
        assert_eq!(policy.tier(0.6), ConfidenceTier::Medium);
        assert_eq!(policy.tier(0.7), ConfidenceTier::Medium);
        assert_eq!(policy.tier(0.9), ConfidenceTier::High);

        assert!(close(policy.factor(&assessment(0.5, 0.5, &[])), 0.95));
        assert!(close(policy.factor(&assessment(0.5, 0.7, &[])), 0.90));
        assert!(close(policy.factor(&assessment(0.5, 0.9, &[])), 0.80));
    }

    #[test]
    fn zero_score_leaves_total_untouched() {
        let policy = Policy::standard().response;
        let mut steps = Vec::new();
        let total = policy.apply(420.0, &assessment(0.0, 0.5, &[]), &mut steps);
        assert_eq!(total, 420.0);
        assert!(steps.is_empty());
    }

    #[test]
    fn factor_never_drops_below_the_safety_floor() {
        let mut policy = Policy::standard().response;
        policy.high_severity = 0.9;

        let suspicious = assessment(1.0, 0.9, &[AnomalyFlag::ExcessiveDailyMileage]);
        assert!(close(policy.factor(&suspicious), 0.30));

        let fraud = assessment(1.0, 0.9, &[AnomalyFlag::KnownFraudPattern]);
        assert!(close(policy.factor(&fraud), 0.15));
    }

    #[test]
    fn standard_known_fraud_response_is_sixty_percent() {
        let policy = Policy::standard().response;
        let fraud = assessment(1.0, 0.9, &[AnomalyFlag::KnownFraudPattern]);
        let mut steps = Vec::new();

        let total = policy.apply(100.0, &fraud, &mut steps);

        assert!(close(total, 60.0));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].effect, Effect::Multiply(policy.factor(&fraud)));
    }
}
