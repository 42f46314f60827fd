use super::domain::{AdjustmentStage, AdjustmentStep, DerivedFeatures, TripRecord};
use super::predicate::TripPredicate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a matched table row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Multiply(f64),
    Add(f64),
}

impl Effect {
    pub const IDENTITY: Effect = Effect::Multiply(1.0);

    pub fn apply(self, total: f64) -> f64 {
        match self {
            Effect::Multiply(factor) => total * factor,
            Effect::Add(amount) => total + amount,
        }
    }

    pub fn is_identity(self) -> bool {
        match self {
            Effect::Multiply(factor) => factor == 1.0,
            Effect::Add(amount) => amount == 0.0,
        }
    }

    fn identity() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Multiply(factor) => write!(f, "x{factor:.2}"),
            Effect::Add(amount) if *amount < 0.0 => write!(f, "-{:.2}", amount.abs()),
            Effect::Add(amount) => write!(f, "+{amount:.2}"),
        }
    }
}

/// Single row of the duration tier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub label: String,
    #[serde(default)]
    pub when: TripPredicate,
    pub effect: Effect,
}

impl TierRule {
    pub fn new(label: impl Into<String>, when: TripPredicate, effect: Effect) -> Self {
        Self {
            label: label.into(),
            when,
            effect,
        }
    }
}

/// Ordered rows evaluated first-match-wins, with a fallback when nothing matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    pub rules: Vec<TierRule>,
    #[serde(default = "Effect::identity")]
    pub fallback: Effect,
}

/// Row selected by [`RuleGroup::resolve`]; `label` is `None` when the fallback applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch<'a> {
    pub label: Option<&'a str>,
    pub effect: Effect,
}

impl RuleGroup {
    pub fn new(name: impl Into<String>, rules: Vec<TierRule>) -> Self {
        Self {
            name: name.into(),
            rules,
            fallback: Effect::IDENTITY,
        }
    }

    pub fn resolve(&self, trip: &TripRecord, features: &DerivedFeatures) -> RuleMatch<'_> {
        self.rules
            .iter()
            .find(|rule| rule.when.matches(trip, features))
            .map(|rule| RuleMatch {
                label: Some(rule.label.as_str()),
                effect: rule.effect,
            })
            .unwrap_or(RuleMatch {
                label: None,
                effect: self.fallback,
            })
    }
}

/// Duration x spending adjustments applied to multi-day trips after the efficiency stage.
///
/// Groups run in sequence; inside a group only the first matching row applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationTierTable {
    groups: Vec<RuleGroup>,
}

impl DurationTierTable {
    pub fn new(groups: Vec<RuleGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub(crate) fn apply(
        &self,
        mut total: f64,
        trip: &TripRecord,
        features: &DerivedFeatures,
        steps: &mut Vec<AdjustmentStep>,
    ) -> f64 {
        for group in &self.groups {
            let matched = group.resolve(trip, features);
            total = matched.effect.apply(total);

            if matched.label.is_some() || !matched.effect.is_identity() {
                steps.push(AdjustmentStep {
                    stage: AdjustmentStage::DurationTier,
                    label: format!(
                        "{}: {}",
                        group.name,
                        matched.label.unwrap_or("fallback")
                    ),
                    effect: matched.effect,
                    total,
                });
            }
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::predicate::{Bound, DayRange};

    fn trip(days: u32, miles: f64, receipts: f64) -> (TripRecord, DerivedFeatures) {
        let trip = TripRecord::new(days, miles, receipts).expect("valid trip");
        let features = DerivedFeatures::derive(&trip);
        (trip, features)
    }

    fn banded_group() -> RuleGroup {
        RuleGroup::new(
            "bands",
            vec![
                TierRule::new(
                    "ultra",
                    TripPredicate::days(DayRange::exactly(2))
                        .with_receipts_per_day(Bound::above(400.0)),
                    Effect::Multiply(1.1),
                ),
                TierRule::new(
                    "high",
                    TripPredicate::days(DayRange::exactly(2))
                        .with_receipts_per_day(Bound::above(200.0)),
                    Effect::Multiply(0.9),
                ),
            ],
        )
    }

    #[test]
    fn first_matching_row_wins() {
        let group = banded_group();
        let (trip, features) = trip(2, 100.0, 1000.0);

        let matched = group.resolve(&trip, &features);

        assert_eq!(matched.label, Some("ultra"));
        assert_eq!(matched.effect, Effect::Multiply(1.1));
    }

    #[test]
    fn unmatched_group_uses_fallback() {
        let mut group = banded_group();
        let (trip, features) = trip(3, 100.0, 100.0);
        assert_eq!(group.resolve(&trip, &features).effect, Effect::IDENTITY);

        group.fallback = Effect::Add(-5.0);
        let matched = group.resolve(&trip, &features);
        assert_eq!(matched.label, None);
        assert_eq!(matched.effect, Effect::Add(-5.0));
    }

    #[test]
    fn table_applies_groups_in_order_and_records_steps() {
        let table = DurationTierTable::new(vec![
            RuleGroup::new(
                "bonus",
                vec![TierRule::new("flat", TripPredicate::any(), Effect::Add(100.0))],
            ),
            RuleGroup::new(
                "scale",
                vec![TierRule::new("double", TripPredicate::any(), Effect::Multiply(2.0))],
            ),
            banded_group(),
        ]);
        let (trip, features) = trip(5, 100.0, 100.0);
        let mut steps = Vec::new();

        let total = table.apply(50.0, &trip, &features, &mut steps);

        assert_eq!(total, 300.0);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].label, "bonus: flat");
        assert_eq!(steps[1].total, 300.0);
    }

    #[test]
    fn effect_parses_from_snake_case_json() {
        let effect: Effect = serde_json::from_str(r#"{"multiply":0.92}"#).expect("parses");
        assert_eq!(effect, Effect::Multiply(0.92));
        let group: RuleGroup = serde_json::from_str(
            r#"{"name":"weekend","rules":[{"label":"6-7 days","when":{"days":{"min":6,"max":7}},"effect":{"multiply":0.92}}]}"#,
        )
        .expect("group parses");
        assert_eq!(group.fallback, Effect::IDENTITY);
        assert_eq!(group.rules[0].when.days, DayRange::between(6, 7));
    }

    #[test]
    fn effect_display_is_compact() {
        assert_eq!(Effect::Multiply(1.25).to_string(), "x1.25");
        assert_eq!(Effect::Add(255.0).to_string(), "+255.00");
        assert_eq!(Effect::Add(-5.0).to_string(), "-5.00");
    }
}
