use super::domain::{DerivedFeatures, TripRecord};
use serde::{Deserialize, Serialize};

/// Numeric interval whose ends are independently optional and either strict or inclusive.
///
/// An empty bound matches every value, which is how catch-all table rows are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_least: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_most: Option<f64>,
}

impl Bound {
    pub const ANY: Bound = Bound {
        above: None,
        at_least: None,
        below: None,
        at_most: None,
    };

    pub fn above(value: f64) -> Self {
        Self {
            above: Some(value),
            ..Self::ANY
        }
    }

    pub fn at_least(value: f64) -> Self {
        Self {
            at_least: Some(value),
            ..Self::ANY
        }
    }

    pub fn below(value: f64) -> Self {
        Self {
            below: Some(value),
            ..Self::ANY
        }
    }

    pub fn at_most(value: f64) -> Self {
        Self {
            at_most: Some(value),
            ..Self::ANY
        }
    }

    /// Closed interval `[min, max]`.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            at_least: Some(min),
            at_most: Some(max),
            ..Self::ANY
        }
    }

    /// Half-open interval `[min, max)`.
    pub fn from_until(min: f64, max: f64) -> Self {
        Self {
            at_least: Some(min),
            below: Some(max),
            ..Self::ANY
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.above.map_or(true, |limit| value > limit)
            && self.at_least.map_or(true, |limit| value >= limit)
            && self.below.map_or(true, |limit| value < limit)
            && self.at_most.map_or(true, |limit| value <= limit)
    }

    pub fn is_unbounded(&self) -> bool {
        self.above.is_none()
            && self.at_least.is_none()
            && self.below.is_none()
            && self.at_most.is_none()
    }
}

/// Inclusive range of trip durations; an absent `max` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    #[serde(default = "DayRange::first_day")]
    pub min: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl Default for DayRange {
    fn default() -> Self {
        Self::ANY
    }
}

impl DayRange {
    pub const ANY: DayRange = DayRange { min: 1, max: None };

    fn first_day() -> u32 {
        1
    }

    pub fn exactly(days: u32) -> Self {
        Self {
            min: days,
            max: Some(days),
        }
    }

    pub fn between(min: u32, max: u32) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn from(min: u32) -> Self {
        Self { min, max: None }
    }

    pub fn up_to(max: u32) -> Self {
        Self {
            min: 1,
            max: Some(max),
        }
    }

    pub fn contains(&self, days: u32) -> bool {
        days >= self.min && self.max.map_or(true, |max| days <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::ANY
    }
}

/// Conjunction of conditions over a trip and its derived features.
///
/// Every unset condition matches, so `TripPredicate::default()` accepts any trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TripPredicate {
    #[serde(default, skip_serializing_if = "DayRange::is_unbounded")]
    pub days: DayRange,
    #[serde(default, skip_serializing_if = "Bound::is_unbounded")]
    pub miles: Bound,
    #[serde(default, skip_serializing_if = "Bound::is_unbounded")]
    pub receipts: Bound,
    #[serde(default, skip_serializing_if = "Bound::is_unbounded")]
    pub miles_per_day: Bound,
    #[serde(default, skip_serializing_if = "Bound::is_unbounded")]
    pub receipts_per_day: Bound,
    #[serde(default, skip_serializing_if = "Bound::is_unbounded")]
    pub expense_ratio: Bound,
}

impl TripPredicate {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn days(days: DayRange) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn with_miles(mut self, bound: Bound) -> Self {
        self.miles = bound;
        self
    }

    pub fn with_receipts(mut self, bound: Bound) -> Self {
        self.receipts = bound;
        self
    }

    pub fn with_miles_per_day(mut self, bound: Bound) -> Self {
        self.miles_per_day = bound;
        self
    }

    pub fn with_receipts_per_day(mut self, bound: Bound) -> Self {
        self.receipts_per_day = bound;
        self
    }

    pub fn with_expense_ratio(mut self, bound: Bound) -> Self {
        self.expense_ratio = bound;
        self
    }

    pub fn matches(&self, trip: &TripRecord, features: &DerivedFeatures) -> bool {
        self.days.contains(trip.duration_days())
            && self.miles.contains(trip.miles_traveled())
            && self.receipts.contains(trip.total_receipts())
            && self.miles_per_day.contains(features.miles_per_day)
            && self.receipts_per_day.contains(features.receipts_per_day)
            && self.expense_ratio.contains(features.expense_ratio)
    }

    pub fn is_catch_all(&self) -> bool {
        self.days.is_unbounded()
            && self.miles.is_unbounded()
            && self.receipts.is_unbounded()
            && self.miles_per_day.is_unbounded()
            && self.receipts_per_day.is_unbounded()
            && self.expense_ratio.is_unbounded()
    }
}
