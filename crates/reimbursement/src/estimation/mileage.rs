use super::domain::{DerivedFeatures, TripRecord};
use serde::{Deserialize, Serialize};

/// Marginal per-mile rate applying up to `up_to` miles; the last tier is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MileageTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,
    pub rate: f64,
}

/// Flat per-day supplement for trips that accumulate little daily mileage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowEfficiencySupplement {
    pub below_miles_per_day: f64,
    pub per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageSchedule {
    pub tiers: Vec<MileageTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_efficiency: Option<LowEfficiencySupplement>,
}

impl MileageSchedule {
    /// Each mile is paid at the rate of the bracket it falls in.
    pub fn tiered_value(&self, miles: f64) -> f64 {
        let mut value = 0.0;
        let mut paid_through = 0.0;

        for tier in &self.tiers {
            if miles <= paid_through {
                break;
            }
            let ceiling = tier.up_to.unwrap_or(f64::INFINITY);
            value += (miles.min(ceiling) - paid_through) * tier.rate;
            paid_through = ceiling;
        }

        value
    }

    pub fn supplement(&self, trip: &TripRecord, features: &DerivedFeatures) -> f64 {
        match self.low_efficiency {
            Some(rule) if features.miles_per_day < rule.below_miles_per_day => {
                f64::from(trip.duration_days()) * rule.per_day
            }
            _ => 0.0,
        }
    }

    pub fn value(&self, trip: &TripRecord, features: &DerivedFeatures) -> f64 {
        self.tiered_value(trip.miles_traveled()) + self.supplement(trip, features)
    }
}
