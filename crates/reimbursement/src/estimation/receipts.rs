use super::domain::TripRecord;
use super::predicate::{Bound, DayRange};
use serde::{Deserialize, Serialize};

/// Receipt valuation schedule selected by the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ReceiptModel {
    Tiered(TieredReceipts),
    DurationAware(DurationAwareReceipts),
}

impl ReceiptModel {
    pub fn value(&self, trip: &TripRecord) -> f64 {
        match self {
            ReceiptModel::Tiered(schedule) => schedule.value(trip.total_receipts()),
            ReceiptModel::DurationAware(schedule) => {
                schedule.value(trip.total_receipts(), trip.duration_days())
            }
        }
    }
}

/// `value = base + (receipts - offset) * rate` for the first band containing the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiptBand {
    pub when: Bound,
    pub rate: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub base: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredReceipts {
    pub bands: Vec<ReceiptBand>,
}

impl TieredReceipts {
    pub fn value(&self, receipts: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| band.when.contains(receipts))
            .map(|band| band.base + (receipts - band.offset) * band.rate)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostRegion {
    #[default]
    Standard,
    HighCost,
    LowCost,
}

impl CostRegion {
    pub fn sweet_spot_scale(self) -> f64 {
        match self {
            CostRegion::Standard => 1.0,
            CostRegion::HighCost => 1.3,
            CostRegion::LowCost => 0.8,
        }
    }
}

/// Preferred receipts-per-day band for trips within `days`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweetSpot {
    pub days: DayRange,
    pub min_per_day: f64,
    pub max_per_day: f64,
}

/// Variant whose sweet spot moves with trip length and regional cost level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationAwareReceipts {
    pub sweet_spots: Vec<SweetSpot>,
    #[serde(default)]
    pub region: CostRegion,
    pub minimum_per_day: f64,
    pub minimum_rate: f64,
    pub sweet_spot_rate: f64,
    pub standard_rate: f64,
    pub extreme_per_day: f64,
    pub extreme_short_trip_days: u32,
    pub extreme_short_trip_rate: f64,
    pub extreme_long_trip_rate: f64,
    pub far_above_floor_rate: f64,
    pub far_above_slope: f64,
    pub above_floor_rate: f64,
    pub above_slope: f64,
}

impl DurationAwareReceipts {
    pub fn sweet_spot(&self, days: u32) -> (f64, f64) {
        let scale = self.region.sweet_spot_scale();
        self.sweet_spots
            .iter()
            .find(|spot| spot.days.contains(days))
            .or_else(|| self.sweet_spots.last())
            .map(|spot| (spot.min_per_day * scale, spot.max_per_day * scale))
            .unwrap_or((0.0, 0.0))
    }

    pub fn value(&self, receipts: f64, days: u32) -> f64 {
        if days == 0 {
            return 0.0;
        }

        let per_day = receipts / f64::from(days);
        let (low, high) = self.sweet_spot(days);

        let rate = if per_day < self.minimum_per_day {
            self.minimum_rate
        } else if per_day >= low && per_day <= high {
            self.sweet_spot_rate
        } else if per_day > self.extreme_per_day {
            if days <= self.extreme_short_trip_days {
                self.extreme_short_trip_rate
            } else {
                self.extreme_long_trip_rate
            }
        } else if high > 0.0 && per_day > high * 2.0 {
            let excess = per_day / (high * 2.0);
            (self.sweet_spot_rate - (excess - 1.0) * self.far_above_slope)
                .max(self.far_above_floor_rate)
        } else if high > 0.0 && per_day > high {
            let excess = per_day / high;
            (self.sweet_spot_rate - (excess - 1.0) * self.above_slope).max(self.above_floor_rate)
        } else {
            self.standard_rate
        };

        receipts * rate
    }
}
