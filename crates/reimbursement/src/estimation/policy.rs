use super::adjusters::EfficiencyPolicy;
use super::anomaly::{AnomalyPolicy, IndicatorWeight};
use super::finishing::{MinimumFloor, RoundingBonus};
use super::mileage::MileageSchedule;
use super::receipts::ReceiptModel;
use super::response::ResponsePolicy;
use super::single_day::SingleDayPolicy;
use super::tiers::{DurationTierTable, Effect};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Every tunable constant of the estimation pipeline.
///
/// `Policy::standard()` reproduces the legacy approvals; alternative policies are loaded
/// from JSON and checked with [`Policy::validate`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub per_diem_rate: f64,
    pub mileage: MileageSchedule,
    pub receipts: ReceiptModel,
    pub efficiency: EfficiencyPolicy,
    pub duration_tiers: DurationTierTable,
    pub single_day: SingleDayPolicy,
    pub anomaly: AnomalyPolicy,
    pub response: ResponsePolicy,
    pub rounding_bonus: RoundingBonus,
    pub minimum_floor: MinimumFloor,
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse policy: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid policy: {0}")]
    Invalid(String),
}

impl Policy {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, PolicyError> {
        let policy: Policy = serde_json::from_str(raw)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn to_json(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks that keep the pipeline total and bounded.
    pub fn validate(&self) -> Result<(), PolicyError> {
        ensure_non_negative("per_diem_rate", self.per_diem_rate)?;
        ensure_non_negative("minimum_floor.per_day", self.minimum_floor.per_day)?;
        ensure_non_negative("rounding_bonus.amount", self.rounding_bonus.amount)?;
        if self.rounding_bonus.cents.iter().any(|cents| *cents > 99) {
            return Err(invalid("rounding_bonus.cents entries must be between 0 and 99"));
        }

        self.validate_mileage()?;
        self.validate_receipts()?;
        self.validate_single_day()?;
        self.validate_response()?;
        self.validate_duration_tiers()?;
        self.validate_anomaly()?;

        Ok(())
    }

    fn validate_duration_tiers(&self) -> Result<(), PolicyError> {
        for group in self.duration_tiers.groups() {
            if group.name.trim().is_empty() {
                return Err(invalid("duration tier groups need a name"));
            }
            let effects = group
                .rules
                .iter()
                .map(|rule| rule.effect)
                .chain(std::iter::once(group.fallback));
            for effect in effects {
                let value = match effect {
                    Effect::Multiply(factor) => factor,
                    Effect::Add(amount) => amount,
                };
                ensure_non_negative(&format!("duration_tiers.{}", group.name), value)?;
            }
        }
        Ok(())
    }

    fn validate_anomaly(&self) -> Result<(), PolicyError> {
        for group in &self.anomaly.groups {
            for indicator in &group.indicators {
                if let IndicatorWeight::Add(weight) = indicator.weight {
                    ensure_non_negative(&format!("anomaly.{}", group.name), weight)?;
                }
            }
        }
        Ok(())
    }

    fn validate_mileage(&self) -> Result<(), PolicyError> {
        let tiers = &self.mileage.tiers;
        let Some(last) = tiers.last() else {
            return Err(invalid("mileage.tiers must not be empty"));
        };
        if last.up_to.is_some() {
            return Err(invalid("the last mileage tier must be open-ended"));
        }

        let mut previous = 0.0;
        for (index, tier) in tiers.iter().enumerate() {
            ensure_non_negative("mileage.tiers.rate", tier.rate)?;
            match tier.up_to {
                Some(limit) if limit <= previous => {
                    return Err(invalid(format!(
                        "mileage tier {index} must end above {previous}"
                    )));
                }
                Some(limit) => previous = limit,
                None if index + 1 < tiers.len() => {
                    return Err(invalid("only the last mileage tier may be open-ended"));
                }
                None => {}
            }
        }

        if let Some(supplement) = self.mileage.low_efficiency {
            ensure_non_negative("mileage.low_efficiency.per_day", supplement.per_day)?;
        }
        Ok(())
    }

    fn validate_receipts(&self) -> Result<(), PolicyError> {
        match &self.receipts {
            ReceiptModel::Tiered(schedule) => {
                let Some(last) = schedule.bands.last() else {
                    return Err(invalid("receipts.bands must not be empty"));
                };
                if last.when.below.is_some() || last.when.at_most.is_some() {
                    return Err(invalid(
                        "the last receipt band must have no upper limit",
                    ));
                }
                for band in &schedule.bands {
                    ensure_non_negative("receipts.bands.rate", band.rate)?;
                }
            }
            ReceiptModel::DurationAware(schedule) => {
                if schedule.sweet_spots.is_empty() {
                    return Err(invalid("receipts.sweet_spots must not be empty"));
                }
                if schedule
                    .sweet_spots
                    .iter()
                    .any(|spot| spot.min_per_day > spot.max_per_day || spot.max_per_day <= 0.0)
                {
                    return Err(invalid(
                        "receipt sweet spots need a positive maximum at or above the minimum",
                    ));
                }
                for (field, rate) in [
                    ("receipts.minimum_rate", schedule.minimum_rate),
                    ("receipts.sweet_spot_rate", schedule.sweet_spot_rate),
                    ("receipts.standard_rate", schedule.standard_rate),
                    ("receipts.extreme_short_trip_rate", schedule.extreme_short_trip_rate),
                    ("receipts.extreme_long_trip_rate", schedule.extreme_long_trip_rate),
                    ("receipts.far_above_floor_rate", schedule.far_above_floor_rate),
                    ("receipts.above_floor_rate", schedule.above_floor_rate),
                ] {
                    ensure_non_negative(field, rate)?;
                }
            }
        }
        Ok(())
    }

    fn validate_single_day(&self) -> Result<(), PolicyError> {
        let single_day = &self.single_day;
        ensure_non_negative("single_day.fallback_bonus", single_day.fallback_bonus)?;
        ensure_non_negative(
            "single_day.fraud_override.mileage_share",
            single_day.fraud_override.mileage_share,
        )?;
        if single_day.fraud_override.when.is_catch_all() {
            return Err(invalid(
                "single_day.fraud_override must be restricted to a signature",
            ));
        }

        let plateau = single_day.plateau;
        if plateau.ceiling < plateau.threshold {
            return Err(invalid(
                "single_day.plateau.ceiling must not be below the threshold",
            ));
        }
        if !(0.0..=1.0).contains(&plateau.excess_share) {
            return Err(invalid("single_day.plateau.excess_share must be within [0, 1]"));
        }
        Ok(())
    }

    fn validate_response(&self) -> Result<(), PolicyError> {
        let response = &self.response;
        for (field, floor) in [
            ("response.safety_floor", response.safety_floor),
            ("response.known_fraud_floor", response.known_fraud_floor),
        ] {
            if !(floor > 0.0 && floor <= 1.0) {
                return Err(invalid(format!("{field} must be within (0, 1]")));
            }
        }
        if response.known_fraud_floor > response.safety_floor {
            return Err(invalid(
                "response.known_fraud_floor must not exceed response.safety_floor",
            ));
        }
        if response.medium_from > response.high_from {
            return Err(invalid(
                "response.medium_from must not exceed response.high_from",
            ));
        }
        for (field, severity) in [
            ("response.low_severity", response.low_severity),
            ("response.medium_severity", response.medium_severity),
            ("response.high_severity", response.high_severity),
        ] {
            ensure_non_negative(field, severity)?;
        }
        Ok(())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::standard()
    }
}

fn invalid(message: impl Into<String>) -> PolicyError {
    PolicyError::Invalid(message.into())
}

fn ensure_non_negative(field: &str, value: f64) -> Result<(), PolicyError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "{field} must be a finite, non-negative number (got {value})"
        )))
    }
}
