//! Regression corpus of historical approvals and the evaluation of an engine against it.

mod parser;
mod report;

pub use report::{CaseOutcome, DurationBucket, EvaluationReport};

use crate::estimation::{ReimbursementEngine, TripError, TripRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum CorpusError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    InvalidTrip { index: usize, source: TripError },
    UnsupportedFormat(String),
}

impl std::fmt::Display for CorpusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusError::Io(err) => write!(f, "failed to read corpus: {}", err),
            CorpusError::Json(err) => write!(f, "invalid corpus JSON: {}", err),
            CorpusError::Csv(err) => write!(f, "invalid corpus CSV data: {}", err),
            CorpusError::InvalidTrip { index, source } => {
                write!(f, "corpus case {} is not a valid trip: {}", index, source)
            }
            CorpusError::UnsupportedFormat(extension) => write!(
                f,
                "unsupported corpus format '{}': expected .json or .csv",
                extension
            ),
        }
    }
}

impl std::error::Error for CorpusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CorpusError::Io(err) => Some(err),
            CorpusError::Json(err) => Some(err),
            CorpusError::Csv(err) => Some(err),
            CorpusError::InvalidTrip { source, .. } => Some(source),
            CorpusError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for CorpusError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CorpusError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for CorpusError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Historical trip paired with the amount the legacy process approved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionCase {
    pub trip: TripRecord,
    pub expected_output: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegressionCorpus {
    cases: Vec<RegressionCase>,
}

impl RegressionCorpus {
    pub fn new(cases: Vec<RegressionCase>) -> Self {
        Self { cases }
    }

    /// Picks the parser from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let file = File::open(path)?;
        match extension.as_str() {
            "json" => Self::from_json_reader(file),
            "csv" => Self::from_csv_reader(file),
            _ => Err(CorpusError::UnsupportedFormat(extension)),
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        Self::from_raw(parser::parse_json(reader)?)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        Self::from_raw(parser::parse_csv(reader)?)
    }

    fn from_raw(raw: Vec<parser::RawCase>) -> Result<Self, CorpusError> {
        let cases = raw
            .into_iter()
            .enumerate()
            .map(|(index, case)| {
                TripRecord::try_from(case.input)
                    .map(|trip| RegressionCase {
                        trip,
                        expected_output: case.expected_output,
                    })
                    .map_err(|source| CorpusError::InvalidTrip { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cases })
    }

    pub fn cases(&self) -> &[RegressionCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn evaluate(&self, engine: &ReimbursementEngine) -> EvaluationReport {
        let outcomes = self
            .cases
            .iter()
            .enumerate()
            .map(|(index, case)| CaseOutcome {
                index,
                trip: case.trip,
                expected: case.expected_output,
                actual: engine.reimburse(&case.trip),
            })
            .collect();

        let report = EvaluationReport::from_outcomes(outcomes);
        info!(
            cases = report.case_count,
            exact = report.exact_matches,
            close = report.close_matches,
            mean_absolute_error = report.mean_absolute_error,
            "evaluated regression corpus"
        );
        report
    }
}
