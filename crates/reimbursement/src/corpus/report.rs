use crate::estimation::{DayRange, TripRecord};
use serde::Serialize;
use std::fmt;

const EXACT_TOLERANCE: f64 = 0.01;
const CLOSE_TOLERANCE: f64 = 1.0;

/// Engine output for one corpus case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub index: usize,
    pub trip: TripRecord,
    pub expected: f64,
    pub actual: f64,
}

impl CaseOutcome {
    /// Signed error; negative when the engine under-pays.
    pub fn error(&self) -> f64 {
        self.actual - self.expected
    }

    pub fn absolute_error(&self) -> f64 {
        self.error().abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBucket {
    pub label: &'static str,
    pub days: DayRange,
    pub cases: usize,
    pub mean_error: f64,
    pub mean_absolute_error: f64,
}

/// Aggregate agreement between the engine and the legacy approvals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub case_count: usize,
    pub exact_matches: usize,
    pub close_matches: usize,
    pub mean_error: f64,
    pub mean_absolute_error: f64,
    pub max_absolute_error: f64,
    pub under_predictions: usize,
    pub over_predictions: usize,
    pub within_25: usize,
    pub within_50: usize,
    pub within_100: usize,
    pub correlation: Option<f64>,
    pub buckets: Vec<DurationBucket>,
    #[serde(skip)]
    outcomes: Vec<CaseOutcome>,
}

fn standard_buckets() -> [(&'static str, DayRange); 7] {
    [
        ("1-2 days", DayRange::between(1, 2)),
        ("3 days", DayRange::exactly(3)),
        ("4-5 days", DayRange::between(4, 5)),
        ("6-7 days", DayRange::between(6, 7)),
        ("8-10 days", DayRange::between(8, 10)),
        ("11-14 days", DayRange::between(11, 14)),
        ("15+ days", DayRange::from(15)),
    ]
}

fn mean(values: impl Iterator<Item = f64>) -> (usize, f64) {
    let (count, sum) = values.fold((0usize, 0.0), |(count, sum), value| (count + 1, sum + value));
    if count == 0 {
        (0, 0.0)
    } else {
        (count, sum / count as f64)
    }
}

fn pearson(outcomes: &[CaseOutcome]) -> Option<f64> {
    if outcomes.len() < 2 {
        return None;
    }

    let (_, mean_expected) = mean(outcomes.iter().map(|outcome| outcome.expected));
    let (_, mean_actual) = mean(outcomes.iter().map(|outcome| outcome.actual));

    let mut covariance = 0.0;
    let mut variance_expected = 0.0;
    let mut variance_actual = 0.0;
    for outcome in outcomes {
        let expected = outcome.expected - mean_expected;
        let actual = outcome.actual - mean_actual;
        covariance += expected * actual;
        variance_expected += expected * expected;
        variance_actual += actual * actual;
    }

    let denominator = (variance_expected * variance_actual).sqrt();
    if denominator == 0.0 {
        None
    } else {
        Some(covariance / denominator)
    }
}

impl EvaluationReport {
    pub fn from_outcomes(outcomes: Vec<CaseOutcome>) -> Self {
        let count_within =
            |limit: f64| outcomes.iter().filter(|o| o.absolute_error() <= limit).count();

        let (case_count, mean_error) = mean(outcomes.iter().map(CaseOutcome::error));
        let (_, mean_absolute_error) = mean(outcomes.iter().map(CaseOutcome::absolute_error));
        let max_absolute_error = outcomes
            .iter()
            .map(CaseOutcome::absolute_error)
            .fold(0.0, f64::max);

        let buckets = standard_buckets()
            .into_iter()
            .map(|(label, days)| {
                let in_bucket = || {
                    outcomes
                        .iter()
                        .filter(move |o| days.contains(o.trip.duration_days()))
                };
                let (cases, mean_error) = mean(in_bucket().map(CaseOutcome::error));
                let (_, mean_absolute_error) = mean(in_bucket().map(CaseOutcome::absolute_error));
                DurationBucket {
                    label,
                    days,
                    cases,
                    mean_error,
                    mean_absolute_error,
                }
            })
            .collect();

        Self {
            case_count,
            exact_matches: count_within(EXACT_TOLERANCE),
            close_matches: count_within(CLOSE_TOLERANCE),
            mean_error,
            mean_absolute_error,
            max_absolute_error,
            under_predictions: outcomes
                .iter()
                .filter(|o| o.error() < -EXACT_TOLERANCE)
                .count(),
            over_predictions: outcomes
                .iter()
                .filter(|o| o.error() > EXACT_TOLERANCE)
                .count(),
            within_25: count_within(25.0),
            within_50: count_within(50.0),
            within_100: count_within(100.0),
            correlation: pearson(&outcomes),
            buckets,
            outcomes,
        }
    }

    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    /// Cases with the largest absolute error, worst first.
    pub fn worst(&self, limit: usize) -> Vec<&CaseOutcome> {
        let mut ranked: Vec<&CaseOutcome> = self.outcomes.iter().collect();
        ranked.sort_by(|a, b| b.absolute_error().total_cmp(&a.absolute_error()));
        ranked.truncate(limit);
        ranked
    }

    pub fn render(&self, top: usize) -> String {
        let mut output = self.to_string();
        let worst = self.worst(top);
        if !worst.is_empty() {
            output.push_str("\nWorst cases\n");
            for outcome in worst {
                output.push_str(&format!(
                    "- case {}: {} days, {:.0} miles, ${:.2} receipts: expected ${:.2}, got ${:.2} (error {:+.2})\n",
                    outcome.index,
                    outcome.trip.duration_days(),
                    outcome.trip.miles_traveled(),
                    outcome.trip.total_receipts(),
                    outcome.expected,
                    outcome.actual,
                    outcome.error()
                ));
            }
        }
        output
    }
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.case_count;
        writeln!(f, "Regression evaluation: {} cases", total)?;
        writeln!(
            f,
            "Exact matches (+/-$0.01): {} ({:.1}%)",
            self.exact_matches,
            share(self.exact_matches, total)
        )?;
        writeln!(
            f,
            "Close matches (+/-$1.00): {} ({:.1}%)",
            self.close_matches,
            share(self.close_matches, total)
        )?;
        writeln!(f, "Mean error: {:+.2}", self.mean_error)?;
        writeln!(f, "Mean absolute error: {:.2}", self.mean_absolute_error)?;
        writeln!(f, "Max absolute error: {:.2}", self.max_absolute_error)?;
        writeln!(
            f,
            "Under/over predictions: {}/{}",
            self.under_predictions, self.over_predictions
        )?;
        writeln!(
            f,
            "Within $25/$50/$100: {}/{}/{}",
            self.within_25, self.within_50, self.within_100
        )?;
        match self.correlation {
            Some(correlation) => writeln!(f, "Correlation: {:.4}", correlation)?,
            None => writeln!(f, "Correlation: n/a")?,
        }

        writeln!(f, "\nBy duration")?;
        for bucket in self.buckets.iter().filter(|bucket| bucket.cases > 0) {
            writeln!(
                f,
                "- {}: {} cases, mean error {:+.2}, mean absolute error {:.2}",
                bucket.label, bucket.cases, bucket.mean_error, bucket.mean_absolute_error
            )?;
        }
        Ok(())
    }
}
