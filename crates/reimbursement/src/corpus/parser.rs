use crate::estimation::TripInput;
use serde::Deserialize;
use std::io::Read;

/// Row exactly as it appears in a corpus file, before trip validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RawCase {
    pub(crate) input: TripInput,
    pub(crate) expected_output: f64,
}

#[derive(Debug, Deserialize)]
struct JsonCase {
    input: TripInput,
    expected_output: f64,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    trip_duration_days: u32,
    miles_traveled: f64,
    total_receipts_amount: f64,
    expected_output: f64,
}

pub(crate) fn parse_json<R: Read>(reader: R) -> Result<Vec<RawCase>, serde_json::Error> {
    let cases: Vec<JsonCase> = serde_json::from_reader(reader)?;
    Ok(cases
        .into_iter()
        .map(|case| RawCase {
            input: case.input,
            expected_output: case.expected_output,
        })
        .collect())
}

pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawCase>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut cases = Vec::new();

    for record in csv_reader.deserialize::<CsvRow>() {
        let row = record?;
        cases.push(RawCase {
            input: TripInput {
                trip_duration_days: row.trip_duration_days,
                miles_traveled: row.miles_traveled,
                total_receipts_amount: row.total_receipts_amount,
            },
            expected_output: row.expected_output,
        });
    }

    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_json_cases() {
        let json = r#"[
            {"input": {"trip_duration_days": 3, "miles_traveled": 93, "total_receipts_amount": 1.42}, "expected_output": 364.51},
            {"input": {"trip_duration_days": 1, "miles_traveled": 55, "total_receipts_amount": 3.6}, "expected_output": 126.06}
        ]"#;

        let cases = parse_json(Cursor::new(json)).expect("json parses");

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].input.trip_duration_days, 3);
        assert_eq!(cases[1].expected_output, 126.06);
    }

    #[test]
    fn parses_csv_with_padding() {
        let csv = "trip_duration_days, miles_traveled, total_receipts_amount, expected_output\n\
                   3, 93, 1.42, 364.51\n\
                   5, 130, 306.9, 574.1\n";

        let cases = parse_csv(Cursor::new(csv)).expect("csv parses");

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].input.miles_traveled, 130.0);
        assert_eq!(cases[1].expected_output, 574.1);
    }

    #[test]
    fn csv_reports_malformed_numbers() {
        let csv = "trip_duration_days,miles_traveled,total_receipts_amount,expected_output\n\
                   three,93,1.42,364.51\n";
        assert!(parse_csv(Cursor::new(csv)).is_err());
    }
}
