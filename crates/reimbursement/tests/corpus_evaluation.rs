use reimbursement::corpus::{CorpusError, RegressionCorpus};
use reimbursement::ReimbursementEngine;
use std::path::PathBuf;

fn temp_corpus(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "reimbursement-corpus-{}-{}",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).expect("corpus written");
    path
}

#[test]
fn json_corpus_evaluates_against_the_standard_engine() {
    let path = temp_corpus(
        "cases.json",
        r#"[
            {"input": {"trip_duration_days": 2, "miles_traveled": 100, "total_receipts_amount": 0}, "expected_output": 230.53},
            {"input": {"trip_duration_days": 5, "miles_traveled": 900, "total_receipts_amount": 450}, "expected_output": 1255.79},
            {"input": {"trip_duration_days": 1, "miles_traveled": 300, "total_receipts_amount": 150}, "expected_output": 300.0}
        ]"#,
    );

    let corpus = RegressionCorpus::from_path(&path).expect("corpus loads");
    let report = corpus.evaluate(&ReimbursementEngine::standard());

    assert_eq!(report.case_count, 3);
    assert_eq!(report.exact_matches, 2);
    assert_eq!(report.over_predictions, 1);
    assert_eq!(report.within_50, 3);
    let worst = report.worst(1);
    assert_eq!(worst[0].index, 2);
    assert!(report.render(3).contains("Worst cases"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn csv_corpus_matches_json_corpus() {
    let csv = temp_corpus(
        "cases.csv",
        "trip_duration_days,miles_traveled,total_receipts_amount,expected_output\n\
         2,100,0,230.53\n\
         5,900,450,1255.79\n",
    );

    let corpus = RegressionCorpus::from_path(&csv).expect("csv loads");

    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus.cases()[1].trip.duration_days(), 5);
    let report = corpus.evaluate(&ReimbursementEngine::standard());
    assert_eq!(report.exact_matches, 2);

    std::fs::remove_file(&csv).ok();
}

#[test]
fn missing_corpus_surfaces_io_errors() {
    let err = RegressionCorpus::from_path("/nonexistent/public_cases.json")
        .expect_err("file does not exist");
    assert!(matches!(err, CorpusError::Io(_)));
}
