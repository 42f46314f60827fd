use std::process::{Command, Output};

fn temp_path(label: &str, extension: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "calculate-reimbursement-{label}-{}.{extension}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_calculate-reimbursement"))
        .args(args)
        .env_remove("REIMBURSEMENT_POLICY")
        .env_remove("APP_PORT")
        .env_remove("APP_HOST")
        .env("APP_LOG_LEVEL", "warn")
        .output()
        .expect("run cli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn prints_the_amount_with_two_decimals() {
    let output = run(&["5", "900", "450"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1255.79");

    let output = run(&["1", "300", "150"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "338.00");
}

#[test]
fn fractional_inputs_are_accepted() {
    let output = run(&["3", "93", "1.42"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "344.64");
}

#[test]
fn explain_prints_the_estimate_as_json() {
    let output = run(&["--explain", "2", "100", "30"]);
    assert!(output.status.success());

    let estimate: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("estimate is json");
    assert_eq!(estimate["amount"], 237.66);
    assert_eq!(estimate["pathway"], "multi_day");
}

#[test]
fn invalid_trips_exit_with_an_error() {
    let output = run(&["0", "100", "30"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: invalid trip"));

    let output = run(&["3", "-5", "30"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn malformed_arguments_are_usage_errors() {
    let output = run(&["three", "100", "30"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let output = run(&["3", "100"]);
    assert!(!output.status.success());
}

#[test]
fn evaluate_reports_corpus_statistics() {
    let corpus = temp_path("corpus", "json");
    std::fs::write(
        &corpus,
        r#"[
            {"input": {"trip_duration_days": 2, "miles_traveled": 100, "total_receipts_amount": 0}, "expected_output": 230.53},
            {"input": {"trip_duration_days": 1, "miles_traveled": 300, "total_receipts_amount": 150}, "expected_output": 300.0}
        ]"#,
    )
    .expect("write corpus");
    let corpus_arg = corpus.to_str().expect("utf-8 temp path");

    let output = run(&["evaluate", corpus_arg, "--top", "1"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Regression evaluation: 2 cases"));
    assert!(text.contains("case 1: 1 days"));

    let output = run(&["evaluate", corpus_arg, "--json"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("report json");
    assert_eq!(report["summary"]["case_count"], 2);
    assert_eq!(report["summary"]["exact_matches"], 1);

    std::fs::remove_file(&corpus).ok();
}

#[test]
fn evaluate_reads_csv_corpora() {
    let corpus = temp_path("corpus", "csv");
    std::fs::write(
        &corpus,
        "trip_duration_days,miles_traveled,total_receipts_amount,expected_output\n\
         5,900,450,1255.79\n",
    )
    .expect("write corpus");
    let corpus_arg = corpus.to_str().expect("utf-8 temp path");

    let output = run(&["evaluate", corpus_arg]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Regression evaluation: 1 cases"));

    std::fs::remove_file(&corpus).ok();
}

#[test]
fn evaluate_rejects_unknown_corpus_extensions() {
    let corpus = temp_path("corpus", "txt");
    std::fs::write(&corpus, "[]").expect("write corpus");
    let corpus_arg = corpus.to_str().expect("utf-8 temp path");

    let output = run(&["evaluate", corpus_arg]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported corpus format 'txt'"));

    std::fs::remove_file(&corpus).ok();
}

#[test]
fn policy_files_change_the_estimate() {
    let output = run(&["policy"]);
    assert!(output.status.success());
    let mut policy: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("policy json");
    policy["minimum_floor"]["per_day"] = serde_json::json!(500.0);

    let path = temp_path("policy", "json");
    std::fs::write(&path, policy.to_string()).expect("write policy");
    let path_arg = path.to_str().expect("utf-8 temp path");

    let output = run(&["--policy", path_arg, "2", "100", "0"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1000.00");

    std::fs::remove_file(&path).ok();
}
