//! Any: cumulative total over the whole timeline

use crate::common::*;
use ecochallenge::{CompletionStatus, EcoMeasurement};

fn walk(n: u64, miles: f64) -> EcoMeasurement {
    let mut m = measurement(n);
    m.transport.walking = miles;
    m
}

#[test]
fn test_any_reaches_threshold_in_one_day() {
    let mut users = vec![user_with(any("Transport", "Walking", 80.0), vec![walk(0, 80.0)])];

    evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Complete);
    assert_eq!(challenge.progress, 80.0);
}

#[test]
fn test_any_just_below_threshold() {
    let mut users = vec![user_with(any("Transport", "Walking", 80.0), vec![walk(0, 79.0)])];

    let (report, lines) = evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Incomplete);
    assert_eq!(challenge.progress, 79.0);
    assert!((challenge.progress_percent() - 79.0 / 80.0).abs() < 1e-9);
    assert_eq!(report.challenges_completed, 0);
    assert!(lines.is_empty());
}

#[test]
fn test_any_accumulates_eighty_single_mile_days() {
    let timeline = (0..80).rev().map(|n| walk(n, 1.0)).collect();
    let mut users = vec![user_with(any("Transport", "Walking", 80.0), timeline)];

    evaluate(&mut users);

    assert_eq!(only_challenge(&users[0]).status, CompletionStatus::Complete);
}

#[test]
fn test_any_has_no_lookback() {
    // Far older than any windowed lookback
    let timeline = vec![walk(400, 50.0), walk(200, 30.0)];
    let mut users = vec![user_with(any("Transport", "Walking", 80.0), timeline)];

    evaluate(&mut users);

    assert_eq!(only_challenge(&users[0]).status, CompletionStatus::Complete);
}

#[test]
fn test_any_progress_is_capped() {
    let rule = any("Transport", "Walking", 10.0);
    let mut users = vec![user_with(rule, vec![walk(1, 6.0), walk(0, 9.0)])];

    evaluate(&mut users);

    assert_eq!(only_challenge(&users[0]).progress, 10.0);
}
