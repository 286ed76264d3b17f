//! Repeated passes over a frozen timeline

use crate::common::*;
use chrono::Duration;
use ecochallenge::engine::{CancelFlag, Orchestrator};
use ecochallenge::messenger::DigestMessenger;
use ecochallenge::{CompletionStatus, User};

fn mixed_users() -> Vec<User> {
    let mut beefless = measurement(0);
    beefless.diet.fish = 1.0;
    let complete = user_with(skip("Diet", "Beef", 1), vec![beefless]);

    let mut short_walk = measurement(2);
    short_walk.transport.walking = 30.0;
    let mut partial = user_with(any("Transport", "Walking", 80.0), vec![short_walk]);
    partial.id = "u2".to_string();

    let mut deferred = user_with(only_this("Transport", "Train", 10), vec![measurement(1)]);
    deferred.id = "u3".to_string();

    vec![complete, partial, deferred]
}

#[test]
fn test_second_pass_changes_nothing() {
    let mut users = mixed_users();
    let (first, first_lines) = evaluate(&mut users);
    let after_first = users.clone();

    let (second, second_lines) = evaluate(&mut users);

    assert_eq!(first_lines.len(), 2);
    assert!(second_lines.is_empty());
    assert_eq!(second.challenges_completed, 0);
    assert_eq!(second.rewards_completed, 0);
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(users, after_first);
}

#[test]
fn test_completion_date_is_not_restamped() {
    let mut users = mixed_users();
    evaluate(&mut users);

    let later = now() + Duration::days(3);
    evaluate_at(&mut users, later);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Complete);
    assert_eq!(challenge.date_completed, Some(now()));
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let mut sequential: Vec<User> = (0..12)
        .flat_map(|i| {
            mixed_users().into_iter().map(move |mut u| {
                u.id = format!("{}-{}", u.id, i);
                u
            })
        })
        .collect();
    let mut parallel = sequential.clone();

    let (seq_report, seq_lines) = evaluate(&mut sequential);

    let messenger = DigestMessenger::logging();
    let par_report =
        Orchestrator::with_workers(4).run(&mut parallel, &messenger, now(), &CancelFlag::new());
    let mut par_lines = messenger.lines();

    let mut seq_lines = seq_lines;
    seq_lines.sort();
    par_lines.sort();
    assert_eq!(seq_lines, par_lines);
    assert_eq!(sequential, parallel);
    assert_eq!(seq_report.challenges_completed, par_report.challenges_completed);
    assert_eq!(seq_report.challenges_deferred, par_report.challenges_deferred);
    assert_eq!(seq_report.users_evaluated, 36);
}

#[test]
fn test_cancelled_batch_evaluates_nothing() {
    let mut users = mixed_users();
    let before = users.clone();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let messenger = DigestMessenger::logging();
    let report = Orchestrator::new().run(&mut users, &messenger, now(), &cancel);

    assert!(report.cancelled);
    assert_eq!(report.users_evaluated, 0);
    assert_eq!(users, before);
}
