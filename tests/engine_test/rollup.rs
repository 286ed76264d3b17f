//! Reward completion follows its last challenge

use crate::common::*;
use ecochallenge::{CompletionStatus, EcoMeasurement, NotificationStatus, User};

fn green_day(n: u64) -> EcoMeasurement {
    let mut m = measurement(n);
    m.diet.plant_based = 2.0;
    m.transport.bicycle = 4.0;
    m.transport.walking = 2.0;
    m.electronics.laptop = 3.0;
    m.clothing.shirts = 0.0;
    m
}

fn six_challenge_user() -> User {
    let challenges = vec![
        challenge("no-beef", skip("Diet", "Beef", 3)),
        challenge("no-pork", skip("Diet", "Pork", 3)),
        challenge("plants-only", only_this("Diet", "Plant_based", 3)),
        challenge("no-car", skip("Transport", "Car", 3)),
        challenge("no-tv", skip("Electronics", "Tv", 3)),
        challenge("walk-20", any("Transport", "Walking", 20.0)),
    ];
    User {
        id: "u1".to_string(),
        measurements: (0..3).rev().map(green_day).collect(),
        rewards: Some(vec![reward("green-month", challenges)]),
    }
}

#[test]
fn test_reward_waits_for_last_challenge() {
    let mut users = vec![six_challenge_user()];

    let (report, lines) = evaluate(&mut users);

    let reward = &users[0].rewards.as_ref().unwrap()[0];
    assert_eq!(report.challenges_completed, 5);
    assert_eq!(report.rewards_completed, 0);
    assert_eq!(reward.status, CompletionStatus::Incomplete);
    assert_eq!(reward.incomplete_challenges(), 1);
    assert_eq!(reward.challenges[5].progress, 6.0);
    assert_eq!(lines.len(), 5);
    assert!(!lines.iter().any(|l| l.contains("Reward")));
}

#[test]
fn test_reward_completes_in_same_pass_as_last_challenge() {
    let mut users = vec![six_challenge_user()];
    evaluate(&mut users);

    let mut long_walk = measurement(0);
    long_walk.transport.walking = 16.0;
    users[0].upsert_measurement(long_walk);

    let (report, lines) = evaluate(&mut users);

    let reward = &users[0].rewards.as_ref().unwrap()[0];
    assert_eq!(report.challenges_completed, 1);
    assert_eq!(report.rewards_completed, 1);
    assert_eq!(reward.status, CompletionStatus::Complete);
    assert_eq!(reward.notification_status, NotificationStatus::PendingAcknowledgment);
    assert_eq!(reward.date_completed, Some(now()));
    assert_eq!(
        lines,
        vec![
            "User u1 completed Challenge walk-20",
            "User u1 completed Reward green-month"
        ]
    );
}

#[test]
fn test_complete_challenges_are_not_reevaluated() {
    let mut users = vec![six_challenge_user()];
    evaluate(&mut users);

    // Eating beef afterwards does not undo a completed skip
    for m in users[0].measurements.iter_mut() {
        m.diet.beef = 1.0;
    }
    let (report, _) = evaluate(&mut users);

    let reward = &users[0].rewards.as_ref().unwrap()[0];
    assert_eq!(reward.challenges[0].status, CompletionStatus::Complete);
    assert_eq!(report.challenges_evaluated, 1);
}

#[test]
fn test_users_without_rewards_are_skipped() {
    let mut users = vec![six_challenge_user(), User::new("newcomer")];

    let (report, _) = evaluate(&mut users);

    assert_eq!(report.users_evaluated, 1);
    assert_eq!(report.users_skipped, 1);
    assert!(users[1].rewards.is_none());
}
