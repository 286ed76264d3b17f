//! Bad rules are isolated to their own challenge

use crate::common::*;
use ecochallenge::{CompletionStatus, User};

#[test]
fn test_unknown_fields_do_not_stop_siblings_or_other_users() {
    let mut fish = measurement(0);
    fish.diet.fish = 1.0;

    let first = User {
        id: "u1".to_string(),
        measurements: vec![fish.clone()],
        rewards: Some(vec![reward(
            "r1",
            vec![
                challenge("typo-category", skip("Diett", "Beef", 1)),
                challenge("typo-item", skip("Diet", "Venison", 1)),
                challenge("no-beef", skip("Diet", "Beef", 1)),
            ],
        )]),
    };
    let mut second = user_with(skip("Diet", "Beef", 1), vec![fish]);
    second.id = "u2".to_string();
    let mut users = vec![first, second];

    let (report, lines) = evaluate(&mut users);

    assert_eq!(report.challenges_misconfigured, 2);
    assert_eq!(report.challenges_completed, 2);
    let reward = &users[0].rewards.as_ref().unwrap()[0];
    assert_eq!(reward.challenges[0].status, CompletionStatus::Incomplete);
    assert_eq!(reward.challenges[1].status, CompletionStatus::Incomplete);
    assert_eq!(reward.challenges[2].status, CompletionStatus::Complete);
    assert_eq!(reward.status, CompletionStatus::Incomplete);
    assert!(lines.contains(&"User u2 completed Reward r1".to_string()));
}

#[test]
fn test_invalid_thresholds_are_reported() {
    let mut walk = measurement(0);
    walk.transport.walking = 5.0;
    let mut users = vec![
        user_with(any("Transport", "Walking", 0.0), vec![walk.clone()]),
        user_with(skip("Transport", "Car", 0), vec![walk]),
    ];

    let (report, lines) = evaluate(&mut users);

    assert_eq!(report.challenges_misconfigured, 2);
    assert!(lines.is_empty());
    assert!(users
        .iter()
        .all(|u| only_challenge(u).status == CompletionStatus::Incomplete));
}
