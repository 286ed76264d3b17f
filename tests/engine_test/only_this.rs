//! Only_This: the item and nothing else in its category

use crate::common::*;
use ecochallenge::{CompletionStatus, EcoMeasurement};

fn plant_day(n: u64) -> EcoMeasurement {
    let mut m = measurement(n);
    m.diet.plant_based = 3.0;
    m
}

#[test]
fn test_only_this_completes_on_non_consecutive_days() {
    let timeline = vec![plant_day(6), plant_day(3), plant_day(0)];
    let mut users = vec![user_with(only_this("Diet", "Plant_based", 3), timeline)];

    let (_, lines) = evaluate(&mut users);

    assert_eq!(only_challenge(&users[0]).status, CompletionStatus::Complete);
    assert_eq!(lines, vec!["User u1 completed Challenge c1", "User u1 completed Reward r1"]);
}

#[test]
fn test_only_this_day_with_sibling_does_not_count() {
    let mut mixed = plant_day(3);
    mixed.diet.beef = 1.0;
    let timeline = vec![plant_day(6), mixed, plant_day(0)];
    let mut users = vec![user_with(only_this("Diet", "Plant_based", 3), timeline)];

    let (report, lines) = evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Incomplete);
    assert_eq!(challenge.progress, 2.0);
    assert_eq!(report.challenges_completed, 0);
    assert!(lines.is_empty());
}

#[test]
fn test_only_this_other_categories_do_not_matter() {
    let timeline = (0..3)
        .map(|n| {
            let mut m = plant_day(n);
            m.transport.car = 20.0;
            m.electronics.phone = 4.0;
            m
        })
        .collect();
    let mut users = vec![user_with(only_this("diet", "plant based", 3), timeline)];

    evaluate(&mut users);

    assert_eq!(only_challenge(&users[0]).status, CompletionStatus::Complete);
}

#[test]
fn test_only_this_bicycle_commute() {
    let timeline = (0..4)
        .rev()
        .map(|n| {
            let mut m = measurement(n);
            m.transport.bicycle = 6.5;
            if n == 2 {
                m.transport.bus = 3.0;
            }
            m
        })
        .collect();
    let mut users = vec![user_with(only_this("Transport", "Bicycle", 3), timeline)];

    evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Complete);
    assert_eq!(challenge.progress, 3.0);
}
