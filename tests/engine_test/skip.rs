//! Skip: active in the category, abstained from the item

use crate::common::*;
use ecochallenge::CompletionStatus;

#[test]
fn test_skip_completes_on_active_day_without_item() {
    let mut today = measurement(0);
    today.diet.chicken = 1.0;
    let mut users = vec![user_with(skip("Diet", "Beef", 1), vec![today])];

    let (report, lines) = evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Complete);
    assert_eq!(challenge.date_completed, Some(now()));
    assert_eq!(report.challenges_completed, 1);
    assert!(lines.contains(&"User u1 completed Challenge c1".to_string()));
}

#[test]
fn test_skip_ignores_days_without_category_activity() {
    let mut idle = measurement(0);
    idle.transport.car = 12.0;
    let mut users = vec![user_with(skip("Diet", "Beef", 1), vec![idle])];

    let (report, lines) = evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Incomplete);
    assert_eq!(challenge.progress, 0.0);
    assert_eq!(report.challenges_completed, 0);
    assert!(lines.is_empty());
}

#[test]
fn test_skip_day_with_item_does_not_count() {
    let mut beef = measurement(1);
    beef.diet.beef = 1.0;
    beef.diet.dairy = 1.0;
    let mut fish = measurement(0);
    fish.diet.fish = 1.0;
    let mut users = vec![user_with(skip("Diet", "Beef", 2), vec![beef, fish])];

    evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Incomplete);
    assert_eq!(challenge.progress, 1.0);
}

#[test]
fn test_skip_defers_until_window_is_full() {
    let timeline = (0..3)
        .map(|n| {
            let mut m = measurement(n);
            m.diet.eggs = 1.0;
            m
        })
        .collect();
    let mut users = vec![user_with(skip("Diet", "Beef", 5), timeline)];

    let (report, _) = evaluate(&mut users);

    assert_eq!(report.challenges_deferred, 1);
    assert_eq!(only_challenge(&users[0]).progress, 0.0);
}

#[test]
fn test_skip_ignores_measurements_before_lookback() {
    // time = 3 looks back 7 days
    let timeline = [20, 15, 10, 1]
        .into_iter()
        .map(|n| {
            let mut m = measurement(n);
            m.diet.pork = 1.0;
            m
        })
        .collect();
    let mut users = vec![user_with(skip("Diet", "Beef", 3), timeline)];

    let (report, _) = evaluate(&mut users);

    assert_eq!(report.challenges_deferred, 1);
    assert_eq!(only_challenge(&users[0]).status, CompletionStatus::Incomplete);
}

#[test]
fn test_long_skip_challenge_uses_full_history() {
    let timeline = (0..90)
        .rev()
        .map(|n| {
            let mut m = measurement(n);
            m.diet.plant_based = 2.0;
            m
        })
        .collect();
    let mut users = vec![user_with(skip("Diet", "Beef", 90), timeline)];

    evaluate(&mut users);

    let challenge = only_challenge(&users[0]);
    assert_eq!(challenge.status, CompletionStatus::Complete);
    assert_eq!(challenge.progress, 90.0);
}
