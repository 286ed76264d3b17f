//! Shared builders for engine and store tests

#![allow(dead_code)]

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};

use ecochallenge::engine::{BatchReport, CancelFlag, Orchestrator};
use ecochallenge::messenger::DigestMessenger;
use ecochallenge::{
    ChallengeRule, CompletionStatus, EcoMeasurement, NotificationStatus, RestrictionType, User,
    UserReward, UserRewardChallenge,
};

/// Fixed evaluation clock
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 9, 30, 0).unwrap()
}

pub fn days_ago(n: u64) -> NaiveDate {
    now().date_naive().checked_sub_days(Days::new(n)).unwrap()
}

/// Empty measurement dated `n` days before [`now`]
pub fn measurement(n: u64) -> EcoMeasurement {
    EcoMeasurement::on(days_ago(n))
}

pub fn skip(category: &str, subcategory: &str, time: u32) -> ChallengeRule {
    rule(category, subcategory, RestrictionType::Skip, time, 0.0)
}

pub fn only_this(category: &str, subcategory: &str, time: u32) -> ChallengeRule {
    rule(category, subcategory, RestrictionType::OnlyThis, time, 0.0)
}

pub fn any(category: &str, subcategory: &str, amount: f64) -> ChallengeRule {
    rule(category, subcategory, RestrictionType::Any, 0, amount)
}

fn rule(
    category: &str,
    subcategory: &str,
    restriction: RestrictionType,
    time: u32,
    amount_to_consume: f64,
) -> ChallengeRule {
    ChallengeRule {
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        restriction,
        time,
        amount_to_consume,
    }
}

pub fn challenge(id: &str, rule: ChallengeRule) -> UserRewardChallenge {
    UserRewardChallenge {
        id: id.to_string(),
        rule,
        status: CompletionStatus::Incomplete,
        notification_status: NotificationStatus::Silent,
        date_completed: None,
        progress: 0.0,
    }
}

pub fn reward(id: &str, challenges: Vec<UserRewardChallenge>) -> UserReward {
    UserReward {
        id: id.to_string(),
        title: id.to_string(),
        status: CompletionStatus::Incomplete,
        notification_status: NotificationStatus::Silent,
        date_completed: None,
        challenges,
    }
}

/// Onboarded user holding a single one-challenge reward
pub fn user_with(rule: ChallengeRule, measurements: Vec<EcoMeasurement>) -> User {
    User {
        id: "u1".to_string(),
        measurements,
        rewards: Some(vec![reward("r1", vec![challenge("c1", rule)])]),
    }
}

pub fn only_challenge(user: &User) -> &UserRewardChallenge {
    &user.rewards.as_ref().unwrap()[0].challenges[0]
}

/// One pass at [`now`]; returns the report and the digest lines it queued
pub fn evaluate(users: &mut [User]) -> (BatchReport, Vec<String>) {
    evaluate_at(users, now())
}

pub fn evaluate_at(users: &mut [User], at: DateTime<Utc>) -> (BatchReport, Vec<String>) {
    let messenger = DigestMessenger::logging();
    let report = Orchestrator::new().run(users, &messenger, at, &CancelFlag::new());
    (report, messenger.lines())
}
