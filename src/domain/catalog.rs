//! Global reward catalog and onboarding
//!
//! The catalog is only read when users are onboarded: each catalog reward is
//! cloned into a fresh, incomplete per-user reward. Evaluation never looks at it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::reward::{
    ChallengeRule, CompletionStatus, NotificationStatus, UserReward, UserRewardChallenge,
};
use super::user::User;

/// A challenge as defined in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardChallenge {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rule: ChallengeRule,
}

/// A reward as defined in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub challenges: Vec<RewardChallenge>,
}

/// Catalog file format
///
/// ```yaml
/// rewards:
///   - id: meatless-week
///     title: Meatless Week
///     challenges:
///       - id: no-beef-7
///         rule: { category: Diet, subcategory: Beef, restriction: Skip, time: 7 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

impl Catalog {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse reward catalog")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid catalog file: {}", path.display()))
    }
}

/// Clone a catalog reward into a fresh per-user reward
pub fn clone_for_user(reward: &Reward) -> UserReward {
    UserReward {
        id: reward.id.clone(),
        title: reward.title.clone(),
        status: CompletionStatus::Incomplete,
        notification_status: NotificationStatus::Silent,
        date_completed: None,
        challenges: reward
            .challenges
            .iter()
            .map(|c| UserRewardChallenge {
                id: c.id.clone(),
                rule: c.rule.clone(),
                status: CompletionStatus::Incomplete,
                notification_status: NotificationStatus::Silent,
                date_completed: None,
                progress: 0.0,
            })
            .collect(),
    }
}

/// Give the user a copy of every catalog reward they do not hold yet.
///
/// Returns how many rewards were added. Running it twice adds nothing the
/// second time, and existing progress is never touched.
pub fn onboard(user: &mut User, catalog: &[Reward]) -> usize {
    let rewards = user.rewards.get_or_insert_with(Vec::new);
    let mut added = 0;
    for reward in catalog {
        if rewards.iter().any(|r| r.id == reward.id) {
            continue;
        }
        rewards.push(clone_for_user(reward));
        added += 1;
    }
    added
}
