//! Per-user rewards, challenges and the rules that govern them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion status shared by rewards and challenges.
///
/// `Complete` is terminal: nothing in this crate moves a value back to `Incomplete`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    #[default]
    Incomplete,
    Complete,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "incomplete" => Some(Self::Incomplete),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the user still has to be told about a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Nothing to announce yet
    #[default]
    Silent,
    /// Completed, waiting for the user to see it
    PendingAcknowledgment,
    /// The user has seen the completion
    Acknowledged,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::PendingAcknowledgment => "pending_acknowledgment",
            Self::Acknowledged => "acknowledged",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "silent" => Some(Self::Silent),
            "pending_acknowledgment" => Some(Self::PendingAcknowledgment),
            "acknowledged" => Some(Self::Acknowledged),
            _ => None,
        }
    }
}

/// How a challenge rule judges the user's measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionType {
    /// Abstain from the item on days the category is otherwise active
    #[serde(alias = "skip")]
    Skip,
    /// Use the item and nothing else in its category
    #[serde(rename = "Only_This", alias = "only_this", alias = "OnlyThis")]
    OnlyThis,
    /// Accumulate usage of the item toward a threshold
    #[serde(alias = "any")]
    Any,
}

impl RestrictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "Skip",
            Self::OnlyThis => "Only_This",
            Self::Any => "Any",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Skip" | "skip" => Some(Self::Skip),
            "Only_This" | "only_this" | "OnlyThis" => Some(Self::OnlyThis),
            "Any" | "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Windowed restrictions count qualifying days inside a lookback window
    pub fn is_windowed(&self) -> bool {
        matches!(self, Self::Skip | Self::OnlyThis)
    }
}

impl std::fmt::Display for RestrictionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declarative description of what a challenge asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRule {
    pub category: String,
    pub subcategory: String,
    pub restriction: RestrictionType,
    /// Required number of qualifying days (Skip / Only_This)
    #[serde(default)]
    pub time: u32,
    /// Cumulative total to reach (Any)
    #[serde(default)]
    pub amount_to_consume: f64,
}

impl ChallengeRule {
    /// Target the progress counter is measured against
    pub fn target(&self) -> f64 {
        match self.restriction {
            RestrictionType::Any => self.amount_to_consume,
            RestrictionType::Skip | RestrictionType::OnlyThis => f64::from(self.time),
        }
    }
}

/// A user's copy of a catalog challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRewardChallenge {
    pub id: String,
    pub rule: ChallengeRule,
    #[serde(default)]
    pub status: CompletionStatus,
    #[serde(default)]
    pub notification_status: NotificationStatus,
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
    /// Qualifying days so far, or the capped running total for Any
    #[serde(default)]
    pub progress: f64,
}

impl UserRewardChallenge {
    pub fn is_complete(&self) -> bool {
        self.status == CompletionStatus::Complete
    }

    /// Flip to Complete. Returns false (and changes nothing) if already complete.
    pub(crate) fn mark_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_complete() {
            return false;
        }
        self.status = CompletionStatus::Complete;
        self.notification_status = NotificationStatus::PendingAcknowledgment;
        self.date_completed = Some(now);
        true
    }

    /// Progress as a fraction of the rule's target (0.0 - 1.0)
    pub fn progress_percent(&self) -> f64 {
        let target = self.rule.target();
        if self.is_complete() || target <= 0.0 {
            1.0
        } else {
            (self.progress / target).clamp(0.0, 1.0)
        }
    }
}

/// A user's copy of a catalog reward, bundling several challenges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReward {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: CompletionStatus,
    #[serde(default)]
    pub notification_status: NotificationStatus,
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub challenges: Vec<UserRewardChallenge>,
}

impl UserReward {
    pub fn is_complete(&self) -> bool {
        self.status == CompletionStatus::Complete
    }

    pub fn incomplete_challenges(&self) -> usize {
        self.challenges.iter().filter(|c| !c.is_complete()).count()
    }

    pub(crate) fn mark_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_complete() {
            return false;
        }
        self.status = CompletionStatus::Complete;
        self.notification_status = NotificationStatus::PendingAcknowledgment;
        self.date_completed = Some(now);
        true
    }
}
