//! Core domain types for eco challenge tracking

mod catalog;
mod measurement;
mod reward;
mod user;

pub use catalog::{clone_for_user, onboard, Catalog, Reward, RewardChallenge};
pub use measurement::{
    normalize_name, Category, CategoryGroup, ClothingGroup, DietGroup, EcoMeasurement,
    ElectronicsGroup, FootwearGroup, TransportGroup,
};
pub use reward::{
    ChallengeRule, CompletionStatus, NotificationStatus, RestrictionType, UserReward,
    UserRewardChallenge,
};
pub use user::User;
