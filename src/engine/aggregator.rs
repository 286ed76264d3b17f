//! Rolls challenge completion up into reward completion

use chrono::{DateTime, Utc};

use crate::domain::UserReward;
use crate::messenger::{ItemKind, Messenger};

pub struct RewardAggregator<'a> {
    messenger: &'a dyn Messenger,
    now: DateTime<Utc>,
}

impl<'a> RewardAggregator<'a> {
    pub fn new(messenger: &'a dyn Messenger, now: DateTime<Utc>) -> Self {
        Self { messenger, now }
    }

    /// Complete the reward if none of its challenges remain incomplete.
    ///
    /// Returns true only on the pass where the reward flips to Complete.
    pub fn aggregate(&self, user_id: &str, reward: &mut UserReward) -> bool {
        if reward.is_complete() || reward.incomplete_challenges() > 0 {
            return false;
        }
        if !reward.mark_complete(self.now) {
            return false;
        }
        tracing::info!("User {} completed reward {}", user_id, reward.id);
        self.messenger.add_line(user_id, ItemKind::Reward, &reward.id);
        true
    }
}
