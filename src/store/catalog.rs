//! Stored reward catalog, onboarding and retirement

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::params;
use tracing::info;

use super::users::{insert_rewards, restriction};
use super::EcoStore;
use crate::domain::{self, ChallengeRule, Reward, RewardChallenge, User};

impl EcoStore {
    /// Insert or replace a catalog reward together with its challenges.
    ///
    /// Users already holding the reward keep their own copy.
    pub fn save_catalog_reward(&self, reward: &Reward) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO rewards (id, title, description) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title, description = excluded.description",
            params![reward.id, reward.title, reward.description],
        )?;
        tx.execute(
            "DELETE FROM reward_challenges WHERE reward_id = ?1",
            params![reward.id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO reward_challenges
                    (reward_id, id, position, category, subcategory, restriction, time,
                     amount_to_consume, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, challenge) in reward.challenges.iter().enumerate() {
                stmt.execute(params![
                    reward.id,
                    challenge.id,
                    position as i64,
                    challenge.rule.category,
                    challenge.rule.subcategory,
                    challenge.rule.restriction.as_str(),
                    challenge.rule.time,
                    challenge.rule.amount_to_consume,
                    challenge.description,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Every catalog reward, in id order
    pub fn load_catalog(&self) -> Result<Vec<Reward>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            "SELECT reward_id, id, description, category, subcategory, restriction, time,
                    amount_to_consume
             FROM reward_challenges ORDER BY reward_id, position",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, u32>(6)?,
                    row.get::<_, f64>(7)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut challenges: HashMap<String, Vec<RewardChallenge>> = HashMap::new();
        for (reward_id, id, description, category, subcategory, kind, time, amount) in rows {
            challenges.entry(reward_id).or_default().push(RewardChallenge {
                id,
                description,
                rule: ChallengeRule {
                    category,
                    subcategory,
                    restriction: restriction(&kind)?,
                    time,
                    amount_to_consume: amount,
                },
            });
        }

        let mut stmt = conn.prepare("SELECT id, title, description FROM rewards ORDER BY id")?;
        let rewards = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|(id, title, description)| Reward {
                challenges: challenges.remove(&id).unwrap_or_default(),
                id,
                title,
                description,
            })
            .collect();

        Ok(rewards)
    }

    /// Give a user every catalog reward they do not hold yet.
    ///
    /// Creates the user if needed. This is the only place per-user reward rows
    /// are created. Returns the number of rewards added.
    pub fn onboard_user(&self, user_id: &str, catalog: &[Reward]) -> Result<usize> {
        let mut user = match self.load_user(user_id)? {
            Some(user) => user,
            None => User::new(user_id),
        };
        let added = domain::onboard(&mut user, catalog);
        let rewards = user.rewards.as_deref().unwrap_or_default();
        let fresh = &rewards[rewards.len() - added..];

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        insert_rewards(&tx, user_id, fresh)?;
        tx.commit()?;

        if added > 0 {
            info!("Onboarded {} with {} rewards", user_id, added);
        }
        Ok(added)
    }

    /// Remove a reward from the catalog and from every user holding it.
    ///
    /// Returns how many users lost the reward.
    pub fn retire_reward(&self, reward_id: &str) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM rewards WHERE id = ?1", params![reward_id])?;
        tx.execute(
            "DELETE FROM user_reward_challenges WHERE reward_id = ?1",
            params![reward_id],
        )?;
        let users = tx.execute(
            "DELETE FROM user_rewards WHERE reward_id = ?1",
            params![reward_id],
        )?;
        tx.commit()?;
        info!("Retired reward {} from {} users", reward_id, users);
        Ok(users)
    }
}
