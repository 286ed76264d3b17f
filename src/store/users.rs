//! Users, measurement timelines and per-user reward progress

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;

use super::{from_millis, to_millis, EcoStore};
use crate::domain::{
    ChallengeRule, CompletionStatus, EcoMeasurement, NotificationStatus, RestrictionType, User,
    UserReward, UserRewardChallenge,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl EcoStore {
    /// Register a user if unknown
    pub fn upsert_user(&self, user_id: &str) -> Result<()> {
        let conn = self.conn();
        insert_user(&conn, user_id)
    }

    /// Store one day's measurement, replacing any earlier report for that date
    pub fn upsert_measurement(&self, user_id: &str, m: &EcoMeasurement) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        insert_user(&tx, user_id)?;
        tx.execute(
            "INSERT INTO measurements
                (user_id, date_taken, eco_footprint, diet, transport, electronics,
                 clothing, footwear, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id, date_taken) DO UPDATE SET
                eco_footprint = excluded.eco_footprint,
                diet = excluded.diet,
                transport = excluded.transport,
                electronics = excluded.electronics,
                clothing = excluded.clothing,
                footwear = excluded.footwear,
                updated_at = excluded.updated_at",
            params![
                user_id,
                m.date_taken.format(DATE_FORMAT).to_string(),
                m.eco_footprint,
                serde_json::to_string(&m.diet)?,
                serde_json::to_string(&m.transport)?,
                serde_json::to_string(&m.electronics)?,
                serde_json::to_string(&m.clothing)?,
                serde_json::to_string(&m.footwear)?,
                Utc::now().timestamp_millis(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// All user ids, in id order
    pub fn user_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM users ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    /// Load a user with a date-sorted timeline and, if onboarded, their rewards
    pub fn load_user(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        let onboarded: Option<bool> = conn
            .query_row(
                "SELECT onboarded FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(onboarded) = onboarded else {
            return Ok(None);
        };

        let measurements = load_measurements(&conn, user_id)?;
        let rewards = if onboarded {
            Some(load_rewards(&conn, user_id)?)
        } else {
            None
        };

        Ok(Some(User {
            id: user_id.to_string(),
            measurements,
            rewards,
        }))
    }

    /// Load every user
    pub fn load_users(&self) -> Result<Vec<User>> {
        let mut users = Vec::new();
        for id in self.user_ids()? {
            if let Some(user) = self.load_user(&id)? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Write back challenge and reward state after an evaluation pass.
    ///
    /// Only rows that still exist are updated: a reward retired or a
    /// completion acknowledged since the user was loaded stays that way.
    /// Measurements are not touched. Returns how many stored rows were updated.
    pub fn save_progress(&self, user: &User) -> Result<usize> {
        let Some(rewards) = &user.rewards else {
            return Ok(0);
        };
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let changed = update_rewards(&tx, &user.id, rewards)?;
        tx.commit()?;
        Ok(changed)
    }

    /// Mark pending completions as seen.
    ///
    /// With a reward id only that reward and its challenges are acknowledged.
    /// Returns how many rewards and challenges changed.
    pub fn acknowledge(&self, user_id: &str, reward_id: Option<&str>) -> Result<usize> {
        let pending = NotificationStatus::PendingAcknowledgment.as_str();
        let acknowledged = NotificationStatus::Acknowledged.as_str();

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut changed = 0;
        for table in ["user_rewards", "user_reward_challenges"] {
            let sql = format!(
                "UPDATE {table} SET notification_status = ?1
                 WHERE user_id = ?2 AND notification_status = ?3
                   AND (?4 IS NULL OR reward_id = ?4)"
            );
            changed += tx.execute(&sql, params![acknowledged, user_id, pending, reward_id])?;
        }
        tx.commit()?;
        Ok(changed)
    }
}

fn insert_user(conn: &Connection, user_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO users (id, onboarded, created_at) VALUES (?1, 0, ?2)",
        params![user_id, Utc::now().timestamp_millis()],
    )?;
    Ok(())
}

fn parse_group<T: DeserializeOwned>(json: &str, column: &str, date: &str) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("Corrupt {} group for {}", column, date))
}

fn load_measurements(conn: &Connection, user_id: &str) -> Result<Vec<EcoMeasurement>> {
    let mut stmt = conn.prepare(
        "SELECT date_taken, eco_footprint, diet, transport, electronics, clothing, footwear
         FROM measurements WHERE user_id = ?1 ORDER BY date_taken",
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(date, eco_footprint, diet, transport, electronics, clothing, footwear)| {
            Ok(EcoMeasurement {
                date_taken: NaiveDate::parse_from_str(&date, DATE_FORMAT)
                    .with_context(|| format!("Invalid measurement date: {}", date))?,
                eco_footprint,
                diet: parse_group(&diet, "diet", &date)?,
                transport: parse_group(&transport, "transport", &date)?,
                electronics: parse_group(&electronics, "electronics", &date)?,
                clothing: parse_group(&clothing, "clothing", &date)?,
                footwear: parse_group(&footwear, "footwear", &date)?,
            })
        })
        .collect()
}

fn completion_status(s: &str) -> Result<CompletionStatus> {
    CompletionStatus::from_str(s).ok_or_else(|| anyhow!("Unknown completion status: {}", s))
}

fn notification_status(s: &str) -> Result<NotificationStatus> {
    NotificationStatus::from_str(s).ok_or_else(|| anyhow!("Unknown notification status: {}", s))
}

pub(super) fn restriction(s: &str) -> Result<RestrictionType> {
    RestrictionType::from_str(s).ok_or_else(|| anyhow!("Unknown restriction type: {}", s))
}

struct ChallengeRow {
    reward_id: String,
    id: String,
    category: String,
    subcategory: String,
    restriction: String,
    time: u32,
    amount_to_consume: f64,
    status: String,
    notification_status: String,
    date_completed: Option<i64>,
    progress: f64,
}

fn load_rewards(conn: &Connection, user_id: &str) -> Result<Vec<UserReward>> {
    let mut stmt = conn.prepare(
        "SELECT reward_id, challenge_id, category, subcategory, restriction, time,
                amount_to_consume, status, notification_status, date_completed, progress
         FROM user_reward_challenges WHERE user_id = ?1
         ORDER BY reward_id, position",
    )?;
    let challenge_rows = stmt
        .query_map(params![user_id], |row| {
            Ok(ChallengeRow {
                reward_id: row.get(0)?,
                id: row.get(1)?,
                category: row.get(2)?,
                subcategory: row.get(3)?,
                restriction: row.get(4)?,
                time: row.get(5)?,
                amount_to_consume: row.get(6)?,
                status: row.get(7)?,
                notification_status: row.get(8)?,
                date_completed: row.get(9)?,
                progress: row.get(10)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut challenges: HashMap<String, Vec<UserRewardChallenge>> = HashMap::new();
    for row in challenge_rows {
        let challenge = UserRewardChallenge {
            id: row.id,
            rule: ChallengeRule {
                category: row.category,
                subcategory: row.subcategory,
                restriction: restriction(&row.restriction)?,
                time: row.time,
                amount_to_consume: row.amount_to_consume,
            },
            status: completion_status(&row.status)?,
            notification_status: notification_status(&row.notification_status)?,
            date_completed: from_millis(row.date_completed),
            progress: row.progress,
        };
        challenges.entry(row.reward_id).or_default().push(challenge);
    }

    let mut stmt = conn.prepare(
        "SELECT reward_id, title, status, notification_status, date_completed
         FROM user_rewards WHERE user_id = ?1 ORDER BY position",
    )?;
    let reward_rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<i64>>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    reward_rows
        .into_iter()
        .map(|(id, title, status, notification, date_completed)| {
            Ok(UserReward {
                challenges: challenges.remove(&id).unwrap_or_default(),
                id,
                title,
                status: completion_status(&status)?,
                notification_status: notification_status(&notification)?,
                date_completed: from_millis(date_completed),
            })
        })
        .collect()
}

// Complete and non-silent notifications are never rolled back by a stale copy.
const UPDATE_REWARD_SQL: &str = "UPDATE user_rewards SET
        status = CASE WHEN status = 'complete' THEN status ELSE ?3 END,
        notification_status = CASE WHEN notification_status = 'silent' THEN ?4
                                    ELSE notification_status END,
        date_completed = COALESCE(date_completed, ?5)
     WHERE user_id = ?1 AND reward_id = ?2";

const UPDATE_CHALLENGE_SQL: &str = "UPDATE user_reward_challenges SET
        status = CASE WHEN status = 'complete' THEN status ELSE ?4 END,
        notification_status = CASE WHEN notification_status = 'silent' THEN ?5
                                    ELSE notification_status END,
        date_completed = COALESCE(date_completed, ?6),
        progress = CASE WHEN status = 'complete' THEN progress ELSE ?7 END
     WHERE user_id = ?1 AND reward_id = ?2 AND challenge_id = ?3";

fn update_rewards(tx: &Transaction<'_>, user_id: &str, rewards: &[UserReward]) -> Result<usize> {
    let mut reward_stmt = tx.prepare(UPDATE_REWARD_SQL)?;
    let mut challenge_stmt = tx.prepare(UPDATE_CHALLENGE_SQL)?;

    let mut changed = 0;
    for reward in rewards {
        for challenge in &reward.challenges {
            changed += challenge_stmt.execute(params![
                user_id,
                reward.id,
                challenge.id,
                challenge.status.as_str(),
                challenge.notification_status.as_str(),
                to_millis(challenge.date_completed),
                challenge.progress,
            ])?;
        }
        changed += reward_stmt.execute(params![
            user_id,
            reward.id,
            reward.status.as_str(),
            reward.notification_status.as_str(),
            to_millis(reward.date_completed),
        ])?;
    }
    Ok(changed)
}

/// Insert freshly onboarded rewards after the ones the user already holds
pub(super) fn insert_rewards(
    tx: &Transaction<'_>,
    user_id: &str,
    rewards: &[UserReward],
) -> Result<()> {
    insert_user(tx, user_id)?;
    tx.execute(
        "UPDATE users SET onboarded = 1 WHERE id = ?1",
        params![user_id],
    )?;

    let next: i64 = tx.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM user_rewards WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    let mut reward_stmt = tx.prepare(
        "INSERT OR IGNORE INTO user_rewards
            (user_id, reward_id, position, title, status, notification_status, date_completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    let mut challenge_stmt = tx.prepare(
        "INSERT OR IGNORE INTO user_reward_challenges
            (user_id, reward_id, challenge_id, position, category, subcategory, restriction,
             time, amount_to_consume, status, notification_status, date_completed, progress)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )?;

    for (offset, reward) in rewards.iter().enumerate() {
        if reward_stmt.execute(params![
            user_id,
            reward.id,
            next + offset as i64,
            reward.title,
            reward.status.as_str(),
            reward.notification_status.as_str(),
            to_millis(reward.date_completed),
        ])? == 0
        {
            // Already held
            continue;
        }

        for (position, challenge) in reward.challenges.iter().enumerate() {
            challenge_stmt.execute(params![
                user_id,
                reward.id,
                challenge.id,
                position as i64,
                challenge.rule.category,
                challenge.rule.subcategory,
                challenge.rule.restriction.as_str(),
                challenge.rule.time,
                challenge.rule.amount_to_consume,
                challenge.status.as_str(),
                challenge.notification_status.as_str(),
                to_millis(challenge.date_completed),
                challenge.progress,
            ])?;
        }
    }
    Ok(())
}
