//! Challenge completion predicates
//!
//! A challenge moves from Incomplete to Complete at most once. Progress is
//! recomputed from the timeline on every pass and overwritten, never added
//! to, so evaluating the same timeline twice leaves the same state.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::{EngineError, Result};
use super::fields::ResolvedField;
use super::window::{select_window, Window};
use crate::domain::{EcoMeasurement, RestrictionType, UserRewardChallenge};
use crate::messenger::{ItemKind, Messenger};

/// What a single evaluation pass did to a challenge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChallengeOutcome {
    /// Was already complete; not looked at
    AlreadyComplete,
    /// Became complete in this pass
    Completed,
    /// Evaluated, target not reached yet
    InProgress { progress: f64 },
    /// Window not full; nothing changed
    Deferred { available: usize, required: u32 },
}

/// Applies a challenge's rule to a user's timeline
pub struct ChallengeEvaluator<'a> {
    messenger: &'a dyn Messenger,
    now: DateTime<Utc>,
}

impl<'a> ChallengeEvaluator<'a> {
    pub fn new(messenger: &'a dyn Messenger, now: DateTime<Utc>) -> Self {
        Self { messenger, now }
    }

    /// Evaluate one challenge against a timeline sorted ascending by date.
    ///
    /// On error the challenge is left exactly as it was.
    pub fn evaluate(
        &self,
        user_id: &str,
        timeline: &[EcoMeasurement],
        challenge: &mut UserRewardChallenge,
    ) -> Result<ChallengeOutcome> {
        if challenge.is_complete() {
            return Ok(ChallengeOutcome::AlreadyComplete);
        }

        let rule = &challenge.rule;
        validate(rule.restriction, rule.time, rule.amount_to_consume)?;
        let field = ResolvedField::from_rule(rule)?;

        let (reached, progress) = match rule.restriction {
            RestrictionType::Any => {
                let total = accumulate(&field, timeline, rule.amount_to_consume)?;
                (total >= rule.amount_to_consume, total.min(rule.amount_to_consume))
            }
            restriction => {
                let window = match select_window(timeline, rule.time, self.now.date_naive()) {
                    Window::Full(window) => window,
                    Window::NotFull {
                        available,
                        required,
                    } => {
                        debug!(
                            "{}/{}: window not full ({} of {} measurements)",
                            user_id, challenge.id, available, required
                        );
                        return Ok(ChallengeOutcome::Deferred {
                            available,
                            required,
                        });
                    }
                };
                let days = if restriction == RestrictionType::Skip {
                    count_skip_days(&field, window, rule.time)?
                } else {
                    count_only_this_days(&field, window, rule.time)?
                };
                (days >= rule.time, f64::from(days))
            }
        };

        challenge.progress = progress;
        if !reached {
            debug!(
                "{}/{}: {} progress {}/{}",
                user_id,
                challenge.id,
                challenge.rule.restriction,
                progress,
                challenge.rule.target()
            );
            return Ok(ChallengeOutcome::InProgress { progress });
        }

        if challenge.mark_complete(self.now) {
            tracing::info!("User {} completed challenge {}", user_id, challenge.id);
            self.messenger
                .add_line(user_id, ItemKind::Challenge, &challenge.id);
        }
        Ok(ChallengeOutcome::Completed)
    }
}

fn validate(restriction: RestrictionType, time: u32, amount: f64) -> Result<()> {
    let problem = match restriction {
        RestrictionType::Any if !(amount.is_finite() && amount > 0.0) => {
            Some(format!("amount_to_consume must be positive, got {amount}"))
        }
        windowed if windowed.is_windowed() && time == 0 => {
            Some("time must be at least one day".to_string())
        }
        _ => None,
    };
    match problem {
        Some(message) => Err(EngineError::InvalidRule {
            restriction,
            message,
        }),
        None => Ok(()),
    }
}

/// Days where the category was active but the ruled item was not consumed.
/// Stops counting once `time` is reached.
fn count_skip_days(field: &ResolvedField, window: &[EcoMeasurement], time: u32) -> Result<u32> {
    let mut skipped = 0;
    for measurement in window {
        if !field.group(measurement).has_activity() {
            continue;
        }
        if field.value(measurement)? == 0.0 {
            skipped += 1;
            if skipped >= time {
                break;
            }
        }
    }
    Ok(skipped)
}

/// Days where the ruled item was used and nothing else in its category was
fn count_only_this_days(
    field: &ResolvedField,
    window: &[EcoMeasurement],
    time: u32,
) -> Result<u32> {
    let mut exclusive = 0;
    for measurement in window {
        if field.value(measurement)? <= 0.0 {
            continue;
        }
        if field.others(measurement)?.iter().all(|(_, v)| *v == 0.0) {
            exclusive += 1;
            if exclusive >= time {
                break;
            }
        }
    }
    Ok(exclusive)
}

/// Running total of the ruled item over the whole timeline, stopping at `threshold`
fn accumulate(field: &ResolvedField, timeline: &[EcoMeasurement], threshold: f64) -> Result<f64> {
    let mut total = 0.0;
    for measurement in timeline {
        total += field.value(measurement)?;
        if total >= threshold {
            break;
        }
    }
    Ok(total)
}
