//! Batch evaluation across users
//!
//! A batch sorts each user's timeline, evaluates every incomplete challenge of
//! every incomplete reward, rolls completions up into rewards, and leaves the
//! completion lines in the messenger. Delivery happens once per batch via
//! [`Orchestrator::flush`], after the caller has persisted the results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::aggregator::RewardAggregator;
use super::evaluator::{ChallengeEvaluator, ChallengeOutcome};
use crate::domain::User;
use crate::messenger::Messenger;

/// Cooperative cancellation shared between a batch and its host
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub users_evaluated: usize,
    /// Users without a reward list (never onboarded)
    pub users_skipped: usize,
    pub challenges_evaluated: usize,
    pub challenges_completed: usize,
    /// Window not full yet
    pub challenges_deferred: usize,
    /// Rules naming fields the schema does not have, or otherwise invalid
    pub challenges_misconfigured: usize,
    pub rewards_completed: usize,
    pub cancelled: bool,
}

impl BatchReport {
    fn absorb(&mut self, other: BatchReport) {
        self.users_evaluated += other.users_evaluated;
        self.users_skipped += other.users_skipped;
        self.challenges_evaluated += other.challenges_evaluated;
        self.challenges_completed += other.challenges_completed;
        self.challenges_deferred += other.challenges_deferred;
        self.challenges_misconfigured += other.challenges_misconfigured;
        self.rewards_completed += other.rewards_completed;
        self.cancelled |= other.cancelled;
    }

    /// Number of digest lines this run produced
    pub fn completions(&self) -> usize {
        self.challenges_completed + self.rewards_completed
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            concat!(
                "users: {} evaluated, {} skipped | ",
                "challenges: {} evaluated, {} completed, {} waiting for data, {} misconfigured | ",
                "rewards completed: {}{}"
            ),
            self.users_evaluated,
            self.users_skipped,
            self.challenges_evaluated,
            self.challenges_completed,
            self.challenges_deferred,
            self.challenges_misconfigured,
            self.rewards_completed,
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}

/// Drives evaluation for a batch of users
#[derive(Debug, Clone)]
pub struct Orchestrator {
    workers: usize,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spread users over `workers` threads (1 = evaluate inline)
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Evaluate a batch in memory. Nothing is sent; call [`Self::flush`] afterwards.
    pub fn run(
        &self,
        users: &mut [User],
        messenger: &dyn Messenger,
        now: DateTime<Utc>,
        cancel: &CancelFlag,
    ) -> BatchReport {
        let mut report = BatchReport {
            run_id: Uuid::new_v4(),
            ..BatchReport::default()
        };
        info!("Batch {} started for {} users", report.run_id, users.len());

        if self.workers == 1 || users.len() < 2 {
            for user in users.iter_mut() {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                report.absorb(evaluate_user(user, messenger, now, cancel));
            }
        } else {
            let chunk_size = users.len().div_ceil(self.workers);
            std::thread::scope(|scope| {
                let handles: Vec<_> = users
                    .chunks_mut(chunk_size)
                    .map(|chunk| {
                        scope.spawn(move || {
                            let mut tally = BatchReport::default();
                            for user in chunk {
                                if cancel.is_cancelled() {
                                    tally.cancelled = true;
                                    break;
                                }
                                tally.absorb(evaluate_user(user, messenger, now, cancel));
                            }
                            tally
                        })
                    })
                    .collect();

                for handle in handles {
                    match handle.join() {
                        Ok(tally) => report.absorb(tally),
                        Err(_) => {
                            warn!("Evaluation worker panicked; its users were not fully evaluated")
                        }
                    }
                }
            });
        }

        info!("Batch {} finished: {}", report.run_id, report);
        report
    }

    /// Send the accumulated digest once
    pub fn flush(&self, messenger: &dyn Messenger, label: &str) -> Result<()> {
        let lines = messenger.line_count();
        messenger.send(label)?;
        if lines > 0 {
            info!("Flushed {} completion lines as '{}'", lines, label);
        }
        Ok(())
    }

    /// Evaluate then flush, for callers that do not persist in between
    pub fn run_batch(
        &self,
        users: &mut [User],
        messenger: &dyn Messenger,
        now: DateTime<Utc>,
        cancel: &CancelFlag,
        label: &str,
    ) -> Result<BatchReport> {
        let report = self.run(users, messenger, now, cancel);
        self.flush(messenger, label)?;
        Ok(report)
    }
}

fn evaluate_user(
    user: &mut User,
    messenger: &dyn Messenger,
    now: DateTime<Utc>,
    cancel: &CancelFlag,
) -> BatchReport {
    let mut tally = BatchReport::default();
    user.sort_timeline();
    let Some(rewards) = user.rewards.as_mut() else {
        debug!("User {} has no rewards; skipping", user.id);
        tally.users_skipped = 1;
        return tally;
    };
    tally.users_evaluated = 1;

    let timeline = &user.measurements;
    let evaluator = ChallengeEvaluator::new(messenger, now);
    let aggregator = RewardAggregator::new(messenger, now);

    for reward in rewards.iter_mut().filter(|r| !r.is_complete()) {
        for challenge in reward.challenges.iter_mut().filter(|c| !c.is_complete()) {
            if cancel.is_cancelled() {
                tally.cancelled = true;
                return tally;
            }
            tally.challenges_evaluated += 1;
            match evaluator.evaluate(&user.id, timeline, challenge) {
                Ok(ChallengeOutcome::Completed) => tally.challenges_completed += 1,
                Ok(ChallengeOutcome::Deferred { .. }) => tally.challenges_deferred += 1,
                Ok(ChallengeOutcome::InProgress { .. } | ChallengeOutcome::AlreadyComplete) => {}
                Err(e) => {
                    warn!(
                        "Skipping challenge {} of reward {} for user {}: {}",
                        challenge.id, reward.id, user.id, e
                    );
                    tally.challenges_misconfigured += 1;
                }
            }
        }

        if aggregator.aggregate(&user.id, reward) {
            tally.rewards_completed += 1;
        }
    }

    tally
}
