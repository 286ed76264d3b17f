//! Challenge and reward completion engine
//!
//! Pure, in-memory evaluation of users' measurement timelines against their
//! reward challenges. The engine performs no I/O: persistence and digest
//! delivery are done by the host once a batch has been evaluated.
//!
//! ```text
//! Orchestrator ──► per user ──► ChallengeEvaluator ──► RewardAggregator
//!                                  │         │                │
//!                              window     fields          Messenger
//! ```

mod aggregator;
mod error;
mod evaluator;
mod fields;
mod orchestrator;
mod window;

pub use aggregator::RewardAggregator;
pub use error::{EngineError, Result};
pub use evaluator::{ChallengeEvaluator, ChallengeOutcome};
pub use fields::{others, resolve_group, resolve_value, ResolvedField};
pub use orchestrator::{BatchReport, CancelFlag, Orchestrator};
pub use window::{lookback_days, select_window, Window};
