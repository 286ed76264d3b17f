//! ecochallenge - eco challenge and reward completion engine
//!
//! Users report their daily consumption (diet, transport, electronics,
//! clothing, footwear). Rewards bundle challenges such as "skip beef for 7
//! days" or "walk 80 miles"; a periodic batch evaluates every user's
//! timeline, marks challenges and rewards complete, and sends one digest of
//! the completions.
//!
//! ## Layers
//!
//! - [`domain`]: measurements, rewards, challenge rules, the catalog
//! - [`engine`]: pure evaluation of a batch of users
//! - [`messenger`]: completion digest buffering and delivery
//! - [`store`]: SQLite persistence
//! - [`config`]: `~/.ecochallenge/config.toml`

pub mod config;
pub mod domain;
pub mod engine;
pub mod messenger;
pub mod store;

pub use domain::*;
