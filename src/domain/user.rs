use serde::{Deserialize, Serialize};

use super::measurement::EcoMeasurement;
use super::reward::UserReward;

/// A user with their measurement timeline and rewards.
///
/// `rewards` is `None` until the user has been onboarded; such users are
/// skipped by evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub measurements: Vec<EcoMeasurement>,
    #[serde(default)]
    pub rewards: Option<Vec<UserReward>>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            measurements: Vec::new(),
            rewards: None,
        }
    }

    /// Sort measurements ascending by date
    pub fn sort_timeline(&mut self) {
        self.measurements.sort_by_key(|m| m.date_taken);
    }

    /// Insert a measurement, replacing any existing one for the same date
    pub fn upsert_measurement(&mut self, measurement: EcoMeasurement) {
        match self
            .measurements
            .iter_mut()
            .find(|m| m.date_taken == measurement.date_taken)
        {
            Some(existing) => *existing = measurement,
            None => self.measurements.push(measurement),
        }
    }
}
