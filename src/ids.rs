//! Workout identifier generation
//!
//! Identifiers are strings. The legacy scheme keeps the last ten digits of the
//! creation time in milliseconds, which collides when two workouts are created
//! within the same millisecond. `Monotonic` keeps the same shape but never
//! hands out a value twice within a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ID_DIGITS: usize = 10;
const ID_MODULUS: u64 = 10_000_000_000;

/// How new workout identifiers are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Last ten digits of the millisecond clock, collisions possible
    Timestamp,
    /// Timestamp digits, bumped past the last issued or observed value
    #[default]
    Monotonic,
    /// Random v4 UUID
    Uuid,
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timestamp" => Ok(IdStrategy::Timestamp),
            "monotonic" => Ok(IdStrategy::Monotonic),
            "uuid" => Ok(IdStrategy::Uuid),
            _ => Err(format!("Invalid id strategy: {}", s)),
        }
    }
}

/// Issues workout identifiers for one session
#[derive(Debug, Clone)]
pub struct IdGenerator {
    strategy: IdStrategy,
    last: Option<u64>,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            last: None,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Produce the identifier for a workout created at `at`
    pub fn next_id(&mut self, at: DateTime<Utc>) -> String {
        match self.strategy {
            IdStrategy::Timestamp => {
                let millis = at.timestamp_millis().to_string();
                let start = millis.len().saturating_sub(ID_DIGITS);
                millis[start..].to_string()
            }
            IdStrategy::Monotonic => {
                let candidate = at.timestamp_millis().rem_euclid(ID_MODULUS as i64) as u64;
                let value = match self.last {
                    Some(last) if candidate <= last => (last + 1) % ID_MODULUS,
                    _ => candidate,
                };
                self.last = Some(value);
                format!("{:0width$}", value, width = ID_DIGITS)
            }
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }

    /// Account for an identifier that entered the session from elsewhere
    /// (restored from storage), so monotonic ids never reuse it.
    pub fn observe(&mut self, id: &str) {
        if self.strategy != IdStrategy::Monotonic {
            return;
        }
        if let Ok(value) = id.parse::<u64>() {
            let value = value % ID_MODULUS;
            if self.last.map_or(true, |last| value > last) {
                self.last = Some(value);
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}
