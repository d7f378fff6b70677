//! Submission validation
//!
//! Raw form values arrive as text. They are coerced the way a browser number
//! input is (`""` is zero, garbage is NaN) and then gated: every required
//! field must be finite, and every required field except elevation gain must
//! be strictly positive unless the elevation rule is switched on.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{ActivityType, Coordinates, Cycling, Running, Workout};

/// Tunable validation behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Reject zero or negative elevation gain for cycling workouts
    #[serde(default)]
    pub require_positive_elevation: bool,
}

/// Raw values read from the workout form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    pub activity_type: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation_gain: String,
}

impl FormInput {
    pub fn running(distance: &str, duration: &str, cadence: &str) -> Self {
        Self {
            activity_type: ActivityType::Running.as_str().to_string(),
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: cadence.to_string(),
            elevation_gain: String::new(),
        }
    }

    pub fn cycling(distance: &str, duration: &str, elevation_gain: &str) -> Self {
        Self {
            activity_type: ActivityType::Cycling.as_str().to_string(),
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: String::new(),
            elevation_gain: elevation_gain.to_string(),
        }
    }
}

/// Coerce a form field to a number: blank is 0, anything unparsable is NaN
pub fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Validated numeric input for one workout
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Submission {
    Running {
        distance: f64,
        duration: f64,
        cadence: f64,
    },
    Cycling {
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    },
}

impl Submission {
    pub fn activity_type(&self) -> ActivityType {
        match self {
            Submission::Running { .. } => ActivityType::Running,
            Submission::Cycling { .. } => ActivityType::Cycling,
        }
    }

    /// Construct the typed workout through its variant constructor
    pub fn into_workout<Tz: TimeZone>(
        self,
        id: String,
        date: DateTime<Tz>,
        at: Coordinates,
    ) -> Workout {
        match self {
            Submission::Running {
                distance,
                duration,
                cadence,
            } => Running::new(id, date, at, distance, duration, cadence).into(),
            Submission::Cycling {
                distance,
                duration,
                elevation_gain,
            } => Cycling::new(id, date, at, distance, duration, elevation_gain).into(),
        }
    }
}

/// Gates workout creation on well-formed numeric input
#[derive(Debug, Clone, Default)]
pub struct SubmissionValidator {
    rules: ValidationRules,
}

impl SubmissionValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate a raw form submission
    pub fn validate(&self, input: &FormInput) -> Result<Submission, ValidationError> {
        let activity: ActivityType =
            input
                .activity_type
                .parse()
                .map_err(|_| ValidationError::UnknownActivity {
                    value: input.activity_type.clone(),
                })?;

        let distance = parse_number(&input.distance);
        let duration = parse_number(&input.duration);

        match activity {
            ActivityType::Running => {
                let cadence = parse_number(&input.cadence);
                let fields = [
                    ("distance", distance),
                    ("duration", duration),
                    ("cadence", cadence),
                ];
                all_finite(&fields)?;
                all_positive(&fields)?;

                Ok(Submission::Running {
                    distance,
                    duration,
                    cadence,
                })
            }
            ActivityType::Cycling => {
                let elevation_gain = parse_number(&input.elevation_gain);
                let fields = [
                    ("distance", distance),
                    ("duration", duration),
                    ("elevation gain", elevation_gain),
                ];
                all_finite(&fields)?;
                if self.rules.require_positive_elevation {
                    all_positive(&fields)?;
                } else {
                    all_positive(&fields[..2])?;
                }

                Ok(Submission::Cycling {
                    distance,
                    duration,
                    elevation_gain,
                })
            }
        }
    }

    /// The position a workout is attached to must exist and be finite
    pub fn validate_position(
        &self,
        position: Option<Coordinates>,
    ) -> Result<Coordinates, ValidationError> {
        let position = position.ok_or(ValidationError::NoMapPosition)?;
        if !position.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "coordinates",
            });
        }
        Ok(position)
    }
}

fn all_finite(fields: &[(&'static str, f64)]) -> Result<(), ValidationError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((field, _)) => Err(ValidationError::NonFinite { field: *field }),
        None => Ok(()),
    }
}

fn all_positive(fields: &[(&'static str, f64)]) -> Result<(), ValidationError> {
    match fields.iter().find(|(_, value)| *value <= 0.0) {
        Some((field, value)) => Err(ValidationError::NonPositive {
            field: *field,
            value: *value,
        }),
        None => Ok(()),
    }
}
