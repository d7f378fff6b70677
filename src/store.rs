//! Session store and its persisted form
//!
//! The store is the ordered, in-memory source of truth for the session.
//! Snapshots are flat JSON records. Restoring a snapshot yields those records
//! back as plain data ([`SessionWorkout::Restored`]): stored fields survive,
//! derivations do not. [`RestoreMode::Revive`] opts into rebuilding them
//! through the variant constructors instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    ActivityType, Coordinates, Cycling, DerivedMetric, Running, Workout, WorkoutCore,
};

/// One persisted workout record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkout {
    pub id: String,
    pub date: DateTime<Utc>,
    pub coordinates: Coordinates,
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub clicks: u32,
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    pub description: String,
}

impl From<&Workout> for StoredWorkout {
    fn from(workout: &Workout) -> Self {
        let (cadence, pace, elevation_gain, speed) = match workout {
            Workout::Running(r) => (Some(r.cadence()), Some(r.pace()), None, None),
            Workout::Cycling(c) => (None, None, Some(c.elevation_gain()), Some(c.speed())),
        };

        StoredWorkout {
            id: workout.id().to_string(),
            date: workout.date(),
            coordinates: workout.coordinates(),
            distance: workout.distance(),
            duration: workout.duration(),
            clicks: workout.clicks(),
            activity_type: workout.activity_type(),
            cadence,
            pace,
            elevation_gain,
            speed,
            description: workout.description().to_string(),
        }
    }
}

impl StoredWorkout {
    /// Rebuild a full workout through the variant constructor for the stored
    /// tag. Returns `None` when the variant field the tag needs is missing.
    pub fn revive(&self) -> Option<Workout> {
        let core = WorkoutCore::restored(
            self.id.clone(),
            self.date,
            self.coordinates,
            self.distance,
            self.duration,
            self.description.clone(),
            self.clicks,
        );

        match self.activity_type {
            ActivityType::Running => Some(Running::from_core(core, self.cadence?).into()),
            ActivityType::Cycling => {
                Some(Cycling::from_core(core, self.elevation_gain?).into())
            }
        }
    }
}

/// How restored records enter the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreMode {
    /// Keep records as plain data
    #[default]
    Plain,
    /// Reconstruct records as typed workouts
    Revive,
}

/// A workout as held by the session: either created here or restored
#[derive(Debug, Clone, PartialEq)]
pub enum SessionWorkout {
    Live(Workout),
    Restored(StoredWorkout),
}

impl SessionWorkout {
    pub fn id(&self) -> &str {
        match self {
            SessionWorkout::Live(w) => w.id(),
            SessionWorkout::Restored(r) => &r.id,
        }
    }

    pub fn activity_type(&self) -> ActivityType {
        match self {
            SessionWorkout::Live(w) => w.activity_type(),
            SessionWorkout::Restored(r) => r.activity_type,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        match self {
            SessionWorkout::Live(w) => w.coordinates(),
            SessionWorkout::Restored(r) => r.coordinates,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            SessionWorkout::Live(w) => w.description(),
            SessionWorkout::Restored(r) => &r.description,
        }
    }

    pub fn distance(&self) -> f64 {
        match self {
            SessionWorkout::Live(w) => w.distance(),
            SessionWorkout::Restored(r) => r.distance,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            SessionWorkout::Live(w) => w.duration(),
            SessionWorkout::Restored(r) => r.duration,
        }
    }

    /// The derived metric as data. Restored records report whatever was
    /// stored, if anything; nothing is recomputed.
    pub fn stored_metric(&self) -> Option<DerivedMetric> {
        match self {
            SessionWorkout::Live(w) => Some(w.metric()),
            SessionWorkout::Restored(r) => match r.activity_type {
                ActivityType::Running => r.pace.map(DerivedMetric::Pace),
                ActivityType::Cycling => r.speed.map(DerivedMetric::Speed),
            },
        }
    }

    /// Cadence for running, elevation gain for cycling
    pub fn variant_field(&self) -> Option<f64> {
        match self {
            SessionWorkout::Live(Workout::Running(r)) => Some(r.cadence()),
            SessionWorkout::Live(Workout::Cycling(c)) => Some(c.elevation_gain()),
            SessionWorkout::Restored(r) => match r.activity_type {
                ActivityType::Running => r.cadence,
                ActivityType::Cycling => r.elevation_gain,
            },
        }
    }

    /// Full workout capabilities; `None` for plain restored records
    pub fn as_workout(&self) -> Option<&Workout> {
        match self {
            SessionWorkout::Live(w) => Some(w),
            SessionWorkout::Restored(_) => None,
        }
    }

    pub fn is_restored(&self) -> bool {
        matches!(self, SessionWorkout::Restored(_))
    }

    pub fn to_record(&self) -> StoredWorkout {
        match self {
            SessionWorkout::Live(w) => StoredWorkout::from(w),
            SessionWorkout::Restored(r) => r.clone(),
        }
    }
}

/// Whether a workout already has its marker on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Pending,
    Placed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub workout: SessionWorkout,
    pub marker: MarkerState,
}

/// Ordered collection of the session's workouts, oldest first
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    entries: Vec<SessionEntry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionWorkout> {
        self.entries.iter().map(|e| &e.workout)
    }

    /// Add a freshly created workout at the end
    pub fn append(&mut self, workout: Workout) -> &SessionEntry {
        self.entries.push(SessionEntry {
            workout: SessionWorkout::Live(workout),
            marker: MarkerState::Pending,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Linear scan; the first match wins when ids collide
    pub fn find_by_id(&self, id: &str) -> Option<&SessionWorkout> {
        self.entries
            .iter()
            .map(|e| &e.workout)
            .find(|w| w.id() == id)
    }

    /// Plain records for every workout, in store order
    pub fn serialize(&self) -> Vec<StoredWorkout> {
        self.iter().map(SessionWorkout::to_record).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.serialize())
    }

    /// Decode a snapshot. Absent or corrupt data means no prior session.
    pub fn restore(raw: Option<&str>) -> Vec<StoredWorkout> {
        let Some(raw) = raw else {
            return Vec::new();
        };

        match serde_json::from_str::<Option<Vec<StoredWorkout>>>(raw) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable workout snapshot");
                Vec::new()
            }
        }
    }

    /// Put restored records ahead of anything created this session. Returns
    /// the number of records loaded.
    pub fn load_restored(&mut self, records: Vec<StoredWorkout>, mode: RestoreMode) -> usize {
        let mut restored: Vec<SessionEntry> = records
            .into_iter()
            .map(|record| {
                let workout = match mode {
                    RestoreMode::Plain => SessionWorkout::Restored(record),
                    RestoreMode::Revive => match record.revive() {
                        Some(workout) => SessionWorkout::Live(workout),
                        None => {
                            tracing::warn!(
                                id = %record.id,
                                "Record missing variant field, kept as plain data"
                            );
                            SessionWorkout::Restored(record)
                        }
                    },
                };
                SessionEntry {
                    workout,
                    marker: MarkerState::Pending,
                }
            })
            .collect();

        let count = restored.len();
        restored.append(&mut self.entries);
        self.entries = restored;
        count
    }

    /// Entries whose marker has not been placed yet, oldest first
    pub fn pending_markers_mut(&mut self) -> impl Iterator<Item = &mut SessionEntry> {
        self.entries
            .iter_mut()
            .filter(|e| e.marker == MarkerState::Pending)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run(id: &str) -> Workout {
        Running::new(
            id.to_string(),
            Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
            Coordinates::new(40.7, -74.0),
            5.0,
            25.0,
            180.0,
        )
        .into()
    }

    fn ride(id: &str) -> Workout {
        Cycling::new(
            id.to_string(),
            Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap(),
            Coordinates::new(39.0, -12.0),
            30.0,
            90.0,
            400.0,
        )
        .into()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = SessionStore::new();
        store.append(run("a"));
        store.append(ride("b"));
        store.append(run("c"));

        let ids: Vec<String> = store.serialize().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_find_by_id() {
        let mut store = SessionStore::new();
        store.append(run("a"));
        store.append(ride("b"));

        let found = store.find_by_id("b").unwrap();
        assert_eq!(found.activity_type(), ActivityType::Cycling);
        assert!(store.find_by_id("nonexistent").is_none());
    }

    #[test]
    fn test_record_field_names() {
        let mut store = SessionStore::new();
        store.append(ride("b"));

        let json = store.to_json().unwrap();
        assert!(json.contains("\"activityType\":\"cycling\""));
        assert!(json.contains("\"elevationGain\":400.0"));
        assert!(json.contains("\"coordinates\":[39.0,-12.0]"));
        assert!(!json.contains("cadence"));
    }

    #[test]
    fn test_restore_absent_or_corrupt_is_empty() {
        assert!(SessionStore::restore(None).is_empty());
        assert!(SessionStore::restore(Some("null")).is_empty());
        assert!(SessionStore::restore(Some("{not json")).is_empty());
        assert!(SessionStore::restore(Some("[{\"id\":\"x\"}]")).is_empty());
    }

    #[test]
    fn test_plain_restore_drops_capabilities() {
        let mut store = SessionStore::new();
        store.append(run("a"));
        let json = store.to_json().unwrap();

        let mut reloaded = SessionStore::new();
        let records = SessionStore::restore(Some(json.as_str()));
        let count = reloaded.load_restored(records, RestoreMode::Plain);
        assert_eq!(count, 1);

        let restored = reloaded.find_by_id("a").unwrap();
        assert!(restored.is_restored());
        assert!(restored.as_workout().is_none());
        assert_eq!(restored.stored_metric(), Some(DerivedMetric::Pace(5.0)));
        assert_eq!(reloaded.serialize(), store.serialize());
    }

    #[test]
    fn test_revive_restore_rebuilds_variants() {
        let mut store = SessionStore::new();
        store.append(ride("b"));
        let json = store.to_json().unwrap();

        let mut reloaded = SessionStore::new();
        reloaded.load_restored(SessionStore::restore(Some(json.as_str())), RestoreMode::Revive);

        let revived = reloaded.find_by_id("b").unwrap().as_workout().unwrap();
        assert_eq!(revived, &ride("b"));
    }

    #[test]
    fn test_revive_without_variant_field_stays_plain() {
        let mut record = StoredWorkout::from(&run("a"));
        record.cadence = None;

        let mut store = SessionStore::new();
        store.load_restored(vec![record], RestoreMode::Revive);
        assert!(store.find_by_id("a").unwrap().is_restored());
    }

    #[test]
    fn test_restored_records_precede_live_ones() {
        let mut store = SessionStore::new();
        store.append(run("live"));
        store.load_restored(vec![StoredWorkout::from(&ride("old"))], RestoreMode::Plain);

        let ids: Vec<&str> = store.iter().map(|w| w.id()).collect();
        assert_eq!(ids, vec!["old", "live"]);
    }

    #[test]
    fn test_pending_markers() {
        let mut store = SessionStore::new();
        store.append(run("a"));
        store.append(run("b"));

        for entry in store.pending_markers_mut().take(1) {
            entry.marker = MarkerState::Placed;
        }
        let pending: Vec<String> = store
            .pending_markers_mut()
            .map(|e| e.workout.id().to_string())
            .collect();
        assert_eq!(pending, vec!["b"]);

        store.clear();
        assert!(store.is_empty());
    }
}
