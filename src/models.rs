use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Month names used in workout descriptions, indexed by zero-based month
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A map position, persisted as a `[lat, lng]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

/// The two supported activity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Running,
    Cycling,
}

impl ActivityType {
    /// Persisted tag, also used in CSS class names
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Running => "running",
            ActivityType::Cycling => "cycling",
        }
    }

    /// Capitalised name used at the start of descriptions
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityType::Running => "Running",
            ActivityType::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityType::Running => "🏃",
            ActivityType::Cycling => "🚴",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ActivityType::Running),
            "cycling" => Ok(ActivityType::Cycling),
            _ => Err(format!("Invalid activity type: {}", s)),
        }
    }
}

/// `"<Activity> on <Month> <day>"`, using the calendar day in `date`'s own zone
pub fn describe<Tz: TimeZone>(activity: ActivityType, date: &DateTime<Tz>) -> String {
    format!(
        "{} on {} {}",
        activity.display_name(),
        MONTHS[date.month0() as usize],
        date.day()
    )
}

/// Fields shared by every workout variant
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutCore {
    id: String,
    date: DateTime<Utc>,
    coordinates: Coordinates,
    /// Distance in kilometers
    distance: f64,
    /// Duration in minutes
    duration: f64,
    description: String,
    clicks: u32,
}

impl WorkoutCore {
    fn new<Tz: TimeZone>(
        activity: ActivityType,
        id: String,
        date: DateTime<Tz>,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
    ) -> Self {
        Self {
            description: describe(activity, &date),
            id,
            date: date.with_timezone(&Utc),
            coordinates,
            distance,
            duration,
            clicks: 0,
        }
    }

    /// Rebuild a core from persisted values; the stored description is kept
    /// as-is since descriptions are never recomputed.
    pub(crate) fn restored(
        id: String,
        date: DateTime<Utc>,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        description: String,
        clicks: u32,
    ) -> Self {
        Self {
            id,
            date,
            coordinates,
            distance,
            duration,
            description,
            clicks,
        }
    }
}

/// Running workout: cadence in steps/min, pace in min/km
#[derive(Debug, Clone, PartialEq)]
pub struct Running {
    core: WorkoutCore,
    cadence: f64,
    pace: f64,
}

impl Running {
    /// Build a running workout. Inputs are assumed validated. The
    /// description takes its day from `date`'s zone; the stored date is UTC.
    pub fn new<Tz: TimeZone>(
        id: String,
        date: DateTime<Tz>,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Self {
        let core = WorkoutCore::new(
            ActivityType::Running,
            id,
            date,
            coordinates,
            distance,
            duration,
        );
        Self::from_core(core, cadence)
    }

    pub(crate) fn from_core(core: WorkoutCore, cadence: f64) -> Self {
        let pace = Self::calc_pace(core.distance, core.duration);
        Self {
            core,
            cadence,
            pace,
        }
    }

    fn calc_pace(distance: f64, duration: f64) -> f64 {
        duration / distance
    }

    pub fn cadence(&self) -> f64 {
        self.cadence
    }

    /// Minutes per kilometer, fixed at construction
    pub fn pace(&self) -> f64 {
        self.pace
    }
}

/// Cycling workout: elevation gain in meters, speed in km/h
#[derive(Debug, Clone, PartialEq)]
pub struct Cycling {
    core: WorkoutCore,
    elevation_gain: f64,
    speed: f64,
}

impl Cycling {
    /// Build a cycling workout. Inputs are assumed validated.
    pub fn new<Tz: TimeZone>(
        id: String,
        date: DateTime<Tz>,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        let core = WorkoutCore::new(
            ActivityType::Cycling,
            id,
            date,
            coordinates,
            distance,
            duration,
        );
        Self::from_core(core, elevation_gain)
    }

    pub(crate) fn from_core(core: WorkoutCore, elevation_gain: f64) -> Self {
        let speed = Self::calc_speed(core.distance, core.duration);
        Self {
            core,
            elevation_gain,
            speed,
        }
    }

    fn calc_speed(distance: f64, duration: f64) -> f64 {
        distance / (duration / 60.0)
    }

    pub fn elevation_gain(&self) -> f64 {
        self.elevation_gain
    }

    /// Kilometers per hour, fixed at construction
    pub fn speed(&self) -> f64 {
        self.speed
    }
}

/// Derived performance metric of a workout
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DerivedMetric {
    /// min/km
    Pace(f64),
    /// km/h
    Speed(f64),
}

/// A fully capable workout created in this session
#[derive(Debug, Clone, PartialEq)]
pub enum Workout {
    Running(Running),
    Cycling(Cycling),
}

impl Workout {
    fn core(&self) -> &WorkoutCore {
        match self {
            Workout::Running(r) => &r.core,
            Workout::Cycling(c) => &c.core,
        }
    }

    pub fn activity_type(&self) -> ActivityType {
        match self {
            Workout::Running(_) => ActivityType::Running,
            Workout::Cycling(_) => ActivityType::Cycling,
        }
    }

    pub fn id(&self) -> &str {
        &self.core().id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.core().date
    }

    pub fn coordinates(&self) -> Coordinates {
        self.core().coordinates
    }

    pub fn distance(&self) -> f64 {
        self.core().distance
    }

    pub fn duration(&self) -> f64 {
        self.core().duration
    }

    pub fn description(&self) -> &str {
        &self.core().description
    }

    pub fn clicks(&self) -> u32 {
        self.core().clicks
    }

    /// Count an interaction with this workout. Nothing in the tracker calls
    /// this yet; the counter is persisted with the workout.
    pub fn click(&mut self) {
        match self {
            Workout::Running(r) => r.core.clicks += 1,
            Workout::Cycling(c) => c.core.clicks += 1,
        }
    }

    pub fn metric(&self) -> DerivedMetric {
        match self {
            Workout::Running(r) => DerivedMetric::Pace(r.pace),
            Workout::Cycling(c) => DerivedMetric::Speed(c.speed),
        }
    }
}

impl From<Running> for Workout {
    fn from(r: Running) -> Self {
        Workout::Running(r)
    }
}

impl From<Cycling> for Workout {
    fn from(c: Cycling) -> Self {
        Workout::Cycling(c)
    }
}
