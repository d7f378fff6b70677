//! Collaborator contracts for the map widget and the page, plus the
//! view data the tracker pushes into them.
//!
//! View data is always built from stored fields, so restored plain records
//! render exactly like workouts created in this session.

use serde::{Deserialize, Serialize};

use crate::models::{ActivityType, Coordinates, DerivedMetric};
use crate::store::SessionWorkout;

/// Opaque handle returned by the map for a placed marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub usize);

/// The interactive map widget
///
/// Map clicks are not registered through a callback: the host forwards them
/// to [`crate::App::on_map_click`].
pub trait MapView {
    /// Create the map view centred on `center`
    fn create_view(&mut self, center: Coordinates, zoom: u8);

    /// Place a marker and open its popup. Every call adds a new marker.
    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerHandle;

    /// Move the view to `center`
    fn set_view(&mut self, center: Coordinates, zoom: u8, pan: &PanOptions);
}

/// The page: workout list, form, and blocking alerts
pub trait PresentationSink {
    /// Insert a row directly after the form, so the newest row shows first
    fn render_list_row(&mut self, row: &ListRow);

    /// Blocking user notification
    fn alert(&mut self, message: &str);

    /// Reveal the form and focus the distance field
    fn show_form(&mut self);

    /// Clear every form field and hide the form
    fn hide_form(&mut self);

    /// Show the extra field for the selected activity and hide the other
    fn show_fields(&mut self, layout: FormLayout);

    /// Throw away everything rendered and start the page again
    fn reload(&mut self);
}

/// Marker popup settings shared by every marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupSettings {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            max_width: 220,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
        }
    }
}

/// Popup bound to a single marker
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub coordinates: Coordinates,
    pub popup: Popup,
}

impl MarkerSpec {
    /// Marker for a workout; icon and popup class come from the activity tag
    pub fn for_workout(workout: &SessionWorkout, settings: &PopupSettings) -> Self {
        let activity = workout.activity_type();
        Self {
            coordinates: workout.coordinates(),
            popup: Popup {
                max_width: settings.max_width,
                min_width: settings.min_width,
                auto_close: settings.auto_close,
                close_on_click: settings.close_on_click,
                class_name: format!("{}-popup", activity.as_str()),
                content: format!("{} {}", activity.icon(), workout.description()),
            },
        }
    }
}

/// Animation options for re-centring the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration_secs: f64,
}

/// Which extra form field is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormLayout {
    pub activity: ActivityType,
    pub cadence_visible: bool,
    pub elevation_visible: bool,
}

impl FormLayout {
    pub fn for_activity(activity: ActivityType) -> Self {
        Self {
            activity,
            cadence_visible: activity == ActivityType::Running,
            elevation_visible: activity == ActivityType::Cycling,
        }
    }
}

/// One value cell of a list row
#[derive(Debug, Clone, PartialEq)]
pub struct RowDetail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl RowDetail {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

/// Display data for one workout row, keyed by workout id
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub id: String,
    pub activity: ActivityType,
    pub title: String,
    pub details: Vec<RowDetail>,
}

const MISSING: &str = "-";

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

impl ListRow {
    pub fn for_workout(workout: &SessionWorkout) -> Self {
        let activity = workout.activity_type();
        let mut details = vec![
            RowDetail::new(activity.icon(), workout.distance().to_string(), "km"),
            RowDetail::new("⏱", workout.duration().to_string(), "min"),
        ];

        let metric = workout.stored_metric();
        match activity {
            ActivityType::Running => {
                let pace = match metric {
                    Some(DerivedMetric::Pace(p)) if p.is_finite() => format!("{:.2}", p),
                    _ => MISSING.to_string(),
                };
                details.push(RowDetail::new("⚡️", pace, "min/km"));
                details.push(RowDetail::new("👟", optional(workout.variant_field()), "spm"));
            }
            ActivityType::Cycling => {
                let speed = match metric {
                    Some(DerivedMetric::Speed(s)) if s.is_finite() => format!("{:.2}", s),
                    _ => MISSING.to_string(),
                };
                details.push(RowDetail::new("⚡️", speed, "km/h"));
                details.push(RowDetail::new("⛰", optional(workout.variant_field()), "m"));
            }
        }

        Self {
            id: workout.id().to_string(),
            activity,
            title: workout.description().to_string(),
            details,
        }
    }

    /// Row markup as inserted into the workout list
    pub fn to_markup(&self) -> String {
        let mut html = format!(
            concat!(
                "<li class=\"workout workout--{}\" data-id=\"{}\">\n",
                "  <h2 class=\"workout__title\">{}</h2>\n",
            ),
            self.activity.as_str(),
            escape(&self.id),
            escape(&self.title)
        );
        for detail in &self.details {
            html.push_str(&format!(
                concat!(
                    "  <div class=\"workout__details\">\n",
                    "    <span class=\"workout__icon\">{}</span>\n",
                    "    <span class=\"workout__value\">{}</span>\n",
                    "    <span class=\"workout__unit\">{}</span>\n",
                    "  </div>\n",
                ),
                detail.icon,
                escape(&detail.value),
                detail.unit
            ));
        }
        html.push_str("</li>\n");
        html
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cycling, Running};
    use crate::store::StoredWorkout;
    use chrono::{TimeZone, Utc};

    fn live_run() -> SessionWorkout {
        SessionWorkout::Live(
            Running::new(
                "0000000042".to_string(),
                Utc.with_ymd_and_hms(2024, 4, 20, 9, 0, 0).unwrap(),
                Coordinates::new(40.7, -74.0),
                5.0,
                27.0,
                178.0,
            )
            .into(),
        )
    }

    #[test]
    fn test_marker_spec_for_running() {
        let marker = MarkerSpec::for_workout(&live_run(), &PopupSettings::default());

        assert_eq!(marker.coordinates, Coordinates::new(40.7, -74.0));
        assert_eq!(marker.popup.class_name, "running-popup");
        assert_eq!(marker.popup.content, "🏃 Running on April 20");
        assert_eq!(marker.popup.max_width, 220);
        assert!(!marker.popup.auto_close);
    }

    #[test]
    fn test_list_row_running() {
        let row = ListRow::for_workout(&live_run());

        assert_eq!(row.id, "0000000042");
        assert_eq!(row.title, "Running on April 20");
        let values: Vec<&str> = row.details.iter().map(|d| d.value.as_str()).collect();
        assert_eq!(values, vec!["5", "27", "5.40", "178"]);
        assert_eq!(row.details[2].unit, "min/km");
    }

    #[test]
    fn test_list_row_from_restored_record() {
        let ride: crate::models::Workout = Cycling::new(
            "7".to_string(),
            Utc.with_ymd_and_hms(2024, 4, 21, 9, 0, 0).unwrap(),
            Coordinates::new(39.0, -12.0),
            23.0,
            60.0,
            458.0,
        )
        .into();
        let mut record = StoredWorkout::from(&ride);
        let live_row = ListRow::for_workout(&SessionWorkout::Live(ride));
        let restored_row = ListRow::for_workout(&SessionWorkout::Restored(record.clone()));
        assert_eq!(live_row, restored_row);
        assert_eq!(restored_row.details[2].value, "23.00");

        record.speed = None;
        let row = ListRow::for_workout(&SessionWorkout::Restored(record));
        assert_eq!(row.details[2].value, "-");
    }

    #[test]
    fn test_overflowing_metric_renders_as_missing() {
        let run: crate::models::Workout = Running::new(
            "8".to_string(),
            Utc.with_ymd_and_hms(2024, 4, 22, 9, 0, 0).unwrap(),
            Coordinates::new(40.7, -74.0),
            1e-320,
            25.0,
            170.0,
        )
        .into();
        let record = StoredWorkout::from(&run);

        let live_row = ListRow::for_workout(&SessionWorkout::Live(run));
        assert_eq!(live_row.details[2].value, "-");
        assert_eq!(live_row, ListRow::for_workout(&SessionWorkout::Restored(record.clone())));

        let mut persisted = record;
        persisted.pace = None;
        assert_eq!(live_row, ListRow::for_workout(&SessionWorkout::Restored(persisted)));
    }

    #[test]
    fn test_markup_escapes_restored_text() {
        let mut row = ListRow::for_workout(&live_run());
        row.title = "<b>Run</b>".to_string();

        let html = row.to_markup();
        assert!(html.starts_with("<li class=\"workout workout--running\" data-id=\"0000000042\">"));
        assert!(html.contains("&lt;b&gt;Run&lt;/b&gt;"));
        assert!(html.contains("<span class=\"workout__unit\">spm</span>"));
    }

    #[test]
    fn test_form_layout() {
        let layout = FormLayout::for_activity(ActivityType::Cycling);
        assert!(layout.elevation_visible);
        assert!(!layout.cadence_visible);
    }
}
