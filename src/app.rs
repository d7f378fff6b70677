//! Application controller
//!
//! `App` owns the session store and drives the map, page and storage
//! collaborators it is constructed with. Every method is an event handler;
//! the host calls them as the corresponding events happen.
//!
//! Startup has two independent completions: [`App::start`] restores the
//! stored session, and [`App::on_position`] brings the map up. List rows are
//! rendered as soon as the session is restored. Markers wait for the map,
//! whichever finishes first.

use chrono::Utc;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::{GeolocationError, MaptrackError, Result};
use crate::ids::IdGenerator;
use crate::models::{ActivityType, Coordinates};
use crate::presentation::{FormLayout, ListRow, MapView, MarkerSpec, PresentationSink};
use crate::storage::KeyValueStorage;
use crate::store::{MarkerState, SessionStore, SessionWorkout};
use crate::validation::{FormInput, SubmissionValidator};

pub struct App<M, S, P, C = SystemClock> {
    config: AppConfig,
    map: M,
    storage: S,
    sink: P,
    clock: C,
    validator: SubmissionValidator,
    ids: IdGenerator,
    store: SessionStore,
    map_ready: bool,
    restored: bool,
    pending_position: Option<Coordinates>,
}

impl<M, S, P, C> App<M, S, P, C>
where
    M: MapView,
    S: KeyValueStorage,
    P: PresentationSink,
    C: Clock,
{
    pub fn new(config: AppConfig, map: M, storage: S, sink: P, clock: C) -> Self {
        let validator = SubmissionValidator::new(config.validation.clone());
        let ids = IdGenerator::new(config.ids.strategy);

        Self {
            config,
            map,
            storage,
            sink,
            clock,
            validator,
            ids,
            store: SessionStore::new(),
            map_ready: false,
            restored: false,
            pending_position: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    pub fn pending_position(&self) -> Option<Coordinates> {
        self.pending_position
    }

    /// Restore the persisted session and render its list rows. Runs once;
    /// later calls return 0. Unreadable storage counts as an empty session.
    pub fn start(&mut self) -> usize {
        if self.restored {
            return 0;
        }
        self.restored = true;

        let key = &self.config.storage.key;
        let raw = match self.storage.get_item(key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Stored session unreadable, starting empty");
                None
            }
        };

        let records = SessionStore::restore(raw.as_deref());
        for record in &records {
            self.ids.observe(&record.id);
        }

        let count = self
            .store
            .load_restored(records, self.config.restore.mode);
        for entry in &self.store.entries()[..count] {
            self.sink.render_list_row(&ListRow::for_workout(&entry.workout));
        }

        tracing::info!(count, mode = ?self.config.restore.mode, "Session restored");

        if self.map_ready {
            self.place_pending_markers();
        }
        count
    }

    /// Outcome of the position lookup. On success the map view is created
    /// and every workout loaded so far gets its marker.
    pub fn on_position(&mut self, position: std::result::Result<Coordinates, GeolocationError>) {
        match position {
            Ok(center) => {
                if self.map_ready {
                    return;
                }
                self.map.create_view(center, self.config.map.zoom_level);
                self.map_ready = true;
                tracing::info!(lat = center.lat, lng = center.lng, "Map ready");
                self.place_pending_markers();
            }
            Err(e) => {
                let err = MaptrackError::from(e);
                err.log("Map not loaded");
                self.sink.alert(&err.user_message());
            }
        }
    }

    /// A click on the map picks the workout position and opens the form
    pub fn on_map_click(&mut self, at: Coordinates) {
        self.pending_position = Some(at);
        self.sink.show_form();
    }

    /// The activity selector changed
    pub fn on_activity_type_changed(&mut self, raw: &str) {
        match raw.parse::<ActivityType>() {
            Ok(activity) => self.sink.show_fields(FormLayout::for_activity(activity)),
            Err(e) => tracing::debug!(error = %e, "Ignoring unknown activity selection"),
        }
    }

    /// Handle a form submission. On success the new workout is appended,
    /// rendered and persisted, and its id returned. On validation failure
    /// the user is alerted and nothing changes.
    pub fn submit(&mut self, input: &FormInput) -> Result<String> {
        let validated = self
            .validator
            .validate_position(self.pending_position)
            .and_then(|at| self.validator.validate(input).map(|s| (at, s)));

        let (at, submission) = match validated {
            Ok(ok) => ok,
            Err(e) => {
                let err = MaptrackError::from(e);
                err.log("Workout rejected");
                self.sink.alert(&err.user_message());
                return Err(err);
            }
        };

        let date = self.clock.local_now();
        let id = self.ids.next_id(date.with_timezone(&Utc));
        let workout = submission.into_workout(id.clone(), date, at);
        tracing::info!(id = %id, activity = %workout.activity_type(), "Workout created");

        self.store.append(workout);

        if self.map_ready {
            self.place_pending_markers();
        }
        if let Some(entry) = self.store.entries().last() {
            self.sink.render_list_row(&ListRow::for_workout(&entry.workout));
        }
        self.sink.hide_form();
        self.pending_position = None;

        if let Err(e) = self.persist() {
            e.log("Failed to persist session");
            self.sink.alert(&e.user_message());
        }

        Ok(id)
    }

    /// A list row was activated: centre the map on its workout. Unknown ids
    /// and a map that is not up yet are ignored.
    pub fn on_row_activated(&mut self, id: &str) -> bool {
        if !self.map_ready {
            tracing::debug!(id, "Row activated before map ready");
            return false;
        }

        let Some(workout) = self.store.find_by_id(id) else {
            tracing::debug!(id, "Row activation did not match any workout");
            return false;
        };

        self.map.set_view(
            workout.coordinates(),
            self.config.map.zoom_level,
            &self.config.map.pan_options(),
        );
        true
    }

    /// Look up a workout by id
    pub fn find_workout(&self, id: &str) -> Option<&SessionWorkout> {
        self.store.find_by_id(id)
    }

    /// Drop the persisted session and everything in memory, then reload
    /// the page. No confirmation, no undo.
    pub fn reset(&mut self) -> Result<()> {
        self.storage.remove_item(&self.config.storage.key)?;
        self.store.clear();
        self.restored = false;
        self.pending_position = None;
        tracing::info!("Stored session cleared");
        self.sink.reload();
        Ok(())
    }

    /// Write the whole session under the configured key
    fn persist(&mut self) -> Result<()> {
        let snapshot = self.store.to_json()?;
        self.storage.set_item(&self.config.storage.key, &snapshot)?;
        tracing::debug!(count = self.store.len(), "Session persisted");
        Ok(())
    }

    fn place_pending_markers(&mut self) {
        let popup = &self.config.popup;
        for entry in self.store.pending_markers_mut() {
            let spec = MarkerSpec::for_workout(&entry.workout, popup);
            self.map.add_marker(&spec);
            entry.marker = MarkerState::Placed;
        }
    }
}
