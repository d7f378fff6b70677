// Library interface for maptrack
// The tracker core: workout model, session store, persistence, and the
// controller that drives the map and page collaborators.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod presentation;
pub mod storage;
pub mod store;
pub mod validation;

// Re-export commonly used types for convenience
pub use app::App;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::{GeolocationError, MaptrackError, Result, StorageError, ValidationError};
pub use ids::{IdGenerator, IdStrategy};
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use presentation::{
    FormLayout, ListRow, MapView, MarkerHandle, MarkerSpec, PanOptions, PopupSettings,
    PresentationSink,
};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{RestoreMode, SessionStore, SessionWorkout, StoredWorkout};
pub use validation::{FormInput, Submission, SubmissionValidator, ValidationRules};
