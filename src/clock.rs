//! Time source for workout creation dates and identifiers

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use std::cell::Cell;

/// Supplies the creation instant of new workouts
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The current instant in the user's zone; descriptions take their
    /// calendar day from it
    fn local_now(&self) -> DateTime<FixedOffset> {
        let local = self.now().with_timezone(&Local);
        local.with_timezone(local.offset())
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock, for deterministic sessions. Its zone is UTC
/// unless set with [`FixedClock::with_offset`].
#[derive(Debug, Clone)]
pub struct FixedClock {
    at: Cell<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            at: Cell::new(at),
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.at.set(at);
    }

    /// Move the clock forward by `millis` milliseconds
    pub fn advance_millis(&self, millis: i64) {
        self.at.set(self.at.get() + chrono::Duration::milliseconds(millis));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at.get()
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&self.offset)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        (**self).local_now()
    }
}
