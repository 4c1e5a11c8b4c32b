//! Time source for "today" checks and record timestamps.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

pub trait Clock: Send + Sync {
    /// Instant used to stamp `created_at`.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Clinic wall-clock time, used for past-date and same-day slot checks.
    fn local_now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single instant; the local time is treated as UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: NaiveDateTime,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.at.and_utc()
    }

    fn local_now(&self) -> NaiveDateTime {
        self.at
    }
}
