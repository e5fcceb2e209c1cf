//! Wall-clock time at the tutoring site.
use anyhow::{anyhow, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use mockable::Clock;
use std::sync::Arc;

/// Reads the injected clock and shifts it to the configured UTC offset.
#[derive(Clone)]
pub struct LocalClock {
    clock: Arc<dyn Clock + Send + Sync>,
    offset: FixedOffset,
}

impl LocalClock {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, utc_offset_minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .ok_or_else(|| anyhow!("UTC offset out of range: {} minutes", utc_offset_minutes))?;
        Ok(Self { clock, offset })
    }

    /// Local date and time, truncated to whole seconds
    pub fn now(&self) -> NaiveDateTime {
        let now = self.clock.utc().with_timezone(&self.offset).naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
