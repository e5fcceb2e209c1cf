//! Shared fixtures for unit tests.
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use mockable::Clock;
use std::sync::{Arc, Mutex};

use crate::domain::local_clock::LocalClock;
use crate::domain::models::points::PointMap;
use crate::domain::models::schedule::ScheduleSlot;
use crate::domain::models::student::Student;

/// UTC offset used by every fixture clock (UTC+9)
pub const TEST_OFFSET_MINUTES: i32 = 540;

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock to a local "YYYY-MM-DD HH:MM[:SS]" in the fixture offset
    pub fn set_local(&self, local: &str) {
        *self.lock_clock() = local_to_utc(local);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

fn local_to_utc(local: &str) -> DateTime<Utc> {
    let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M"))
        .expect("fixture time must be YYYY-MM-DD HH:MM[:SS]");
    let shifted = naive - chrono::Duration::minutes(TEST_OFFSET_MINUTES as i64);
    Utc.from_utc_datetime(&shifted)
}

/// A controllable clock and the local view the services read
pub fn clock_at(local: &str) -> (Arc<MutableClock>, LocalClock) {
    let clock = Arc::new(MutableClock::new(local_to_utc(local)));
    let local_clock = LocalClock::new(clock.clone(), TEST_OFFSET_MINUTES).expect("valid offset");
    (clock, local_clock)
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("fixture date must be YYYY-MM-DD")
}

pub fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .expect("fixture time must be HH:MM")
}

pub fn slot(weekday: Weekday, at: &str) -> ScheduleSlot {
    ScheduleSlot {
        weekday,
        time: time(at),
    }
}

/// An active student with zero points and no schedule
pub fn new_student(name: &str, birth: &str, guardian_phone: &str) -> Student {
    Student {
        id: Student::generate_id(),
        name: name.to_string(),
        birth: date(birth),
        guardian_phone: guardian_phone.to_string(),
        schedules: Vec::new(),
        points: PointMap::zeroed(),
        spendable_points: 0,
        active: true,
        pause_date: None,
    }
}
