use crate::model::{CalendarError, NoteKey, HOURS_PER_DAY};
use chrono::{Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Date collaborator. "Today" is fixed for the lifetime of a clock.
pub trait Clock {
    fn today(&self) -> NaiveDate;

    /// Key of a local hour. Fails with `SkippedHour` when a clock change
    /// jumps over that hour.
    fn hour_key(&self, day: NaiveDate, hour: u32) -> Result<NoteKey, CalendarError>;

    fn local_datetime(&self, key: NoteKey) -> Option<NaiveDateTime>;

    fn day_of(&self, key: NoteKey) -> Option<NaiveDate> {
        self.local_datetime(key).map(|dt| dt.date())
    }

    /// Like `hour_key`, with a skipped hour as `None`.
    fn slot_key(&self, day: NaiveDate, hour: u32) -> Result<Option<NoteKey>, CalendarError> {
        match self.hour_key(day, hour) {
            Ok(key) => Ok(Some(key)),
            Err(CalendarError::SkippedHour(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Keys of the hours that exist on `day`, in order.
    fn day_keys(&self, day: NaiveDate) -> Result<Vec<NoteKey>, CalendarError> {
        let mut keys = Vec::with_capacity(HOURS_PER_DAY as usize);
        for hour in 0..HOURS_PER_DAY {
            if let Some(key) = self.slot_key(day, hour)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[derive(Debug, Clone)]
pub struct ZonedClock<Tz: TimeZone> {
    tz: Tz,
    today: NaiveDate,
}

impl ZonedClock<Local> {
    pub fn local() -> Self {
        ZonedClock {
            tz: Local,
            today: Local::now().date_naive(),
        }
    }
}

impl<Tz: TimeZone> ZonedClock<Tz> {
    pub fn new(tz: Tz, today: NaiveDate) -> Self {
        ZonedClock { tz, today }
    }
}

impl<Tz: TimeZone> Clock for ZonedClock<Tz> {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn hour_key(&self, day: NaiveDate, hour: u32) -> Result<NoteKey, CalendarError> {
        let time = NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| CalendarError::InvalidRange(format!("hour {} out of range", hour)))?;
        let local = day.and_time(time);
        let instant = match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => return Err(CalendarError::SkippedHour(hour)),
        };
        Ok(NoteKey::from_millis(instant.timestamp_millis()))
    }

    fn local_datetime(&self, key: NoteKey) -> Option<NaiveDateTime> {
        match self.tz.timestamp_millis_opt(key.millis()) {
            LocalResult::Single(dt) => Some(dt.naive_local()),
            _ => None,
        }
    }
}
