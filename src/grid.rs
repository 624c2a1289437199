use crate::clock::Clock;
use crate::model::{CalendarError, StoreError, Warning};
use crate::range::{grid_range, same_month, start_of_month, WeekStart};
use crate::store::NoteStore;
use chrono::NaiveDate;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_selected: bool,
    pub is_today: bool,
    pub has_event: bool,
}

#[derive(Debug, Clone)]
pub struct MonthGrid {
    /// First day of the displayed month.
    pub month: NaiveDate,
    pub cells: Vec<DayCell>,
    pub warnings: Vec<Warning>,
}

impl MonthGrid {
    pub fn weeks(&self) -> std::slice::Chunks<'_, DayCell> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.date == date)
    }
}

/// Memo of per-day `has_event` results. Must be invalidated on every store mutation.
#[derive(Debug, Default, Clone)]
pub struct DayEventCache {
    days: HashMap<NaiveDate, bool>,
}

impl DayEventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self, day: NaiveDate) {
        self.days.remove(&day);
    }

    pub fn clear(&mut self) {
        self.days.clear();
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn get(&self, day: NaiveDate) -> Option<bool> {
        self.days.get(&day).copied()
    }

    fn put(&mut self, day: NaiveDate, has_event: bool) {
        self.days.insert(day, has_event);
    }
}

/// Scans the hour keys of `day`; stops at the first hit.
pub fn day_has_event<C, S>(day: NaiveDate, clock: &C, store: &S) -> Result<bool, CalendarError>
where
    C: Clock + ?Sized,
    S: NoteStore + ?Sized,
{
    for key in clock.day_keys(day)? {
        if store.contains(key)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn build_month_grid<C, S>(
    month: NaiveDate,
    selected: Option<NaiveDate>,
    week_start: WeekStart,
    clock: &C,
    store: &S,
    mut cache: Option<&mut DayEventCache>,
) -> Result<MonthGrid, CalendarError>
where
    C: Clock + ?Sized,
    S: NoteStore + ?Sized,
{
    let range = grid_range(month, week_start)?;
    let today = clock.today();
    let mut cells = Vec::with_capacity(range.len());
    let mut warnings = Vec::new();

    for date in range.days() {
        let cached = cache.as_deref().and_then(|c| c.get(date));
        let has_event = match cached {
            Some(hit) => hit,
            None => match day_has_event(date, clock, store) {
                Ok(found) => {
                    if let Some(c) = cache.as_deref_mut() {
                        c.put(date, found);
                    }
                    found
                }
                Err(CalendarError::StoreUnavailable(err)) => {
                    warn!("event=grid_read status=degraded day={} error={}", date, err);
                    warnings.push(read_warning(date, clock, err)?);
                    false
                }
                Err(other) => return Err(other),
            },
        };
        cells.push(DayCell {
            date,
            in_current_month: same_month(date, month),
            is_selected: selected == Some(date),
            is_today: date == today,
            has_event,
        });
    }

    Ok(MonthGrid {
        month: start_of_month(month),
        cells,
        warnings,
    })
}

fn read_warning<C: Clock + ?Sized>(
    date: NaiveDate,
    clock: &C,
    err: StoreError,
) -> Result<Warning, CalendarError> {
    let key = clock.day_keys(date)?.first().copied().ok_or_else(|| {
        CalendarError::InvalidRange(format!("{} has no local hours", date))
    })?;
    Ok(Warning {
        key,
        message: format!("could not check notes for {}: {}", date, err),
    })
}
