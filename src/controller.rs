use crate::agenda::{build_day_agenda, DayAgenda};
use crate::clock::Clock;
use crate::grid::{build_month_grid, DayEventCache, MonthGrid};
use crate::model::{CalendarError, NoteKey, Warning};
use crate::range::{add_months, end_of_month, same_month, start_of_month, WeekStart};
use crate::sample::SampleGenerator;
use crate::slot::{Commit, SlotState};
use crate::store::NoteStore;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rand::{Rng, RngCore};

const SEED_MIN_STEP_HOURS: i64 = 12;
const SEED_MAX_STEP_HOURS: i64 = 48;
const SEED_MONTHS_AROUND: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    RemoveNote { key: NoteKey },
    ClearAll,
}

/// A destructive action waiting for the user to approve it.
///
/// Only [`CalendarState`] hands these out, and only [`CalendarState::confirm`]
/// carries them out.
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmRequest {
    action: PendingAction,
    prompt: String,
}

impl ConfirmRequest {
    pub fn action(&self) -> PendingAction {
        self.action
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Inclusive day span for sample seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SampleRange {
    /// Start of the month two months back through the end of the month two months ahead.
    pub fn around(day: NaiveDate) -> Result<Self, CalendarError> {
        Ok(SampleRange {
            start: start_of_month(add_months(day, -SEED_MONTHS_AROUND)?),
            end: end_of_month(add_months(day, SEED_MONTHS_AROUND)?)?,
        })
    }
}

pub struct CalendarState<S, C> {
    store: S,
    clock: C,
    week_start: WeekStart,
    month: NaiveDate,
    selected: NaiveDate,
    cache: DayEventCache,
    grid: MonthGrid,
    agenda: DayAgenda,
}

impl<S: NoteStore, C: Clock> CalendarState<S, C> {
    /// Opens on today's month with today selected.
    pub fn new(store: S, clock: C, week_start: WeekStart) -> Result<Self, CalendarError> {
        let today = clock.today();
        let month = start_of_month(today);
        let mut cache = DayEventCache::new();
        let grid = build_month_grid(month, Some(today), week_start, &clock, &store, Some(&mut cache))?;
        let agenda = build_day_agenda(today, &clock, &store)?;
        Ok(CalendarState {
            store,
            clock,
            week_start,
            month,
            selected: today,
            cache,
            grid,
            agenda,
        })
    }

    pub fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub fn agenda(&self) -> &DayAgenda {
        &self.agenda
    }

    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.grid.warnings.iter().chain(self.agenda.warnings.iter())
    }

    pub fn select_month(&mut self, date: NaiveDate) -> Result<(), CalendarError> {
        self.month = start_of_month(date);
        debug!("event=select_month month={}", self.month);
        self.rebuild_grid()
    }

    pub fn select_day(&mut self, date: NaiveDate) -> Result<(), CalendarError> {
        // Build first so an invalid day leaves the current selection in place.
        let agenda = build_day_agenda(date, &self.clock, &self.store)?;
        self.selected = date;
        self.agenda = agenda;
        debug!("event=select_day day={}", date);
        if same_month(date, self.month) {
            self.rebuild_grid()
        } else {
            self.select_month(date)
        }
    }

    pub fn next_month(&mut self) -> Result<(), CalendarError> {
        let month = add_months(self.month, 1)?;
        self.select_month(month)
    }

    pub fn prev_month(&mut self) -> Result<(), CalendarError> {
        let month = add_months(self.month, -1)?;
        self.select_month(month)
    }

    pub fn go_to_today(&mut self) -> Result<(), CalendarError> {
        self.select_day(self.clock.today())
    }

    /// Moves the selection by whole days, following it across months.
    pub fn shift_day(&mut self, days: i64) -> Result<(), CalendarError> {
        let target = self
            .selected
            .checked_add_signed(chrono::Duration::days(days))
            .ok_or_else(|| {
                CalendarError::InvalidRange(format!("{} + {} days", self.selected, days))
            })?;
        self.select_day(target)
    }

    pub fn edit_slot(&mut self, hour: u32, text: &str) -> Result<SlotState, CalendarError> {
        self.slot_mut(hour)?.edit(text)
    }

    pub fn cancel_slot(&mut self, hour: u32) -> Result<SlotState, CalendarError> {
        Ok(self.slot_mut(hour)?.cancel())
    }

    pub fn save_slot(&mut self, hour: u32) -> Result<Commit, CalendarError> {
        let slot = self
            .agenda
            .slots
            .get_mut(hour as usize)
            .ok_or_else(|| no_such_hour(hour))?;
        let commit = slot.save(&mut self.store)?;
        self.after_commit(commit)?;
        Ok(commit)
    }

    pub fn request_remove(&self, hour: u32) -> Result<ConfirmRequest, CalendarError> {
        let slot = self.agenda.slot(hour).ok_or_else(|| no_such_hour(hour))?;
        let key = slot.key.ok_or(CalendarError::SkippedHour(hour))?;
        if slot.state() != SlotState::SavedFilled {
            return Err(CalendarError::NothingToRemove(key));
        }
        Ok(ConfirmRequest {
            action: PendingAction::RemoveNote { key },
            prompt: format!("Are you sure you want to remove \"{}\"?", slot.persisted),
        })
    }

    pub fn request_clear(&self) -> ConfirmRequest {
        ConfirmRequest {
            action: PendingAction::ClearAll,
            prompt: "Are you sure you want to remove ALL the notes on the calendar?".into(),
        }
    }

    pub fn confirm(&mut self, request: ConfirmRequest) -> Result<(), CalendarError> {
        match request.action {
            PendingAction::RemoveNote { key } => {
                let slot = self
                    .agenda
                    .slots
                    .iter_mut()
                    .find(|s| s.key == Some(key))
                    .ok_or(CalendarError::NothingToRemove(key))?;
                let commit = slot.remove(&mut self.store)?;
                info!("event=note_removed key={}", key);
                self.after_commit(commit)
            }
            PendingAction::ClearAll => {
                self.store.clear()?;
                self.cache.clear();
                info!("event=notes_cleared");
                self.refresh_agenda()?;
                self.rebuild_grid()
            }
        }
    }

    /// Writes sample notes through the range at random 12-48 hour steps.
    /// Returns how many notes were written.
    pub fn seed_sample(
        &mut self,
        range: SampleRange,
        generator: &mut dyn SampleGenerator,
        rng: &mut dyn RngCore,
    ) -> Result<usize, CalendarError> {
        if range.end < range.start {
            return Err(CalendarError::InvalidRange(format!(
                "sample range {}..{} is reversed",
                range.start, range.end
            )));
        }
        let (mut cursor, _) = day_bounds(&self.clock, range.start)?;
        let (_, end) = day_bounds(&self.clock, range.end)?;
        let mut written = 0;
        let mut failure = None;
        loop {
            let step = rng.gen_range(SEED_MIN_STEP_HOURS..=SEED_MAX_STEP_HOURS);
            cursor = match cursor.checked_add_hours(step) {
                Some(next) if next <= end => next,
                _ => break,
            };
            let text = generator.sample(rng);
            if text.trim().is_empty() {
                continue;
            }
            if let Err(err) = self.store.set(cursor, &text) {
                warn!("event=seeded status=error notes={} error={}", written, err);
                failure = Some(CalendarError::from(err));
                break;
            }
            written += 1;
        }
        // Whatever reached the store must show, even after a failed write.
        self.cache.clear();
        let rebuilt = self.refresh_agenda().and_then(|()| self.rebuild_grid());
        if let Some(err) = failure {
            return Err(err);
        }
        rebuilt?;
        info!(
            "event=seeded start={} end={} notes={}",
            range.start, range.end, written
        );
        Ok(written)
    }

    fn slot_mut(&mut self, hour: u32) -> Result<&mut crate::slot::Slot, CalendarError> {
        self.agenda.slot_mut(hour).ok_or_else(|| no_such_hour(hour))
    }

    fn after_commit(&mut self, commit: Commit) -> Result<(), CalendarError> {
        if !commit.touched_store() {
            return Ok(());
        }
        self.cache.invalidate(self.agenda.day);
        self.rebuild_grid()
    }

    fn rebuild_grid(&mut self) -> Result<(), CalendarError> {
        self.grid = build_month_grid(
            self.month,
            Some(self.selected),
            self.week_start,
            &self.clock,
            &self.store,
            Some(&mut self.cache),
        )?;
        Ok(())
    }

    // Re-reads the selected day, carrying over drafts the user has not committed.
    fn refresh_agenda(&mut self) -> Result<(), CalendarError> {
        let mut fresh = build_day_agenda(self.selected, &self.clock, &self.store)?;
        if fresh.day == self.agenda.day {
            for (old, new) in self.agenda.slots.iter().zip(fresh.slots.iter_mut()) {
                if old.state() == SlotState::Dirty {
                    new.edit(old.displayed.clone())?;
                }
            }
        }
        self.agenda = fresh;
        Ok(())
    }
}

// First and last existing hour keys of `day`.
fn day_bounds<C: Clock>(clock: &C, day: NaiveDate) -> Result<(NoteKey, NoteKey), CalendarError> {
    let keys = clock.day_keys(day)?;
    match (keys.first(), keys.last()) {
        (Some(first), Some(last)) => Ok((*first, *last)),
        _ => Err(CalendarError::InvalidRange(format!("{} has no local hours", day))),
    }
}

fn no_such_hour(hour: u32) -> CalendarError {
    CalendarError::InvalidRange(format!("hour {} is not part of the day", hour))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::fakes::SpringForward;
    use crate::clock::ZonedClock;
    use crate::grid::day_has_event;
    use crate::sample::ChoreList;
    use crate::store::fakes::FlakyStore;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> CalendarState<MemoryStore, ZonedClock<Utc>> {
        CalendarState::new(
            MemoryStore::new(),
            ZonedClock::new(Utc, day(2024, 3, 15)),
            WeekStart::Sunday,
        )
        .unwrap()
    }

    #[test]
    fn opens_on_today() {
        let cal = state();
        assert_eq!(cal.month(), day(2024, 3, 1));
        assert_eq!(cal.selected(), day(2024, 3, 15));
        assert_eq!(cal.agenda().day, day(2024, 3, 15));
        assert!(cal.grid().cell(day(2024, 3, 15)).unwrap().is_selected);
    }

    #[test]
    fn month_navigation_keeps_selected_day() {
        let mut cal = state();
        cal.next_month().unwrap();
        assert_eq!(cal.month(), day(2024, 4, 1));
        assert_eq!(cal.selected(), day(2024, 3, 15));
        assert!(cal.grid().cell(day(2024, 3, 15)).is_none());
        cal.prev_month().unwrap();
        cal.prev_month().unwrap();
        assert_eq!(cal.month(), day(2024, 2, 1));
        let grid = cal.grid();
        assert_eq!(grid.cells.last().unwrap().date, day(2024, 3, 2));
        assert!(grid.cells.iter().all(|c| !c.is_selected));
    }

    #[test]
    fn selected_day_stays_marked_when_visible_from_adjacent_month() {
        let mut cal = state();
        cal.select_day(day(2024, 3, 31)).unwrap();
        cal.next_month().unwrap();
        let cell = cal.grid().cell(day(2024, 3, 31)).unwrap();
        assert!(cell.is_selected && !cell.in_current_month);
    }

    #[test]
    fn selecting_a_day_in_another_month_follows_it() {
        let mut cal = state();
        cal.select_day(day(2024, 5, 2)).unwrap();
        assert_eq!(cal.month(), day(2024, 5, 1));
        assert_eq!(cal.agenda().day, day(2024, 5, 2));
        cal.go_to_today().unwrap();
        assert_eq!(cal.month(), day(2024, 3, 1));
        assert_eq!(cal.selected(), day(2024, 3, 15));
    }

    #[test]
    fn shift_day_crosses_month_boundaries() {
        let mut cal = state();
        cal.select_day(day(2024, 3, 29)).unwrap();
        cal.shift_day(7).unwrap();
        assert_eq!(cal.selected(), day(2024, 4, 5));
        assert_eq!(cal.month(), day(2024, 4, 1));
    }

    #[test]
    fn save_lights_up_the_day_and_remove_clears_it() {
        let mut cal = state();
        assert_eq!(cal.edit_slot(9, "Meeting").unwrap(), SlotState::Dirty);
        assert!(!cal.grid().cell(day(2024, 3, 15)).unwrap().has_event);
        assert_eq!(cal.save_slot(9).unwrap(), Commit::Stored);
        assert!(cal.grid().cell(day(2024, 3, 15)).unwrap().has_event);

        let request = cal.request_remove(9).unwrap();
        assert!(request.prompt().contains("Meeting"));
        cal.confirm(request).unwrap();
        assert_eq!(cal.agenda().slot(9).unwrap().state(), SlotState::Empty);
        assert!(cal.store().is_empty());
        assert!(!cal.grid().cell(day(2024, 3, 15)).unwrap().has_event);
    }

    #[test]
    fn dropped_confirmation_removes_nothing() {
        let mut cal = state();
        cal.edit_slot(9, "Call").unwrap();
        cal.save_slot(9).unwrap();
        let request = cal.request_remove(9).unwrap();
        drop(request);
        assert_eq!(cal.store().len(), 1);
        assert_eq!(cal.agenda().slot(9).unwrap().state(), SlotState::SavedFilled);
    }

    #[test]
    fn remove_is_refused_for_empty_or_dirty_slots() {
        let mut cal = state();
        assert!(matches!(
            cal.request_remove(3),
            Err(CalendarError::NothingToRemove(_))
        ));
        cal.edit_slot(3, "draft").unwrap();
        assert!(cal.request_remove(3).is_err());
        assert!(cal.request_remove(24).is_err());
    }

    #[test]
    fn clear_all_empties_store_and_keeps_drafts() {
        let mut cal = state();
        cal.edit_slot(8, "Stand-up").unwrap();
        cal.save_slot(8).unwrap();
        cal.edit_slot(10, "unsaved").unwrap();
        let request = cal.request_clear();
        assert_eq!(request.action(), PendingAction::ClearAll);
        cal.confirm(request).unwrap();
        assert!(cal.store().is_empty());
        assert_eq!(cal.agenda().slot(8).unwrap().state(), SlotState::Empty);
        assert_eq!(cal.agenda().slot(10).unwrap().state(), SlotState::Dirty);
        assert!(cal.grid().cells.iter().all(|c| !c.has_event));
    }

    #[test]
    fn seeding_stays_in_range_and_steps_12_to_48_hours() {
        let mut cal = state();
        let range = SampleRange::around(cal.today()).unwrap();
        assert_eq!(range.start, day(2024, 1, 1));
        assert_eq!(range.end, day(2024, 5, 31));
        let mut rng = StdRng::seed_from_u64(42);
        let written = cal
            .seed_sample(range, &mut ChoreList::default(), &mut rng)
            .unwrap();
        assert_eq!(cal.store().len(), written);
        // 152 days in range; steps of at most 48h give at least 75 notes.
        assert!(written >= 75, "only {} notes", written);
        assert!(written <= 152 * 2);
        assert!(cal.grid().cells.iter().any(|c| c.has_event));
    }

    #[test]
    fn reversed_sample_range_is_invalid() {
        let mut cal = state();
        let range = SampleRange {
            start: day(2024, 3, 10),
            end: day(2024, 3, 1),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let err = cal
            .seed_sample(range, &mut ChoreList::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, CalendarError::InvalidRange(_)));
    }

    #[test]
    fn interrupted_seeding_still_shows_what_was_written() {
        let mut cal = CalendarState::new(
            FlakyStore::failing_after(60),
            ZonedClock::new(Utc, day(2024, 3, 15)),
            WeekStart::Sunday,
        )
        .unwrap();
        assert!(cal.grid().cells.iter().all(|c| !c.has_event));
        let range = SampleRange::around(cal.today()).unwrap();
        let mut rng = StdRng::seed_from_u64(40);
        let err = cal
            .seed_sample(range, &mut ChoreList::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, CalendarError::StoreUnavailable(_)));
        assert_eq!(cal.store().inner.len(), 60);

        // 60 steps of 12-48h from Jan 1 reach well past Feb 25, the first grid day.
        assert!(cal.grid().cells.iter().any(|c| c.has_event));
        for cell in &cal.grid().cells {
            let stored = day_has_event(cell.date, cal.clock(), cal.store()).unwrap();
            assert_eq!(cell.has_event, stored, "{}", cell.date);
        }
    }

    #[test]
    fn skipped_hour_cannot_take_the_next_hours_note() {
        let mut cal = CalendarState::new(
            MemoryStore::new(),
            ZonedClock::new(SpringForward, day(2024, 3, 10)),
            WeekStart::Sunday,
        )
        .unwrap();
        assert!(matches!(
            cal.edit_slot(2, "A"),
            Err(CalendarError::SkippedHour(2))
        ));
        cal.edit_slot(3, "B").unwrap();
        assert_eq!(cal.save_slot(3).unwrap(), Commit::Stored);
        assert_eq!(cal.save_slot(2).unwrap(), Commit::Unchanged);
        assert_eq!(cal.store().len(), 1);
        assert_eq!(cal.agenda().slot(2).unwrap().displayed, "");
        assert_eq!(cal.agenda().slot(3).unwrap().persisted, "B");
        assert!(matches!(
            cal.request_remove(2),
            Err(CalendarError::SkippedHour(2))
        ));
    }
}
