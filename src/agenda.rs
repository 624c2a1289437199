use crate::clock::Clock;
use crate::model::{CalendarError, NoteKey, Warning, HOURS_PER_DAY};
use crate::slot::Slot;
use crate::store::NoteStore;
use chrono::NaiveDate;
use log::warn;

#[derive(Debug, Clone)]
pub struct DayAgenda {
    pub day: NaiveDate,
    pub slots: Vec<Slot>,
    pub warnings: Vec<Warning>,
}

impl DayAgenda {
    pub fn slot(&self, hour: u32) -> Option<&Slot> {
        self.slots.get(hour as usize)
    }

    pub fn slot_mut(&mut self, hour: u32) -> Option<&mut Slot> {
        self.slots.get_mut(hour as usize)
    }

    pub fn slot_by_key(&self, key: NoteKey) -> Option<&Slot> {
        self.slots.iter().find(|s| s.key == Some(key))
    }

    pub fn has_notes(&self) -> bool {
        self.slots.iter().any(Slot::has_note)
    }

    pub fn dirty_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state() == crate::slot::SlotState::Dirty)
            .count()
    }
}

/// Projects the store onto the 24 hours of `day`. Reads only.
/// An hour skipped by a clock change gets a keyless slot.
pub fn build_day_agenda<C, S>(day: NaiveDate, clock: &C, store: &S) -> Result<DayAgenda, CalendarError>
where
    C: Clock + ?Sized,
    S: NoteStore + ?Sized,
{
    let mut slots = Vec::with_capacity(HOURS_PER_DAY as usize);
    let mut warnings = Vec::new();
    for hour in 0..HOURS_PER_DAY {
        let Some(key) = clock.slot_key(day, hour)? else {
            slots.push(Slot::skipped(hour));
            continue;
        };
        let persisted = match store.get(key) {
            Ok(text) => text.filter(|t| !t.trim().is_empty()),
            Err(err) => {
                warn!("event=agenda_read status=degraded key={} error={}", key, err);
                warnings.push(Warning {
                    key,
                    message: format!("could not read note: {}", err),
                });
                None
            }
        };
        slots.push(Slot::new(key, hour, persisted));
    }
    Ok(DayAgenda {
        day,
        slots,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::fakes::SpringForward;
    use crate::clock::ZonedClock;
    use crate::slot::SlotState;
    use crate::store::fakes::BrokenStore;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_store_gives_24_empty_slots() {
        let clock = ZonedClock::new(Utc, day(2024, 3, 15));
        let agenda = build_day_agenda(day(2024, 3, 15), &clock, &MemoryStore::new()).unwrap();
        assert_eq!(agenda.slots.len(), 24);
        assert!(agenda.slots.iter().all(|s| s.state() == SlotState::Empty));
        assert_eq!(
            agenda.slots.iter().map(|s| s.hour).collect::<Vec<_>>(),
            (0..24).collect::<Vec<_>>()
        );
        assert!(agenda.warnings.is_empty());
    }

    #[test]
    fn slots_bind_to_stored_text() {
        let clock = ZonedClock::new(Utc, day(2024, 3, 15));
        let mut store = MemoryStore::new();
        let key = clock.hour_key(day(2024, 3, 15), 9).unwrap();
        store.set(key, "Call").unwrap();
        let agenda = build_day_agenda(day(2024, 3, 15), &clock, &store).unwrap();
        let slot = agenda.slot(9).unwrap();
        assert_eq!(slot.key, Some(key));
        assert_eq!(slot.persisted, "Call");
        assert_eq!(slot.displayed, "Call");
        assert_eq!(slot.state(), SlotState::SavedFilled);
        assert_eq!(agenda.slot_by_key(key).map(|s| s.hour), Some(9));
        assert!(agenda.has_notes());
    }

    #[test]
    fn unreadable_store_degrades_to_empty_slots() {
        let clock = ZonedClock::new(Utc, day(2024, 3, 15));
        let agenda = build_day_agenda(day(2024, 3, 15), &clock, &BrokenStore).unwrap();
        assert_eq!(agenda.slots.len(), 24);
        assert!(!agenda.has_notes());
        assert_eq!(agenda.warnings.len(), 24);
    }

    #[test]
    fn spring_forward_day_keeps_24_slots_with_distinct_keys() {
        let clock = ZonedClock::new(SpringForward, day(2024, 3, 10));
        let agenda = build_day_agenda(day(2024, 3, 10), &clock, &MemoryStore::new()).unwrap();
        assert_eq!(agenda.slots.len(), 24);
        assert!(agenda.slot(2).unwrap().is_skipped());
        let mut keys = agenda.slots.iter().filter_map(|s| s.key).collect::<Vec<_>>();
        keys.dedup();
        assert_eq!(keys.len(), 23);
    }
}
