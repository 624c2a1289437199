//! Per-hour edit state.
//!
//! A slot pairs the persisted note text with the text currently on screen.
//! Its state is never stored; it is recomputed from those two strings each
//! time it is asked for.

use crate::model::{CalendarError, Note, NoteKey};
use crate::store::NoteStore;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    SavedFilled,
    Dirty,
}

impl SlotState {
    pub fn diff(persisted: &str, displayed: &str) -> SlotState {
        let persisted = persisted.trim();
        let displayed = displayed.trim();
        if displayed.is_empty() && persisted.is_empty() {
            SlotState::Empty
        } else if displayed == persisted {
            SlotState::SavedFilled
        } else {
            SlotState::Dirty
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotState::Empty => "empty",
            SlotState::SavedFilled => "saved",
            SlotState::Dirty => "unsaved",
        }
    }
}

/// Which controls the presentation should offer for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    None,
    SaveCancel,
    Remove,
}

/// Outcome of committing a slot to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Stored,
    Removed,
    Unchanged,
}

impl Commit {
    pub fn touched_store(self) -> bool {
        !matches!(self, Commit::Unchanged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// `None` for an hour the local clock skips. Such a slot stays empty.
    pub key: Option<NoteKey>,
    pub hour: u32,
    pub persisted: String,
    pub displayed: String,
}

impl Slot {
    pub fn new(key: NoteKey, hour: u32, persisted: Option<String>) -> Self {
        let persisted = persisted.unwrap_or_default();
        Slot {
            key: Some(key),
            hour,
            displayed: persisted.clone(),
            persisted,
        }
    }

    pub fn skipped(hour: u32) -> Self {
        Slot {
            key: None,
            hour,
            persisted: String::new(),
            displayed: String::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.key.is_none()
    }

    pub fn state(&self) -> SlotState {
        SlotState::diff(&self.persisted, &self.displayed)
    }

    pub fn has_note(&self) -> bool {
        !self.persisted.trim().is_empty()
    }

    /// Controls for the current state. A slot being edited always offers save/cancel.
    pub fn controls(&self, editing: bool) -> Controls {
        if self.is_skipped() {
            return Controls::None;
        }
        if editing {
            return Controls::SaveCancel;
        }
        match self.state() {
            SlotState::Empty => Controls::None,
            SlotState::SavedFilled => Controls::Remove,
            SlotState::Dirty => Controls::SaveCancel,
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) -> Result<SlotState, CalendarError> {
        if self.is_skipped() {
            return Err(CalendarError::SkippedHour(self.hour));
        }
        self.displayed = text.into();
        Ok(self.state())
    }

    pub fn cancel(&mut self) -> SlotState {
        self.displayed = self.persisted.clone();
        self.state()
    }

    /// Commits the displayed text. Blank text commits as a removal.
    ///
    /// On a store failure the slot is left untouched, so it stays dirty.
    pub fn save<S: NoteStore + ?Sized>(&mut self, store: &mut S) -> Result<Commit, CalendarError> {
        if self.state() != SlotState::Dirty {
            return Ok(Commit::Unchanged);
        }
        let key = self.key.ok_or(CalendarError::SkippedHour(self.hour))?;
        match Note::new(key, &self.displayed) {
            Some(note) => {
                store.set(note.key, &note.text).map_err(|err| {
                    warn!("event=slot_save status=error key={} error={}", key, err);
                    CalendarError::from(err)
                })?;
                debug!("event=slot_save status=ok key={}", key);
                self.persisted = note.text.clone();
                self.displayed = note.text;
                Ok(Commit::Stored)
            }
            None => {
                self.remove_from(key, store)?;
                Ok(Commit::Removed)
            }
        }
    }

    /// Removes a saved note. Only valid while the slot shows exactly what is stored.
    pub fn remove<S: NoteStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<Commit, CalendarError> {
        let key = self.key.ok_or(CalendarError::SkippedHour(self.hour))?;
        if self.state() != SlotState::SavedFilled {
            return Err(CalendarError::NothingToRemove(key));
        }
        self.remove_from(key, store)?;
        Ok(Commit::Removed)
    }

    fn remove_from<S: NoteStore + ?Sized>(
        &mut self,
        key: NoteKey,
        store: &mut S,
    ) -> Result<(), CalendarError> {
        store.remove(key).map_err(|err| {
            warn!("event=slot_remove status=error key={} error={}", key, err);
            CalendarError::from(err)
        })?;
        debug!("event=slot_remove status=ok key={}", key);
        self.persisted.clear();
        self.displayed.clear();
        Ok(())
    }
}
