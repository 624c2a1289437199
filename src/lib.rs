pub mod agenda;
pub mod clock;
pub mod controller;
pub mod grid;
pub mod model;
pub mod range;
pub mod sample;
pub mod slot;
pub mod store;

pub use controller::CalendarState;
pub use model::{CalendarError, NoteKey, StoreError};
