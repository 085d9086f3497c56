//! deckweave: spread the new cards of several Anki decks across one study
//! queue, each deck in proportion to its size.

pub mod anki;
pub mod config;
pub mod interleave;
pub mod reposition;

pub use config::{ApplyMode, Config};
pub use interleave::{schedule, GlobalOrder, Placement, ScheduleError, Stream};
