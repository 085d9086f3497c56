pub mod apply;
pub mod decks;
pub mod plan;
