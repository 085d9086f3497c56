//! Translating a global order into writes against Anki
//!
//! Two write strategies:
//! - position: every card gets due position `rank + 1`
//! - field: every note gets its lowest card rank, zero-padded, in a text field
//!
//! Every update is idempotent, so a plan that failed part-way can be applied
//! again from the start.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anki::{AnkiClient, AnkiError, CardId, NoteId};
use crate::interleave::GlobalOrder;

#[derive(Error, Debug)]
pub enum RepositionError {
    #[error("No note found for card {0}")]
    UnknownCard(CardId),

    #[error("Stopped after {applied} of {total} updates: {source}")]
    Interrupted {
        applied: usize,
        total: usize,
        #[source]
        source: AnkiError,
    },
}

pub type Result<T> = std::result::Result<T, RepositionError>;

/// A single write against the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Update {
    /// New-card due position (1-based)
    Position { card: CardId, position: usize },
    /// Rank text written into a note field
    Field {
        note: NoteId,
        field: String,
        value: String,
    },
}

/// Write side of the collection
pub trait CardMutator {
    fn set_position(&self, card: CardId, position: usize) -> crate::anki::client::Result<()>;
    fn set_note_field(&self, note: NoteId, field: &str, value: &str) -> crate::anki::client::Result<()>;
}

impl CardMutator for AnkiClient {
    fn set_position(&self, card: CardId, position: usize) -> crate::anki::client::Result<()> {
        self.set_due(card, position)
    }

    fn set_note_field(&self, note: NoteId, field: &str, value: &str) -> crate::anki::client::Result<()> {
        self.update_note_field(note, field, value)
    }
}

/// Digits needed to print every rank below `total` at the same width
pub fn rank_width(total: usize) -> usize {
    total.saturating_sub(1).to_string().len()
}

/// Zero-padded rank text; sorts as text in the same order as the numbers
pub fn encode_rank(rank: usize, width: usize) -> String {
    format!("{:0width$}", rank, width = width)
}

/// One position write per card
pub fn position_plan(order: &GlobalOrder<CardId>) -> Vec<Update> {
    order
        .iter()
        .map(|p| Update::Position {
            card: p.item,
            position: p.rank + 1,
        })
        .collect()
}

/// One field write per note, carrying the lowest rank among the note's cards
pub fn field_plan(
    order: &GlobalOrder<CardId>,
    note_of: &HashMap<CardId, NoteId>,
    field: &str,
) -> Result<Vec<Update>> {
    let width = rank_width(order.len());
    let mut seen = HashSet::new();
    let mut plan = Vec::new();

    // Placements are in rank order, so a note's first card has its lowest rank
    for placement in order.iter() {
        let note = *note_of
            .get(&placement.item)
            .ok_or(RepositionError::UnknownCard(placement.item))?;
        if seen.insert(note) {
            plan.push(Update::Field {
                note,
                field: field.to_string(),
                value: encode_rank(placement.rank, width),
            });
        }
    }

    Ok(plan)
}

/// Run a plan in order, stopping at the first failure.
///
/// `progress` is called after each successful update with `(done, total)`.
pub fn apply<M, F>(plan: &[Update], mutator: &M, mut progress: F) -> Result<usize>
where
    M: CardMutator + ?Sized,
    F: FnMut(usize, usize),
{
    let total = plan.len();

    for (done, update) in plan.iter().enumerate() {
        let outcome = match update {
            Update::Position { card, position } => mutator.set_position(*card, *position),
            Update::Field { note, field, value } => mutator.set_note_field(*note, field, value),
        };

        if let Err(source) = outcome {
            log::warn!("Update {} of {} failed: {}", done + 1, total, source);
            return Err(RepositionError::Interrupted {
                applied: done,
                total,
                source,
            });
        }
        progress(done + 1, total);
    }

    Ok(total)
}
