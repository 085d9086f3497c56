//! AnkiConnect access
//!
//! This module provides:
//! - A blocking JSON client for the AnkiConnect add-on
//! - Wire types for the actions deckweave uses
//! - Gathering per-deck card streams for the scheduler

pub mod client;
pub mod models;

pub use client::{AnkiClient, AnkiError};
pub use models::*;

use std::collections::HashSet;

use crate::interleave::Stream;

/// Source of ordered card ids per deck
pub trait DeckCatalog {
    /// Cards of `deck` matching `filter`, in the deck's natural order
    fn deck_cards(&self, deck: &str, filter: &str) -> client::Result<Vec<CardId>>;
}

impl DeckCatalog for AnkiClient {
    fn deck_cards(&self, deck: &str, filter: &str) -> client::Result<Vec<CardId>> {
        let ids = self.find_cards(&deck_query(deck, filter))?;
        Ok(order_by_due(self.cards_info_batched(&ids)?))
    }
}

/// One stream per deck, in the order the decks were given.
///
/// A deck search also matches its subdecks, so a card can turn up under more
/// than one configured deck. Each card stays in the first deck that claims it.
pub fn collect_streams<C: DeckCatalog + ?Sized>(
    catalog: &C,
    decks: &[String],
    filter: &str,
) -> client::Result<Vec<Stream<CardId>>> {
    let mut claimed = HashSet::new();
    let mut streams = Vec::with_capacity(decks.len());
    for deck in decks {
        let found = catalog.deck_cards(deck, filter)?;
        let found_count = found.len();
        let cards: Vec<CardId> = found
            .into_iter()
            .filter(|card| claimed.insert(*card))
            .collect();

        if cards.len() < found_count {
            log::warn!(
                "Deck '{}': skipping {} cards already taken by an earlier deck",
                deck,
                found_count - cards.len()
            );
        }
        log::info!("Deck '{}': found {} cards matching '{}'", deck, cards.len(), filter);
        streams.push(Stream::new(deck.clone(), cards));
    }
    Ok(streams)
}
