//! AnkiConnect wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// AnkiConnect API version spoken by this client
pub const API_VERSION: u32 = 6;

/// Default AnkiConnect endpoint
pub const DEFAULT_URL: &str = "http://127.0.0.1:8765";

/// Default search filter for the cards being interleaved
pub const DEFAULT_FILTER: &str = "is:new";

pub type CardId = i64;
pub type NoteId = i64;

/// Request envelope: `{ "action", "version", "params" }`
#[derive(Debug, Clone, Serialize)]
pub struct AnkiRequest<'a> {
    pub action: &'a str,
    pub version: u32,
    pub params: Value,
}

impl<'a> AnkiRequest<'a> {
    pub fn new(action: &'a str, params: Value) -> Self {
        Self {
            action,
            version: API_VERSION,
            params,
        }
    }
}

/// Response envelope: exactly one of `result` / `error` is meaningful
#[derive(Debug, Clone, Deserialize)]
pub struct AnkiResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// Subset of `cardsInfo` output used for ordering and repositioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    pub card_id: CardId,
    /// Owning note
    pub note: NoteId,
    /// New-card position for new cards
    #[serde(default)]
    pub due: i64,
}

/// Card ids in the collection's new-card order: by `due`, then by id
pub fn order_by_due(mut cards: Vec<CardInfo>) -> Vec<CardId> {
    cards.sort_by_key(|c| (c.due, c.card_id));
    cards.into_iter().map(|c| c.card_id).collect()
}

/// Search query selecting the cards of one deck.
///
/// Double quotes in the deck name are escaped so the name stays a single
/// quoted term.
pub fn deck_query(deck: &str, filter: &str) -> String {
    let escaped = deck.replace('"', "\\\"");
    let filter = filter.trim();
    if filter.is_empty() {
        format!("deck:\"{}\"", escaped)
    } else {
        format!("deck:\"{}\" {}", escaped, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_envelope() {
        let request = AnkiRequest::new("findCards", json!({ "query": "deck:\"a\"" }));
        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(
            encoded,
            json!({
                "action": "findCards",
                "version": 6,
                "params": { "query": "deck:\"a\"" },
            })
        );
    }

    #[test]
    fn test_response_with_error() {
        let response: AnkiResponse =
            serde_json::from_str(r#"{"result": null, "error": "collection is not available"}"#).unwrap();

        assert!(response.result.is_null());
        assert_eq!(response.error.as_deref(), Some("collection is not available"));
    }

    #[test]
    fn test_cards_info_decodes() {
        let raw = r#"[{"cardId": 1498938915662, "note": 1502098034045, "deckName": "Default",
                       "due": 12, "fields": {}, "interval": 0}]"#;
        let cards: Vec<CardInfo> = serde_json::from_str(raw).unwrap();

        assert_eq!(cards[0].card_id, 1498938915662);
        assert_eq!(cards[0].note, 1502098034045);
        assert_eq!(cards[0].due, 12);
    }

    #[test]
    fn test_order_by_due() {
        let card = |card_id, due| CardInfo { card_id, note: 1, due };
        let cards = vec![card(30, 7), card(10, 9), card(20, 7), card(40, 1)];

        assert_eq!(order_by_due(cards), vec![40, 20, 30, 10]);
    }

    #[test]
    fn test_deck_query() {
        assert_eq!(deck_query("Japanese::Vocab", "is:new"), "deck:\"Japanese::Vocab\" is:new");
        assert_eq!(deck_query("say \"hi\"", ""), "deck:\"say \\\"hi\\\"\"");
    }
}
