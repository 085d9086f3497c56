use std::collections::{HashMap, HashSet};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use super::models::{AnkiRequest, AnkiResponse, CardId, CardInfo, NoteId};

/// Cards per `cardsInfo` request
const CARDS_INFO_BATCH: usize = 500;

/// Blocking client for the AnkiConnect add-on
pub struct AnkiClient {
    client: Client,
    url: String,
}

#[derive(Error, Debug)]
pub enum AnkiError {
    #[error("Failed to connect to AnkiConnect at {url}. Is Anki open? ({source})")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AnkiConnect returned HTTP {status}")]
    Status { status: u16 },
    #[error("AnkiConnect API error on action '{action}': {message}")]
    Api { action: String, message: String },
    #[error("Unexpected result for action '{action}': {source}")]
    Decode {
        action: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Deck(s) not found in Anki: {}. Deck names must match exactly.", .0.join(", "))]
    MissingDecks(Vec<String>),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, AnkiError>;

/// Unwrap an AnkiConnect response envelope into the action's result
pub fn decode_response<R: DeserializeOwned>(action: &str, response: AnkiResponse) -> Result<R> {
    if let Some(message) = response.error {
        return Err(AnkiError::Api {
            action: action.to_string(),
            message,
        });
    }

    serde_json::from_value(response.result).map_err(|source| AnkiError::Decode {
        action: action.to_string(),
        source,
    })
}

/// Parameters for `setSpecificValueOfCard` writing a due position
pub fn set_due_params(card: CardId, position: usize) -> Value {
    json!({
        "card": card,
        "keys": ["due"],
        "newValues": [position],
    })
}

impl AnkiClient {
    /// Create a client for the given endpoint
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = url.trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AnkiError::InvalidUrl(format!(
                "'{}' must start with http:// or https://",
                url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call one AnkiConnect action and decode its result
    pub fn invoke<R: DeserializeOwned>(&self, action: &str, params: Value) -> Result<R> {
        let request = AnkiRequest::new(action, params);
        log::debug!("AnkiConnect -> {}", action);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(|source| AnkiError::Connect {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnkiError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: AnkiResponse = response.json()?;
        decode_response(action, envelope)
    }

    /// API version reported by the add-on
    pub fn version(&self) -> Result<u32> {
        self.invoke("version", json!({}))
    }

    pub fn deck_names(&self) -> Result<Vec<String>> {
        self.invoke("deckNames", json!({}))
    }

    /// Fail with every missing name if any deck does not exist
    pub fn ensure_decks_exist(&self, decks: &[String]) -> Result<()> {
        let known: HashSet<String> = self.deck_names()?.into_iter().collect();
        let missing: Vec<String> = decks
            .iter()
            .filter(|name| !known.contains(*name))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AnkiError::MissingDecks(missing))
        }
    }

    /// Card ids matching a search, in no particular order
    pub fn find_cards(&self, query: &str) -> Result<Vec<CardId>> {
        self.invoke("findCards", json!({ "query": query }))
    }

    pub fn cards_info(&self, cards: &[CardId]) -> Result<Vec<CardInfo>> {
        self.invoke("cardsInfo", json!({ "cards": cards }))
    }

    /// `cardsInfo` for any number of cards, fetched in batches
    pub fn cards_info_batched(&self, cards: &[CardId]) -> Result<Vec<CardInfo>> {
        let mut infos = Vec::with_capacity(cards.len());
        for batch in cards.chunks(CARDS_INFO_BATCH) {
            infos.extend(self.cards_info(batch)?);
        }
        Ok(infos)
    }

    /// Owning note of every card
    pub fn card_notes(&self, cards: &[CardId]) -> Result<HashMap<CardId, NoteId>> {
        Ok(self
            .cards_info_batched(cards)?
            .into_iter()
            .map(|info| (info.card_id, info.note))
            .collect())
    }

    /// Write a new-card due position
    pub fn set_due(&self, card: CardId, position: usize) -> Result<()> {
        let written: Vec<bool> =
            self.invoke("setSpecificValueOfCard", set_due_params(card, position))?;

        if written.iter().all(|ok| *ok) {
            Ok(())
        } else {
            Err(AnkiError::Api {
                action: "setSpecificValueOfCard".to_string(),
                message: format!("due was not written for card {}", card),
            })
        }
    }

    pub fn update_note_field(&self, note: NoteId, field: &str, value: &str) -> Result<()> {
        self.invoke(
            "updateNoteFields",
            json!({
                "note": {
                    "id": note,
                    "fields": { field: value },
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(result: Value, error: Option<&str>) -> AnkiResponse {
        AnkiResponse {
            result,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_decode_result() {
        let cards: Vec<CardId> = decode_response("findCards", envelope(json!([3, 1, 2]), None)).unwrap();
        assert_eq!(cards, vec![3, 1, 2]);
    }

    #[test]
    fn test_decode_null_as_unit() {
        let result: Result<()> = decode_response("updateNoteFields", envelope(Value::Null, None));
        assert!(result.is_ok());
    }

    #[test]
    fn test_api_error_wins_over_result() {
        let err = decode_response::<Vec<CardId>>("findCards", envelope(Value::Null, Some("bad query")))
            .unwrap_err();

        assert!(matches!(err, AnkiError::Api { ref action, ref message }
            if action == "findCards" && message == "bad query"));
        assert_eq!(err.to_string(), "AnkiConnect API error on action 'findCards': bad query");
    }

    #[test]
    fn test_decode_wrong_shape() {
        let err = decode_response::<Vec<CardId>>("findCards", envelope(json!("nope"), None)).unwrap_err();
        assert!(matches!(err, AnkiError::Decode { .. }));
    }

    #[test]
    fn test_set_due_params() {
        assert_eq!(
            set_due_params(1498938915662, 7),
            json!({
                "card": 1498938915662_i64,
                "keys": ["due"],
                "newValues": [7],
            })
        );
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = AnkiClient::new("localhost:8765", Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, AnkiError::InvalidUrl(_)));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let client = AnkiClient::new("http://127.0.0.1:8765/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:8765");
    }

    #[test]
    fn test_missing_decks_message() {
        let err = AnkiError::MissingDecks(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            err.to_string(),
            "Deck(s) not found in Anki: a, b. Deck names must match exactly."
        );
    }
}
