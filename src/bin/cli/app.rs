use std::path::Path;

use anyhow::{Context, Result};

use deckweave_lib::anki::{self, AnkiClient, CardId};
use deckweave_lib::config::{Config, Overrides};
use deckweave_lib::interleave::{self, GlobalOrder};

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub client: AnkiClient,
}

/// Card count of one scheduled deck
pub struct DeckSummary {
    pub name: String,
    pub count: usize,
}

/// Result of gathering the configured decks and interleaving them
pub struct Scheduled {
    pub decks: Vec<DeckSummary>,
    pub order: GlobalOrder<CardId>,
}

impl Scheduled {
    pub fn deck_name(&self, stream: usize) -> &str {
        self.decks.get(stream).map_or("?", |d| d.name.as_str())
    }
}

impl App {
    /// Load config (explicit path or default location) and connect settings
    pub fn new(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => {
                let path = Config::default_path().context("Failed to locate config file")?;
                Config::load(&path)?
            }
        }
        .with_overrides(overrides);

        let client = AnkiClient::new(&config.url, config.timeout())
            .context("Failed to create AnkiConnect client")?;

        Ok(Self { config, client })
    }

    pub fn deck_names(&self) -> Result<Vec<String>> {
        let mut names = self.client.deck_names().context("Failed to list decks")?;
        names.sort();
        Ok(names)
    }

    /// Fetch every configured deck's cards and compute the global order
    pub fn build_schedule(&self) -> Result<Scheduled> {
        self.config.validate()?;

        log::info!("Checking that {} deck(s) exist", self.config.decks.len());
        self.client.ensure_decks_exist(&self.config.decks)?;

        let streams = anki::collect_streams(&self.client, &self.config.decks, &self.config.filter)
            .context("Failed to fetch deck cards")?;
        let decks = streams
            .iter()
            .map(|s| DeckSummary {
                name: s.name.clone(),
                count: s.items.len(),
            })
            .collect();

        let order = interleave::schedule(streams)?;
        log::info!("Computed global order over {} cards", order.len());

        Ok(Scheduled { decks, order })
    }
}
