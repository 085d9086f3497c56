mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use deckweave_lib::config::{ApplyMode, Overrides};

#[derive(Parser)]
#[command(
    name = "deckweave-cli",
    about = "Interleave new cards from several Anki decks in proportion to deck size",
    version
)]
struct Cli {
    /// Config file (default: <config dir>/deckweave/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// AnkiConnect URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(clap::Args, Debug, Default)]
struct SelectionArgs {
    /// Deck to include (repeatable, order sets tie-breaks; replaces the configured list)
    #[arg(long = "deck")]
    decks: Vec<String>,

    /// Search terms added to each deck query (default: "is:new")
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List deck names known to Anki
    Decks,

    /// Compute the interleaved order without writing anything
    Plan {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Only print the first N placements
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Compute the interleaved order and write it to Anki
    Apply {
        #[command(flatten)]
        selection: SelectionArgs,
        /// How ranks are written
        #[arg(long)]
        mode: Option<ApplyMode>,
        /// Note field receiving the rank (field mode)
        #[arg(long)]
        field: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();

    let overrides = |selection: SelectionArgs, mode: Option<ApplyMode>, field: Option<String>| Overrides {
        url: cli.url.clone(),
        decks: selection.decks,
        filter: selection.filter,
        mode,
        field,
    };

    match cli.command {
        Command::Decks => {
            let app = app::App::new(cli.config.as_deref(), overrides(SelectionArgs::default(), None, None))?;
            commands::decks::run(&app, &cli.format)?;
        }
        Command::Plan { selection, limit } => {
            let app = app::App::new(cli.config.as_deref(), overrides(selection, None, None))?;
            commands::plan::run(&app, limit, &cli.format, use_color)?;
        }
        Command::Apply { selection, mode, field } => {
            let app = app::App::new(cli.config.as_deref(), overrides(selection, mode, field))?;
            commands::apply::run(&app, &cli.format, use_color)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_arguments() {
        let cli = Cli::try_parse_from([
            "deckweave-cli",
            "apply",
            "--deck",
            "Vocab",
            "--deck",
            "Kanji",
            "--mode",
            "field",
            "--field",
            "Rank",
        ])
        .unwrap();

        match cli.command {
            Command::Apply { selection, mode, field } => {
                assert_eq!(selection.decks, vec!["Vocab", "Kanji"]);
                assert_eq!(mode, Some(ApplyMode::Field));
                assert_eq!(field.as_deref(), Some("Rank"));
            }
            _ => panic!("expected apply"),
        }
    }
}
