use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let names = app.deck_names()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        OutputFormat::Plain => {
            if names.is_empty() {
                println!("No decks found.");
                return Ok(());
            }
            for name in &names {
                let selected = if app.config.decks.contains(name) { "* " } else { "  " };
                println!("{}{}", selected, name);
            }
            println!("\n{} decks total", names.len());
        }
    }

    Ok(())
}
