use anyhow::{Context, Result};

use deckweave_lib::config::ApplyMode;
use deckweave_lib::reposition::{self, Update};

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let scheduled = app.build_schedule()?;

    if scheduled.order.is_empty() {
        match format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "total": 0, "updated": 0 })),
            OutputFormat::Plain => println!("No matching cards were found in the specified decks."),
        }
        return Ok(());
    }

    if matches!(format, OutputFormat::Plain) {
        println!("{}\n", terminal::render_deck_table(&scheduled.decks, use_color));
    }

    let plan: Vec<Update> = match app.config.mode {
        ApplyMode::Position => reposition::position_plan(&scheduled.order),
        ApplyMode::Field => {
            let field = app.config.field.as_deref().context("No field configured")?;
            let cards: Vec<_> = scheduled.order.items().copied().collect();
            let notes = app.client.card_notes(&cards).context("Failed to look up notes")?;
            reposition::field_plan(&scheduled.order, &notes, field)?
        }
    };

    log::info!(
        "Writing {} updates ({:?} mode) for {} cards",
        plan.len(),
        app.config.mode,
        scheduled.order.len()
    );
    let show_progress = matches!(format, OutputFormat::Plain);
    let updated = reposition::apply(&plan, &app.client, |done, total| {
        if show_progress {
            terminal::progress(done, total);
        }
    })?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "total": scheduled.order.len(),
                "updated": updated,
                "mode": app.config.mode,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let message = format!("Repositioned {} cards ({} updates).", scheduled.order.len(), updated);
            println!("{}", terminal::success(&message, use_color));
        }
    }

    Ok(())
}
