use anyhow::Result;

use crate::app::{App, Scheduled};
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, limit: Option<usize>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let scheduled = app.build_schedule()?;
    let shown = limit.unwrap_or(scheduled.order.len());

    match format {
        OutputFormat::Json => {
            let output = plan_json(&scheduled, shown);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::render_deck_table(&scheduled.decks, use_color));

            if scheduled.order.is_empty() {
                println!("\nNo matching cards were found in the specified decks.");
                return Ok(());
            }

            println!();
            println!("{:>6}  {:<20}  Deck", "Pos", "Card");
            for placement in scheduled.order.iter().take(shown) {
                println!(
                    "{:>6}  {:<20}  {}",
                    placement.rank + 1,
                    placement.item,
                    scheduled.deck_name(placement.stream)
                );
            }
            if shown < scheduled.order.len() {
                let rest = format!("... {} more", scheduled.order.len() - shown);
                println!("{}", terminal::dim(&rest, use_color));
            }

            let footer = format!(
                "\n{} cards total, max lag {:.3}",
                scheduled.order.len(),
                scheduled.order.max_lag()
            );
            println!("{}", terminal::dim(&footer, use_color));
        }
    }

    Ok(())
}

/// JSON summary of a schedule, listing the first `shown` placements
fn plan_json(scheduled: &Scheduled, shown: usize) -> serde_json::Value {
    let decks: Vec<serde_json::Value> = scheduled
        .decks
        .iter()
        .map(|d| {
            serde_json::json!({
                "name": d.name,
                "count": d.count,
            })
        })
        .collect();
    let order: Vec<serde_json::Value> = scheduled
        .order
        .iter()
        .take(shown)
        .map(|p| {
            serde_json::json!({
                "card": p.item,
                "rank": p.rank,
                "deck": scheduled.deck_name(p.stream),
            })
        })
        .collect();

    serde_json::json!({
        "total": scheduled.order.len(),
        "maxLag": scheduled.order.max_lag(),
        "decks": decks,
        "order": order,
    })
}
