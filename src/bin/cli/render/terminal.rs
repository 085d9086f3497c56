use std::io::Write;

use crate::app::DeckSummary;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
}

/// Table of decks with card counts and their share of the total
pub fn render_deck_table(decks: &[DeckSummary], use_color: bool) -> String {
    let total: usize = decks.iter().map(|d| d.count).sum();
    let name_width = decks.iter().map(|d| d.name.len()).max().unwrap_or(4).max(4);

    let mut lines = Vec::new();
    let header = format!("{:<width$}  {:>6}  {:>6}", "Deck", "Cards", "Share", width = name_width);
    if use_color {
        lines.push(format!("{}{}{}", Color::BOLD, header, Color::RESET));
    } else {
        lines.push(header);
    }
    lines.push(format!("{}  {}  {}", "\u{2500}".repeat(name_width), "\u{2500}".repeat(6), "\u{2500}".repeat(6)));

    for deck in decks {
        let share = if total == 0 {
            0.0
        } else {
            deck.count as f64 * 100.0 / total as f64
        };
        lines.push(format!(
            "{:<width$}  {:>6}  {:>5.1}%",
            deck.name,
            deck.count,
            share,
            width = name_width
        ));
    }

    lines.join("\n")
}

/// Overwrite the current stderr line with a progress counter
pub fn progress(done: usize, total: usize) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r  Progress: {}/{}", done, total);
    if done == total {
        let _ = writeln!(stderr);
    }
    let _ = stderr.flush();
}

pub fn success(message: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", Color::GREEN, message, Color::RESET)
    } else {
        message.to_string()
    }
}

pub fn dim(message: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", Color::DIM, message, Color::RESET)
    } else {
        message.to_string()
    }
}
