use std::io::Write;

use owo_colors::OwoColorize;
use studydeck_core::Flashcard;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the one-line summary after a file has been read.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    file_name: &str,
    chars: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "Read {} ({} characters)", file_name.bold(), chars)?;
    } else {
        writeln!(w, "Read {} ({} characters)", file_name, chars)?;
    }
    Ok(())
}

/// Print every card with its position in the deck.
pub fn print_deck(w: &mut dyn Write, cards: &[Flashcard], color: ColorMode) -> std::io::Result<()> {
    if cards.is_empty() {
        writeln!(w, "No flashcards were generated.")?;
        return Ok(());
    }

    let total = cards.len();
    for (i, card) in cards.iter().enumerate() {
        let pos = format!("[{}/{}]", i + 1, total);
        if color.enabled() {
            writeln!(w, "{} {}", pos.bold().yellow(), card.question.bold())?;
            writeln!(w, "      {}", card.answer.green())?;
        } else {
            writeln!(w, "{} {}", pos, card.question)?;
            writeln!(w, "      {}", card.answer)?;
        }
        writeln!(w)?;
    }

    let summary = format!("{} flashcards", total);
    if color.enabled() {
        writeln!(w, "{}", summary.dimmed())?;
    } else {
        writeln!(w, "{}", summary)?;
    }
    Ok(())
}
