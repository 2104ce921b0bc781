//! Terminal styling and layout helpers

use owo_colors::{OwoColorize, colors::css};

/// Whether stdout accepts ANSI colours
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Terminal width in columns, if stdout is a terminal
pub fn width() -> Option<usize> {
    terminal_size::terminal_size().map(|(w, _)| usize::from(w.0))
}

/// Whether the terminal is too narrow for tabular output (< 80 columns)
pub fn is_narrow() -> bool {
    width().is_some_and(|w| w < 80)
}

/// Shortens `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Extension trait for styling output
pub trait Colorize {
    /// Green
    fn success(&self) -> String;
    /// Orange
    fn warning(&self) -> String;
    /// Bold, for course codes and headings
    fn emphasis(&self) -> String;
    /// Dimmed
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), |s| s.fg::<css::Green>().to_string())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), |s| s.fg::<css::Orange>().to_string())
    }

    fn emphasis(&self) -> String {
        paint(self.as_ref(), |s| s.bold().to_string())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), |s| s.dimmed().to_string())
    }
}

fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if supports_color() {
        style(text)
    } else {
        text.to_string()
    }
}
