//! Styling helpers for terminal output.
//!
//! The [`GameStyle`] trait provides a set of convenience methods for applying
//! ANSI styling via the `colored` crate. Implementations for `&str` and
//! `String` are provided so string literals can be styled directly.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to text output.
pub trait GameStyle {
    fn room_style(&self) -> ColoredString;
    fn item_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn heading_style(&self) -> ColoredString;
    fn notice_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn room_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10)
    }
    fn item_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
    fn prompt_style(&self) -> ColoredString {
        self.truecolor(110, 220, 110)
    }
    fn heading_style(&self) -> ColoredString {
        self.bold().bright_yellow()
    }
    fn notice_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
}

impl GameStyle for String {
    fn room_style(&self) -> ColoredString {
        self.as_str().room_style()
    }
    fn item_style(&self) -> ColoredString {
        self.as_str().item_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn heading_style(&self) -> ColoredString {
        self.as_str().heading_style()
    }
    fn notice_style(&self) -> ColoredString {
        self.as_str().notice_style()
    }
}
