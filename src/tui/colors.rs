//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Priority badge colors.

/// Used for low priority.
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for medium priority.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for high priority.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
