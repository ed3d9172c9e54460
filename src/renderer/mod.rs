//! Terminal renderer for a deal list.
//!
//! - [`card`] - Card text layout (display-width aware truncation)
//! - [`list`] - Full-repaint list renderer over `crossterm` commands

pub mod card;
pub mod list;

pub use card::{card_lines, price_line, truncate_to_width, CARD_LINES, PLACEHOLDER_IMAGE};
pub use list::{Frame, ListRenderer, CARD_ROWS, FOOTER_ROWS};
