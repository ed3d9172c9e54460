//! Deal card text layout.
//!
//! A card is a fixed block of [`CARD_LINES`] lines so the list renderer can
//! compute how many cards fit without measuring each one.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::platform::PlatformContext;
use crate::types::DealRecord;

/// Lines per card, not counting the separator row.
pub const CARD_LINES: usize = 4;

/// Placeholder shown when a deal image cannot be resolved.
pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder.png";

/// Truncate to `width` display cells, ending in `…` when shortened.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if text.width() <= width {
        return text.to_string();
    }

    let target = width - 1;
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > target {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Price line: `¥price  ¥original  [button]`.
pub fn price_line(deal: &DealRecord) -> String {
    let mut line = format!("¥{}  ¥{}", deal.price, deal.original_price);
    if !deal.button_text.is_empty() {
        line.push_str("  [");
        line.push_str(&deal.button_text);
        line.push(']');
    }
    line
}

/// Format one card.
///
/// `badge_sub_text` replaces the primary badge's stored sub-text; countdown
/// badges pass their live display here. Every line fits in `width` cells.
pub fn card_lines(
    deal: &DealRecord,
    width: usize,
    badge_sub_text: Option<&str>,
    platform: &PlatformContext,
) -> Vec<String> {
    let badge = deal
        .primary_badge()
        .map(|badge| badge.label(badge_sub_text))
        .unwrap_or_default();
    let image = platform.resolve_asset_url(&deal.deal_image, Some(PLACEHOLDER_IMAGE));

    [deal.deal_title.clone(), price_line(deal), badge, image]
        .iter()
        .map(|line| truncate_to_width(line, width))
        .collect()
}
