//! Core types for deal-reveal.
//!
//! These are the records that arrive from the data load cycle and flow
//! read-only through the reveal engine to the view layer.

use serde::{Deserialize, Serialize};

/// Milliseconds as reported by a [`Clock`](crate::engine::Clock).
///
/// Fractional so a monotonic source can keep sub-millisecond precision.
pub type Millis = f64;

// =============================================================================
// Badges
// =============================================================================

/// How a badge's sub-text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    /// Static text such as "减10".
    #[default]
    Normal,
    /// Sub-text is a "H:MM:SS" duration that counts down once per second.
    Countdown,
    /// Any kind this crate does not know about renders like `Normal`.
    #[serde(other)]
    Unknown,
}

impl BadgeKind {
    /// Whether the sub-text drives a live countdown.
    pub fn is_countdown(self) -> bool {
        matches!(self, BadgeKind::Countdown)
    }
}

/// A corner badge on a deal card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_text: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: BadgeKind,
}

impl BadgeItem {
    /// Label shown on the card.
    ///
    /// `sub_text` overrides the stored sub-text; countdown badges pass their
    /// live display string here.
    pub fn label(&self, sub_text: Option<&str>) -> String {
        match sub_text.or(self.sub_text.as_deref()) {
            Some(sub) if !sub.is_empty() => format!("{} {}", self.text, sub),
            _ => self.text.clone(),
        }
    }
}

// =============================================================================
// Deals
// =============================================================================

/// One purchasable deal. Order inside a collection defines disclosure order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    pub deal_id: String,
    #[serde(default)]
    pub deal_image: String,
    #[serde(default)]
    pub badges: Vec<BadgeItem>,
    pub deal_title: String,
    pub price: f64,
    pub original_price: f64,
    #[serde(default)]
    pub button_text: String,
}

impl DealRecord {
    /// The badge a card displays. Only the first one is shown.
    pub fn primary_badge(&self) -> Option<&BadgeItem> {
        self.badges.first()
    }
}

/// Restaurant header data. Served by the same backend as the deals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInfo {
    pub restaurant_id: String,
    pub restaurant_name: String,
    #[serde(default)]
    pub restaurant_cover: String,
    pub rating: f64,
    #[serde(default)]
    pub rating_text: String,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_decodes_from_camel_case() {
        let json = r#"{
            "dealId": "7",
            "dealImage": "/static/image/food.png",
            "badges": [{ "text": "限时", "subText": "0:10:00", "type": "countdown" }],
            "dealTitle": "双人套餐",
            "price": 168,
            "originalPrice": 298,
            "buttonText": "抢购"
        }"#;
        let deal: DealRecord = serde_json::from_str(json).unwrap();
        assert_eq!(deal.deal_id, "7");
        assert_eq!(deal.original_price, 298.0);
        let badge = deal.primary_badge().unwrap();
        assert!(badge.kind.is_countdown());
        assert_eq!(badge.sub_text.as_deref(), Some("0:10:00"));
    }

    #[test]
    fn test_unknown_badge_kind_is_tolerated() {
        let badge: BadgeItem =
            serde_json::from_str(r#"{ "text": "新品", "type": "sparkle" }"#).unwrap();
        assert_eq!(badge.kind, BadgeKind::Unknown);
        assert!(!badge.kind.is_countdown());

        let plain: BadgeItem = serde_json::from_str(r#"{ "text": "新品" }"#).unwrap();
        assert_eq!(plain.kind, BadgeKind::Normal);
    }

    #[test]
    fn test_badge_label() {
        let badge = BadgeItem {
            text: "特惠补贴".into(),
            sub_text: Some("减10".into()),
            kind: BadgeKind::Normal,
        };
        assert_eq!(badge.label(None), "特惠补贴 减10");
        assert_eq!(badge.label(Some("00:00:09")), "特惠补贴 00:00:09");

        let bare = BadgeItem {
            text: "热卖".into(),
            sub_text: None,
            kind: BadgeKind::Normal,
        };
        assert_eq!(bare.label(None), "热卖");
    }
}
