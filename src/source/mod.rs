//! Deal sources - the upstream response format and an in-memory backend.
//!
//! Every upstream response is wrapped in the same envelope:
//!
//! ```json
//! { "code": 200, "data": [ ... ], "message": "success" }
//! ```
//!
//! A code other than 200 is a rejection. A blank body or `"data": null`
//! means the data is unavailable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::pipeline::DealSource;
use crate::types::{DealRecord, RestaurantInfo};

/// Business code for success.
pub const CODE_OK: i64 = 200;

/// Response wrapper used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            data: Some(data),
            message: "success".to_string(),
        }
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            message: message.into(),
        }
    }
}

/// Decode an envelope and return its payload.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, LoadError> {
    if body.trim().is_empty() {
        return Err(LoadError::unavailable("empty response body"));
    }

    let envelope: Envelope<T> = serde_json::from_str(body)?;
    if envelope.code != CODE_OK {
        let message = if envelope.message.is_empty() {
            "request failed".to_string()
        } else {
            envelope.message
        };
        return Err(LoadError::Rejected {
            code: envelope.code,
            message,
        });
    }

    envelope
        .data
        .ok_or_else(|| LoadError::unavailable("response carried no data"))
}

/// Decode a `/api/deals` response.
pub fn decode_deals_response(body: &str) -> Result<Vec<DealRecord>, LoadError> {
    decode_envelope(body)
}

/// Decode a `/api/shops` response.
pub fn decode_shops_response(body: &str) -> Result<Vec<RestaurantInfo>, LoadError> {
    decode_envelope(body)
}

// =============================================================================
// StaticDealSource
// =============================================================================

/// In-memory stand-in for the deals backend.
///
/// Every deal belongs to a single restaurant. Requests go through the same
/// envelope encoding a network response would.
#[derive(Debug, Clone)]
pub struct StaticDealSource {
    restaurant_id: String,
    deals: Vec<DealRecord>,
}

impl StaticDealSource {
    pub fn new(restaurant_id: impl Into<String>, deals: Vec<DealRecord>) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            deals,
        }
    }

    /// Load deals from a JSON array of deal records.
    pub fn from_json(restaurant_id: impl Into<String>, json: &str) -> Result<Self, LoadError> {
        let deals = serde_json::from_str(json)?;
        Ok(Self::new(restaurant_id, deals))
    }

    /// The encoded response for a deals request.
    pub fn respond(&self, restaurant_id: &str) -> String {
        let envelope = if restaurant_id.is_empty() {
            Envelope::error(400, "restaurantId must not be empty")
        } else if restaurant_id == self.restaurant_id {
            Envelope::ok(self.deals.clone())
        } else {
            Envelope::ok(Vec::new())
        };
        // Serializing plain records cannot fail; fall back to a 500 envelope.
        serde_json::to_string(&envelope).unwrap_or_else(|err| {
            format!(r#"{{"code":500,"data":null,"message":"{err}"}}"#)
        })
    }
}

impl DealSource for StaticDealSource {
    fn fetch_deals(&self, restaurant_id: &str) -> Result<Vec<DealRecord>, LoadError> {
        decode_deals_response(&self.respond(restaurant_id))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"[
        { "dealId": "1", "dealTitle": "椒麻鸡", "price": 168, "originalPrice": 298 },
        { "dealId": "2", "dealTitle": "柠檬茶", "price": 18, "originalPrice": 25 }
    ]"#;

    #[test]
    fn test_decode_ok() {
        let body = r#"{ "code": 200, "data": [], "message": "success" }"#;
        assert!(decode_deals_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejected() {
        let body = r#"{ "code": 500, "data": null, "message": "boom" }"#;
        let err = decode_deals_response(body).unwrap_err();
        assert!(matches!(err, LoadError::Rejected { code: 500, ref message } if message == "boom"));
    }

    #[test]
    fn test_decode_blank_and_null() {
        assert!(matches!(
            decode_deals_response("  "),
            Err(LoadError::DataUnavailable { .. })
        ));
        assert!(matches!(
            decode_deals_response(r#"{ "code": 200, "data": null }"#),
            Err(LoadError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_deals_response("<html>"),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_shops() {
        let body = r#"{ "code": 200, "data": [{
            "restaurantId": "1", "restaurantName": "椒鸣椒麻馆", "rating": 3.5
        }] }"#;
        let shops = decode_shops_response(body).unwrap();
        assert_eq!(shops[0].restaurant_name, "椒鸣椒麻馆");
    }

    #[test]
    fn test_static_source_filters_by_restaurant() {
        let source = StaticDealSource::from_json("1", PRODUCTS).unwrap();
        assert_eq!(source.fetch_deals("1").unwrap().len(), 2);
        assert!(source.fetch_deals("2").unwrap().is_empty());
    }

    #[test]
    fn test_static_source_rejects_empty_id() {
        let source = StaticDealSource::from_json("1", PRODUCTS).unwrap();
        let err = source.fetch_deals("").unwrap_err();
        assert!(matches!(err, LoadError::Rejected { code: 400, .. }));
    }
}
