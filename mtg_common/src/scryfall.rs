//! Scryfall card JSON as returned by `/cards/named`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scryfall card response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScryfallCard {
    pub id: String,
    pub name: String,
    pub set: String,
    pub set_name: String,
    pub collector_number: String,
    #[serde(default)]
    pub prices: ScryfallPrices,
    /// Image size name -> URL (`small`, `normal`, `large`, `png`, ...)
    #[serde(default)]
    pub image_uris: Option<BTreeMap<String, String>>,
    /// For double-faced cards, images are in card_faces
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ScryfallPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub image_uris: Option<BTreeMap<String, String>>,
}

/// Scryfall API error response
#[derive(Debug, Deserialize)]
pub struct ScryfallErrorResponse {
    pub status: u16,
    pub code: String,
    pub details: String,
}

impl ScryfallCard {
    /// Image map for the card, falling back to the front face for
    /// double-faced cards. Empty when Scryfall has no images.
    pub fn image_map(&self) -> BTreeMap<String, String> {
        if let Some(ref uris) = self.image_uris {
            return uris.clone();
        }
        self.card_faces
            .as_ref()
            .and_then(|faces| faces.first())
            .and_then(|face| face.image_uris.clone())
            .unwrap_or_default()
    }

    /// Regular USD price, 0 when unknown
    pub fn usd_price(&self) -> f64 {
        parse_price(self.prices.usd.as_deref())
    }

    /// Foil USD price, 0 when unknown
    pub fn usd_foil_price(&self) -> f64 {
        parse_price(self.prices.usd_foil.as_deref())
    }
}

/// Parse a Scryfall price string. Missing, malformed, negative or
/// non-finite values all become 0.
pub fn parse_price(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        Ok(value) => {
            log::debug!("Ignoring out-of-range price {}", value);
            0.0
        }
        Err(_) => {
            log::debug!("Ignoring unparsable price {:?}", raw);
            0.0
        }
    }
}
