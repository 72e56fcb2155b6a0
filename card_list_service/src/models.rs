//! Card and card list records passed between the pipeline stages

use mtg_common::ScryfallCard;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Set name used for cards whose lookup failed
pub const UNKNOWN_SET_NAME: &str = "Unknown";

/// One card requested by a CSV row, before it is looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCardRequest {
    pub name: String,
    pub set_code: String,
    /// Empty when the CSV has no collector number column or cell
    pub collector_number: String,
}

impl RawCardRequest {
    pub fn new(
        name: impl Into<String>,
        set_code: impl Into<String>,
        collector_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            set_code: set_code.into(),
            collector_number: collector_number.into(),
        }
    }
}

/// Canonical card data for one requested row.
///
/// Serialized with the same field names the card list API returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCard {
    pub id: String,
    pub name: String,
    #[serde(rename = "set")]
    pub set_code: String,
    pub set_name: String,
    pub image_uris: BTreeMap<String, String>,
    pub price: f64,
    pub foil_price: f64,
    pub collector_number: String,
    pub quantity: u32,
}

impl ResolvedCard {
    /// Normalize a Scryfall response
    pub fn from_scryfall(card: &ScryfallCard) -> Self {
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            set_code: card.set.clone(),
            set_name: card.set_name.clone(),
            image_uris: card.image_map(),
            price: card.usd_price(),
            foil_price: card.usd_foil_price(),
            collector_number: card.collector_number.clone(),
            quantity: 1,
        }
    }

    /// Stand-in for a card whose lookup failed.
    ///
    /// `index` is the number of cards already resolved in the batch, which
    /// keeps placeholder ids unique within one upload. Scryfall ids are UUIDs
    /// so `error_<n>` never collides with a real card.
    pub fn placeholder(request: &RawCardRequest, index: usize) -> Self {
        Self {
            id: format!("error_{}", index),
            name: request.name.clone(),
            set_code: request.set_code.clone(),
            set_name: UNKNOWN_SET_NAME.to_string(),
            image_uris: BTreeMap::new(),
            price: 0.0,
            foil_price: 0.0,
            collector_number: request.collector_number.clone(),
            quantity: 1,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with("error_") && self.set_name == UNKNOWN_SET_NAME
    }
}

/// One stored entry of a card list, unique per (list, card id)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardListItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "set")]
    pub set_code: String,
    pub set_name: String,
    pub image_uris: BTreeMap<String, String>,
    pub price: f64,
    pub foil_price: f64,
    pub collector_number: String,
    pub quantity: u32,
}

/// A stored card list with its items in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardList {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub created_at: String,
    #[serde(rename = "cards")]
    pub items: Vec<CardListItem>,
}

impl CardList {
    /// Number of physical cards (sum of quantities)
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Regular price of the whole list
    pub fn total_price(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scryfall_bolt() -> ScryfallCard {
        serde_json::from_value(serde_json::json!({
            "id": "e3285e6b-3e79-4d7c-bf96-d920f973b80d",
            "name": "Lightning Bolt",
            "set": "lea",
            "set_name": "Limited Edition Alpha",
            "collector_number": "161",
            "prices": { "usd": "450.00", "usd_foil": null },
            "image_uris": { "normal": "https://example.com/bolt.jpg" }
        }))
        .unwrap()
    }

    #[test]
    fn from_scryfall_normalizes_fields() {
        let card = ResolvedCard::from_scryfall(&scryfall_bolt());
        assert_eq!(card.id, "e3285e6b-3e79-4d7c-bf96-d920f973b80d");
        assert_eq!(card.set_code, "lea");
        assert_eq!(card.set_name, "Limited Edition Alpha");
        assert!((card.price - 450.0).abs() < 1e-9);
        assert_eq!(card.foil_price, 0.0);
        assert_eq!(card.quantity, 1);
        assert_eq!(card.image_uris.len(), 1);
        assert!(!card.is_placeholder());
    }

    #[test]
    fn placeholder_keeps_request_fields() {
        let request = RawCardRequest::new("Mox Emerald", "LEB", "");
        let card = ResolvedCard::placeholder(&request, 3);
        assert_eq!(card.id, "error_3");
        assert_eq!(card.name, "Mox Emerald");
        assert_eq!(card.set_code, "LEB");
        assert_eq!(card.set_name, "Unknown");
        assert_eq!(card.price, 0.0);
        assert_eq!(card.foil_price, 0.0);
        assert!(card.image_uris.is_empty());
        assert!(card.is_placeholder());
    }

    #[test]
    fn resolved_card_serializes_with_api_field_names() {
        let card = ResolvedCard::from_scryfall(&scryfall_bolt());
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["set"], "lea");
        assert_eq!(json["quantity"], 1);
        assert!(json.get("set_code").is_none());
    }

    #[test]
    fn card_list_totals() {
        let item = |price: f64, quantity: u32| CardListItem {
            id: format!("id-{}", quantity),
            name: "Card".to_string(),
            set_code: "lea".to_string(),
            set_name: "Alpha".to_string(),
            image_uris: BTreeMap::new(),
            price,
            foil_price: 0.0,
            collector_number: "1".to_string(),
            quantity,
        };
        let list = CardList {
            id: "list".to_string(),
            name: "Test".to_string(),
            created_at: String::new(),
            items: vec![item(2.5, 2), item(1.0, 3)],
        };
        assert_eq!(list.total_quantity(), 5);
        assert!((list.total_price() - 8.0).abs() < 1e-9);

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["cards"].as_array().unwrap().len(), 2);
        assert!(json.get("created_at").is_none());
    }
}
