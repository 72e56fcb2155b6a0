//! Shared MTG types used across the card tools.
//!
//! Holds the Scryfall wire format and the error type for card lookups so the
//! service crates don't each carry their own copy.

pub mod error;
pub mod scryfall;

pub use error::LookupError;
pub use scryfall::{parse_price, CardFace, ScryfallCard, ScryfallErrorResponse, ScryfallPrices};
