//! Card List Service - shareable MTG card lists
//!
//! Turns an uploaded CSV of card names and sets into a stored card list:
//! rows are extracted, resolved against Scryfall, merged by card id and
//! saved to SQLite. Lists can then be read back as JSON, renamed, or shown
//! as a printable page.

pub mod config;
pub mod csv_import;
pub mod database;
pub mod error;
pub mod html;
pub mod models;
pub mod scryfall;
pub mod web;

pub use config::ServiceConfig;
pub use csv_import::{extract_card_requests, ExtractOutcome};
pub use database::{create_card_list, get_card_list, init_schema, rename_card_list};
pub use error::{Result, ServiceError};
pub use models::{CardList, CardListItem, RawCardRequest, ResolvedCard};
pub use scryfall::ScryfallClient;
