//! Scryfall API client for resolving requested cards
//!
//! Uses async reqwest for non-blocking HTTP requests. Lookups run one at a
//! time so placeholder ids stay in row order.

use crate::models::{RawCardRequest, ResolvedCard};
use mtg_common::{LookupError, ScryfallCard, ScryfallErrorResponse};
use reqwest::header::ACCEPT;
use std::time::Duration;

const USER_AGENT: &str = "CardListService/1.0";

/// Client for exact-name card lookups
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScryfallClient {
    /// Create a client for `base_url` where each lookup gives up after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a card by exact name within a set
    pub async fn fetch_card_exact(
        &self,
        name: &str,
        set_code: &str,
    ) -> Result<ScryfallCard, LookupError> {
        let url = format!(
            "{}/cards/named?exact={}&set={}",
            self.base_url,
            urlencoding::encode(name),
            urlencoding::encode(&set_code.to_lowercase())
        );

        log::debug!("Fetching card from Scryfall: {}", url);

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<ScryfallCard>().await?);
        }

        match response.json::<ScryfallErrorResponse>().await {
            Ok(error) => Err(LookupError::Api {
                status: status.as_u16(),
                code: error.code,
                details: error.details,
            }),
            Err(_) => Err(LookupError::HttpStatus(status.as_u16())),
        }
    }

    /// Look up one requested card and normalize the response
    pub async fn resolve_card(
        &self,
        request: &RawCardRequest,
    ) -> Result<ResolvedCard, LookupError> {
        let card = self
            .fetch_card_exact(&request.name, &request.set_code)
            .await?;
        Ok(ResolvedCard::from_scryfall(&card))
    }

    /// Resolve every request in order.
    ///
    /// Always returns exactly one card per request. Failed lookups (network,
    /// timeout, unknown card) become placeholders instead of failing the batch.
    pub async fn resolve_cards(&self, requests: &[RawCardRequest]) -> Vec<ResolvedCard> {
        let mut cards = Vec::with_capacity(requests.len());

        for request in requests {
            match self.resolve_card(request).await {
                Ok(card) => cards.push(card),
                Err(e) if e.is_not_found() => {
                    log::warn!(
                        "Card not found on Scryfall: {} ({}): {}",
                        request.name,
                        request.set_code,
                        e
                    );
                    let placeholder = ResolvedCard::placeholder(request, cards.len());
                    cards.push(placeholder);
                }
                Err(e) => {
                    log::error!(
                        "Error fetching card data from Scryfall for {} ({}): {}",
                        request.name,
                        request.set_code,
                        e
                    );
                    let placeholder = ResolvedCard::placeholder(request, cards.len());
                    cards.push(placeholder);
                }
            }
        }

        cards
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
