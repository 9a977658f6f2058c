//! HTTP implementation of the market API
//!
//! All response parsing lives in pure functions over the body text so the
//! JSON handling stays testable without a server.

use crate::{
    constants::{MARKET_API_URL, RECORD_API_URL, REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::FetchError,
    provider::MarketApi,
    settings::AuctionCategory,
    types::{AuctionListing, ItemKey, MarketSnapshot, Order, PriceRecord},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Auction entry as returned by the auctions endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuctionWire {
    item: Option<AuctionItemWire>,
    #[serde(default)]
    current_bid: f64,
    end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuctionItemWire {
    material: Option<String>,
    #[serde(default = "one")]
    amount: u32,
    display_name: Option<String>,
}

fn one() -> u32 {
    1
}

/// Market API client over HTTPS
pub struct HttpMarketApi {
    client: Client,
    base_url: String,
    record_url: String,
}

impl HttpMarketApi {
    /// Creates a client against the production API
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(MARKET_API_URL)
    }

    /// Creates a client against an arbitrary base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            record_url: RECORD_API_URL.to_string(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "fetching market data");

        let response = self.client.get(url).send().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Network(err)
            }
        })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(FetchError::Network)
    }
}

/// Parses the single-item price body, an object keyed by the item id
///
/// A missing or empty order array is an authoritative "no listings".
fn parse_price_body(key: &ItemKey, body: &str) -> Result<PriceRecord, FetchError> {
    let by_item: HashMap<String, Vec<Order>> = serde_json::from_str(body)?;
    match by_item.get(key.as_str()) {
        Some(orders) => Ok(PriceRecord::from_orders(orders)),
        None => Ok(PriceRecord::not_found()),
    }
}

/// Parses the bulk snapshot body: category -> item id -> orders
fn parse_snapshot_body(body: &str) -> Result<MarketSnapshot, FetchError> {
    let categories: HashMap<String, HashMap<String, Vec<Order>>> = serde_json::from_str(body)?;
    Ok(MarketSnapshot::new(categories))
}

/// Parses the record body: either a bare number or an object carrying it
/// under `recordPlayers` (older deployments used `players`)
fn parse_record_body(body: &str) -> Result<u64, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let record = match &value {
        serde_json::Value::Number(number) => number.as_u64(),
        serde_json::Value::Object(map) => map
            .get("recordPlayers")
            .or_else(|| map.get("players"))
            .and_then(serde_json::Value::as_u64),
        _ => None,
    };
    record.ok_or_else(|| FetchError::InvalidResponse("no numeric record in body".to_string()))
}

/// Parses an auction list body, skipping rows without a material or end time
fn parse_auctions_body(body: &str) -> Result<Vec<AuctionListing>, FetchError> {
    let rows: Vec<AuctionWire> = serde_json::from_str(body)?;

    let listings = rows
        .into_iter()
        .filter_map(|row| {
            let item = row.item?;
            let material = item.material?;
            let end_time = row.end_time?;
            Some(AuctionListing {
                material,
                amount: item.amount,
                display_name: item.display_name,
                current_bid: row.current_bid,
                end_time,
            })
        })
        .collect();

    Ok(listings)
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    async fn fetch_item_price(&self, key: &ItemKey) -> Result<PriceRecord, FetchError> {
        let url = format!("{}/market/price/{}", self.base_url, key);
        let body = self.get_text(&url).await?;
        parse_price_body(key, &body)
    }

    async fn fetch_snapshot(&self) -> Result<MarketSnapshot, FetchError> {
        let url = format!("{}/market/prices", self.base_url);
        let body = self.get_text(&url).await?;
        parse_snapshot_body(&body)
    }

    async fn fetch_auctions(
        &self,
        category: AuctionCategory,
    ) -> Result<Vec<AuctionListing>, FetchError> {
        let url = match category.api_value() {
            None => format!("{}/auctions/active", self.base_url),
            Some(segment) => format!("{}/auctions/categories/{}", self.base_url, segment),
        };
        let body = self.get_text(&url).await?;
        parse_auctions_body(&body)
    }

    async fn fetch_player_record(&self) -> Result<u64, FetchError> {
        let body = self.get_text(&self.record_url).await?;
        parse_record_body(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
