//! Subscription command construction and validation.

use crate::codec::ORDERBOOK_DELTA;
use crate::config::Config;

use serde::Serialize;

/// Errors returned while building a subscription request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubscribeError {
    #[error("orderbook_delta channel requires at least one market ticker")]
    MissingMarketTickers,
}

/// Validated subscribe command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub id: u64,
    pub channels: Vec<String>,
    pub market_tickers: Vec<String>,
}

#[derive(Serialize)]
struct WsSubscribeCmd<'a> {
    id: u64,
    cmd: &'static str,
    params: WsSubscribeParams<'a>,
}

#[derive(Serialize)]
struct WsSubscribeParams<'a> {
    channels: &'a [String],

    #[serde(skip_serializing_if = "Option::is_none")]
    market_tickers: Option<&'a [String]>,
}

fn requires_market_tickers(channels: &[String]) -> bool {
    channels.iter().any(|c| c == ORDERBOOK_DELTA)
}

fn build_payload(request: &SubscribeRequest) -> String {
    let cmd = WsSubscribeCmd {
        id: request.id,
        cmd: "subscribe",
        params: WsSubscribeParams {
            channels: &request.channels,
            market_tickers: if request.market_tickers.is_empty() {
                None
            } else {
                Some(&request.market_tickers)
            },
        },
    };
    serde_json::to_string(&cmd).expect("subscribe command serializes to JSON")
}

/// A validated subscription with its cached JSON payload.
///
/// Immutable once built; the payload is sent verbatim after every successful
/// WebSocket handshake.
#[derive(Debug, Clone)]
pub struct SubscriptionCommand {
    request: SubscribeRequest,
    json: String,
}

impl SubscriptionCommand {
    /// Validate the request and cache its JSON payload.
    ///
    /// The `orderbook_delta` channel is subscribed per market, so requesting
    /// it with an empty ticker list fails with
    /// [`SubscribeError::MissingMarketTickers`].
    pub fn new(request: SubscribeRequest) -> Result<Self, SubscribeError> {
        if requires_market_tickers(&request.channels) && request.market_tickers.is_empty() {
            return Err(SubscribeError::MissingMarketTickers);
        }
        let json = build_payload(&request);
        Ok(Self { request, json })
    }

    /// Build a subscription from loaded configuration.
    pub fn from_config(config: &Config, id: u64) -> Result<Self, SubscribeError> {
        Self::new(SubscribeRequest {
            id,
            channels: config.subscription.channels.clone(),
            market_tickers: config.subscription.market_tickers.clone(),
        })
    }

    pub fn request(&self) -> &SubscribeRequest {
        &self.request
    }

    /// The cached JSON payload.
    pub fn json(&self) -> &str {
        &self.json
    }
}
