use serde::{Serialize, Serializer};
use std::fmt;

/// Market ticker identifier (e.g. `KXGOVSHUT-26JAN31`).
pub type MarketTicker = String;
/// Monotonic sequence number scoped per (market, channel).
pub type Sequence = u64;
/// Price in cents, valid range 0..=100.
pub type Price = u16;
/// Aggregate contracts resting at a price level.
pub type Size = u32;
/// Signed change in size at a price level.
pub type Delta = i32;
/// Number of contracts in a trade.
pub type Count = u32;
/// Nanoseconds since the Unix epoch; 0 when the source did not provide one.
pub type Timestamp = i64;

/// Maximum valid price in cents.
pub const PRICE_MAX: Price = 100;

/// --- Book Side ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSide {
    Yes,
    No,
}

impl BookSide {
    pub fn as_str(self) -> &'static str {
        match self {
            BookSide::Yes => "yes",
            BookSide::No => "no",
        }
    }
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BookSide {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// --- Market Status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Unopened,
    Open,
    Paused,
    Closed,
    Settled,
}

impl MarketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketStatus::Unopened => "unopened",
            MarketStatus::Open => "open",
            MarketStatus::Paused => "paused",
            MarketStatus::Closed => "closed",
            MarketStatus::Settled => "settled",
        }
    }

    /// Parse the wire representation used by the exchange.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "unopened" => Some(MarketStatus::Unopened),
            "open" => Some(MarketStatus::Open),
            "paused" => Some(MarketStatus::Paused),
            "closed" => Some(MarketStatus::Closed),
            "settled" => Some(MarketStatus::Settled),
            _ => None,
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MarketStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Single price level in an orderbook: aggregate size resting at a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceLevel {
    /// Price in cents.
    pub price: Price,
    pub size: Size,
}

/// Full orderbook state for one market at a sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderbookSnapshot {
    pub market_ticker: MarketTicker,
    pub sequence: Sequence,
    pub yes: Vec<PriceLevel>,
    pub no: Vec<PriceLevel>,
    pub ts: Timestamp,
}

/// Incremental change to a single price level.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderbookDelta {
    pub market_ticker: MarketTicker,
    pub sequence: Sequence,
    pub price: Price,
    pub delta: Delta,
    pub side: BookSide,
    pub client_order_id: Option<String>,
    pub ts: Timestamp,
}

/// Trade execution event.
///
/// `yes_price + no_price` is not required to equal 100; the exchange feed
/// reports both prices independently and this client passes them through.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub market_ticker: MarketTicker,
    pub yes_price: Price,
    pub no_price: Price,
    pub count: Count,
    pub taker_side: BookSide,
    pub ts: Timestamp,
}

/// Market lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketStatusUpdate {
    pub market_ticker: MarketTicker,
    pub status: MarketStatus,
    pub ts: Timestamp,
}
