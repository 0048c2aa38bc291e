//! Decoding of the exchange's WebSocket data messages.
//!
//! Every inbound frame is a JSON document with a top-level `type`
//! discriminator. Snapshot and delta frames carry the sequence number at the
//! document root; the type-specific payload lives in the `msg` object.
//! Decoding validates every numeric field against its domain range before an
//! event is produced, so downstream sinks never observe an out-of-range
//! price, size, delta, or count.

use crate::types::{
    BookSide, Count, Delta, MarketStatus, MarketStatusUpdate, OrderbookDelta, OrderbookSnapshot,
    Price, PriceLevel, Sequence, Size, Timestamp, TradeEvent, PRICE_MAX,
};

use serde_json::{Map, Value};
use std::fmt;

/// Message type strings from the exchange WebSocket API.
pub const ORDERBOOK_SNAPSHOT: &str = "orderbook_snapshot";
pub const ORDERBOOK_DELTA: &str = "orderbook_delta";
pub const TRADE: &str = "trade";
pub const MARKET_STATUS: &str = "market_status";
pub const TICKER: &str = "ticker";
pub const SUBSCRIBED: &str = "subscribed";
pub const ERROR: &str = "error";

const FIELD_TYPE: &str = "type";
const FIELD_SEQ: &str = "seq";
const FIELD_MSG: &str = "msg";
const FIELD_MARKET_TICKER: &str = "market_ticker";
const FIELD_YES: &str = "yes";
const FIELD_NO: &str = "no";
const FIELD_PRICE: &str = "price";
const FIELD_DELTA: &str = "delta";
const FIELD_SIDE: &str = "side";
const FIELD_CLIENT_ORDER_ID: &str = "client_order_id";
const FIELD_YES_PRICE: &str = "yes_price";
const FIELD_NO_PRICE: &str = "no_price";
const FIELD_COUNT: &str = "count";
const FIELD_TAKER_SIDE: &str = "taker_side";
const FIELD_STATUS: &str = "status";
const FIELD_TIMESTAMP: &str = "ts";

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Errors produced while decoding a WebSocket frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty message")]
    EmptyMessage,
    #[error("invalid json")]
    InvalidJson,
    #[error("missing type discriminator")]
    MissingType,
    #[error("missing required field")]
    MissingField,
    #[error("field value out of range or wrong type")]
    InvalidField,
    #[error("unsupported message type")]
    UnsupportedType,
}

impl ParseError {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseError::EmptyMessage => "empty_message",
            ParseError::InvalidJson => "invalid_json",
            ParseError::MissingType => "missing_type",
            ParseError::MissingField => "missing_field",
            ParseError::InvalidField => "invalid_field",
            ParseError::UnsupportedType => "unsupported_type",
        }
    }
}

/// A decoded market-data event.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    Snapshot(OrderbookSnapshot),
    Delta(OrderbookDelta),
    Trade(TradeEvent),
    Status(MarketStatusUpdate),
}

impl fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketEvent::Snapshot(_) => f.write_str(ORDERBOOK_SNAPSHOT),
            MarketEvent::Delta(_) => f.write_str(ORDERBOOK_DELTA),
            MarketEvent::Trade(_) => f.write_str(TRADE),
            MarketEvent::Status(_) => f.write_str(MARKET_STATUS),
        }
    }
}

/// Extract the top-level `type` discriminator from a frame.
pub fn message_type(json: &str) -> Result<String, ParseError> {
    let root = parse_root(json)?;
    Ok(type_of(&root)?.to_string())
}

/// Discriminate and decode one complete text frame into a typed event.
pub fn decode_event(json: &str) -> Result<MarketEvent, ParseError> {
    let root = parse_root(json)?;
    match type_of(&root)? {
        ORDERBOOK_SNAPSHOT => decode_snapshot(&root).map(MarketEvent::Snapshot),
        ORDERBOOK_DELTA => decode_delta(&root).map(MarketEvent::Delta),
        TRADE => decode_trade(&root).map(MarketEvent::Trade),
        MARKET_STATUS => decode_status(&root).map(MarketEvent::Status),
        _ => Err(ParseError::UnsupportedType),
    }
}

fn parse_root(json: &str) -> Result<Map<String, Value>, ParseError> {
    if json.is_empty() {
        return Err(ParseError::EmptyMessage);
    }
    let doc: Value = serde_json::from_str(json).map_err(|_| ParseError::InvalidJson)?;
    match doc {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::MissingType),
    }
}

fn type_of(root: &Map<String, Value>) -> Result<&str, ParseError> {
    root.get(FIELD_TYPE)
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingType)
}

fn sequence_of(root: &Map<String, Value>) -> Result<Sequence, ParseError> {
    root.get(FIELD_SEQ)
        .ok_or(ParseError::MissingField)?
        .as_u64()
        .ok_or(ParseError::InvalidField)
}

fn message_object(root: &Map<String, Value>) -> Result<&Map<String, Value>, ParseError> {
    root.get(FIELD_MSG)
        .and_then(Value::as_object)
        .ok_or(ParseError::MissingField)
}

fn get_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str, ParseError> {
    obj.get(key)
        .ok_or(ParseError::MissingField)?
        .as_str()
        .ok_or(ParseError::InvalidField)
}

fn get_int(obj: &Map<String, Value>, key: &str) -> Result<i64, ParseError> {
    obj.get(key)
        .ok_or(ParseError::MissingField)?
        .as_i64()
        .ok_or(ParseError::InvalidField)
}

fn optional_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Optional `ts` field carried as seconds, converted to nanoseconds.
fn optional_timestamp(obj: &Map<String, Value>) -> Timestamp {
    obj.get(FIELD_TIMESTAMP)
        .and_then(Value::as_i64)
        .map(|secs| secs.saturating_mul(NANOS_PER_SEC))
        .unwrap_or(0)
}

fn parse_price(value: i64) -> Result<Price, ParseError> {
    if !(0..=i64::from(PRICE_MAX)).contains(&value) {
        return Err(ParseError::InvalidField);
    }
    Ok(value as Price)
}

fn parse_side(text: &str) -> Result<BookSide, ParseError> {
    match text {
        "yes" => Ok(BookSide::Yes),
        "no" => Ok(BookSide::No),
        _ => Err(ParseError::InvalidField),
    }
}

fn parse_levels(obj: &Map<String, Value>, key: &str) -> Result<Vec<PriceLevel>, ParseError> {
    let entries = obj
        .get(key)
        .ok_or(ParseError::MissingField)?
        .as_array()
        .ok_or(ParseError::InvalidField)?;

    let mut levels = Vec::with_capacity(entries.len());
    for entry in entries {
        let pair = entry.as_array().ok_or(ParseError::InvalidField)?;
        let price = pair
            .first()
            .and_then(Value::as_i64)
            .ok_or(ParseError::InvalidField)?;
        let size = pair
            .get(1)
            .and_then(Value::as_i64)
            .ok_or(ParseError::InvalidField)?;
        if !(0..=i64::from(Size::MAX)).contains(&size) {
            return Err(ParseError::InvalidField);
        }
        levels.push(PriceLevel {
            price: parse_price(price)?,
            size: size as Size,
        });
    }
    Ok(levels)
}

fn decode_snapshot(root: &Map<String, Value>) -> Result<OrderbookSnapshot, ParseError> {
    let sequence = sequence_of(root)?;
    let msg = message_object(root)?;
    Ok(OrderbookSnapshot {
        market_ticker: get_str(msg, FIELD_MARKET_TICKER)?.to_string(),
        sequence,
        yes: parse_levels(msg, FIELD_YES)?,
        no: parse_levels(msg, FIELD_NO)?,
        ts: 0,
    })
}

fn decode_delta(root: &Map<String, Value>) -> Result<OrderbookDelta, ParseError> {
    let sequence = sequence_of(root)?;
    let msg = message_object(root)?;

    let market_ticker = get_str(msg, FIELD_MARKET_TICKER)?.to_string();
    let price = parse_price(get_int(msg, FIELD_PRICE)?)?;
    let delta = get_int(msg, FIELD_DELTA)?;
    if !(i64::from(Delta::MIN)..=i64::from(Delta::MAX)).contains(&delta) {
        return Err(ParseError::InvalidField);
    }
    let side = parse_side(get_str(msg, FIELD_SIDE)?)?;

    Ok(OrderbookDelta {
        market_ticker,
        sequence,
        price,
        delta: delta as Delta,
        side,
        client_order_id: optional_str(msg, FIELD_CLIENT_ORDER_ID),
        ts: 0,
    })
}

fn decode_trade(root: &Map<String, Value>) -> Result<TradeEvent, ParseError> {
    let msg = message_object(root)?;

    let market_ticker = get_str(msg, FIELD_MARKET_TICKER)?.to_string();
    let yes_price = parse_price(get_int(msg, FIELD_YES_PRICE)?)?;
    let no_price = parse_price(get_int(msg, FIELD_NO_PRICE)?)?;
    let count = get_int(msg, FIELD_COUNT)?;
    if !(0..=i64::from(Count::MAX)).contains(&count) {
        return Err(ParseError::InvalidField);
    }
    let taker_side = parse_side(get_str(msg, FIELD_TAKER_SIDE)?)?;

    Ok(TradeEvent {
        market_ticker,
        yes_price,
        no_price,
        count: count as Count,
        taker_side,
        ts: optional_timestamp(msg),
    })
}

fn decode_status(root: &Map<String, Value>) -> Result<MarketStatusUpdate, ParseError> {
    let msg = message_object(root)?;

    let market_ticker = get_str(msg, FIELD_MARKET_TICKER)?.to_string();
    let status =
        MarketStatus::parse(get_str(msg, FIELD_STATUS)?).ok_or(ParseError::InvalidField)?;

    Ok(MarketStatusUpdate {
        market_ticker,
        status,
        ts: optional_timestamp(msg),
    })
}
