//! Unit tests for WebSocket frame decoding.

pub(crate) use cargo_husky as _;
use kalshi_md::{
    decode_event, BookSide, MarketEvent, MarketStatus, ParseError, PriceLevel,
};

// ============================================================================
// Snapshot Decoding
// ============================================================================

#[test]
fn decodes_orderbook_snapshot() {
    let frame = r#"{"type":"orderbook_snapshot","seq":42,"msg":{"market_ticker":"T1","yes":[[30,100],[31,50]],"no":[[69,200]]}}"#;

    let event = decode_event(frame).unwrap();
    let snapshot = match event {
        MarketEvent::Snapshot(snapshot) => snapshot,
        other => panic!("expected snapshot, got {other:?}"),
    };

    assert_eq!(snapshot.market_ticker, "T1");
    assert_eq!(snapshot.sequence, 42);
    assert_eq!(
        snapshot.yes,
        vec![
            PriceLevel { price: 30, size: 100 },
            PriceLevel { price: 31, size: 50 },
        ]
    );
    assert_eq!(snapshot.no, vec![PriceLevel { price: 69, size: 200 }]);
    assert_eq!(snapshot.ts, 0);
}

#[test]
fn snapshot_accepts_boundary_prices() {
    let frame = r#"{"type":"orderbook_snapshot","seq":1,"msg":{"market_ticker":"T1","yes":[[0,1],[100,1]],"no":[]}}"#;

    let event = decode_event(frame).unwrap();
    match event {
        MarketEvent::Snapshot(snapshot) => {
            assert_eq!(snapshot.yes[0].price, 0);
            assert_eq!(snapshot.yes[1].price, 100);
        }
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[test]
fn snapshot_rejects_price_above_max() {
    let frame = r#"{"type":"orderbook_snapshot","seq":1,"msg":{"market_ticker":"T1","yes":[[101,1]],"no":[]}}"#;
    assert_eq!(decode_event(frame).unwrap_err(), ParseError::InvalidField);
}

#[test]
fn snapshot_rejects_negative_size() {
    let frame = r#"{"type":"orderbook_snapshot","seq":1,"msg":{"market_ticker":"T1","yes":[[30,-1]],"no":[]}}"#;
    assert_eq!(decode_event(frame).unwrap_err(), ParseError::InvalidField);
}

#[test]
fn snapshot_requires_both_sides() {
    let missing_no = r#"{"type":"orderbook_snapshot","seq":1,"msg":{"market_ticker":"T1","yes":[[30,100]]}}"#;
    assert_eq!(
        decode_event(missing_no).unwrap_err(),
        ParseError::MissingField
    );

    let missing_yes = r#"{"type":"orderbook_snapshot","seq":1,"msg":{"market_ticker":"T1","no":[[30,100]]}}"#;
    assert_eq!(
        decode_event(missing_yes).unwrap_err(),
        ParseError::MissingField
    );
}

#[test]
fn snapshot_requires_top_level_seq() {
    let frame = r#"{"type":"orderbook_snapshot","msg":{"market_ticker":"T1","yes":[],"no":[]}}"#;
    assert_eq!(decode_event(frame).unwrap_err(), ParseError::MissingField);
}

// ============================================================================
// Delta Decoding
// ============================================================================

#[test]
fn decodes_orderbook_delta() {
    let frame = r#"{"type":"orderbook_delta","seq":7,"msg":{"market_ticker":"T1","price":30,"delta":-25,"side":"yes"}}"#;

    let event = decode_event(frame).unwrap();
    let delta = match event {
        MarketEvent::Delta(delta) => delta,
        other => panic!("expected delta, got {other:?}"),
    };

    assert_eq!(delta.market_ticker, "T1");
    assert_eq!(delta.sequence, 7);
    assert_eq!(delta.price, 30);
    assert_eq!(delta.delta, -25);
    assert_eq!(delta.side, BookSide::Yes);
    assert_eq!(delta.client_order_id, None);
    assert_eq!(delta.ts, 0);
}

#[test]
fn delta_carries_client_order_id() {
    let frame = r#"{"type":"orderbook_delta","seq":8,"msg":{"market_ticker":"T1","price":55,"delta":10,"side":"no","client_order_id":"abc-123"}}"#;

    match decode_event(frame).unwrap() {
        MarketEvent::Delta(delta) => {
            assert_eq!(delta.side, BookSide::No);
            assert_eq!(delta.client_order_id.as_deref(), Some("abc-123"));
        }
        other => panic!("expected delta, got {other:?}"),
    }
}

#[test]
fn delta_rejects_unknown_side() {
    let frame = r#"{"type":"orderbook_delta","seq":7,"msg":{"market_ticker":"T1","price":30,"delta":1,"side":"maybe"}}"#;
    assert_eq!(decode_event(frame).unwrap_err(), ParseError::InvalidField);
}

#[test]
fn delta_rejects_out_of_range_values() {
    let bad_price = r#"{"type":"orderbook_delta","seq":7,"msg":{"market_ticker":"T1","price":101,"delta":1,"side":"yes"}}"#;
    assert_eq!(decode_event(bad_price).unwrap_err(), ParseError::InvalidField);

    let bad_delta = r#"{"type":"orderbook_delta","seq":7,"msg":{"market_ticker":"T1","price":30,"delta":2147483648,"side":"yes"}}"#;
    assert_eq!(decode_event(bad_delta).unwrap_err(), ParseError::InvalidField);
}

// ============================================================================
// Trade Decoding
// ============================================================================

#[test]
fn decodes_trade() {
    let frame = r#"{"type":"trade","msg":{"market_ticker":"T1","yes_price":62,"no_price":38,"count":5,"taker_side":"no","ts":1700000000}}"#;

    let event = decode_event(frame).unwrap();
    let trade = match event {
        MarketEvent::Trade(trade) => trade,
        other => panic!("expected trade, got {other:?}"),
    };

    assert_eq!(trade.market_ticker, "T1");
    assert_eq!(trade.yes_price, 62);
    assert_eq!(trade.no_price, 38);
    assert_eq!(trade.count, 5);
    assert_eq!(trade.taker_side, BookSide::No);
    assert_eq!(trade.ts, 1_700_000_000_000_000_000);
}

#[test]
fn trade_timestamp_defaults_to_zero() {
    let frame = r#"{"type":"trade","msg":{"market_ticker":"T1","yes_price":62,"no_price":38,"count":5,"taker_side":"yes"}}"#;

    match decode_event(frame).unwrap() {
        MarketEvent::Trade(trade) => assert_eq!(trade.ts, 0),
        other => panic!("expected trade, got {other:?}"),
    }
}

#[test]
fn trade_prices_need_not_sum_to_100() {
    let frame = r#"{"type":"trade","msg":{"market_ticker":"T1","yes_price":60,"no_price":30,"count":1,"taker_side":"yes"}}"#;

    match decode_event(frame).unwrap() {
        MarketEvent::Trade(trade) => {
            assert_eq!(trade.yes_price + trade.no_price, 90);
        }
        other => panic!("expected trade, got {other:?}"),
    }
}

// ============================================================================
// Market Status Decoding
// ============================================================================

#[test]
fn decodes_market_status() {
    let frame =
        r#"{"type":"market_status","msg":{"market_ticker":"T1","status":"paused"}}"#;

    match decode_event(frame).unwrap() {
        MarketEvent::Status(status) => {
            assert_eq!(status.market_ticker, "T1");
            assert_eq!(status.status, MarketStatus::Paused);
            assert_eq!(status.ts, 0);
        }
        other => panic!("expected status, got {other:?}"),
    }
}

#[test]
fn market_status_rejects_unknown_value() {
    let frame =
        r#"{"type":"market_status","msg":{"market_ticker":"T1","status":"suspended"}}"#;
    assert_eq!(decode_event(frame).unwrap_err(), ParseError::InvalidField);
}

// ============================================================================
// Enum Serialization Tests
// ============================================================================

#[test]
fn book_side_serializes_correctly() {
    assert_eq!(serde_json::to_string(&BookSide::Yes).unwrap(), "\"yes\"");
    assert_eq!(serde_json::to_string(&BookSide::No).unwrap(), "\"no\"");
}

#[test]
fn market_status_serializes_correctly() {
    assert_eq!(
        serde_json::to_string(&MarketStatus::Open).unwrap(),
        "\"open\""
    );
    assert_eq!(
        serde_json::to_string(&MarketStatus::Closed).unwrap(),
        "\"closed\""
    );
    assert_eq!(
        serde_json::to_string(&MarketStatus::Settled).unwrap(),
        "\"settled\""
    );
    assert_eq!(
        serde_json::to_string(&MarketStatus::Paused).unwrap(),
        "\"paused\""
    );
    assert_eq!(
        serde_json::to_string(&MarketStatus::Unopened).unwrap(),
        "\"unopened\""
    );
}

// ============================================================================
// Error Taxonomy
// ============================================================================

#[test]
fn empty_frame_is_empty_message() {
    assert_eq!(decode_event("").unwrap_err(), ParseError::EmptyMessage);
}

#[test]
fn malformed_json_is_invalid_json() {
    assert_eq!(
        decode_event("{not json").unwrap_err(),
        ParseError::InvalidJson
    );
}

#[test]
fn valid_json_without_type_is_missing_type() {
    assert_eq!(
        decode_event(r#"{"seq":1}"#).unwrap_err(),
        ParseError::MissingType
    );
    assert_eq!(decode_event("[1,2,3]").unwrap_err(), ParseError::MissingType);
}

#[test]
fn unknown_type_is_unsupported() {
    assert_eq!(
        decode_event(r#"{"type":"subscribed","id":1}"#).unwrap_err(),
        ParseError::UnsupportedType
    );
    assert_eq!(
        decode_event(r#"{"type":"ticker","msg":{}}"#).unwrap_err(),
        ParseError::UnsupportedType
    );
}

#[test]
fn missing_msg_object_is_missing_field() {
    assert_eq!(
        decode_event(r#"{"type":"trade","seq":1}"#).unwrap_err(),
        ParseError::MissingField
    );
}
