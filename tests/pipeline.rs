//! Tests for the message pipeline: raw capture, dispatch, and parse-error
//! logging.

use kalshi_md::{
    FanoutSink, FileRawMessageSink, LogEvent, LogFields, LogLevel, Logger, MarketSink,
    MarketStatusUpdate, MessagePipeline, OrderbookDelta, OrderbookSnapshot, TradeEvent,
};

use std::fs;
use std::sync::Mutex;

/// Logger that records every event for assertions.
#[derive(Default)]
struct CapturingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl CapturingLogger {
    fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Logger for CapturingLogger {
    fn log_event(&self, event: LogEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn level(&self) -> LogLevel {
        LogLevel::Trace
    }
}

/// Sink that counts dispatched events per type.
#[derive(Default)]
struct RecordingSink {
    snapshots: Vec<OrderbookSnapshot>,
    deltas: Vec<OrderbookDelta>,
    trades: Vec<TradeEvent>,
    statuses: Vec<MarketStatusUpdate>,
}

impl MarketSink for RecordingSink {
    fn on_snapshot(&mut self, snapshot: &OrderbookSnapshot) {
        self.snapshots.push(snapshot.clone());
    }
    fn on_delta(&mut self, delta: &OrderbookDelta) {
        self.deltas.push(delta.clone());
    }
    fn on_trade(&mut self, trade: &TradeEvent) {
        self.trades.push(trade.clone());
    }
    fn on_status(&mut self, status: &MarketStatusUpdate) {
        self.statuses.push(status.clone());
    }
}

const SNAPSHOT: &str = r#"{"type":"orderbook_snapshot","seq":1,"msg":{"market_ticker":"T1","yes":[[30,100]],"no":[[69,200]]}}"#;
const DELTA: &str = r#"{"type":"orderbook_delta","seq":2,"msg":{"market_ticker":"T1","price":30,"delta":-5,"side":"yes"}}"#;
const TRADE: &str = r#"{"type":"trade","msg":{"market_ticker":"T1","yes_price":30,"no_price":70,"count":3,"taker_side":"yes"}}"#;
const STATUS: &str = r#"{"type":"market_status","msg":{"market_ticker":"T1","status":"closed"}}"#;
const BAD_PRICE: &str = r#"{"type":"orderbook_snapshot","seq":3,"msg":{"market_ticker":"T1","yes":[[101,1]],"no":[]}}"#;
const UNKNOWN: &str = r#"{"type":"subscribed","id":1}"#;

#[test]
fn dispatches_each_event_type_to_its_handler() {
    let logger = CapturingLogger::default();
    let mut sink = RecordingSink::default();
    let mut pipeline = MessagePipeline::new(&mut sink, &logger, None, true, false);

    pipeline.on_message(SNAPSHOT);
    pipeline.on_message(DELTA);
    pipeline.on_message(TRADE);
    pipeline.on_message(STATUS);

    assert_eq!(sink.snapshots.len(), 1);
    assert_eq!(sink.deltas.len(), 1);
    assert_eq!(sink.trades.len(), 1);
    assert_eq!(sink.statuses.len(), 1);
    assert_eq!(sink.snapshots[0].market_ticker, "T1");
    assert!(logger.events().is_empty());
}

#[test]
fn invalid_field_logs_warn_and_skips_sink() {
    let logger = CapturingLogger::default();
    let mut sink = RecordingSink::default();
    let mut pipeline = MessagePipeline::new(&mut sink, &logger, None, true, false);

    pipeline.on_message(BAD_PRICE);

    assert!(sink.snapshots.is_empty());

    let events = logger.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, LogLevel::Warn);
    assert_eq!(events[0].message, "parse_error");
    assert_eq!(events[0].raw.as_deref(), Some(BAD_PRICE));
    assert!(events[0]
        .fields
        .entries()
        .iter()
        .any(|(key, _)| key == "parse_error"));
}

#[test]
fn raw_payload_omitted_when_disabled() {
    let logger = CapturingLogger::default();
    let mut sink = RecordingSink::default();
    let mut pipeline = MessagePipeline::new(&mut sink, &logger, None, false, false);

    pipeline.on_message(BAD_PRICE);

    let events = logger.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].raw, None);
}

#[test]
fn unsupported_type_is_a_debug_event() {
    let logger = CapturingLogger::default();
    let mut sink = RecordingSink::default();
    let mut pipeline = MessagePipeline::new(&mut sink, &logger, None, true, false);

    pipeline.on_message(UNKNOWN);

    let events = logger.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, LogLevel::Debug);
    assert_eq!(events[0].message, "unsupported_message_type");
}

#[test]
fn raw_frames_are_captured_line_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw").join("ws_messages.json");

    let logger = CapturingLogger::default();
    let mut sink = RecordingSink::default();
    let raw_sink = FileRawMessageSink::create(&path).unwrap();
    let mut pipeline =
        MessagePipeline::new(&mut sink, &logger, Some(Box::new(raw_sink)), true, false);

    pipeline.on_message(SNAPSHOT);
    pipeline.on_message(UNKNOWN);
    pipeline.on_message(BAD_PRICE);

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec![SNAPSHOT, UNKNOWN, BAD_PRICE]);
}

#[test]
fn fanout_broadcasts_to_every_sink_in_order() {
    let logger = CapturingLogger::default();
    let mut first = RecordingSink::default();
    let mut second = RecordingSink::default();

    {
        let mut fanout = FanoutSink::new(vec![&mut first, &mut second]);
        let mut pipeline = MessagePipeline::new(&mut fanout, &logger, None, true, false);
        pipeline.on_message(SNAPSHOT);
        pipeline.on_message(TRADE);
    }

    assert_eq!(first.snapshots.len(), 1);
    assert_eq!(second.snapshots.len(), 1);
    assert_eq!(first.trades.len(), 1);
    assert_eq!(second.trades.len(), 1);
}

#[test]
fn raw_message_logging_attaches_frame_and_size() {
    let logger = CapturingLogger::default();
    let mut sink = RecordingSink::default();
    let mut pipeline = MessagePipeline::new(&mut sink, &logger, None, true, true);

    pipeline.on_message(TRADE);

    let events = logger.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, LogLevel::Debug);
    assert_eq!(events[0].message, "ws_message");
    assert_eq!(events[0].raw.as_deref(), Some(TRADE));

    let mut expected = LogFields::new();
    expected.add_uint("bytes", TRADE.len() as u64);
    assert_eq!(events[0].fields, expected);
}
