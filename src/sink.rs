//! Market event sinks.

use crate::logging::{LogFields, LogLevel, Logger};
use crate::types::{MarketStatusUpdate, OrderbookDelta, OrderbookSnapshot, TradeEvent};

/// Receiver for decoded market-data events.
///
/// Implementations are invoked synchronously from the feed loop, one event
/// at a time, in the order the server sent them.
pub trait MarketSink {
    fn on_snapshot(&mut self, snapshot: &OrderbookSnapshot);
    fn on_delta(&mut self, delta: &OrderbookDelta);
    fn on_trade(&mut self, trade: &TradeEvent);
    fn on_status(&mut self, status: &MarketStatusUpdate);
}

/// Broadcasts every event to a set of sinks in order.
pub struct FanoutSink<'a> {
    sinks: Vec<&'a mut dyn MarketSink>,
}

impl<'a> FanoutSink<'a> {
    pub fn new(sinks: Vec<&'a mut dyn MarketSink>) -> Self {
        Self { sinks }
    }
}

impl MarketSink for FanoutSink<'_> {
    fn on_snapshot(&mut self, snapshot: &OrderbookSnapshot) {
        for sink in &mut self.sinks {
            sink.on_snapshot(snapshot);
        }
    }

    fn on_delta(&mut self, delta: &OrderbookDelta) {
        for sink in &mut self.sinks {
            sink.on_delta(delta);
        }
    }

    fn on_trade(&mut self, trade: &TradeEvent) {
        for sink in &mut self.sinks {
            sink.on_trade(trade);
        }
    }

    fn on_status(&mut self, status: &MarketStatusUpdate) {
        for sink in &mut self.sinks {
            sink.on_status(status);
        }
    }
}

/// Sink that writes one structured log line per market event.
pub struct LoggingSink<'a> {
    logger: &'a dyn Logger,
}

impl<'a> LoggingSink<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self { logger }
    }
}

impl MarketSink for LoggingSink<'_> {
    fn on_snapshot(&mut self, snapshot: &OrderbookSnapshot) {
        let mut fields = LogFields::new();
        fields.add_str("market_ticker", snapshot.market_ticker.clone());
        fields.add_uint("sequence", snapshot.sequence);
        self.logger
            .log_with(LogLevel::Info, "md.sink", "orderbook_snapshot", fields);
    }

    fn on_delta(&mut self, delta: &OrderbookDelta) {
        let mut fields = LogFields::new();
        fields.add_str("market_ticker", delta.market_ticker.clone());
        fields.add_uint("sequence", delta.sequence);
        fields.add_uint("price", u64::from(delta.price));
        fields.add_int("delta", i64::from(delta.delta));
        self.logger
            .log_with(LogLevel::Debug, "md.sink", "orderbook_delta", fields);
    }

    fn on_trade(&mut self, trade: &TradeEvent) {
        let mut fields = LogFields::new();
        fields.add_str("market_ticker", trade.market_ticker.clone());
        fields.add_uint("yes_price", u64::from(trade.yes_price));
        fields.add_uint("no_price", u64::from(trade.no_price));
        fields.add_uint("count", u64::from(trade.count));
        self.logger
            .log_with(LogLevel::Debug, "md.sink", "trade", fields);
    }

    fn on_status(&mut self, status: &MarketStatusUpdate) {
        let mut fields = LogFields::new();
        fields.add_str("market_ticker", status.market_ticker.clone());
        fields.add_str("status", status.status.as_str());
        self.logger
            .log_with(LogLevel::Info, "md.sink", "market_status", fields);
    }
}
