//! # kalshi-md
//!
//! Streaming market-data client for the [Kalshi](https://kalshi.com)
//! prediction-market exchange.
//!
//! ## Features
//!
//! - **Authenticated WebSocket feed** — RSA-PSS signed upgrade headers,
//!   minted fresh for every connect attempt
//! - **Typed event decoding** — orderbook snapshots/deltas, trades, and
//!   market status updates with range-checked fields
//! - **Automatic reconnection** — exponential backoff with credential
//!   refresh and resubscription on every reopen
//! - **Raw-frame capture** — every inbound frame archived as one JSON line
//! - **Async structured logging** — bounded queue with a configurable drop
//!   policy and a background JSON-lines writer
//!
//! ## Quick Start
//!
//! ```no_run
//! use kalshi_md::{FeedHandler, KalshiAuth, MarketSink, RunOptions, WS_PATH};
//! use kalshi_md::{MarketStatusUpdate, OrderbookDelta, OrderbookSnapshot, TradeEvent};
//! use kalshi_md::{AsyncJsonLogger, AsyncJsonLoggerOptions, SubscribeRequest, SubscriptionCommand};
//!
//! struct PrintSink;
//!
//! impl MarketSink for PrintSink {
//!     fn on_snapshot(&mut self, snapshot: &OrderbookSnapshot) {
//!         println!("snapshot {} seq={}", snapshot.market_ticker, snapshot.sequence);
//!     }
//!     fn on_delta(&mut self, delta: &OrderbookDelta) {
//!         println!("delta {} {}@{}", delta.market_ticker, delta.delta, delta.price);
//!     }
//!     fn on_trade(&mut self, trade: &TradeEvent) {
//!         println!("trade {} x{}", trade.market_ticker, trade.count);
//!     }
//!     fn on_status(&mut self, status: &MarketStatusUpdate) {
//!         println!("status {} {}", status.market_ticker, status.status);
//!     }
//! }
//!
//! # async fn run() -> Result<(), kalshi_md::KalshiError> {
//! let auth = KalshiAuth::from_env()?;
//! let logger = AsyncJsonLogger::new(AsyncJsonLoggerOptions::default());
//!
//! let subscription = SubscriptionCommand::new(SubscribeRequest {
//!     id: 1,
//!     channels: vec!["orderbook_delta".to_string(), "trade".to_string()],
//!     market_tickers: vec!["KXGOVSHUT-26JAN31".to_string()],
//! })?;
//!
//! let mut sink = PrintSink;
//! let mut handler = FeedHandler::new(&mut sink, &logger);
//! handler
//!     .run(
//!         RunOptions {
//!             ws_url: "wss://api.elections.kalshi.com/trade-api/ws/v2".to_string(),
//!             subscribe_cmd: subscription.json().to_string(),
//!             ..Default::default()
//!         },
//!         || auth.ws_headers_now(WS_PATH),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication
//!
//! Every connection attempt signs `<timestamp_ms>GET/trade-api/ws/v2` with
//! RSA-PSS/SHA-256 and sends the result in the upgrade headers. Load your
//! key with [`KalshiAuth::from_pem_file`], [`KalshiAuth::from_pem_str`]
//! (PKCS#8 or PKCS#1 PEM), or [`KalshiAuth::from_env`].
//!
//! Environment variables read by [`KalshiAuth::from_env`]:
//! - `KALSHI_API_KEY` — your API key ID
//! - `KALSHI_PRIVATE_KEY` — PEM contents, or
//! - `KALSHI_PRIVATE_KEY_PATH` — path to the PEM file
//!
//! ## Reconnection
//!
//! Reads and connects that fail are retried with exponential backoff,
//! re-signing the upgrade headers each attempt:
//!
//! | Field | Default | Description |
//! |---|---|---|
//! | `auto_reconnect` | `true` | Retry failed connections |
//! | `reconnect_initial_delay` | 500 ms | First backoff delay |
//! | `reconnect_max_delay` | 30 s | Upper bound on backoff |
//!
//! The delay doubles after each attempt and resets on a successful open.
//!
//! ## Logging
//!
//! [`AsyncJsonLogger`] writes newline-delimited JSON from a dedicated
//! thread. The queue is bounded; when full, either the oldest event is
//! evicted (`drop_oldest`) or the new event is rejected (`drop_newest`),
//! and a `dropped_logs` summary records how many were lost.

pub mod app;
pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod pipeline;
pub mod sink;
pub mod subscribe;
pub mod types;
pub mod ws;

pub use app::AppContext;
pub use auth::{AuthError, Header, KalshiAuth, WS_PATH};
pub use codec::{decode_event, MarketEvent, ParseError};
pub use config::{load_config, Config, ConfigError};
pub use error::KalshiError;
pub use feed::{FeedHandler, ReconnectState, RunError, RunLimiter, RunOptions};
pub use logging::{
    AsyncJsonLogger, AsyncJsonLoggerOptions, DropPolicy, FieldValue, LogEvent, LogFields, LogLevel,
    Logger,
};
pub use pipeline::{FileRawMessageSink, MessagePipeline, RawMessageSink};
pub use sink::{FanoutSink, LoggingSink, MarketSink};
pub use subscribe::{SubscribeError, SubscribeRequest, SubscriptionCommand};
pub use types::{
    BookSide, Count, Delta, MarketStatus, MarketStatusUpdate, MarketTicker, OrderbookDelta,
    OrderbookSnapshot, Price, PriceLevel, Sequence, Size, Timestamp, TradeEvent, PRICE_MAX,
};
pub use ws::{parse_ws_url, WsClient, WsConfig, WsError, WsErrorKind, WsIncoming, WsUrl};
