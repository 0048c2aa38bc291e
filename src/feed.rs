//! The feed handler: connection lifecycle, reconnection, and the run loop.

use crate::auth::{AuthError, Header};
use crate::logging::{LogFields, LogLevel, Logger};
use crate::pipeline::{FileRawMessageSink, MessagePipeline};
use crate::sink::MarketSink;
use crate::ws::{WsClient, WsConfig, WsError, WsIncoming};

use std::path::PathBuf;
use std::time::Duration;

/// Errors returned by [`FeedHandler::run`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to open raw message output")]
    OutputOpenFailed,
}

/// Runtime options for one feed run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ws_url: String,
    /// Sent after every successful handshake; empty disables subscription.
    pub subscribe_cmd: String,
    /// Raw-frame capture file.
    pub output_path: PathBuf,
    pub include_raw_on_parse_error: bool,
    pub log_raw_messages: bool,
    pub auto_reconnect: bool,
    pub reconnect_initial_delay: Duration,
    pub reconnect_max_delay: Duration,
    pub handshake_timeout: Duration,
    pub idle_timeout: Duration,
    pub keep_alive_pings: bool,
    /// Stop after this many messages; 0 means unlimited.
    pub max_messages: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ws_url: String::new(),
            subscribe_cmd: String::new(),
            output_path: PathBuf::from("logs/ws_messages.json"),
            include_raw_on_parse_error: true,
            log_raw_messages: false,
            auto_reconnect: true,
            reconnect_initial_delay: Duration::from_millis(500),
            reconnect_max_delay: Duration::from_secs(30),
            handshake_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            keep_alive_pings: true,
            max_messages: 0,
        }
    }
}

/// Exponential backoff schedule for reconnect attempts.
///
/// The delay doubles after each scheduled attempt, clamped to `max`, and
/// resets to `initial` on a successful open.
#[derive(Debug, Clone)]
pub struct ReconnectState {
    pub enabled: bool,
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectState {
    pub fn new(enabled: bool, initial: Duration, max: Duration) -> Self {
        Self {
            enabled,
            initial,
            max,
            current: initial,
        }
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// The delay to wait before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        if self.current < self.max {
            self.current = (self.current * 2).min(self.max);
        }
        delay
    }
}

/// Tracks message counts and the optional stop-after-N limit.
#[derive(Debug, Clone)]
pub struct RunLimiter {
    remaining: usize,
    seen: usize,
}

impl RunLimiter {
    /// `max_messages` of 0 means unlimited.
    pub fn new(max_messages: usize) -> Self {
        Self {
            remaining: max_messages,
            seen: 0,
        }
    }

    pub fn on_message(&mut self) {
        self.seen += 1;
    }

    /// True if the run should stop after the current message.
    pub fn should_stop(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub fn seen(&self) -> usize {
        self.seen
    }
}

/// Composes the pipeline, the run limiter, and the reconnection controller,
/// and owns the event loop.
///
/// Each connect attempt mints fresh headers through `refresh_headers` so the
/// signed timestamp is never stale. The run terminates when the message
/// limit is reached or when an error occurs with reconnection disabled.
pub struct FeedHandler<'a, S: MarketSink> {
    sink: &'a mut S,
    logger: &'a dyn Logger,
}

impl<'a, S: MarketSink> FeedHandler<'a, S> {
    pub fn new(sink: &'a mut S, logger: &'a dyn Logger) -> Self {
        Self { sink, logger }
    }

    pub async fn run<F>(&mut self, options: RunOptions, mut refresh_headers: F) -> Result<(), RunError>
    where
        F: FnMut() -> Result<Vec<Header>, AuthError>,
    {
        let logger = self.logger;

        let raw_sink = FileRawMessageSink::create(&options.output_path).map_err(|_| {
            logger.log(LogLevel::Error, "md.feed_handler", "output_open_failed");
            RunError::OutputOpenFailed
        })?;

        let mut pipeline = MessagePipeline::new(
            &mut *self.sink,
            logger,
            Some(Box::new(raw_sink)),
            options.include_raw_on_parse_error,
            options.log_raw_messages,
        );
        let mut limiter = RunLimiter::new(options.max_messages);
        let mut reconnect = ReconnectState::new(
            options.auto_reconnect,
            options.reconnect_initial_delay,
            options.reconnect_max_delay,
        );
        let ws_config = WsConfig {
            handshake_timeout: options.handshake_timeout,
            idle_timeout: options.idle_timeout,
            keep_alive_pings: options.keep_alive_pings,
        };

        loop {
            let headers = match refresh_headers() {
                Ok(headers) => headers,
                Err(err) => {
                    let mut fields = LogFields::new();
                    fields.add_str("error", err.to_string());
                    logger.log_with(LogLevel::Error, "core.auth", "signing_failed", fields);
                    if !reconnect.enabled {
                        return Ok(());
                    }
                    wait_backoff(logger, &mut reconnect).await;
                    continue;
                }
            };

            let mut client = match WsClient::connect(&options.ws_url, &headers, &ws_config).await {
                Ok(client) => client,
                Err(err) => {
                    log_ws_error(logger, &err);
                    if !reconnect.enabled {
                        return Ok(());
                    }
                    wait_backoff(logger, &mut reconnect).await;
                    continue;
                }
            };

            logger.log(LogLevel::Info, "md.ws_client", "ws_open");
            reconnect.reset();

            if !options.subscribe_cmd.is_empty() {
                if let Err(err) = client.send_text(options.subscribe_cmd.clone()).await {
                    log_ws_error(logger, &err);
                    if !reconnect.enabled {
                        return Ok(());
                    }
                    wait_backoff(logger, &mut reconnect).await;
                    continue;
                }
            }

            let limit_reached = loop {
                match client.next().await {
                    Ok(WsIncoming::Text(message)) => {
                        if limiter.seen() == 0 {
                            logger.log(LogLevel::Info, "md.feed_handler", "first_message_received");
                        }
                        limiter.on_message();

                        pipeline.on_message(&message);

                        if limiter.should_stop() {
                            logger.log(LogLevel::Info, "md.feed_handler", "max_messages_reached");
                            client.close().await;
                            break true;
                        }
                    }
                    Ok(WsIncoming::Ping(payload)) => log_control(logger, "ws_ping", &payload),
                    Ok(WsIncoming::Pong(payload)) => log_control(logger, "ws_pong", &payload),
                    Ok(WsIncoming::Close(reason)) => {
                        let payload = reason.unwrap_or_default();
                        log_control(logger, "ws_control", payload.as_bytes());
                    }
                    Err(err) => {
                        log_ws_error(logger, &err);
                        break false;
                    }
                }
            };

            if limit_reached || !reconnect.enabled {
                return Ok(());
            }
            wait_backoff(logger, &mut reconnect).await;
        }
    }
}

async fn wait_backoff(logger: &dyn Logger, reconnect: &mut ReconnectState) {
    let delay = reconnect.next_delay();
    let mut fields = LogFields::new();
    fields.add_int("delay_ms", delay.as_millis() as i64);
    logger.log_with(LogLevel::Warn, "md.ws_client", "reconnect_scheduled", fields);
    tokio::time::sleep(delay).await;
}

fn log_ws_error(logger: &dyn Logger, err: &WsError) {
    let mut fields = LogFields::new();
    fields.add_str("code", err.kind.as_str());
    fields.add_str("message", err.detail.clone());
    logger.log_with(LogLevel::Error, "md.ws_client", "ws_error", fields);
}

fn log_control(logger: &dyn Logger, message: &str, payload: &[u8]) {
    let mut fields = LogFields::new();
    fields.add_str("payload", String::from_utf8_lossy(payload).into_owned());
    logger.log_with(LogLevel::Info, "md.ws_client", message, fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_clamps() {
        let mut reconnect = ReconnectState::new(
            true,
            Duration::from_millis(500),
            Duration::from_secs(30),
        );

        let delays: Vec<u64> = (0..5)
            .map(|_| reconnect.next_delay().as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000]);
    }

    #[test]
    fn backoff_clamps_to_max() {
        let mut reconnect = ReconnectState::new(
            true,
            Duration::from_millis(500),
            Duration::from_secs(30),
        );

        let mut last = Duration::ZERO;
        for _ in 0..12 {
            last = reconnect.next_delay();
        }
        assert_eq!(last, Duration::from_secs(30));
        assert_eq!(reconnect.next_delay(), Duration::from_secs(30));
    }

    #[test]
    fn backoff_resets_on_open() {
        let mut reconnect = ReconnectState::new(
            true,
            Duration::from_millis(500),
            Duration::from_secs(30),
        );

        reconnect.next_delay();
        reconnect.next_delay();
        reconnect.reset();
        assert_eq!(reconnect.next_delay(), Duration::from_millis(500));
    }

    #[test]
    fn limiter_stops_after_n_messages() {
        let mut limiter = RunLimiter::new(3);
        for expected_stop in [false, false, true] {
            limiter.on_message();
            assert_eq!(limiter.should_stop(), expected_stop);
        }
        assert_eq!(limiter.seen(), 3);
    }

    #[test]
    fn limiter_zero_means_unlimited() {
        let mut limiter = RunLimiter::new(0);
        for _ in 0..1000 {
            limiter.on_message();
            assert!(!limiter.should_stop());
        }
        assert_eq!(limiter.seen(), 1000);
    }
}
