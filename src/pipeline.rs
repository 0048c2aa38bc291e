//! Per-frame processing: raw capture, decode, dispatch, failure logging.

use crate::codec::{decode_event, MarketEvent, ParseError};
use crate::logging::{LogFields, LogLevel, Logger};
use crate::sink::MarketSink;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Destination for raw WebSocket frames.
pub trait RawMessageSink {
    /// Persist a single raw frame.
    fn write(&mut self, message: &str);
}

/// Raw sink that writes one line per frame to a file.
pub struct FileRawMessageSink {
    out: File,
}

impl FileRawMessageSink {
    /// Open the output file, creating parent directories if needed.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            out: File::create(path)?,
        })
    }
}

impl RawMessageSink for FileRawMessageSink {
    fn write(&mut self, message: &str) {
        // Capture failures never interrupt the feed.
        let _ = writeln!(self.out, "{message}");
        let _ = self.out.flush();
    }
}

/// Routes each complete text frame through the raw sink, the codec, and the
/// typed market sink.
///
/// The pipeline never panics and never surfaces errors to its caller; every
/// failure becomes a log event.
pub struct MessagePipeline<'a, S: MarketSink> {
    sink: &'a mut S,
    logger: &'a dyn Logger,
    raw_sink: Option<Box<dyn RawMessageSink>>,
    include_raw_on_parse_error: bool,
    log_raw_messages: bool,
}

impl<'a, S: MarketSink> MessagePipeline<'a, S> {
    pub fn new(
        sink: &'a mut S,
        logger: &'a dyn Logger,
        raw_sink: Option<Box<dyn RawMessageSink>>,
        include_raw_on_parse_error: bool,
        log_raw_messages: bool,
    ) -> Self {
        Self {
            sink,
            logger,
            raw_sink,
            include_raw_on_parse_error,
            log_raw_messages,
        }
    }

    /// Process a single WebSocket text frame.
    pub fn on_message(&mut self, message: &str) {
        if let Some(raw_sink) = &mut self.raw_sink {
            raw_sink.write(message);
        }

        if self.log_raw_messages {
            let mut fields = LogFields::new();
            fields.add_uint("bytes", message.len() as u64);
            self.logger.log_raw(
                LogLevel::Debug,
                "md.ws_client",
                "ws_message",
                fields,
                message.to_string(),
            );
        }

        match decode_event(message) {
            Ok(event) => self.dispatch(&event),
            Err(ParseError::UnsupportedType) => {
                self.logger
                    .log(LogLevel::Debug, "md.dispatcher", "unsupported_message_type");
            }
            Err(err) => self.log_parse_error(err, message),
        }
    }

    fn dispatch(&mut self, event: &MarketEvent) {
        match event {
            MarketEvent::Snapshot(snapshot) => self.sink.on_snapshot(snapshot),
            MarketEvent::Delta(delta) => self.sink.on_delta(delta),
            MarketEvent::Trade(trade) => self.sink.on_trade(trade),
            MarketEvent::Status(status) => self.sink.on_status(status),
        }
    }

    fn log_parse_error(&self, error: ParseError, raw: &str) {
        let mut fields = LogFields::new();
        fields.add_str("parse_error", error.as_str());
        if self.include_raw_on_parse_error {
            self.logger.log_raw(
                LogLevel::Warn,
                "md.dispatcher",
                "parse_error",
                fields,
                raw.to_string(),
            );
        } else {
            self.logger
                .log_with(LogLevel::Warn, "md.dispatcher", "parse_error", fields);
        }
    }
}
