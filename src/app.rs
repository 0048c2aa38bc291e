//! Application assembly: config, logger, credentials, and subscription.

use crate::auth::{AuthError, Header, KalshiAuth, WS_PATH};
use crate::config::{load_config, Config};
use crate::error::KalshiError;
use crate::feed::RunOptions;
use crate::logging::{AsyncJsonLogger, AsyncJsonLoggerOptions, LogFields, LogLevel, Logger};
use crate::subscribe::SubscriptionCommand;

use std::path::Path;
use std::time::Duration;

const SUBSCRIBE_ID: u64 = 1;

/// Everything a feed run needs, built from a config file and the process
/// environment.
///
/// Construction fails fast: credentials are loaded and a header bundle is
/// minted once up front, so a bad key is reported at startup instead of on
/// the first connect attempt.
pub struct AppContext {
    config: Config,
    logger: AsyncJsonLogger,
    auth: KalshiAuth,
    subscription: SubscriptionCommand,
}

impl AppContext {
    /// Build the context from a config path.
    pub fn build(config_path: impl AsRef<Path>) -> Result<Self, KalshiError> {
        let config = load_config(config_path)?;

        let logger = AsyncJsonLogger::new(AsyncJsonLoggerOptions {
            level: config.logging.level,
            queue_size: config.logging.queue_size,
            drop_policy: config.logging.drop_policy,
            output_path: config.logging.output_path.clone(),
        });

        let auth = match KalshiAuth::from_env() {
            Ok(auth) => auth,
            Err(err) => {
                let mut fields = LogFields::new();
                fields.add_str("error", err.to_string());
                logger.log_with(LogLevel::Error, "core.auth", "auth_error", fields);
                return Err(err.into());
            }
        };

        let subscription = match SubscriptionCommand::from_config(&config, SUBSCRIBE_ID) {
            Ok(subscription) => subscription,
            Err(err) => {
                logger.log(
                    LogLevel::Error,
                    "core.config",
                    "orderbook_delta_requires_market_tickers",
                );
                return Err(err.into());
            }
        };

        if let Err(err) = auth.ws_headers_now(WS_PATH) {
            let mut fields = LogFields::new();
            fields.add_str("error", err.to_string());
            logger.log_with(LogLevel::Error, "core.auth", "signing_failed", fields);
            return Err(err.into());
        }

        Ok(Self {
            config,
            logger,
            auth,
            subscription,
        })
    }

    pub fn logger(&self) -> &dyn Logger {
        &self.logger
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscription(&self) -> &SubscriptionCommand {
        &self.subscription
    }

    /// Feed run options derived from the loaded configuration.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            ws_url: self.config.ws_url.clone(),
            subscribe_cmd: self.subscription.json().to_string(),
            output_path: self.config.output.raw_messages_path.clone(),
            include_raw_on_parse_error: self.config.logging.include_raw_on_parse_error,
            log_raw_messages: self.config.logging.log_raw_messages,
            auto_reconnect: self.config.ws.auto_reconnect,
            reconnect_initial_delay: Duration::from_millis(self.config.ws.reconnect_initial_delay_ms),
            reconnect_max_delay: Duration::from_millis(self.config.ws.reconnect_max_delay_ms),
            handshake_timeout: Duration::from_millis(self.config.ws.handshake_timeout_ms),
            idle_timeout: Duration::from_millis(self.config.ws.idle_timeout_ms),
            keep_alive_pings: self.config.ws.keep_alive_pings,
            max_messages: 0,
        }
    }

    /// A header minter producing a freshly timestamped bundle per call.
    pub fn refresh_headers(&self) -> impl FnMut() -> Result<Vec<Header>, AuthError> + '_ {
        move || self.auth.ws_headers_now(WS_PATH)
    }

    /// Emit a config summary to the structured log.
    pub fn log_config(&self) {
        let mut ws_fields = LogFields::new();
        ws_fields.add_str("env", self.config.env.clone());
        ws_fields.add_str("ws_url", self.config.ws_url.clone());
        self.logger
            .log_with(LogLevel::Info, "core.config", "ws_url", ws_fields);

        let mut sub_fields = LogFields::new();
        sub_fields.add_str_list("channels", self.subscription.request().channels.clone());
        sub_fields.add_str_list(
            "market_tickers",
            self.subscription.request().market_tickers.clone(),
        );
        self.logger
            .log_with(LogLevel::Info, "core.config", "subscription", sub_fields);
    }
}
