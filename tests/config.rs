//! Tests for configuration loading, defaults, and validation.

use kalshi_md::{load_config, ConfigError, DropPolicy, LogLevel};

use std::io::Write;

fn load_str(contents: &str) -> Result<kalshi_md::Config, ConfigError> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    load_config(file.path())
}

const MINIMAL: &str = r#"{
    "env": "demo",
    "ws_url": "wss://demo-api.kalshi.co/trade-api/ws/v2",
    "subscription": {
        "channels": ["orderbook_delta", "trade"],
        "market_tickers": ["KXGOVSHUT-26JAN31"]
    }
}"#;

#[test]
fn minimal_config_applies_defaults() {
    let config = load_str(MINIMAL).unwrap();

    assert_eq!(config.env, "demo");
    assert_eq!(config.ws_url, "wss://demo-api.kalshi.co/trade-api/ws/v2");
    assert_eq!(config.subscription.channels.len(), 2);

    assert_eq!(config.ws.handshake_timeout_ms, 30_000);
    assert_eq!(config.ws.idle_timeout_ms, 60_000);
    assert!(config.ws.keep_alive_pings);
    assert!(config.ws.auto_reconnect);
    assert_eq!(config.ws.reconnect_initial_delay_ms, 500);
    assert_eq!(config.ws.reconnect_max_delay_ms, 30_000);

    assert_eq!(config.logging.level, LogLevel::Info);
    assert_eq!(config.logging.queue_size, 10_000);
    assert_eq!(config.logging.drop_policy, DropPolicy::DropOldest);
    assert!(config.logging.include_raw_on_parse_error);
    assert!(!config.logging.log_raw_messages);
    assert_eq!(
        config.logging.output_path.to_str().unwrap(),
        "logs/kalshi.log.json"
    );
    assert_eq!(
        config.output.raw_messages_path.to_str().unwrap(),
        "logs/ws_messages.json"
    );
}

#[test]
fn full_config_overrides_defaults() {
    let config = load_str(
        r#"{
            "env": "prod",
            "ws_url": "wss://api.elections.kalshi.com/trade-api/ws/v2",
            "subscription": {
                "channels": ["trade"],
                "market_tickers": []
            },
            "ws": {
                "handshake_timeout_ms": 5000,
                "idle_timeout_ms": 10000,
                "keep_alive_pings": false,
                "auto_reconnect": false,
                "reconnect_initial_delay_ms": 250,
                "reconnect_max_delay_ms": 8000
            },
            "logging": {
                "level": "debug",
                "queue_size": 64,
                "drop_policy": "drop_newest",
                "include_raw_on_parse_error": false,
                "log_raw_messages": true,
                "output_path": "out/log.json"
            },
            "output": {
                "raw_messages_path": "out/raw.json"
            }
        }"#,
    )
    .unwrap();

    assert_eq!(config.ws.handshake_timeout_ms, 5000);
    assert!(!config.ws.auto_reconnect);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.queue_size, 64);
    assert_eq!(config.logging.drop_policy, DropPolicy::DropNewest);
    assert!(!config.logging.include_raw_on_parse_error);
    assert!(config.logging.log_raw_messages);
    assert_eq!(config.output.raw_messages_path.to_str().unwrap(), "out/raw.json");
}

#[test]
fn zero_queue_size_is_rejected() {
    let result = load_str(
        r#"{
            "env": "demo",
            "ws_url": "wss://h/p",
            "subscription": {"channels": ["trade"], "market_tickers": []},
            "logging": {"queue_size": 0}
        }"#,
    );
    assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
}

#[test]
fn unknown_log_level_is_rejected() {
    let result = load_str(
        r#"{
            "env": "demo",
            "ws_url": "wss://h/p",
            "subscription": {"channels": ["trade"], "market_tickers": []},
            "logging": {"level": "loud"}
        }"#,
    );
    assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
}

#[test]
fn unknown_drop_policy_is_rejected() {
    let result = load_str(
        r#"{
            "env": "demo",
            "ws_url": "wss://h/p",
            "subscription": {"channels": ["trade"], "market_tickers": []},
            "logging": {"drop_policy": "drop_random"}
        }"#,
    );
    assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
}

#[test]
fn empty_channel_list_is_rejected() {
    let result = load_str(
        r#"{
            "env": "demo",
            "ws_url": "wss://h/p",
            "subscription": {"channels": [], "market_tickers": []}
        }"#,
    );
    assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
}

#[test]
fn missing_subscription_section_is_rejected() {
    let result = load_str(r#"{"env": "demo", "ws_url": "wss://h/p"}"#);
    assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
}

#[test]
fn malformed_json_is_rejected() {
    let result = load_str("{not json");
    assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
}

#[test]
fn missing_file_is_file_open_failed() {
    let result = load_config("/nonexistent/config.json");
    assert!(matches!(result, Err(ConfigError::FileOpenFailed(_))));
}
