use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::feed::RunError;
use crate::subscribe::SubscribeError;
use crate::ws::WsError;

/// Unified error for startup and run failures.
///
/// Runtime WebSocket and parse failures inside an auto-reconnecting run are
/// reported through log events instead; this type covers the paths that
/// terminate startup or the run loop.
#[derive(Debug, thiserror::Error)]
pub enum KalshiError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("subscription error: {0}")]
    Subscribe(#[from] SubscribeError),

    #[error("websocket error: {0}")]
    Ws(#[from] WsError),

    #[error("feed error: {0}")]
    Run(#[from] RunError),
}
