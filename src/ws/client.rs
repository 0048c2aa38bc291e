use super::url::parse_ws_url;
use super::{WsError, WsErrorKind};
use crate::auth::Header;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::{interval_at, timeout_at, Instant, Interval, MissedTickBehavior};
use tokio_native_tls::TlsStream;
use tokio_tungstenite::client_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue, Request};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use std::net::SocketAddr;
use std::time::Duration;

type WsStream = WebSocketStream<TlsStream<TcpStream>>;

/// Socket timeouts and keep-alive policy for a connection.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Single deadline covering the resolve/connect/TLS/upgrade steps.
    pub handshake_timeout: Duration,
    /// Maximum silence tolerated on the streaming read.
    pub idle_timeout: Duration,
    /// Send pings at half the idle interval to keep quiet connections live.
    pub keep_alive_pings: bool,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            keep_alive_pings: true,
        }
    }
}

/// One item from the stream: a complete text frame or a control frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsIncoming {
    Text(String),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close(Option<String>),
}

/// TLS WebSocket client with split read/write halves.
///
/// `connect` walks the full state machine explicitly — DNS resolve, TCP
/// connect, TLS handshake with SNI and peer verification against the system
/// roots, then the WebSocket upgrade with the caller's headers injected —
/// so each failure surfaces with the error kind of the phase that failed.
pub struct WsClient {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    idle_timeout: Duration,
    ping_timer: Option<Interval>,
}

impl WsClient {
    /// Connect, authenticate the upgrade with `headers`, and open the stream.
    pub async fn connect(
        url: &str,
        headers: &[Header],
        config: &WsConfig,
    ) -> Result<Self, WsError> {
        let parsed = parse_ws_url(url)?;

        // One budget for the whole resolve -> connect -> TLS -> upgrade walk.
        let deadline = Instant::now() + config.handshake_timeout;

        let addrs: Vec<SocketAddr> = timeout_at(
            deadline,
            lookup_host(format!("{}:{}", parsed.host, parsed.port)),
        )
        .await
        .map_err(|_| WsError::new(WsErrorKind::ResolveFailed, "dns resolution timed out"))?
        .map_err(|err| WsError::new(WsErrorKind::ResolveFailed, err.to_string()))?
        .collect();
        if addrs.is_empty() {
            return Err(WsError::new(
                WsErrorKind::ResolveFailed,
                "host resolved to no addresses",
            ));
        }

        let tcp = timeout_at(deadline, TcpStream::connect(addrs.as_slice()))
            .await
            .map_err(|_| WsError::new(WsErrorKind::ConnectFailed, "tcp connect timed out"))?
            .map_err(|err| WsError::new(WsErrorKind::ConnectFailed, err.to_string()))?;

        let connector = native_tls::TlsConnector::new()
            .map_err(|err| WsError::new(WsErrorKind::SslHandshakeFailed, err.to_string()))?;
        let connector = tokio_native_tls::TlsConnector::from(connector);
        let tls = timeout_at(deadline, connector.connect(&parsed.host, tcp))
            .await
            .map_err(|_| WsError::new(WsErrorKind::SslHandshakeFailed, "tls handshake timed out"))?
            .map_err(|err| WsError::new(WsErrorKind::SslHandshakeFailed, err.to_string()))?;

        let request = upgrade_request(url, headers)?;
        let (stream, _response) = timeout_at(deadline, client_async(request, tls))
            .await
            .map_err(|_| {
                WsError::new(WsErrorKind::WsHandshakeFailed, "websocket handshake timed out")
            })?
            .map_err(|err| WsError::new(WsErrorKind::WsHandshakeFailed, err.to_string()))?;

        let (write, read) = stream.split();
        let ping_timer = config.keep_alive_pings.then(|| {
            let period = (config.idle_timeout / 2).max(Duration::from_secs(1));
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });

        Ok(Self {
            write,
            read,
            idle_timeout: config.idle_timeout,
            ping_timer,
        })
    }

    /// Await the next complete message from the server.
    ///
    /// Text frames are returned as-is; binary frames are decoded as UTF-8
    /// text. Ping frames are answered with a pong before being reported.
    /// Exceeding the idle timeout, or the stream ending, yields `ReadFailed`.
    pub async fn next(&mut self) -> Result<WsIncoming, WsError> {
        loop {
            match self.read_frame().await? {
                Message::Text(text) => return Ok(WsIncoming::Text(text)),
                Message::Binary(bytes) => {
                    let text = String::from_utf8(bytes)
                        .map_err(|err| WsError::new(WsErrorKind::ReadFailed, err.to_string()))?;
                    return Ok(WsIncoming::Text(text));
                }
                Message::Ping(payload) => {
                    self.write
                        .send(Message::Pong(payload.clone()))
                        .await
                        .map_err(|err| {
                            WsError::new(WsErrorKind::WriteFailed, err.to_string())
                        })?;
                    return Ok(WsIncoming::Ping(payload));
                }
                Message::Pong(payload) => return Ok(WsIncoming::Pong(payload)),
                Message::Close(frame) => {
                    return Ok(WsIncoming::Close(frame.map(|f| f.reason.into_owned())));
                }
                Message::Frame(_) => {}
            }
        }
    }

    /// Send one text frame.
    pub async fn send_text(&mut self, payload: String) -> Result<(), WsError> {
        self.write
            .send(Message::Text(payload))
            .await
            .map_err(|err| WsError::new(WsErrorKind::WriteFailed, err.to_string()))
    }

    /// Issue a graceful close with a normal close code, ignoring errors.
    pub async fn close(&mut self) {
        let _ = self
            .write
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            })))
            .await;
    }

    async fn read_frame(&mut self) -> Result<Message, WsError> {
        // The idle deadline is re-armed only by inbound frames (each call to
        // this method); outgoing keep-alive pings must not extend it, or a
        // dead peer would never trip the timeout.
        let deadline = Instant::now() + self.idle_timeout;
        loop {
            match self.ping_timer.as_mut() {
                Some(timer) => {
                    tokio::select! {
                        result = timeout_at(deadline, self.read.next()) => {
                            return flatten_read(result);
                        }
                        _ = timer.tick() => {}
                    }
                    self.write
                        .send(Message::Ping(Vec::new()))
                        .await
                        .map_err(|err| {
                            WsError::new(WsErrorKind::WriteFailed, err.to_string())
                        })?;
                }
                None => {
                    let result = timeout_at(deadline, self.read.next()).await;
                    return flatten_read(result);
                }
            }
        }
    }
}

type ReadResult =
    Result<Option<Result<Message, tokio_tungstenite::tungstenite::Error>>, tokio::time::error::Elapsed>;

fn flatten_read(result: ReadResult) -> Result<Message, WsError> {
    match result {
        Err(_) => Err(WsError::new(WsErrorKind::ReadFailed, "idle timeout expired")),
        Ok(None) => Err(WsError::new(WsErrorKind::ReadFailed, "websocket stream ended")),
        Ok(Some(Err(err))) => Err(WsError::new(WsErrorKind::ReadFailed, err.to_string())),
        Ok(Some(Ok(message))) => Ok(message),
    }
}

fn upgrade_request(url: &str, headers: &[Header]) -> Result<Request<()>, WsError> {
    let mut request: Request<()> = url
        .into_client_request()
        .map_err(|err| WsError::new(WsErrorKind::WsHandshakeFailed, err.to_string()))?;

    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| WsError::new(WsErrorKind::WsHandshakeFailed, err.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| WsError::new(WsErrorKind::WsHandshakeFailed, err.to_string()))?;
        request.headers_mut().insert(name, value);
    }

    Ok(request)
}
