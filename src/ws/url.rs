use super::{WsError, WsErrorKind};

const WSS_PREFIX: &str = "wss://";

/// Parsed `wss://` URL parts.
///
/// The port stays textual; it is passed through unchanged to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsUrl {
    pub host: String,
    pub port: String,
    pub target: String,
}

/// Split a `wss://` URL into host, port, and request target.
///
/// The port defaults to `443` and the target to `/` when absent. Any other
/// scheme, or an empty host or port, fails with `InvalidUrl`.
pub fn parse_ws_url(url: &str) -> Result<WsUrl, WsError> {
    let rest = url
        .strip_prefix(WSS_PREFIX)
        .ok_or_else(|| WsError::new(WsErrorKind::InvalidUrl, "expected wss:// scheme"))?;

    let (host_port, target) = match rest.find('/') {
        Some(slash) => (&rest[..slash], &rest[slash..]),
        None => (rest, "/"),
    };

    if host_port.is_empty() {
        return Err(WsError::new(WsErrorKind::InvalidUrl, "missing host"));
    }

    let (host, port) = match host_port.find(':') {
        Some(colon) => (&host_port[..colon], &host_port[colon + 1..]),
        None => (host_port, "443"),
    };

    if host.is_empty() || port.is_empty() {
        return Err(WsError::new(
            WsErrorKind::InvalidUrl,
            "missing host or port",
        ));
    }

    Ok(WsUrl {
        host: host.to_string(),
        port: port.to_string(),
        target: target.to_string(),
    })
}
