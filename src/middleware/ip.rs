use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{connect_info::ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};

use crate::state::AppState;

/// Used when neither connection info nor a trusted proxy header is available.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Strips the port from a `host:port` remote address.
///
/// Handles IPv6 in brackets (`[::1]:8080`). Anything that does not parse is
/// returned verbatim, so a ban on the raw string still matches.
pub fn client_address(remote: &str) -> String {
    if let Ok(addr) = remote.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    if let Some((host, port)) = remote.rsplit_once(':') {
        if !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok() {
            return host.to_string();
        }
    }
    remote.to_string()
}

/// First address from `X-Forwarded-For`, else `X-Real-IP`.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(h) = headers.get("x-forwarded-for").and_then(|hv| hv.to_str().ok()) {
        if let Some(first) = h.split(',').next() {
            if let Ok(ip) = first.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    headers.get("x-real-ip").and_then(|hv| hv.to_str().ok()).and_then(|h| h.trim().parse::<IpAddr>().ok())
}

/// Address used for ban lookups and logging.
///
/// Proxy headers are only consulted when `trust_forwarded` is set; otherwise any
/// client could pick its own address.
pub fn resolve_client_address(headers: &HeaderMap, extensions: &Extensions, trust_forwarded: bool) -> String {
    if trust_forwarded {
        if let Some(ip) = forwarded_ip(headers) {
            return ip.to_string();
        }
    }
    remote_socket(extensions)
        .map(|addr| client_address(&addr.to_string()))
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

pub fn remote_socket(extensions: &Extensions) -> Option<SocketAddr> {
    extensions.get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| *addr)
}

/// Extractor for the client's address as seen by the ban list.
///
/// Never rejects. Without connection info (e.g. in tests) the address is
/// [`UNKNOWN_ADDRESS`].
#[derive(Clone, Debug)]
pub struct ClientAddress {
    pub address: String,
    /// The transport peer, regardless of proxy headers.
    pub peer: Option<SocketAddr>,
}

impl ClientAddress {
    pub fn is_loopback_peer(&self) -> bool {
        self.peer.map(|addr| addr.ip().is_loopback()).unwrap_or(false)
    }
}

impl FromRequestParts<AppState> for ClientAddress {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let trust = state.config.security.trust_forwarded_headers;
        Ok(ClientAddress {
            address: resolve_client_address(&parts.headers, &parts.extensions, trust),
            peer: remote_socket(&parts.extensions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_address_strips_port() {
        assert_eq!(client_address("192.168.1.20:51234"), "192.168.1.20");
        assert_eq!(client_address("[::1]:8080"), "::1");
        assert_eq!(client_address("localhost:80"), "localhost");
    }

    #[test]
    fn test_client_address_falls_back_to_raw() {
        assert_eq!(client_address("not an address"), "not an address");
        assert_eq!(client_address("::1"), "::1");
        assert_eq!(client_address("host:notaport"), "host:notaport");
    }

    #[test]
    fn test_forwarded_headers_only_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let mut ext = Extensions::new();
        ext.insert(ConnectInfo("10.0.0.1:4000".parse::<SocketAddr>().unwrap()));

        assert_eq!(resolve_client_address(&headers, &ext, true), "203.0.113.9");
        assert_eq!(resolve_client_address(&headers, &ext, false), "10.0.0.1");
    }

    #[test]
    fn test_real_ip_and_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(resolve_client_address(&headers, &Extensions::new(), true), "198.51.100.4");
        assert_eq!(resolve_client_address(&HeaderMap::new(), &Extensions::new(), true), UNKNOWN_ADDRESS);
    }
}
