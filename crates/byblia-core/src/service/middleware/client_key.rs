use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;

/// Key identifying a client for rate limiting, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

/// First `x-forwarded-for` entry, else `x-real-ip`, else the peer address.
pub fn client_key(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> ClientKey {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        });

    let key = match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(ConnectInfo(addr))) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    };
    ClientKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"));
        assert_eq!(client_key(&headers, None), ClientKey("203.0.113.7".to_string()));
    }

    #[test]
    fn test_peer_address_fallback() {
        let peer = ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 5555)));
        assert_eq!(client_key(&HeaderMap::new(), Some(&peer)).0, "192.0.2.1");
        assert_eq!(client_key(&HeaderMap::new(), None).0, "unknown");
    }
}
