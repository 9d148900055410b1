//! Client identity used to partition rate limits.
//!
//! Usage: add `ClientKey` as an extractor parameter.
//!
//! ```ignore
//! async fn my_handler(client: ClientKey, ...) -> ... {
//!     limiter.check(client.as_str()).await;
//! }
//! ```
//!
//! The key comes from proxy headers, which clients can forge when the
//! service is not behind a trusted proxy. It partitions counters; it is not
//! an authentication boundary.

use std::{convert::Infallible, fmt};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(String);

impl ClientKey {
    #[cfg(test)]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// First hop of `X-Forwarded-For`, then `X-Real-IP`, then `unknown`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let forwarded = header_str(headers, FORWARDED_FOR)
            .and_then(|chain| chain.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        let key = forwarded
            .or_else(|| header_str(headers, REAL_IP).map(str::trim).filter(|ip| !ip.is_empty()))
            .unwrap_or(UNKNOWN);

        Self(key.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
