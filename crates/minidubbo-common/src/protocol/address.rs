//! Provider addresses.
//!
//! Addresses travel through the coordination service and the command line as
//! plain `"host:port"` strings. [`Address`] is the parsed, immutable form.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use super::error::MinidubboError;

/// A provider endpoint, externally represented as `"host:port"`.
///
/// The host is kept verbatim (it may be a DNS name); it is only resolved when
/// a connection is opened.
///
/// # Example
///
/// ```
/// use minidubbo_common::Address;
///
/// let addr: Address = "127.0.0.1:9001".parse().unwrap();
/// assert_eq!(addr.host(), "127.0.0.1");
/// assert_eq!(addr.port(), 9001);
/// assert_eq!(addr.to_string(), "127.0.0.1:9001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    host: String,
    port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Address {
    type Err = MinidubboError;

    /// Parses `"host:port"`, splitting on the last colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| MinidubboError::InvalidAddress(format!("'{}' is missing a port", s)))?;

        // Bracketed IPv6 literals keep their brackets out of the host.
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if host.is_empty() {
            return Err(MinidubboError::InvalidAddress(format!("'{}' has an empty host", s)));
        }

        let port = port
            .parse::<u16>()
            .map_err(|e| {
                MinidubboError::InvalidAddress(format!("'{}' has an invalid port: {}", s, e))
            })?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}
