//! Server address parsing.
//!
//! Pool entries arrive as raw strings (`host`, `host:port`, `[v6]:port` or
//! `unix:///path`). They are parsed once when the adapter is initialized and
//! rendered as `memcache://` URLs for the native client.

use crate::error::{AdapterError, Result};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

pub const DEFAULT_PORT: u16 = 11211;
pub const UNIX_SOCKET_PREFIX: &str = "unix://";
const URL_SCHEME: &str = "memcache";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerAddress {
    Tcp { host: String, port: u16 },
    /// Full raw string, prefix included.
    Unix(String),
}

/// Username and password handed to the native client for SASL auth
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ServerAddress {
    pub fn host(&self) -> &str {
        match self {
            ServerAddress::Tcp { host, .. } => host,
            ServerAddress::Unix(path) => path,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            ServerAddress::Tcp { port, .. } => *port,
            ServerAddress::Unix(_) => 0,
        }
    }

    pub fn as_pair(&self) -> (&str, u16) {
        (self.host(), self.port())
    }

    /// Renders the address as a connection url understood by the `memcache` crate.
    pub fn to_url(
        &self,
        credentials: Option<&Credentials>,
        options: &BTreeMap<String, String>,
    ) -> Result<Url> {
        let raw = match self {
            ServerAddress::Tcp { host, port } => format!("{URL_SCHEME}://{host}:{port}"),
            ServerAddress::Unix(path) => {
                let socket_path = path.strip_prefix(UNIX_SOCKET_PREFIX).unwrap_or(path);
                format!("{URL_SCHEME}://{socket_path}")
            }
        };
        let mut url =
            Url::parse(&raw).map_err(|_| AdapterError::InvalidServerAddress(self.to_string()))?;

        if let Some(credentials) = credentials {
            match self {
                ServerAddress::Tcp { .. } => {
                    url.set_username(&credentials.username)
                        .and_then(|_| url.set_password(Some(&credentials.password)))
                        .map_err(|_| AdapterError::InvalidServerAddress(self.to_string()))?;
                }
                ServerAddress::Unix(_) => {
                    warn!("Credentials are ignored for unix socket {}", self);
                }
            }
        }

        if !options.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in options {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerAddress::Tcp { host, port } => write!(f, "{host}:{port}"),
            ServerAddress::Unix(path) => f.write_str(path),
        }
    }
}

/// Splits a raw pool entry into host and port.
///
/// A bracketed literal is only split on `]:`. `[::1]` without a port is kept
/// verbatim, brackets included, and gets the default port.
///
/// Anything after the split must be a valid port: `host:`, `host:abc`, `[::1]:`
/// and an unbracketed `::1` all fail with `InvalidServerAddress`, which makes
/// `CacheAdapter::init` fail too.
pub fn parse_server_address(raw: &str) -> Result<ServerAddress> {
    if raw.starts_with(UNIX_SOCKET_PREFIX) {
        return Ok(ServerAddress::Unix(raw.to_string()));
    }

    let split_at = if raw.starts_with('[') {
        raw.find("]:").map(|position| position + 1)
    } else {
        raw.find(':')
    };

    match split_at {
        Some(position) => {
            let host = &raw[..position];
            let port = raw[position + 1..]
                .parse::<u16>()
                .map_err(|_| AdapterError::InvalidServerAddress(raw.to_string()))?;
            Ok(ServerAddress::Tcp {
                host: host.to_string(),
                port,
            })
        }
        None => Ok(ServerAddress::Tcp {
            host: raw.to_string(),
            port: DEFAULT_PORT,
        }),
    }
}

pub fn parse_server_addresses<S: AsRef<str>>(servers: &[S]) -> Result<Vec<ServerAddress>> {
    servers
        .iter()
        .map(|server| parse_server_address(server.as_ref()))
        .collect()
}
