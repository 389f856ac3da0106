pub mod memcache_client;
pub mod memory_client;
pub mod timer;

use crate::address::{Credentials, ServerAddress};
use crate::codec::Payload;
use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use memcache_client::{MemcacheClient, MemcacheConnector};
pub use memory_client::{MemoryClient, MemoryConnector};

/// Relative expirations above this many seconds are read as unix timestamps
pub const MAX_RELATIVE_TTL: u32 = 60 * 60 * 24 * 30;

/// The native key-value client the adapter drives.
///
/// Every call is a single blocking round trip. Implementations must be
/// shareable between threads since a handle may back several adapters.
pub trait KeyValueClient {
    /// Stores a payload. `ttl` follows memcached rules: 0 never expires,
    /// up to `MAX_RELATIVE_TTL` is relative, anything larger is absolute.
    fn set(&self, key: &str, payload: &Payload, ttl: u32) -> Result<()>;

    /// Returns `None` for a missing or expired key
    fn get(&self, key: &str) -> Result<Option<Payload>>;

    fn increment(&self, key: &str, offset: u64) -> Result<u64>;

    fn decrement(&self, key: &str, offset: u64) -> Result<u64>;

    /// Returns whether something was removed
    fn delete(&self, key: &str) -> Result<bool>;
}

pub type SharedClient = Arc<dyn KeyValueClient + Send + Sync>;

/// Everything needed to bring up a client for a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    pub servers: Vec<ServerAddress>,
    pub credentials: Option<Credentials>,
    pub options: BTreeMap<String, String>,
}

impl ConnectionSpec {
    pub fn new(servers: Vec<ServerAddress>) -> ConnectionSpec {
        ConnectionSpec {
            servers,
            credentials: None,
            options: BTreeMap::new(),
        }
    }
}

/// Builds clients, the point where a missing engine is detected
pub trait Connector {
    fn connect(&self, spec: &ConnectionSpec) -> Result<SharedClient>;
}
