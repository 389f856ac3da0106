use super::timer::{SystemTimer, Timer};
use super::{ConnectionSpec, Connector, KeyValueClient, SharedClient, MAX_RELATIVE_TTL};
use crate::codec::Payload;
use crate::error::{AdapterError, Result};
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Record {
    payload: Payload,
    /// Absolute unix time, 0 means the record never expires
    expires_at: u32,
}

/// In-process store following memcached item semantics.
///
/// Nothing is evicted. Expired records are dropped lazily on access.
pub struct MemoryClient {
    memory: DashMap<String, Record>,
    timer: Arc<dyn Timer + Send + Sync>,
}

impl MemoryClient {
    pub fn new(timer: Arc<dyn Timer + Send + Sync>) -> MemoryClient {
        let parallelism = std::thread::available_parallelism().map_or(1, usize::from);
        MemoryClient {
            memory: DashMap::with_shard_amount(Self::get_number_of_shards(parallelism)),
            timer,
        }
    }

    // Shard count is the power of two closest below parallelism^2 / 4, at least 2.
    fn get_number_of_shards(parallelism: usize) -> usize {
        let parallelism = parallelism.clamp(2, 192);
        let optimal_number_shards = parallelism.pow(2) / 4;
        if optimal_number_shards < 2 {
            return 2;
        }
        2usize.pow(optimal_number_shards.ilog2()).max(2)
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    fn expiration(&self, ttl: u32) -> u32 {
        match ttl {
            0 => 0,
            ttl if ttl <= MAX_RELATIVE_TTL => self.timer.timestamp().saturating_add(ttl),
            absolute => absolute,
        }
    }

    fn is_expired(&self, record: &Record) -> bool {
        record.expires_at != 0 && record.expires_at <= self.timer.timestamp()
    }

    fn incr_decr(&self, key: &str, offset: u64, increment: bool) -> Result<u64> {
        match self.memory.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if self.is_expired(entry.get()) {
                    entry.remove();
                    return Err(AdapterError::OperationFailed(format!("{key}: not found")));
                }
                let record = entry.get_mut();
                let value = std::str::from_utf8(&record.payload.data)
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .ok_or_else(|| {
                        AdapterError::OperationFailed(format!("{key}: incr/decr on non numeric value"))
                    })?;
                let value = if increment {
                    value.wrapping_add(offset)
                } else {
                    value.saturating_sub(offset)
                };
                record.payload.data = Bytes::from(value.to_string());
                Ok(value)
            }
            Entry::Vacant(_) => Err(AdapterError::OperationFailed(format!("{key}: not found"))),
        }
    }
}

impl KeyValueClient for MemoryClient {
    fn set(&self, key: &str, payload: &Payload, ttl: u32) -> Result<()> {
        let record = Record {
            payload: payload.clone(),
            expires_at: self.expiration(ttl),
        };
        self.memory.insert(key.to_string(), record);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Payload>> {
        match self.memory.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                if self.is_expired(entry.get()) {
                    entry.remove();
                    return Ok(None);
                }
                Ok(Some(entry.get().payload.clone()))
            }
            Entry::Vacant(_) => Ok(None),
        }
    }

    fn increment(&self, key: &str, offset: u64) -> Result<u64> {
        self.incr_decr(key, offset, true)
    }

    fn decrement(&self, key: &str, offset: u64) -> Result<u64> {
        self.incr_decr(key, offset, false)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        match self.memory.remove(key) {
            Some((_key, record)) => Ok(!self.is_expired(&record)),
            None => Ok(false),
        }
    }
}

/// Hands out a fresh in-process store per connection
#[derive(Clone)]
pub struct MemoryConnector {
    timer: Arc<dyn Timer + Send + Sync>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        MemoryConnector::new(Arc::new(SystemTimer::new()))
    }
}

impl MemoryConnector {
    pub fn new(timer: Arc<dyn Timer + Send + Sync>) -> MemoryConnector {
        MemoryConnector { timer }
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, spec: &ConnectionSpec) -> Result<SharedClient> {
        debug!(
            "Creating in-process store standing in for {} server(s)",
            spec.servers.len()
        );
        Ok(Arc::new(MemoryClient::new(self.timer.clone())))
    }
}
