use super::{ConnectionSpec, Connector, KeyValueClient, SharedClient};
use crate::codec::Payload;
use crate::error::{AdapterError, Result};
use bytes::Bytes;
use memcache::ToMemcacheValue;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Connection option selecting how many connections each server pool keeps
pub const POOL_SIZE_OPTION: &str = "pool_size";
pub const DEFAULT_POOL_SIZE: u32 = 1;

/// Client backed by the `memcache` crate, which owns hashing and pooling
pub struct MemcacheClient {
    client: memcache::Client,
    urls: Vec<String>,
}

impl fmt::Debug for MemcacheClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemcacheClient")
            .field("client", &"<memcache::Client>")
            .field("servers", &self.urls.len())
            .finish()
    }
}

impl MemcacheClient {
    pub fn connect(spec: &ConnectionSpec) -> Result<MemcacheClient> {
        let urls = spec
            .servers
            .iter()
            .map(|server| {
                server
                    .to_url(spec.credentials.as_ref(), &spec.options)
                    .map(String::from)
            })
            .collect::<Result<Vec<String>>>()?;

        let pool_size = match spec.options.get(POOL_SIZE_OPTION) {
            Some(size) => match size.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(AdapterError::InvalidConfig(format!(
                        "{POOL_SIZE_OPTION} must be a positive integer, got {size}"
                    )))
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        // `connect_timeout` in the urls bounds how long building the pool may block
        let client = memcache::Client::with_pool_size(urls.clone(), pool_size)
            .map_err(|err| AdapterError::EngineUnavailable(err.to_string()))?;
        debug!("Connected memcache client to {} server(s)", urls.len());
        Ok(MemcacheClient { client, urls })
    }
}

impl<W: Write> ToMemcacheValue<W> for &Payload {
    fn get_flags(&self) -> u32 {
        self.flags
    }

    fn get_length(&self) -> usize {
        self.data.len()
    }

    fn write_to(&self, stream: &mut W) -> io::Result<()> {
        stream.write_all(&self.data)
    }
}

impl KeyValueClient for MemcacheClient {
    fn set(&self, key: &str, payload: &Payload, ttl: u32) -> Result<()> {
        self.client.set(key, payload, ttl)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Payload>> {
        let value: Option<(Vec<u8>, u32)> = self.client.get(key)?;
        Ok(value.map(|(data, flags)| Payload::new(Bytes::from(data), flags)))
    }

    fn increment(&self, key: &str, offset: u64) -> Result<u64> {
        Ok(self.client.increment(key, offset)?)
    }

    fn decrement(&self, key: &str, offset: u64) -> Result<u64> {
        Ok(self.client.decrement(key, offset)?)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.client.delete(key)?)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MemcacheConnector;

impl Connector for MemcacheConnector {
    fn connect(&self, spec: &ConnectionSpec) -> Result<SharedClient> {
        Ok(Arc::new(MemcacheClient::connect(spec)?))
    }
}
