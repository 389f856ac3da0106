//! Memcached cache engine adapter.
//!
//! Translates single-key cache calls into calls on a pooled native client.
//! Keys get the configured prefix, durations are remapped to what memcached
//! expects and store failures surface as `false`/`None` rather than errors.

use crate::address::{parse_server_addresses, ServerAddress};
use crate::capability::{CacheCapability, CapabilitySet, Operation};
use crate::client::{ConnectionSpec, Connector, MAX_RELATIVE_TTL};
use crate::codec::Codec;
use crate::config::AdapterConfig;
use crate::connection::{ConnectionHandle, ConnectionRegistry};
use crate::error::{AdapterError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_OFFSET: u64 = 1;

pub struct CacheAdapter {
    config: AdapterConfig,
    codec: Codec,
    handle: ConnectionHandle,
}

impl CacheAdapter {
    /// Validates `config`, parses its pool and acquires a connection handle
    /// from `registry`, shared when `persistent` is set.
    pub fn init(
        config: AdapterConfig,
        registry: &ConnectionRegistry,
        connector: &dyn Connector,
    ) -> Result<CacheAdapter> {
        config.validate()?;
        let servers = parse_server_addresses(&config.server_list())?;
        let spec = ConnectionSpec {
            servers,
            credentials: config.credentials(),
            options: config.options.clone(),
        };
        let handle = registry.acquire(config.persistent.as_deref(), &spec, connector)?;
        Ok(CacheAdapter {
            codec: Codec::new(config.serialize, config.compress),
            config,
            handle,
        })
    }

    /// Re-initialization keeps the open handle and always succeeds: only the
    /// stored settings change, the servers in use stay the ones from the
    /// first `init`. Checks that only matter when connecting are logged.
    pub fn reinit(&mut self, config: AdapterConfig) -> Result<()> {
        if let Err(err) = config.validate() {
            warn!("Re-init with a config that would not open a connection: {}", err);
        }
        if config.server_list() != self.config.server_list() {
            debug!("Re-init with a different pool, connection handle is kept");
        }
        self.codec = Codec::new(config.serialize, config.compress);
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Servers the handle is bound to, fixed since the first `init`
    pub fn servers(&self) -> &[ServerAddress] {
        self.handle.servers()
    }

    pub fn persistent_id(&self) -> Option<&str> {
        self.handle.persistent_id()
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    /// Memcached reads anything above 30 days as a unix timestamp,
    /// so longer durations are stored without expiry.
    pub fn ttl(&self) -> u32 {
        let duration = self.config.duration;
        if duration > u64::from(MAX_RELATIVE_TTL) {
            0
        } else {
            duration as u32
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let key = self.key(key);
        let result = self
            .codec
            .encode(value)
            .and_then(|payload| self.handle.client().set(&key, &payload, self.ttl()));
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!("Write of {} failed: {}", key, err);
                false
            }
        }
    }

    /// Missing, expired and undecodable values all read as `None`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let key = self.key(key);
        let payload = match self.handle.client().get(&key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                debug!("Read of {} failed: {}", key, err);
                return None;
            }
        };
        match self.codec.decode(&payload) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("Read of {} failed: {}", key, err);
                None
            }
        }
    }

    pub fn increment(&self, key: &str, offset: u64) -> Option<u64> {
        let key = self.key(key);
        self.handle
            .client()
            .increment(&key, offset)
            .map_err(|err| debug!("Increment of {} failed: {}", key, err))
            .ok()
    }

    pub fn decrement(&self, key: &str, offset: u64) -> Option<u64> {
        let key = self.key(key);
        self.handle
            .client()
            .decrement(&key, offset)
            .map_err(|err| debug!("Decrement of {} failed: {}", key, err))
            .ok()
    }

    pub fn delete(&self, key: &str) -> bool {
        let key = self.key(key);
        match self.handle.client().delete(&key) {
            Ok(deleted) => deleted,
            Err(err) => {
                debug!("Delete of {} failed: {}", key, err);
                false
            }
        }
    }

    pub fn write_many<T: Serialize>(&self, _values: &[(&str, T)]) -> Result<Vec<bool>> {
        Err(AdapterError::Unsupported(Operation::WriteMany))
    }

    pub fn read_many<T: DeserializeOwned>(&self, _keys: &[&str]) -> Result<Vec<Option<T>>> {
        Err(AdapterError::Unsupported(Operation::ReadMany))
    }

    pub fn delete_many(&self, _keys: &[&str]) -> Result<Vec<bool>> {
        Err(AdapterError::Unsupported(Operation::DeleteMany))
    }

    pub fn clear(&self, _check: bool) -> Result<bool> {
        Err(AdapterError::Unsupported(Operation::Clear))
    }

    pub fn groups(&self) -> Result<Vec<String>> {
        Err(AdapterError::Unsupported(Operation::Groups))
    }

    pub fn clear_group(&self, _group: &str) -> Result<bool> {
        Err(AdapterError::Unsupported(Operation::ClearGroup))
    }
}

impl CacheCapability for CacheAdapter {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::single_key()
    }
}

#[cfg(test)]
mod adapter_tests;
