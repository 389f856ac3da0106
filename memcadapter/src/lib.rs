#[macro_use]
extern crate log;

pub mod adapter;
pub mod address;
pub mod capability;
pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;

#[cfg(test)]
mod mock;

pub use adapter::{CacheAdapter, DEFAULT_OFFSET};
pub use address::{parse_server_address, ServerAddress, DEFAULT_PORT};
pub use capability::{CacheCapability, CapabilitySet, Operation};
pub use client::{MemcacheConnector, MemoryConnector, MAX_RELATIVE_TTL};
pub use config::{AdapterConfig, SerializeFormat, DEFAULT_DURATION, DEFAULT_PREFIX};
pub use connection::{ConnectionHandle, ConnectionRegistry};
pub use error::{AdapterError, Result};
