pub mod builder;

use crate::address::Credentials;
use crate::error::{AdapterError, Result};
use serde::{Deserialize as _, Deserializer};
use serde_derive::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub use builder::AdapterConfigBuilder;

pub const DEFAULT_SERVER: &str = "127.0.0.1";
pub const DEFAULT_PREFIX: &str = "cake_";
pub const DEFAULT_DURATION: u64 = 3600;
pub const DEFAULT_PROBABILITY: u8 = 100;
const MAX_PROBABILITY: u8 = 100;

/// Value encoding used for non-integer values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializeFormat {
    /// bincode with its default options
    #[default]
    #[serde(alias = "php")]
    Native,
    Json,
    /// bincode with varint integers
    #[serde(alias = "igbinary")]
    Compact,
}

impl SerializeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializeFormat::Native => "native",
            SerializeFormat::Json => "json",
            SerializeFormat::Compact => "compact",
        }
    }
}

/// Memcached adapter settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    #[serde(deserialize_with = "one_or_many")]
    pub servers: Vec<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub prefix: String,
    pub duration: u64,
    pub compress: bool,
    pub serialize: SerializeFormat,
    pub probability: u8,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Name under which the connection handle is shared between adapters
    pub persistent: Option<String>,
    /// Passed to the native client as url query parameters
    pub options: BTreeMap<String, String>,
    pub groups: Vec<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        AdapterConfig {
            servers: vec![String::from(DEFAULT_SERVER)],
            host: None,
            port: None,
            prefix: String::from(DEFAULT_PREFIX),
            duration: DEFAULT_DURATION,
            compress: false,
            serialize: SerializeFormat::default(),
            probability: DEFAULT_PROBABILITY,
            username: None,
            password: None,
            persistent: None,
            options: BTreeMap::new(),
            groups: Vec::new(),
        }
    }
}

impl AdapterConfig {
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::new()
    }

    pub fn from_toml_str(input: &str) -> Result<AdapterConfig> {
        let config: AdapterConfig =
            toml::from_str(input).map_err(|err| AdapterError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<AdapterConfig> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|err| {
            AdapterError::InvalidConfig(format!("cannot read {}: {}", path.display(), err))
        })?;
        AdapterConfig::from_toml_str(&input)
    }

    /// Effective pool: `host`/`port` win over `servers` when a host is set.
    pub fn server_list(&self) -> Vec<String> {
        match (&self.host, self.port) {
            (Some(host), Some(port)) => vec![format!("{host}:{port}")],
            (Some(host), None) => vec![host.clone()],
            (None, _) => self.servers.clone(),
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: self.password.clone().unwrap_or_default(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.probability > MAX_PROBABILITY {
            return Err(AdapterError::InvalidConfig(format!(
                "probability must be within 0-{}, got {}",
                MAX_PROBABILITY, self.probability
            )));
        }
        if self.server_list().is_empty() {
            return Err(AdapterError::InvalidConfig(String::from(
                "at least one server is required",
            )));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(AdapterError::InvalidConfig(String::from(
                "password given without username",
            )));
        }
        Ok(())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(server) => vec![server],
        OneOrMany::Many(servers) => servers,
    })
}
