use super::{AdapterConfig, SerializeFormat};
use crate::error::Result;

pub struct AdapterConfigBuilder {
    config: AdapterConfig,
}

impl Default for AdapterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterConfigBuilder {
    pub fn new() -> AdapterConfigBuilder {
        AdapterConfigBuilder {
            config: AdapterConfig::default(),
        }
    }

    pub fn with_servers<S: Into<String>>(&mut self, servers: Vec<S>) -> &mut Self {
        self.config.servers = servers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_server<S: Into<String>>(&mut self, server: S) -> &mut Self {
        self.config.servers = vec![server.into()];
        self
    }

    pub fn with_host<S: Into<String>>(&mut self, host: S) -> &mut Self {
        self.config.host = Some(host.into());
        self
    }

    pub fn with_port(&mut self, port: u16) -> &mut Self {
        self.config.port = Some(port);
        self
    }

    pub fn with_prefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn with_duration(&mut self, duration: u64) -> &mut Self {
        self.config.duration = duration;
        self
    }

    pub fn with_compress(&mut self, compress: bool) -> &mut Self {
        self.config.compress = compress;
        self
    }

    pub fn with_serialize(&mut self, format: SerializeFormat) -> &mut Self {
        self.config.serialize = format;
        self
    }

    pub fn with_probability(&mut self, probability: u8) -> &mut Self {
        self.config.probability = probability;
        self
    }

    pub fn with_credentials<S: Into<String>>(&mut self, username: S, password: S) -> &mut Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    pub fn with_persistent<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.config.persistent = Some(name.into());
        self
    }

    pub fn with_option<S: Into<String>>(&mut self, name: S, value: S) -> &mut Self {
        self.config.options.insert(name.into(), value.into());
        self
    }

    pub fn with_groups<S: Into<String>>(&mut self, groups: Vec<S>) -> &mut Self {
        self.config.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(&self) -> Result<AdapterConfig> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}
