use clap::{Parser, Subcommand, ValueEnum};
use memcadapter::{AdapterConfig, SerializeFormat, DEFAULT_OFFSET};
use std::{fmt::Debug, path::PathBuf};

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Engine {
    /// memcached pool through the memcache crate
    Memcache,
    /// in-process store, nothing leaves this process
    Memory,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Memcache => "memcache",
            Engine::Memory => "in-process memory",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Format {
    Native,
    Json,
    Compact,
}

impl From<Format> for SerializeFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Native => SerializeFormat::Native,
            Format::Json => SerializeFormat::Json,
            Format::Compact => SerializeFormat::Compact,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// store a value, integers are stored as counters
    Set { key: String, value: String },
    /// print a stored value
    Get { key: String },
    /// increment a counter
    Incr {
        key: String,
        #[arg(default_value_t = DEFAULT_OFFSET)]
        offset: u64,
    },
    /// decrement a counter
    Decr {
        key: String,
        #[arg(default_value_t = DEFAULT_OFFSET)]
        offset: u64,
    },
    /// remove a value
    Delete { key: String },
    /// list the operations the adapter supports
    Capabilities,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
/// memcached cache adapter client
pub struct MemcacheClientConfig {
    #[arg(short, long = "server", value_name = "ADDRESS")]
    /// pool member: host, host:port, [v6]:port or unix:///path (repeatable)
    pub servers: Vec<String>,

    #[arg(short, long, value_name = "FILE")]
    /// TOML adapter configuration
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "PREFIX")]
    /// prefix prepended to every key
    pub prefix: Option<String>,

    #[arg(short, long, value_name = "SECONDS")]
    /// expiry of written values
    pub duration: Option<u64>,

    #[arg(short = 'f', long, value_enum, value_name = "FORMAT")]
    /// encoding of non-integer values
    pub serialize: Option<Format>,

    #[arg(long)]
    /// compress large values
    pub compress: bool,

    #[arg(short, long, value_enum, default_value_t = Engine::Memcache)]
    /// cache engine to talk to
    pub engine: Engine,

    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 2)]
    /// sets the level of verbosity
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl MemcacheClientConfig {
    fn from_args(args: Vec<String>) -> Result<MemcacheClientConfig, String> {
        MemcacheClientConfig::try_parse_from(args.iter()).map_err(|err| err.to_string())
    }

    /// Config file (or defaults) with command line overrides applied
    pub fn adapter_config(&self) -> Result<AdapterConfig, String> {
        let mut config = match &self.config {
            Some(path) => AdapterConfig::from_toml_file(path).map_err(|err| err.to_string())?,
            None => AdapterConfig::default(),
        };
        if !self.servers.is_empty() {
            config.servers = self.servers.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(format) = self.serialize {
            config.serialize = format.into();
        }
        if self.compress {
            config.compress = true;
        }
        config.validate().map_err(|err| err.to_string())?;
        Ok(config)
    }
}

pub fn parse(args: Vec<String>) -> Result<MemcacheClientConfig, String> {
    MemcacheClientConfig::from_args(args)
}
