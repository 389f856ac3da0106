use crate::capability::Operation;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The native client could not be brought up for the configured pool.
    #[error("cache engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("operation `{0}` is not supported by the memcached adapter")]
    Unsupported(Operation),
    #[error("operation failed: {0}")]
    OperationFailed(String),
    #[error("invalid server address `{0}`")]
    InvalidServerAddress(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("codec error: {0}")]
    Codec(String),
}

impl AdapterError {
    pub fn to_static_string(&self) -> &'static str {
        match self {
            AdapterError::EngineUnavailable(_) => "Engine unavailable",
            AdapterError::Unsupported(_) => "Not supported",
            AdapterError::OperationFailed(_) => "Operation failed",
            AdapterError::InvalidServerAddress(_) => "Invalid server address",
            AdapterError::InvalidConfig(_) => "Invalid configuration",
            AdapterError::Codec(_) => "Codec error",
        }
    }
}

impl From<memcache::MemcacheError> for AdapterError {
    fn from(err: memcache::MemcacheError) -> Self {
        AdapterError::OperationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
