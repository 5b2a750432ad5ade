//! Error types for stressweb-core

use thiserror::Error;

/// Invalid run or request configuration, rejected before any batch starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no target URL given")]
    MissingUrl,

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("URL must include a host: {0}")]
    MissingHost(String),

    #[error("URL must not include credentials: {0}")]
    CredentialsInUrl(String),

    #[error("unsupported method {0:?}, expected GET or POST")]
    UnsupportedMethod(String),

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    #[error("batch size {0} does not fit in memory on this platform")]
    BatchSizeTooLarge(u64),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Config file could not be loaded
#[derive(Error, Debug)]
pub enum FileConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Concurrency limiter semaphore was closed mid-run
    #[error("concurrency limiter closed")]
    LimiterClosed,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
