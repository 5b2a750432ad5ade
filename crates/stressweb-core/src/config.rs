use crate::error::{ConfigError, FileConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_NUM_PACKETS: u64 = 1_000_000;
pub const DEFAULT_CONCURRENCY: usize = 100;
pub const DEFAULT_BATCH_SIZE: u64 = 10_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Sizing of one run. Immutable once dispatch begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub total_requests: u64,
    /// May exceed `batch_size`; effective parallelism is then bounded by the batch
    pub concurrency: NonZeroUsize,
    pub batch_size: NonZeroU64,
}

impl RunConfig {
    pub fn new(
        total_requests: u64,
        concurrency: usize,
        batch_size: u64,
    ) -> Result<Self, ConfigError> {
        let concurrency = NonZeroUsize::new(concurrency).ok_or(ConfigError::ZeroConcurrency)?;
        let batch_size = NonZeroU64::new(batch_size).ok_or(ConfigError::ZeroBatchSize)?;
        batch_len(batch_size.get())?;

        Ok(Self {
            total_requests,
            concurrency,
            batch_size,
        })
    }

    /// Upper bound on attempts simultaneously in flight.
    pub fn peak_in_flight(&self) -> u64 {
        let concurrency = self.concurrency.get() as u64;
        concurrency.min(self.batch_size.get()).min(self.total_requests)
    }
}

/// Number of attempt slots a batch of `size` needs on this target.
pub fn batch_len(size: u64) -> Result<usize, ConfigError> {
    usize::try_from(size).map_err(|_| ConfigError::BatchSizeTooLarge(size))
}

/// Validated per-request timeout in milliseconds.
pub fn request_timeout(timeout_ms: u64) -> Result<Duration, ConfigError> {
    if timeout_ms == 0 {
        return Err(ConfigError::ZeroTimeout);
    }
    Ok(Duration::from_millis(timeout_ms))
}

/// On-disk configuration. Every field is optional so that command-line
/// flags can fill the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub run: RunSection,
}

impl FileConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FileConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Endpoint every request is sent to
    pub url: Option<String>,
    /// GET or POST
    pub method: Option<String>,
    /// Extra request headers; a `User-Agent` entry replaces the default
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// POST body, sent verbatim
    pub body: Option<String>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSection {
    /// Total number of requests to send
    pub num_packets: Option<u64>,
    /// Maximum concurrent in-flight requests
    pub concurrency: Option<usize>,
    /// Requests dispatched and awaited together per batch
    pub batch_size: Option<u64>,
}
