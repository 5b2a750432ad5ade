use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use stressweb_core::{
    parse_header_line, request_timeout, Bytes, ConfigError, FileConfig, Method, RequestSpec,
    RunConfig, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_NUM_PACKETS, DEFAULT_TIMEOUT_MS,
};

#[derive(Parser, Debug)]
#[command(name = "stressweb")]
#[command(about = "HTTP stress testing tool - sends a fixed number of requests in concurrent batches")]
pub struct Args {
    /// Target URL to send requests to (may come from --config instead)
    pub url: Option<String>,

    /// Number of requests to send (default: 1,000,000)
    #[arg(short = 'n', long = "num-packets")]
    pub num_packets: Option<u64>,

    /// Number of concurrent connections (default: 100)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// HTTP method to use: GET or POST (default: GET)
    #[arg(short, long)]
    pub method: Option<String>,

    /// Data to send with POST requests
    #[arg(short = 'd', long = "data")]
    pub data: Option<String>,

    /// Requests dispatched and awaited together (default: 10,000)
    #[arg(short = 'b', long = "batch-size")]
    pub batch_size: Option<u64>,

    /// Extra request header as `Name: value`, repeatable
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Per-request timeout in milliseconds (default: 5000)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Submission mode
    #[arg(long, value_enum, default_value_t = Mode::Http)]
    pub mode: Mode,

    /// Write the run result as JSON to this path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Where per-batch progress goes
    #[arg(long, value_enum, default_value_t = ProgressMode::Stdout)]
    pub progress: ProgressMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgressMode {
    /// One `Progress:` line per batch on stdout
    Stdout,
    /// Tracing events instead of plain lines
    Log,
    Quiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Real HTTP requests
    Http,
    /// Simulated 5ms responses, no network
    Mock,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Http => "http",
            Mode::Mock => "mock",
        }
    }
}

/// Fully validated inputs for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub spec: RequestSpec,
    pub run: RunConfig,
    pub timeout: Duration,
}

impl Settings {
    /// Merge command-line flags over the file config over built-in defaults.
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self, ConfigError> {
        let target = file.target;
        let run_section = file.run;

        let url = args
            .url
            .clone()
            .or(target.url)
            .ok_or(ConfigError::MissingUrl)?;
        let method = match args.method.as_deref().or(target.method.as_deref()) {
            Some(raw) => raw.parse::<Method>()?,
            None => Method::default(),
        };

        let mut headers: Vec<(String, String)> = target.headers.into_iter().collect();
        for line in &args.headers {
            headers.push(parse_header_line(line)?);
        }

        let body = args.data.clone().or(target.body).map(Bytes::from);
        let spec = RequestSpec::new(&url, method, headers, body)?;

        let run = RunConfig::new(
            args.num_packets
                .or(run_section.num_packets)
                .unwrap_or(DEFAULT_NUM_PACKETS),
            args.concurrency
                .or(run_section.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            args.batch_size
                .or(run_section.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
        )?;

        let timeout = request_timeout(
            args.timeout_ms
                .or(target.timeout_ms)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        )?;

        Ok(Self { spec, run, timeout })
    }
}
