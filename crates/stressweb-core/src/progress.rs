use std::io::Write;
use tracing::info;

/// Receives the running count after each batch fold. Output only; the
/// dispatcher ignores whatever happens inside.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, sent: u64, total: u64);
}

/// `Progress: 10000/1000000 requests sent (1.00%)`
pub fn progress_line(sent: u64, total: u64) -> String {
    let percent = if total == 0 {
        0.0
    } else {
        sent as f64 / total as f64 * 100.0
    };
    format!("Progress: {sent}/{total} requests sent ({percent:.2}%)")
}

/// One line per batch on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ProgressReporter for StdoutProgress {
    fn report(&self, sent: u64, total: u64) {
        // A closed stdout must not take the run down with it.
        let _ = writeln!(std::io::stdout().lock(), "{}", progress_line(sent, total));
    }
}

/// Progress as structured tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, sent: u64, total: u64) {
        info!(sent, total, "{}", progress_line(sent, total));
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _sent: u64, _total: u64) {}
}
