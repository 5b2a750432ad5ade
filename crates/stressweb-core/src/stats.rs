use crate::outcome::{FailureKind, Outcome};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Accumulated run statistics.
///
/// Only [`StatsAggregator`] mutates this, one batch fold at a time, so
/// `sent == success + failure` holds after every fold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub sent: u64,
    pub success: u64,
    pub failure: u64,
    /// Failures with a status >= 400
    pub rejected: u64,
    pub timeouts: u64,
    /// Connect, I/O and protocol failures
    pub transport_errors: u64,
    /// Attempts whose task died before producing an outcome
    pub aborted: u64,
    pub batches: u64,
    /// Dispatch stopped early on an external cancellation signal
    pub cancelled: bool,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl RunStats {
    /// Wall-clock span from the first batch to the last fold, or up to now
    /// for a run still in progress.
    pub fn duration(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn rates(&self) -> Rates {
        Rates::compute(self.sent, self.success, self.failure, self.duration())
    }
}

/// Derived rates. Percentages are 0 when nothing was sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub success_rate: f64,
    pub failure_rate: f64,
    /// Requests per second
    pub throughput: f64,
}

impl Rates {
    fn compute(sent: u64, success: u64, failure: u64, duration: Duration) -> Self {
        let percent = |n: u64| {
            if sent == 0 {
                0.0
            } else {
                n as f64 / sent as f64 * 100.0
            }
        };

        let seconds = duration.as_secs_f64();
        let throughput = if seconds > 0.0 {
            sent as f64 / seconds
        } else {
            0.0
        };

        Self {
            success_rate: percent(success),
            failure_rate: percent(failure),
            throughput,
        }
    }
}

/// Single writer for [`RunStats`]
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: RunStats,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the start time. Only the first call has an effect.
    pub fn start(&mut self) {
        if self.stats.started_at.is_none() {
            self.stats.started_at = Some(Instant::now());
        }
    }

    /// Fold one batch's outcomes.
    pub fn fold(&mut self, outcomes: &[Outcome]) {
        let stats = &mut self.stats;
        for outcome in outcomes {
            stats.sent += 1;
            match outcome {
                Outcome::Success => stats.success += 1,
                Outcome::Failure(kind) => {
                    stats.failure += 1;
                    match kind {
                        FailureKind::Status(_) => stats.rejected += 1,
                        FailureKind::Timeout => stats.timeouts += 1,
                        FailureKind::Connect | FailureKind::Io | FailureKind::Protocol => {
                            stats.transport_errors += 1
                        }
                        FailureKind::Aborted => stats.aborted += 1,
                    }
                }
            }
        }
        stats.batches += 1;
    }

    pub fn mark_cancelled(&mut self) {
        self.stats.cancelled = true;
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn rates(&self) -> Rates {
        self.stats.rates()
    }

    /// Stamp the end time and hand the statistics over for reporting.
    pub fn finalize(mut self) -> RunStats {
        self.start();
        self.stats.finished_at = Some(Instant::now());
        self.stats
    }
}

/// Serializable view of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub sent: u64,
    pub success: u64,
    pub failure: u64,
    pub rejected: u64,
    pub timeouts: u64,
    pub transport_errors: u64,
    pub aborted: u64,
    pub batches: u64,
    pub success_rate: f64,
    pub failure_rate: f64,
    pub duration_ms: u64,
    pub throughput: f64,
    pub cancelled: bool,
}

impl StatsSummary {
    pub fn from_stats(stats: &RunStats) -> Self {
        let rates = stats.rates();
        Self {
            sent: stats.sent,
            success: stats.success,
            failure: stats.failure,
            rejected: stats.rejected,
            timeouts: stats.timeouts,
            transport_errors: stats.transport_errors,
            aborted: stats.aborted,
            batches: stats.batches,
            success_rate: rates.success_rate,
            failure_rate: rates.failure_rate,
            duration_ms: stats.duration().as_millis() as u64,
            throughput: rates.throughput,
            cancelled: stats.cancelled,
        }
    }
}
