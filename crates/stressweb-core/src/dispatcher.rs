//! Batched dispatch loop
//!
//! Batches run strictly one after another; attempts inside a batch run
//! concurrently through the [`ConcurrencyLimiter`]. Each attempt writes only
//! its own slot, and the fold after the batch is the single writer of
//! [`RunStats`].

use crate::batch::BatchPlan;
use crate::config::{batch_len, RunConfig};
use crate::error::Result;
use crate::issuer::RequestIssuer;
use crate::limiter::ConcurrencyLimiter;
use crate::outcome::{FailureKind, Outcome};
use crate::progress::ProgressReporter;
use crate::request::RequestSpec;
use crate::stats::{RunStats, StatsAggregator};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct BatchDispatcher {
    issuer: RequestIssuer,
    reporter: Arc<dyn ProgressReporter>,
}

impl BatchDispatcher {
    pub fn new(issuer: RequestIssuer, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self { issuer, reporter }
    }

    /// Dispatch every batch to completion.
    pub async fn run(&self, spec: Arc<RequestSpec>, config: &RunConfig) -> Result<RunStats> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run_until_cancelled(spec, config, cancel_rx).await
    }

    /// Like [`run`](Self::run), but the flag is checked before each batch.
    /// Once it reads `true` no further batch is issued; the batch already in
    /// flight always finishes and is folded.
    pub async fn run_until_cancelled(
        &self,
        spec: Arc<RequestSpec>,
        config: &RunConfig,
        cancel: watch::Receiver<bool>,
    ) -> Result<RunStats> {
        let plan = BatchPlan::new(config.total_requests, config.batch_size);
        let limiter = ConcurrencyLimiter::new(config.concurrency);
        let mut aggregator = StatsAggregator::new();

        info!(
            url = %spec.url(),
            method = %spec.method(),
            transport = self.issuer.transport_name(),
            total = plan.total(),
            concurrency = limiter.limit(),
            batch_size = config.batch_size.get(),
            peak_in_flight = config.peak_in_flight(),
            batches = plan.batch_count(),
            "Starting dispatch"
        );

        aggregator.start();
        for (batch, size) in plan.sizes().enumerate() {
            if *cancel.borrow() {
                info!(batch, "Cancellation requested, not issuing further batches");
                aggregator.mark_cancelled();
                break;
            }

            let outcomes = self.run_batch(&limiter, &spec, size).await?;
            aggregator.fold(&outcomes);

            let stats = aggregator.stats();
            let rates = aggregator.rates();
            debug!(
                batch,
                size,
                sent = stats.sent,
                success = stats.success,
                failure = stats.failure,
                throughput = rates.throughput,
                "Batch complete"
            );
            self.reporter.report(stats.sent, plan.total());
        }

        let stats = aggregator.finalize();
        info!(
            sent = stats.sent,
            success = stats.success,
            failure = stats.failure,
            batches = stats.batches,
            elapsed_ms = stats.duration().as_millis() as u64,
            cancelled = stats.cancelled,
            "Dispatch finished"
        );

        Ok(stats)
    }

    /// Issue `size` attempts and wait for every one of them.
    async fn run_batch(
        &self,
        limiter: &ConcurrencyLimiter,
        spec: &Arc<RequestSpec>,
        size: u64,
    ) -> Result<Vec<Outcome>> {
        let slots = limiter
            .run(batch_len(size)?, |_| {
                let issuer = self.issuer.clone();
                let spec = Arc::clone(spec);
                async move { issuer.attempt(&spec).await }
            })
            .await?;

        Ok(slots
            .into_iter()
            .map(|slot| slot.unwrap_or(Outcome::Failure(FailureKind::Aborted)))
            .collect())
    }
}
