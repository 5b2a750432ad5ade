use crate::stats::RunStats;

/// Render the final statistics block.
pub fn render_report(url: &str, stats: &RunStats) -> String {
    let rates = stats.rates();
    let cancelled = if stats.cancelled {
        format!("Run cancelled after {} batches\n", stats.batches)
    } else {
        String::new()
    };

    format!(
        "===== Request Statistics =====\n\
         Target URL: {url}\n\
         Total requests sent: {sent}\n\
         Successful requests: {success} ({success_rate:.2}%)\n\
         Failed requests: {failure} ({failure_rate:.2}%)\n\
         \x20 rejected (status >= 400): {rejected}\n\
         \x20 timeouts: {timeouts}\n\
         \x20 transport errors: {transport_errors}\n\
         \x20 aborted: {aborted}\n\
         {cancelled}\
         Total time: {secs:.2} seconds\n\
         Average speed: {throughput:.2} requests/second\n\
         ==============================\n",
        sent = stats.sent,
        success = stats.success,
        success_rate = rates.success_rate,
        failure = stats.failure,
        failure_rate = rates.failure_rate,
        rejected = stats.rejected,
        timeouts = stats.timeouts,
        transport_errors = stats.transport_errors,
        aborted = stats.aborted,
        secs = stats.duration().as_secs_f64(),
        throughput = rates.throughput,
    )
}
