use std::num::NonZeroU64;

/// Deterministic batch planner: batch boundaries depend only on the total
/// and the batch size, and batches are produced strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    total: u64,
    batch_size: NonZeroU64,
}

impl BatchPlan {
    pub fn new(total: u64, batch_size: NonZeroU64) -> Self {
        Self { total, batch_size }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `ceil(total / batch_size)`
    pub fn batch_count(&self) -> u64 {
        self.total.div_ceil(self.batch_size.get())
    }

    /// Size of every batch in dispatch order; only the last may be short.
    pub fn sizes(&self) -> BatchSizes {
        BatchSizes {
            remaining: self.total,
            batch_size: self.batch_size.get(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchSizes {
    remaining: u64,
    batch_size: u64,
}

impl Iterator for BatchSizes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.batch_size.min(self.remaining);
        self.remaining -= current;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.div_ceil(self.batch_size) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BatchSizes {}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(total: u64, batch_size: u64) -> BatchPlan {
        BatchPlan::new(total, NonZeroU64::new(batch_size).unwrap())
    }

    #[test]
    fn test_partial_last_batch() {
        let plan = plan(25, 10);
        assert_eq!(plan.batch_count(), 3);
        assert_eq!(plan.sizes().collect::<Vec<_>>(), vec![10, 10, 5]);
    }

    #[test]
    fn test_exact_multiple() {
        let plan = plan(30, 10);
        assert_eq!(plan.batch_count(), 3);
        assert_eq!(plan.sizes().collect::<Vec<_>>(), vec![10, 10, 10]);
    }

    #[test]
    fn test_total_below_batch_size() {
        let plan = plan(7, 10_000);
        assert_eq!(plan.batch_count(), 1);
        assert_eq!(plan.sizes().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_empty_run() {
        let plan = plan(0, 10);
        assert_eq!(plan.batch_count(), 0);
        assert_eq!(plan.sizes().next(), None);
    }

    #[test]
    fn test_sizes_sum_to_total() {
        for total in [1u64, 9, 10, 11, 99, 1_000, 12_345] {
            for batch_size in [1u64, 3, 10, 64, 10_000] {
                let plan = plan(total, batch_size);
                let sizes: Vec<u64> = plan.sizes().collect();
                let count = plan.batch_count();

                assert_eq!(sizes.len() as u64, count);
                assert_eq!(plan.sizes().len() as u64, count);
                assert_eq!(sizes.iter().sum::<u64>(), total);
                assert_eq!(*sizes.last().unwrap(), total - batch_size * (count - 1));
            }
        }
    }
}
