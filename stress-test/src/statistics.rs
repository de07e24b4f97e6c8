use std::collections::BTreeMap;

use crate::worker::{FailureLabel, WorkerResult};

/// Outcome counts of a whole run, summed over every worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub requests_completed: u64,
    pub successes: u64,
    pub failures: BTreeMap<FailureLabel, u64>,
}

impl AggregateResult {
    pub fn merge(&mut self, worker: &WorkerResult) {
        self.requests_completed += worker.requests_completed;
        self.successes += worker.successes;
        for (label, count) in &worker.failures {
            *self.failures.entry(*label).or_insert(0) += count;
        }
    }

    #[inline]
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failures.values().sum()
    }
}

impl FromIterator<WorkerResult> for AggregateResult {
    fn from_iter<I: IntoIterator<Item = WorkerResult>>(iter: I) -> Self {
        let mut agg = Self::default();
        for worker in iter {
            agg.merge(&worker);
        }
        agg
    }
}

/// Sums per-worker results into one. The order results arrive in does not matter.
pub fn aggregate<I>(results: I) -> AggregateResult
where
    I: IntoIterator<Item = WorkerResult>,
{
    results.into_iter().collect()
}
