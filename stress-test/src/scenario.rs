use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Barrier, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::budget::{BudgetTracker, TrackerExit};
use crate::client::Transport;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::statistics::{aggregate, AggregateResult};
use crate::worker::Worker;

/// Everything a finished run has to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Wall-clock time from the moment the workers were released until the last one stopped.
    pub elapsed: Duration,
    pub result: AggregateResult,
    /// The run was cancelled from outside before the budget ran out.
    pub interrupted: bool,
}

impl RunReport {
    #[must_use]
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.result.requests_completed as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct Dispatcher<T> {
    config: Arc<RunConfig>,
    transport: T,
    cancel: CancellationToken,
}

impl<T> Dispatcher<T>
where
    T: Transport,
{
    #[must_use]
    pub fn new(config: RunConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling this token stops the run early. The report is still produced, flagged as
    /// interrupted.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(self) -> Result<RunReport> {
        let total_requests = self.config.total_requests();
        let concurrency = self.config.concurrency();
        // An early return or a dropped future still stops every spawned task.
        let _stop_on_exit = self.cancel.clone().drop_guard();

        let (completions_tx, completions_rx) = mpsc::channel(completion_capacity(total_requests));
        let tracker = tokio::spawn(
            BudgetTracker::new(total_requests, completions_rx, self.cancel.clone()).run(),
        );

        tracing::info!(concurrency, "preparing workers");
        let start = Arc::new(Barrier::new(concurrency + 1));
        let mut workers = Vec::with_capacity(concurrency);
        for id in 0..concurrency {
            let worker = Worker::new(
                id,
                self.config.clone(),
                self.transport.clone(),
                self.cancel.clone(),
                completions_tx.clone(),
                start.clone(),
            );
            workers.push(tokio::spawn(worker.run()));
        }
        drop(completions_tx);

        start.wait().await;
        let started = Instant::now();
        tracing::info!(
            url = %self.config.target(),
            total_requests,
            concurrency,
            "running"
        );

        let mut results = Vec::with_capacity(concurrency);
        for worker in workers {
            results.push(worker.await.map_err(Error::Worker)?);
        }
        let elapsed = started.elapsed();

        let exit = tracker.await.map_err(Error::Tracker)?;
        let result = aggregate(results);
        tracing::info!(
            ?elapsed,
            completed = result.requests_completed,
            counted = exit.counted(),
            "run finished"
        );

        Ok(RunReport {
            elapsed,
            result,
            interrupted: !matches!(exit, TrackerExit::Exhausted { .. }),
        })
    }
}

/// One slot per budgeted request, capped at what a tokio channel can hold.
fn completion_capacity(total_requests: usize) -> usize {
    total_requests.min(Semaphore::MAX_PERMITS)
}
