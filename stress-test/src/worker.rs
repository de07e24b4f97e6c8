use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hyper::StatusCode;
use tokio::sync::{mpsc, Barrier};
use tokio_util::sync::CancellationToken;

use crate::budget::Completion;
use crate::client::{Transport, TransportError};
use crate::config::RunConfig;

/// Key for an unsuccessful request in a result's failure breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureLabel {
    /// The server answered with something other than `200 OK`.
    Status(StatusCode),
    /// No response at all: refused connection, DNS failure, reset, etc.
    Unknown,
}

impl fmt::Display for FailureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureLabel::Status(status) => f.write_str(status.as_str()),
            FailureLabel::Unknown => f.write_str("unknown error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(FailureLabel),
}

impl Outcome {
    #[must_use]
    pub fn classify(res: &Result<StatusCode, TransportError>) -> Self {
        match res {
            Ok(StatusCode::OK) => Outcome::Success,
            Ok(status) => Outcome::Failure(FailureLabel::Status(*status)),
            Err(_) => Outcome::Failure(FailureLabel::Unknown),
        }
    }
}

/// Counters owned by a single worker for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerResult {
    pub requests_completed: u64,
    pub successes: u64,
    pub failures: BTreeMap<FailureLabel, u64>,
}

impl WorkerResult {
    pub fn record(&mut self, outcome: Outcome) {
        self.requests_completed += 1;
        match outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Failure(label) => *self.failures.entry(label).or_insert(0) += 1,
        }
    }
}

pub struct Worker<T> {
    id: usize,
    config: Arc<RunConfig>,
    transport: T,
    cancel: CancellationToken,
    completions: mpsc::Sender<Completion>,
    start: Arc<Barrier>,
}

impl<T> Worker<T>
where
    T: Transport,
{
    #[must_use]
    pub fn new(
        id: usize,
        config: Arc<RunConfig>,
        transport: T,
        cancel: CancellationToken,
        completions: mpsc::Sender<Completion>,
        start: Arc<Barrier>,
    ) -> Self {
        Self {
            id,
            config,
            transport,
            cancel,
            completions,
            start,
        }
    }

    /// Waits for the start barrier, then keeps issuing requests until the run is cancelled.
    ///
    /// Every counted request is reported on the completion channel, and the next request only
    /// starts once the tracker has acknowledged it. A request cut short by cancellation is
    /// neither counted nor reported.
    pub async fn run(self) -> WorkerResult {
        self.start.wait().await;
        tracing::debug!(worker = self.id, "worker started");

        let mut result = WorkerResult::default();
        while !self.cancel.is_cancelled() {
            let res = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                res = self.transport.get(self.config.target()) => res,
            };
            if let Err(e) = &res {
                tracing::warn!(worker = self.id, error = %e, "error while making request");
            }
            result.record(Outcome::classify(&res));

            // Either step only fails once the tracker is gone, and the run is cancelled by then.
            let (completion, counted) = Completion::new();
            if self.completions.send(completion).await.is_err() || counted.await.is_err() {
                tracing::debug!(worker = self.id, "budget tracker stopped listening");
            }
        }

        tracing::debug!(
            worker = self.id,
            completed = result.requests_completed,
            "worker stopped"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use hyper::StatusCode;
    use tokio::sync::{mpsc, Barrier};
    use tokio_util::sync::CancellationToken;

    use super::{FailureLabel, Outcome, Worker, WorkerResult};
    use crate::budget::{BudgetTracker, Completion};
    use crate::config::RunConfig;
    use crate::testing::{Reply, ScriptedTransport};

    #[test]
    fn labels_display_like_status_codes() {
        assert_eq!(
            "503",
            FailureLabel::Status(StatusCode::SERVICE_UNAVAILABLE).to_string()
        );
        assert_eq!("unknown error", FailureLabel::Unknown.to_string());
    }

    #[test]
    fn unknown_sorts_after_statuses() {
        assert!(FailureLabel::Status(StatusCode::NOT_FOUND) < FailureLabel::Unknown);
        assert!(
            FailureLabel::Status(StatusCode::NOT_FOUND)
                < FailureLabel::Status(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[test]
    fn record_keeps_totals_consistent() {
        let mut result = WorkerResult::default();
        result.record(Outcome::Success);
        result.record(Outcome::Failure(FailureLabel::Unknown));
        result.record(Outcome::Failure(FailureLabel::Unknown));
        assert_eq!(3, result.requests_completed);
        assert_eq!(1, result.successes);
        assert_eq!(Some(&2), result.failures.get(&FailureLabel::Unknown));
    }

    #[tokio::test]
    async fn classifies_scripted_responses() {
        let transport = ScriptedTransport::new([
            Reply::Status(StatusCode::OK),
            Reply::Status(StatusCode::OK),
            Reply::Status(StatusCode::SERVICE_UNAVAILABLE),
            Reply::Status(StatusCode::NOT_FOUND),
            Reply::TransportError,
        ]);
        let config = Arc::new(RunConfig::new("http://stub.local/", 5, 1).unwrap());
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(5);
        let tracker = tokio::spawn(BudgetTracker::new(5, rx, cancel.clone()).run());
        let worker = Worker::new(
            0,
            config,
            transport.clone(),
            cancel,
            tx,
            Arc::new(Barrier::new(1)),
        );

        let result = worker.run().await;
        tracker.await.unwrap();

        let expected = WorkerResult {
            requests_completed: 5,
            successes: 2,
            failures: [
                (FailureLabel::Status(StatusCode::SERVICE_UNAVAILABLE), 1),
                (FailureLabel::Status(StatusCode::NOT_FOUND), 1),
                (FailureLabel::Unknown, 1),
            ]
            .into_iter()
            .collect(),
        };
        assert_eq!(expected, result);
        assert_eq!(5, transport.calls());
    }

    #[tokio::test]
    async fn exits_without_requests_when_already_cancelled() {
        let transport = ScriptedTransport::always(Reply::Status(StatusCode::OK));
        let config = Arc::new(RunConfig::new("http://stub.local/", 5, 1).unwrap());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, _rx) = mpsc::channel(5);
        let worker = Worker::new(
            0,
            config,
            transport.clone(),
            cancel,
            tx,
            Arc::new(Barrier::new(1)),
        );

        assert_eq!(WorkerResult::default(), worker.run().await);
        assert_eq!(0, transport.calls());
    }

    #[tokio::test]
    async fn aborted_request_is_not_counted_or_reported() {
        let transport = ScriptedTransport::always(Reply::Hang);
        let config = Arc::new(RunConfig::new("http://stub.local/", 5, 1).unwrap());
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(5);
        let worker = tokio::spawn(
            Worker::new(
                0,
                config,
                transport.clone(),
                cancel.clone(),
                tx,
                Arc::new(Barrier::new(1)),
            )
            .run(),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        let result = worker.await.unwrap();

        assert_eq!(WorkerResult::default(), result);
        assert_eq!(1, transport.calls());
        // The sender went away with the worker and nothing was ever sent.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn next_request_waits_for_acknowledgement() {
        let transport = ScriptedTransport::always(Reply::Status(StatusCode::OK));
        let config = Arc::new(RunConfig::new("http://stub.local/", 5, 1).unwrap());
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<Completion>(5);
        let worker = tokio::spawn(
            Worker::new(
                0,
                config,
                transport.clone(),
                cancel.clone(),
                tx,
                Arc::new(Barrier::new(1)),
            )
            .run(),
        );

        let first = rx.recv().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(1, transport.calls());

        // Cancel before acknowledging, the way the tracker does on its last completion.
        cancel.cancel();
        drop(first);
        let result = worker.await.unwrap();

        assert_eq!(1, result.requests_completed);
        assert_eq!(1, transport.calls());
    }
}
