use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// One finished request, reported by a worker. The tracker answers on `ack` once it has
/// counted it, after cancelling the run if this was the last one the budget allows.
#[derive(Debug)]
pub struct Completion {
    ack: oneshot::Sender<()>,
}

impl Completion {
    /// The receiver resolves once the completion has been counted, or errors if the tracker
    /// stopped before getting to it.
    #[must_use]
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (ack, counted) = oneshot::channel();
        (Self { ack }, counted)
    }
}

/// Why the tracker stopped listening, and how many completions it had counted by then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerExit {
    /// The budget was reached and the tracker cancelled the run.
    Exhausted { counted: usize },
    /// Someone else cancelled the run first.
    Cancelled { counted: usize },
    /// Every worker hung up before the budget was reached.
    Disconnected { counted: usize },
}

impl TrackerExit {
    #[must_use]
    pub fn counted(self) -> usize {
        match self {
            TrackerExit::Exhausted { counted }
            | TrackerExit::Cancelled { counted }
            | TrackerExit::Disconnected { counted } => counted,
        }
    }
}

/// Sole owner of the global completion count.
///
/// Workers never touch the count directly, they send one [`Completion`] per finished request
/// and wait for it to be acknowledged before starting the next one. The tracker tallies them
/// in arrival order. Once the tally reaches the budget the shared token is cancelled, exactly
/// once, and the receiver is dropped along with any completions still queued.
pub struct BudgetTracker {
    budget: usize,
    completions: mpsc::Receiver<Completion>,
    cancel: CancellationToken,
}

impl BudgetTracker {
    #[must_use]
    pub fn new(
        budget: usize,
        completions: mpsc::Receiver<Completion>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            budget,
            completions,
            cancel,
        }
    }

    pub async fn run(mut self) -> TrackerExit {
        let mut counted = 0usize;
        let exit = loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break TrackerExit::Cancelled { counted },
                msg = self.completions.recv() => match msg {
                    Some(completion) => {
                        counted += 1;
                        let exhausted = counted >= self.budget;
                        if exhausted {
                            self.cancel.cancel();
                        }
                        // The worker may have given up waiting, that is fine.
                        let _ = completion.ack.send(());
                        if exhausted {
                            break TrackerExit::Exhausted { counted };
                        }
                    }
                    None => break TrackerExit::Disconnected { counted },
                },
            }
        };
        tracing::debug!(?exit, budget = self.budget, "budget tracker stopped");
        exit
    }
}
