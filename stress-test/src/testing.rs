use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hyper::{StatusCode, Uri};

use crate::client::{Transport, TransportError};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    Status(StatusCode),
    TransportError,
    /// Never answers.
    Hang,
}

/// In-process transport replaying a fixed script, then repeating `fallback` forever.
///
/// Every call yields to the scheduler once before answering, the way a real network round
/// trip would.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Reply>>>,
    fallback: Reply,
    calls: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub(crate) fn new<I: IntoIterator<Item = Reply>>(script: I) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            fallback: Reply::Hang,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn always(reply: Reply) -> Self {
        Self {
            fallback: reply,
            ..Self::new(std::iter::empty())
        }
    }

    /// Calls that got past the initial yield.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }

    fn next_reply(&self) -> Reply {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, _target: &Uri) -> Result<StatusCode, TransportError> {
        tokio::task::yield_now().await;
        self.calls.fetch_add(1, Ordering::AcqRel);
        match self.next_reply() {
            Reply::Status(status) => Ok(status),
            Reply::TransportError => Err(transport_error()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// A real transport error without touching the network: a method token with a space in it.
fn transport_error() -> TransportError {
    let err = hyper::Request::builder()
        .method("NOT VALID")
        .body(())
        .unwrap_err();
    TransportError::RequestBuild(err)
}
