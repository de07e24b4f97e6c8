//! A throwaway HTTP target answering every request with a scripted status code.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::SharedCounter;

#[derive(Clone)]
struct StubState {
    hits: SharedCounter,
    script: Arc<[StatusCode]>,
}

impl StubState {
    /// Statuses are handed out in script order, the last one repeats forever.
    fn next_status(&self) -> StatusCode {
        let idx = self.hits.increment();
        self.script
            .get(idx)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or(StatusCode::OK)
    }
}

async fn respond(State(state): State<StubState>) -> StatusCode {
    state.next_status()
}

pub struct StubServer {
    addr: SocketAddr,
    hits: SharedCounter,
    task: Option<JoinHandle<io::Result<()>>>,
}

impl StubServer {
    /// Answers every request with `status`.
    pub async fn fixed(status: StatusCode) -> io::Result<Self> {
        Self::scripted([status]).await
    }

    /// Answers requests with `statuses` in order, repeating the last one once the script runs
    /// out. An empty script answers `200 OK`.
    pub async fn scripted<I>(statuses: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = StatusCode>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let hits = SharedCounter::new();
        let state = StubState {
            hits: hits.clone(),
            script: statuses.into_iter().collect(),
        };
        let router = Router::new().fallback(respond).with_state(state);

        let task = tokio::spawn(async move { axum::serve(listener, router).await });

        Ok(Self {
            addr,
            hits,
            task: Some(task),
        })
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of requests the server has answered so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    /// Stops accepting connections. Connections that are already open keep being served
    /// until their client hangs up or the runtime goes away.
    ///
    /// Fails with the server's own error if it stopped serving before being asked to.
    pub async fn shutdown(mut self) -> io::Result<()> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.abort();
        match task.await {
            Ok(served) => served,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
