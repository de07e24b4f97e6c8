pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("worker task failed: {0}")]
    Worker(#[source] tokio::task::JoinError),

    #[error("budget tracker task failed: {0}")]
    Tracker(#[source] tokio::task::JoinError),
}
