//! Fires a fixed number of GET requests at one URL from a pool of concurrent workers and
//! reports how they went.

pub mod budget;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod scenario;
pub mod statistics;
pub mod worker;

#[cfg(test)]
mod testing;

pub use budget::{BudgetTracker, TrackerExit};
pub use client::{HttpClient, Transport, TransportError};
pub use config::{ConfigError, RunConfig};
pub use error::{Error, Result};
pub use report::ConsoleReport;
pub use scenario::{Dispatcher, RunReport};
pub use statistics::{aggregate, AggregateResult};
pub use worker::{FailureLabel, Outcome, Worker, WorkerResult};
