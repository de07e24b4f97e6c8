use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;
use stress_test::{ConsoleReport, Dispatcher, HttpClient, RunConfig, RunReport};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::exit_codes::ExitCode;

mod cli;
mod exit_codes;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(v) => v,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::InvalidInput,
            };
            std::process::exit(code.as_i32());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.run_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error during stress tests: {err}");
            std::process::exit(ExitCode::InvalidInput.as_i32());
        }
    };

    let code = match run(config) {
        Ok(report) => {
            print!("{}", ConsoleReport(&report));
            if report.interrupted {
                ExitCode::Interrupted
            } else {
                ExitCode::Success
            }
        }
        Err(err) => {
            eprintln!("Error during stress tests: {err:#}");
            ExitCode::RuntimeError
        }
    };
    std::process::exit(code.as_i32());
}

fn run(config: RunConfig) -> anyhow::Result<RunReport> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    rt.block_on(async move {
        let dispatcher = Dispatcher::new(config, HttpClient::new());
        tokio::spawn(cancel_on_ctrl_c(dispatcher.cancel_token()));
        dispatcher.run().await.context("Stress test run failed")
    })
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::select! {
        () = cancel.cancelled() => {}
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => {
                tracing::warn!("interrupted, stopping workers");
                cancel.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "failed to listen for ctrl-c"),
        },
    }
}
