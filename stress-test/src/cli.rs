use clap::Parser;
use stress_test::{ConfigError, RunConfig};

#[derive(Debug, Parser)]
#[command(
    name = "stress-test",
    version,
    about = "Stress test an HTTP endpoint with concurrent requests",
    long_about = "Sends a fixed number of GET requests to one URL from a pool of concurrent workers, then reports how many succeeded (HTTP 200) and how the rest failed.\n\nThe run ends once the request budget is used up, or on Ctrl-C.",
    after_help = "Examples:\n  stress-test --url http://localhost:8080 --requests 1000 --concurrency 10\n  stress-test -u https://example.com/health -r 100 -c 5"
)]
pub struct Cli {
    /// URL of the service under test.
    #[arg(short = 'u', long)]
    pub url: String,

    /// Total number of requests to send.
    #[arg(short = 'r', long)]
    pub requests: usize,

    /// Number of requests in flight at the same time.
    #[arg(short = 'c', long)]
    pub concurrency: usize,
}

impl Cli {
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        RunConfig::new(&self.url, self.requests, self.concurrency)
    }
}
