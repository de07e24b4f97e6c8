use std::fmt;

use crate::scenario::RunReport;
use crate::worker::FailureLabel;

/// Human readable rendering of a [`RunReport`] for the terminal.
pub struct ConsoleReport<'a>(pub &'a RunReport);

impl fmt::Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let result = &report.result;
        if report.interrupted {
            writeln!(f, "Run interrupted before the request budget was used up")?;
        }
        writeln!(f, "Tests finished in {:.2?}", report.elapsed)?;
        writeln!(f, "Total requests: {}", result.requests_completed)?;
        writeln!(f, "Successes (HTTP 200): {}", result.successes)?;
        writeln!(f, "Throughput: {:.2} req/s", report.requests_per_second())?;
        if result.failures.is_empty() {
            return writeln!(f, "Failures (by status code): none");
        }
        writeln!(f, "Failures (by status code):")?;
        for (label, count) in &result.failures {
            match label {
                FailureLabel::Status(status) => match status.canonical_reason() {
                    Some(reason) => writeln!(f, "    {label} {reason}: {count}")?,
                    None => writeln!(f, "    {label}: {count}")?,
                },
                FailureLabel::Unknown => writeln!(f, "    {label}: {count}")?,
            }
        }
        Ok(())
    }
}
