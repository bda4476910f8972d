//! Final run report

use std::time::Duration;
use tracing::info;

use crate::outcome::{self, FailureDetail, Tally};

/// Summary produced once per run
#[derive(Debug, Clone)]
pub struct TestReport {
    pub total: usize,
    pub successful: usize,
    pub failed: Vec<(String, FailureDetail)>,

    /// Whether a critical step cut the run short
    pub aborted: bool,

    pub duration: Duration,
}

impl TestReport {
    pub fn from_tally(tally: Tally, aborted: bool, duration: Duration) -> Self {
        let (total, successful, failed) = tally.into_parts();
        Self {
            total,
            successful,
            failed,
            aborted,
            duration,
        }
    }

    /// Percentage of successful tests, None when nothing ran
    pub fn success_rate(&self) -> Option<f64> {
        outcome::success_rate(self.successful, self.total)
    }

    /// Rate as printed, e.g. `80.00%` or `N/A`
    pub fn success_rate_text(&self) -> String {
        match self.success_rate() {
            Some(rate) => format!("{:.2}%", rate),
            None => "N/A".to_string(),
        }
    }

    pub fn failure(&self, name: &str) -> Option<&FailureDetail> {
        self.failed.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Report lines in output order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "=== Test Report ===".to_string(),
            format!("Total Tests: {}", self.total),
            format!("Successful Tests: {}", self.successful),
            format!("Failed Tests: {}", self.failed.len()),
            format!("Success Rate: {}", self.success_rate_text()),
            format!("Duration: {} ms", self.duration.as_millis()),
        ];
        if self.aborted {
            lines.push("Run aborted after a critical failure".to_string());
        }

        if !self.failed.is_empty() {
            lines.push("Failed Tests Details:".to_string());
            for (name, detail) in &self.failed {
                lines.push(format!("{}:", name));
                for (key, value) in detail.fields() {
                    lines.push(format!("  {}: {}", key, value));
                }
            }
        }
        lines
    }

    /// Write the report to the log
    pub fn log(&self) {
        for line in self.lines() {
            info!("{}", line);
        }
    }
}
