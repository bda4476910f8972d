//! Per-step verdicts and the running tally

use reqwest::StatusCode;
use tracing::{error, info};

use crate::client::ApiResponse;

/// Why a step did not pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDetail {
    /// Wrong status, or no response at all (`actual` is None)
    StatusMismatch {
        expected: u16,
        actual: Option<u16>,
        body: String,
    },

    /// Fault raised by step logic, or an expected field missing from a
    /// response whose status matched
    Fault { message: String },
}

impl FailureDetail {
    pub fn fault(message: impl Into<String>) -> Self {
        FailureDetail::Fault {
            message: message.into(),
        }
    }

    /// Field name / value pairs as they appear in the report
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            FailureDetail::StatusMismatch {
                expected,
                actual,
                body,
            } => vec![
                ("expected_status", expected.to_string()),
                ("actual_status", status_text(*actual)),
                ("response", body.clone()),
            ],
            FailureDetail::Fault { message } => vec![("exception", message.clone())],
        }
    }
}

fn status_text(status: Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_string(),
    }
}

/// Counters and failure record for one run
///
/// `total == successful + failed.len()` holds after every record call as long
/// as each test name is recorded once.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    total: usize,
    successful: usize,
    failed: Vec<(String, FailureDetail)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    /// Failed tests in the order they first failed
    pub fn failed(&self) -> &[(String, FailureDetail)] {
        &self.failed
    }

    pub fn failure(&self, name: &str) -> Option<&FailureDetail> {
        self.failed.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Compare a response against the expected status and count it
    ///
    /// Returns true iff the status matched. A missing response never matches.
    pub fn record(&mut self, name: &str, response: Option<&ApiResponse>, expected: StatusCode) -> bool {
        self.total += 1;

        match response {
            Some(resp) if resp.status == expected => {
                self.successful += 1;
                info!("✅ {} - Success", name);
                true
            }
            _ => {
                let actual = response.map(|r| r.status.as_u16());
                error!("❌ {} - Failed", name);
                error!(
                    "Expected status {}, got {}",
                    expected.as_u16(),
                    status_text(actual)
                );
                self.insert_failure(
                    name,
                    FailureDetail::StatusMismatch {
                        expected: expected.as_u16(),
                        actual,
                        body: response.map(|r| r.body.clone()).unwrap_or_default(),
                    },
                );
                false
            }
        }
    }

    /// Count a failed test with a fault message
    pub fn record_fault(&mut self, name: &str, message: impl Into<String>) {
        self.total += 1;
        error!("❌ {} - Failed", name);
        self.insert_failure(name, FailureDetail::fault(message));
    }

    /// Percentage of successful tests, None when nothing ran
    pub fn success_rate(&self) -> Option<f64> {
        success_rate(self.successful, self.total)
    }

    pub(crate) fn into_parts(self) -> (usize, usize, Vec<(String, FailureDetail)>) {
        (self.total, self.successful, self.failed)
    }

    fn insert_failure(&mut self, name: &str, detail: FailureDetail) {
        match self.failed.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = detail,
            None => self.failed.push((name.to_string(), detail)),
        }
    }
}

pub(crate) fn success_rate(successful: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(successful as f64 / total as f64 * 100.0)
    }
}
