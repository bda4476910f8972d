//! apismoke: end-to-end smoke tests for the project board API
//!
//! Drives a fixed sequence of HTTP calls (health, auth, project CRUD,
//! comment CRUD) against a running service, checks each status code, and
//! logs a pass/fail report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TestRunner                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  run_plan(PLAN)                                             │
//! │    ├── for each Step (one at a time, pause after each)      │
//! │    │     ├── ApiClient::dispatch(request, bearer)           │
//! │    │     ├── Tally::record(name, response, expected)        │
//! │    │     └── RunState <- token / project id / comment id    │
//! │    ├── critical step failed? -> Aborted                     │
//! │    └── TestReport::log()                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod plan;
pub mod report;
pub mod runner;

pub use client::{ApiClient, ApiRequest, ApiResponse};
pub use config::RunnerConfig;
pub use error::{SmokeError, SmokeResult};
pub use outcome::{FailureDetail, Tally};
pub use plan::{Step, PLAN};
pub use report::TestReport;
pub use runner::{RunPhase, RunState, TestRunner};
