//! Sequential runner: executes the plan step by step and reports

use std::fmt;
use std::time::{Duration, Instant};

use apismoke_common::{
    CommentUpdate, Created, LoginResponse, NewComment, ProjectPayload, ResourceId, TestUser,
};
use reqwest::StatusCode;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::config::RunnerConfig;
use crate::error::{SmokeError, SmokeResult};
use crate::outcome::Tally;
use crate::plan::{Step, PLAN};
use crate::report::TestReport;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Pending,
    Running,
    Aborted,
    Completed,
    Reported,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Pending => write!(f, "pending"),
            RunPhase::Running => write!(f, "running"),
            RunPhase::Aborted => write!(f, "aborted"),
            RunPhase::Completed => write!(f, "completed"),
            RunPhase::Reported => write!(f, "reported"),
        }
    }
}

impl RunPhase {
    fn can_transition_to(self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (RunPhase::Pending, RunPhase::Running)
                | (RunPhase::Running, RunPhase::Aborted)
                | (RunPhase::Running, RunPhase::Completed)
                | (RunPhase::Aborted, RunPhase::Reported)
                | (RunPhase::Completed, RunPhase::Reported)
        )
    }
}

/// Values carried from one step to later ones
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Bearer token, set by a successful login
    pub token: Option<String>,

    /// Set by project creation, never cleared
    pub project_id: Option<ResourceId>,

    /// Set by comment creation, never cleared
    pub comment_id: Option<ResourceId>,
}

/// Main smoke test runner
pub struct TestRunner {
    client: ApiClient,

    /// Pause after every step
    step_delay: Duration,

    /// Synthetic user for this run
    user: TestUser,

    state: RunState,
    tally: Tally,
    phase: RunPhase,
}

impl TestRunner {
    /// Create a runner against the default local service
    pub fn new() -> SmokeResult<Self> {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a runner with a freshly stamped user
    pub fn with_config(config: RunnerConfig) -> SmokeResult<Self> {
        Self::with_user(config, TestUser::generate())
    }

    /// Create a runner with a given user
    pub fn with_user(config: RunnerConfig, user: TestUser) -> SmokeResult<Self> {
        Ok(Self {
            client: ApiClient::new(&config)?,
            step_delay: config.step_delay,
            user,
            state: RunState::default(),
            tally: Tally::new(),
            phase: RunPhase::Pending,
        })
    }

    pub fn user(&self) -> &TestUser {
        &self.user
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Run the full plan
    pub async fn run_all(&mut self) -> SmokeResult<TestReport> {
        self.run_plan(&PLAN).await
    }

    /// Run the given steps in order and produce the report
    ///
    /// A runner runs once; calling this again is an invalid transition.
    /// Each step may appear at most once, since verdicts are keyed by name.
    pub async fn run_plan(&mut self, plan: &[Step]) -> SmokeResult<TestReport> {
        if let Some(step) = repeated_step(plan) {
            return Err(SmokeError::InvalidConfig(format!(
                "step {} appears more than once in the plan",
                step.label()
            )));
        }
        self.transition(RunPhase::Running)?;
        let start = Instant::now();

        info!("=== Starting API Tests ===");
        info!("Target: {}", self.client.base_url());
        debug!("Test user: {} / {}", self.user.email, self.user.username);

        for &step in plan {
            info!("=== Running Test: {} ===", step.label());

            let passed = match self.run_step(step).await {
                Ok(passed) => passed,
                Err(e) => {
                    error!("Test {} failed with exception: {}", step.label(), e);
                    self.tally.record_fault(step.label(), e.to_string());
                    false
                }
            };

            let abort = !passed && step.is_critical();
            if abort {
                error!("Critical test {} failed. Stopping tests.", step.label());
            }

            sleep(self.step_delay).await;

            if abort {
                self.transition(RunPhase::Aborted)?;
                break;
            }
        }

        if self.phase == RunPhase::Running {
            self.transition(RunPhase::Completed)?;
        }

        self.generate_report(start.elapsed())
    }

    fn generate_report(&mut self, duration: Duration) -> SmokeResult<TestReport> {
        let aborted = self.phase == RunPhase::Aborted;
        self.transition(RunPhase::Reported)?;

        let report = TestReport::from_tally(self.tally.clone(), aborted, duration);
        report.log();
        Ok(report)
    }

    fn transition(&mut self, next: RunPhase) -> SmokeResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(SmokeError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        debug!("Run {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Execute one step; `Err` is a fault, `Ok(false)` a failed assertion
    pub async fn run_step(&mut self, step: Step) -> SmokeResult<bool> {
        match step {
            Step::Health => self.test_health().await,
            Step::Register => self.test_register().await,
            Step::Login => self.test_login().await,
            Step::CreateProject => self.test_create_project().await,
            Step::ListProjects => self.test_list_projects().await,
            Step::GetProject => self.test_get_project().await,
            Step::CreateComment => self.test_create_comment().await,
            Step::ListComments => self.test_list_comments().await,
            Step::UpdateComment => self.test_update_comment().await,
            Step::UpdateProject => self.test_update_project().await,
            Step::DeleteComment => self.test_delete_comment().await,
            Step::DeleteProject => self.test_delete_project().await,
        }
    }

    pub async fn test_health(&mut self) -> SmokeResult<bool> {
        self.check(Step::Health, ApiRequest::get("/health")).await
    }

    pub async fn test_register(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::post("/api/auth/register", &self.user)?.expect(StatusCode::CREATED);
        self.check(Step::Register, request).await
    }

    pub async fn test_login(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::post("/api/auth/login", &self.user.login())?;
        let response = self.send(&request).await?;

        let token = self.record_with(Step::Login, response.as_ref(), request.expected, "token", |r| {
            r.json::<LoginResponse>().ok().and_then(LoginResponse::into_token)
        });
        let passed = token.is_some();
        if token.is_some() {
            self.state.token = token;
        }
        Ok(passed)
    }

    pub async fn test_create_project(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::post("/api/projects", &ProjectPayload::sample())?
            .expect(StatusCode::CREATED);
        let response = self.send(&request).await?;

        let id = self.record_with(Step::CreateProject, response.as_ref(), request.expected, "id", created_id);
        let passed = id.is_some();
        if id.is_some() {
            self.state.project_id = id;
        }
        Ok(passed)
    }

    pub async fn test_list_projects(&mut self) -> SmokeResult<bool> {
        self.check(Step::ListProjects, ApiRequest::get("/api/projects")).await
    }

    pub async fn test_get_project(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::get(self.project_path());
        self.check(Step::GetProject, request).await
    }

    pub async fn test_create_comment(&mut self) -> SmokeResult<bool> {
        let body = NewComment::sample(self.state.project_id.clone());
        let request = ApiRequest::post("/api/comments", &body)?.expect(StatusCode::CREATED);
        let response = self.send(&request).await?;

        let id = self.record_with(Step::CreateComment, response.as_ref(), request.expected, "id", created_id);
        let passed = id.is_some();
        if id.is_some() {
            self.state.comment_id = id;
        }
        Ok(passed)
    }

    pub async fn test_list_comments(&mut self) -> SmokeResult<bool> {
        let path = format!(
            "/api/comments/project/{}",
            ResourceId::segment(self.state.project_id.as_ref())
        );
        self.check(Step::ListComments, ApiRequest::get(path)).await
    }

    pub async fn test_update_comment(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::put(self.comment_path(), &CommentUpdate::sample())?;
        self.check(Step::UpdateComment, request).await
    }

    pub async fn test_update_project(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::put(self.project_path(), &ProjectPayload::updated())?;
        self.check(Step::UpdateProject, request).await
    }

    pub async fn test_delete_comment(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::delete(self.comment_path());
        self.check(Step::DeleteComment, request).await
    }

    pub async fn test_delete_project(&mut self) -> SmokeResult<bool> {
        let request = ApiRequest::delete(self.project_path());
        self.check(Step::DeleteProject, request).await
    }

    fn project_path(&self) -> String {
        format!("/api/projects/{}", ResourceId::segment(self.state.project_id.as_ref()))
    }

    fn comment_path(&self) -> String {
        format!("/api/comments/{}", ResourceId::segment(self.state.comment_id.as_ref()))
    }

    async fn send(&self, request: &ApiRequest) -> SmokeResult<Option<ApiResponse>> {
        self.client.dispatch(request, self.state.token.as_deref()).await
    }

    /// Dispatch and record a status-only step
    async fn check(&mut self, step: Step, request: ApiRequest) -> SmokeResult<bool> {
        let response = self.send(&request).await?;
        Ok(self.tally.record(step.test_name(), response.as_ref(), request.expected))
    }

    /// Record a step whose response must also carry `field`
    ///
    /// A matching status with the field absent counts as one failed test.
    fn record_with<T, F>(
        &mut self,
        step: Step,
        response: Option<&ApiResponse>,
        expected: StatusCode,
        field: &str,
        pick: F,
    ) -> Option<T>
    where
        F: FnOnce(&ApiResponse) -> Option<T>,
    {
        let name = step.test_name();
        match response {
            Some(resp) if resp.status == expected => match pick(resp) {
                Some(value) => {
                    self.tally.record(name, Some(resp), expected);
                    Some(value)
                }
                None => {
                    error!("No {} received in {} response", field, name);
                    self.tally
                        .record_fault(name, format!("response is missing the `{}` field", field));
                    None
                }
            },
            _ => {
                self.tally.record(name, response, expected);
                None
            }
        }
    }
}

fn repeated_step(plan: &[Step]) -> Option<Step> {
    plan.iter()
        .enumerate()
        .find(|(i, step)| plan[..*i].contains(*step))
        .map(|(_, step)| *step)
}

fn created_id(response: &ApiResponse) -> Option<ResourceId> {
    response.json::<Created>().ok().and_then(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> TestRunner {
        let config = RunnerConfig {
            step_delay: Duration::ZERO,
            ..RunnerConfig::for_base_url("http://127.0.0.1:9")
        };
        TestRunner::with_config(config).unwrap()
    }

    #[test]
    fn test_phase_transitions() {
        assert!(RunPhase::Pending.can_transition_to(RunPhase::Running));
        assert!(RunPhase::Running.can_transition_to(RunPhase::Aborted));
        assert!(RunPhase::Running.can_transition_to(RunPhase::Completed));
        assert!(RunPhase::Aborted.can_transition_to(RunPhase::Reported));
        assert!(RunPhase::Completed.can_transition_to(RunPhase::Reported));

        assert!(!RunPhase::Pending.can_transition_to(RunPhase::Reported));
        assert!(!RunPhase::Reported.can_transition_to(RunPhase::Running));
        assert!(!RunPhase::Aborted.can_transition_to(RunPhase::Completed));
    }

    #[test]
    fn test_paths_with_missing_ids() {
        let r = runner();
        assert_eq!(r.project_path(), "/api/projects/undefined");
        assert_eq!(r.comment_path(), "/api/comments/undefined");
    }

    #[test]
    fn test_paths_with_ids() {
        let mut r = runner();
        r.state.project_id = Some(ResourceId::from("p1"));
        r.state.comment_id = Some(ResourceId::Number(12));
        assert_eq!(r.project_path(), "/api/projects/p1");
        assert_eq!(r.comment_path(), "/api/comments/12");
    }

    #[test]
    fn test_missing_field_counts_once_as_failure() {
        let mut r = runner();
        let resp = ApiResponse::new(StatusCode::CREATED, r#"{"title":"Test Project"}"#);
        let id = r.record_with(Step::CreateProject, Some(&resp), StatusCode::CREATED, "id", created_id);

        assert!(id.is_none());
        assert_eq!(r.tally().total(), 1);
        assert_eq!(r.tally().successful(), 0);
        assert!(r.tally().failure("Create Project").is_some());
    }

    #[test]
    fn test_non_json_body_is_missing_field() {
        let mut r = runner();
        let resp = ApiResponse::new(StatusCode::OK, "<html>ok</html>");
        let token = r.record_with(Step::Login, Some(&resp), StatusCode::OK, "token", |r| {
            r.json::<LoginResponse>().ok().and_then(LoginResponse::into_token)
        });
        assert!(token.is_none());
        assert_eq!(r.tally().failed().len(), 1);
    }

    #[test]
    fn test_repeated_step_detection() {
        assert_eq!(repeated_step(&PLAN), None);
        assert_eq!(repeated_step(&[]), None);
        assert_eq!(
            repeated_step(&[Step::Health, Step::Login, Step::Health]),
            Some(Step::Health)
        );
    }

    #[tokio::test]
    async fn test_plan_with_repeated_step_is_rejected() {
        let mut r = runner();
        let result = r.run_plan(&[Step::Health, Step::Health]).await;

        assert!(matches!(result, Err(SmokeError::InvalidConfig(_))));
        assert_eq!(r.phase(), RunPhase::Pending);
        assert_eq!(r.tally().total(), 0);
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let mut r = runner();
        let report = r.run_plan(&[]).await.unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(r.phase(), RunPhase::Reported);

        assert!(matches!(
            r.run_plan(&[]).await,
            Err(SmokeError::InvalidStateTransition { .. })
        ));
    }
}
