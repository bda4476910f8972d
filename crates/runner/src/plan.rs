//! The fixed test plan

use std::fmt;

/// One named step of the smoke run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Health,
    Register,
    Login,
    CreateProject,
    ListProjects,
    GetProject,
    CreateComment,
    ListComments,
    UpdateComment,
    UpdateProject,
    DeleteComment,
    DeleteProject,
}

/// Execution order of a full run
pub const PLAN: [Step; 12] = [
    Step::Health,
    Step::Register,
    Step::Login,
    Step::CreateProject,
    Step::ListProjects,
    Step::GetProject,
    Step::CreateComment,
    Step::ListComments,
    Step::UpdateComment,
    Step::UpdateProject,
    Step::DeleteComment,
    Step::DeleteProject,
];

impl Step {
    /// Name used by the run loop (step markers, faults, abort messages)
    pub fn label(&self) -> &'static str {
        match self {
            Step::Health => "Health Check",
            Step::Register => "Registration",
            Step::Login => "Login",
            Step::CreateProject => "Create Project",
            Step::ListProjects => "Get Projects",
            Step::GetProject => "Get Project",
            Step::CreateComment => "Create Comment",
            Step::ListComments => "Get Comments",
            Step::UpdateComment => "Update Comment",
            Step::UpdateProject => "Update Project",
            Step::DeleteComment => "Delete Comment",
            Step::DeleteProject => "Delete Project",
        }
    }

    /// Name the verdict is recorded under
    pub fn test_name(&self) -> &'static str {
        match self {
            Step::Health => "Health Check",
            Step::Register => "User Registration",
            Step::Login => "User Login",
            Step::CreateProject => "Create Project",
            Step::ListProjects => "Get All Projects",
            Step::GetProject => "Get Project by ID",
            Step::CreateComment => "Create Comment",
            Step::ListComments => "Get Project Comments",
            Step::UpdateComment => "Update Comment",
            Step::UpdateProject => "Update Project",
            Step::DeleteComment => "Delete Comment",
            Step::DeleteProject => "Delete Project",
        }
    }

    /// A failed critical step ends the run
    pub fn is_critical(&self) -> bool {
        matches!(self, Step::Register | Step::Login)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
