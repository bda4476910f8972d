//! Wire types for the project board API under test

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Password shared by every synthetic user
pub const TEST_PASSWORD: &str = "password123";

/// Synthetic user registered once per run
///
/// Email and username embed a second-resolution timestamp so repeated runs
/// against a persistent backend never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl TestUser {
    /// Generate a user stamped with the current local time
    pub fn generate() -> Self {
        Self::stamped(&chrono::Local::now())
    }

    /// Generate a user stamped with the given time
    pub fn stamped<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let stamp = at.format("%Y%m%d%H%M%S");
        Self {
            email: format!("test_{}@example.com", stamp),
            password: TEST_PASSWORD.to_string(),
            username: format!("testuser_{}", stamp),
        }
    }

    /// Credentials for the login endpoint
    pub fn login(&self) -> LoginRequest<'_> {
        LoginRequest {
            email: &self.email,
            password: &self.password,
        }
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Decoded login response; only the token matters
///
/// The token is kept as raw JSON so a numeric token still authenticates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<serde_json::Value>,
}

impl LoginResponse {
    /// The bearer token as text, if it is a non-empty string or a number
    pub fn into_token(self) -> Option<String> {
        match self.token? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Body of project create and update calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
}

impl ProjectPayload {
    /// Project created by the create step
    pub fn sample() -> Self {
        Self {
            title: "Test Project".to_string(),
            description: "This is a test project".to_string(),
            status: ProjectStatus::Active,
        }
    }

    /// Replacement sent by the update step
    pub fn updated() -> Self {
        Self {
            title: "Updated Project".to_string(),
            description: "This is an updated project".to_string(),
            status: ProjectStatus::Completed,
        }
    }
}

/// Body of `POST /api/comments`
///
/// `projectId` is sent as `null` when no project was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    #[serde(rename = "projectId")]
    pub project_id: Option<ResourceId>,
    pub content: String,
}

impl NewComment {
    pub fn sample(project_id: Option<ResourceId>) -> Self {
        Self {
            project_id,
            content: "This is a test comment".to_string(),
        }
    }
}

/// Body of `PUT /api/comments/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentUpdate {
    pub content: String,
}

impl CommentUpdate {
    pub fn sample() -> Self {
        Self {
            content: "Updated comment".to_string(),
        }
    }
}

/// Decoded create response; only the id matters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub id: Option<ResourceId>,
}

/// Server-assigned identifier, accepted as a JSON string or integer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Text(String),
    Number(i64),
}

impl ResourceId {
    /// Path segment for an id that may never have been assigned
    pub fn segment(id: Option<&ResourceId>) -> String {
        match id {
            Some(id) => id.to_string(),
            None => "undefined".to_string(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Text(s) => write!(f, "{}", s),
            ResourceId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        ResourceId::Text(s.to_string())
    }
}
