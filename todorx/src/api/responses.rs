//! Response bodies returned by the backend.
//!
//! Optional fields default when absent so that additive backend changes do
//! not break decoding.

use crate::SessionToken;
use serde::{Deserialize, Serialize};

/// Responses that start a session.
pub trait IssuesSession {
    /// The value kept for later requests: the user id. It names the owner of
    /// new tasks and the list to fetch, and is sent as the bearer credential.
    fn session_token(&self) -> SessionToken;
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl IssuesSession for LoginResponse {
    fn session_token(&self) -> SessionToken {
        SessionToken::new(self.id.to_string())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl IssuesSession for SignupResponse {
    fn session_token(&self) -> SessionToken {
        SessionToken::new(self.id.to_string())
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AddTasksResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    #[serde(default)]
    pub message: Option<String>,
}
