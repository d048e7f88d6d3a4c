//! Request values built from user input.
//!
//! Constructors validate their input and return [`ValidationError`] before
//! anything reaches the network. Once built, a request is never mutated; the
//! `with_*` methods consume the value and return a new one.

use crate::{SessionToken, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Progress of a task. The backend stores it as a lowercase string.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Created,
    Progress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Progress => "progress",
            TaskStatus::Done => "done",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(TaskStatus::Created),
            "progress" | "in progress" | "in_progress" => Ok(TaskStatus::Progress),
            "done" => Ok(TaskStatus::Done),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(value.to_string())
    }
}

fn email(value: &str) -> Result<String, ValidationError> {
    let value = required("email", value)?;
    match value.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(value),
        _ => Err(ValidationError::InvalidEmail(value)),
    }
}

/// Sent as query parameters to `GET /auth`.
#[derive(Clone, Eq, PartialEq, Serialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl LoginRequest {
    pub fn new(email_address: &str, password: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            email: email(email_address)?,
            password: required("password", password)?,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Debug for LoginRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Sent as form fields to `POST /signup`.
#[derive(Clone, Eq, PartialEq, Serialize)]
pub struct SignupRequest {
    username: String,
    email: String,
    password: String,
}

impl SignupRequest {
    pub fn new(username: &str, email_address: &str, password: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            username: required("username", username)?,
            email: email(email_address)?,
            password: required("password", password)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Debug for SignupRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// JSON body of `POST /tasks` for a new task.
///
/// `id` is the owning user's identifier, not the task's.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AddTaskRequest {
    pub title: String,
    pub id: Option<String>,
    pub description: String,
    pub status: TaskStatus,
    pub reminder: Option<String>,
    pub due_date: Option<String>,
}

impl AddTaskRequest {
    pub fn new(title: &str, description: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required("title", title)?,
            id: None,
            description: required("description", description)?,
            status: TaskStatus::default(),
            reminder: None,
            due_date: None,
        })
    }

    pub fn with_status(self, status: TaskStatus) -> Self {
        Self { status, ..self }
    }

    pub fn with_reminder(self, reminder: impl Into<String>) -> Self {
        Self {
            reminder: Some(reminder.into()),
            ..self
        }
    }

    pub fn with_due_date(self, due_date: impl Into<String>) -> Self {
        Self {
            due_date: Some(due_date.into()),
            ..self
        }
    }

    pub fn for_user(self, user: &SessionToken) -> Self {
        Self {
            id: Some(user.as_str().to_string()),
            ..self
        }
    }
}

/// Full representation of a stored task. Sent as-is to edit a task.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub reminder: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl Task {
    pub fn with_status(self, status: TaskStatus) -> Self {
        Self { status, ..self }
    }

    pub fn with_title(self, title: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required("title", title)?,
            ..self
        })
    }

    pub fn with_description(self, description: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            description: required("description", description)?,
            ..self
        })
    }
}

/// JSON body of `DELETE /tasks`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeleteTaskRequest {
    pub id: i64,
}

impl DeleteTaskRequest {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

impl From<&Task> for DeleteTaskRequest {
    fn from(task: &Task) -> Self {
        Self { id: task.id }
    }
}
