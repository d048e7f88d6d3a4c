use crate::api::{
    AddTaskRequest, DeleteTaskRequest, IssuesSession, LoginRequest, LoginResponse, SignupRequest,
    SignupResponse, Task, TaskStatus,
};
use crate::{SessionToken, ValidationError};
use serde_json::json;

#[test]
fn test_login_request_validation() {
    assert_eq!(
        LoginRequest::new("", "secret"),
        Err(ValidationError::EmptyField("email"))
    );
    assert_eq!(
        LoginRequest::new("ada.example.com", "secret"),
        Err(ValidationError::InvalidEmail("ada.example.com".to_string()))
    );
    assert_eq!(
        LoginRequest::new("ada@example.com", "   "),
        Err(ValidationError::EmptyField("password"))
    );

    let request = LoginRequest::new(" ada@example.com ", "secret").unwrap();
    assert_eq!(request.email(), "ada@example.com");
}

#[test]
fn test_credentials_are_not_logged() {
    let login = LoginRequest::new("ada@example.com", "hunter2").unwrap();
    assert!(!format!("{login:?}").contains("hunter2"));

    let signup = SignupRequest::new("ada", "ada@example.com", "hunter2").unwrap();
    let debug = format!("{signup:?}");
    assert!(debug.contains("ada@example.com"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn test_signup_request_validation() {
    assert_eq!(
        SignupRequest::new("", "ada@example.com", "secret"),
        Err(ValidationError::EmptyField("username"))
    );
    let request = SignupRequest::new("ada", "ada@example.com", "secret").unwrap();
    assert_eq!(request.username(), "ada");
    assert_eq!(request.email(), "ada@example.com");
}

#[test]
fn test_task_status_parsing() {
    assert_eq!("created".parse::<TaskStatus>(), Ok(TaskStatus::Created));
    assert_eq!("In Progress".parse::<TaskStatus>(), Ok(TaskStatus::Progress));
    assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::Progress));
    assert_eq!(" Done ".parse::<TaskStatus>(), Ok(TaskStatus::Done));
    assert_eq!(
        "archived".parse::<TaskStatus>(),
        Err(ValidationError::UnknownStatus("archived".to_string()))
    );
    assert_eq!(TaskStatus::Progress.to_string(), "progress");
    assert_eq!(TaskStatus::default(), TaskStatus::Created);
}

#[test]
fn test_add_task_request_body() {
    assert_eq!(
        AddTaskRequest::new("  ", "details"),
        Err(ValidationError::EmptyField("title"))
    );

    let request = AddTaskRequest::new("Build a Todo App", "Wire it up")
        .unwrap()
        .with_status(TaskStatus::Done)
        .with_due_date("2026/10/20 09:00:00")
        .for_user(&SessionToken::new("7"));

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "title": "Build a Todo App",
            "id": "7",
            "description": "Wire it up",
            "status": "done",
            "reminder": null,
            "due_date": "2026/10/20 09:00:00",
        })
    );
}

#[test]
fn test_task_decoding_defaults_optional_fields() {
    let task: Task = serde_json::from_value(json!({"id": 3, "title": "Write tests"})).unwrap();
    assert_eq!(task.id, 3);
    assert_eq!(task.description, "");
    assert_eq!(task.status, TaskStatus::Created);
    assert_eq!(task.reminder, None);

    let edited = task.clone().with_status(TaskStatus::Progress).with_title("Write more tests").unwrap();
    assert_eq!(edited.id, 3);
    assert_eq!(edited.title, "Write more tests");
    assert_eq!(edited.status, TaskStatus::Progress);
    assert_eq!(task.with_description(""), Err(ValidationError::EmptyField("description")));
}

#[test]
fn test_delete_request_from_task() {
    let task: Task = serde_json::from_value(json!({"id": 42, "title": "Old"})).unwrap();
    assert_eq!(DeleteTaskRequest::from(&task), DeleteTaskRequest::new(42));
    assert_eq!(serde_json::to_value(DeleteTaskRequest::new(42)).unwrap(), json!({"id": 42}));
}

#[test]
fn test_session_token_is_user_id() {
    let login: LoginResponse =
        serde_json::from_value(json!({"id": 7, "username": "ada"})).unwrap();
    assert_eq!(login.session_token(), SessionToken::new("7"));

    // Extra fields such as an issued token are ignored.
    let signup: SignupResponse =
        serde_json::from_value(json!({"id": 9, "username": "grace", "token": "opaque"})).unwrap();
    assert_eq!(signup.session_token(), SessionToken::new("9"));
}
