#![allow(dead_code)]

use axum::body::Body;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todorx::api::{ApiClient, Task, TaskStatus};
use todorx::config::ClientConfig;
use todorx::{Pipeline, Session, TokenStore};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "secret";
pub const USER_ID: i64 = 7;
/// Id handed to the next signup.
pub const SIGNUP_ID: i64 = 8;
/// Logging in with this address makes the backend stall.
pub const SLOW_EMAIL: &str = "slow@example.com";
/// Logging in with this address returns a body that is not JSON.
pub const GARBLED_EMAIL: &str = "garbled@example.com";
/// Logging in with this address returns 503 with a body cut off mid-stream.
pub const BROKEN_EMAIL: &str = "broken@example.com";

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct BackendState {
    tasks: Vec<(String, Task)>,
    next_id: i64,
    signed_up: Vec<i64>,
    requests: Vec<Recorded>,
}

/// In-process stand-in for the to-do backend.
#[derive(Debug, Clone, Default)]
pub struct Backend {
    state: Arc<Mutex<BackendState>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().last().cloned().expect("no request recorded")
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state
            .lock()
            .unwrap()
            .tasks
            .iter()
            .map(|(_, task)| task.clone())
            .collect()
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap, body: Option<Value>) {
        let value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.state.lock().unwrap().requests.push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            authorization: value(header::AUTHORIZATION),
            content_type: value(header::CONTENT_TYPE),
            body,
        });
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Accepts `Bearer <user id>` for the seeded user and anyone who signed up.
fn authorized(backend: &Backend, headers: &HeaderMap) -> bool {
    let Some(user) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|v| v.parse::<i64>().ok())
    else {
        return false;
    };
    user == USER_ID || backend.state.lock().unwrap().signed_up.contains(&user)
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn auth(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(credentials): Query<Credentials>,
) -> Response {
    backend.record("GET", "/auth", &headers, None);
    match credentials.email.as_str() {
        SLOW_EMAIL => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            error(StatusCode::GATEWAY_TIMEOUT, "too slow")
        }
        GARBLED_EMAIL => (StatusCode::OK, "<html>not json</html>").into_response(),
        BROKEN_EMAIL => {
            let cut = futures::stream::once(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err(std::io::Error::other("connection reset"))
            });
            let chunks = futures::stream::iter([Ok::<_, std::io::Error>("{\"error\":".to_string())]).chain(cut);
            (StatusCode::SERVICE_UNAVAILABLE, Body::from_stream(chunks)).into_response()
        }
        EMAIL if credentials.password == PASSWORD => Json(json!({
            "id": USER_ID,
            "username": "ada",
            "email": EMAIL,
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "invalid credentials"),
    }
}

#[derive(Deserialize)]
struct SignupForm {
    username: String,
    email: String,
    #[allow(dead_code)]
    password: String,
}

async fn signup(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Form(form): Form<SignupForm>,
) -> Response {
    backend.record(
        "POST",
        "/signup",
        &headers,
        Some(json!({ "username": form.username, "email": form.email })),
    );
    if form.username == "taken" {
        return error(StatusCode::CONFLICT, "user already exists");
    }
    let id = {
        let mut state = backend.state.lock().unwrap();
        let id = SIGNUP_ID + state.signed_up.len() as i64;
        state.signed_up.push(id);
        id
    };
    Json(json!({
        "id": id,
        "username": form.username,
        "email": form.email,
        // Not a credential the client should keep; sessions are keyed by id.
        "token": "signup-token",
    }))
    .into_response()
}

#[derive(Deserialize)]
struct Owner {
    id: String,
}

async fn list_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(owner): Query<Owner>,
) -> Response {
    backend.record("GET", "/tasks", &headers, Some(json!({ "id": owner.id })));
    if !authorized(&backend, &headers) {
        return error(StatusCode::UNAUTHORIZED, "missing credentials");
    }
    let state = backend.state.lock().unwrap();
    let tasks: Vec<Task> = state
        .tasks
        .iter()
        .filter(|(user, _)| *user == owner.id)
        .map(|(_, task)| task.clone())
        .collect();
    Json(tasks).into_response()
}

/// Adds a task when `id` is the owner's id string, edits one when it is a
/// numeric task id.
async fn save_task(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("POST", "/tasks", &headers, Some(body.clone()));
    if !authorized(&backend, &headers) {
        return error(StatusCode::UNAUTHORIZED, "missing credentials");
    }
    let mut state = backend.state.lock().unwrap();
    if body["id"].is_i64() {
        let Ok(task) = serde_json::from_value::<Task>(body) else {
            return error(StatusCode::BAD_REQUEST, "malformed task");
        };
        return match state.tasks.iter_mut().find(|(_, t)| t.id == task.id) {
            Some((_, stored)) => {
                *stored = task.clone();
                Json(task).into_response()
            }
            None => error(StatusCode::NOT_FOUND, "task not found"),
        };
    }

    let owner = body["id"].as_str().unwrap_or_default().to_string();
    state.next_id += 1;
    let task = Task {
        id: state.next_id,
        title: body["title"].as_str().unwrap_or_default().to_string(),
        description: body["description"].as_str().unwrap_or_default().to_string(),
        status: serde_json::from_value(body["status"].clone()).unwrap_or(TaskStatus::Created),
        reminder: body["reminder"].as_str().map(str::to_string),
        due_date: body["due_date"].as_str().map(str::to_string),
    };
    let id = task.id;
    state.tasks.push((owner, task));
    Json(json!({ "id": id, "message": "Task added" })).into_response()
}

async fn delete_task(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("DELETE", "/tasks", &headers, Some(body.clone()));
    if !authorized(&backend, &headers) {
        return error(StatusCode::UNAUTHORIZED, "missing credentials");
    }
    let mut state = backend.state.lock().unwrap();
    let before = state.tasks.len();
    state.tasks.retain(|(_, task)| Some(task.id) != body["id"].as_i64());
    if state.tasks.len() == before {
        return error(StatusCode::NOT_FOUND, "task not found");
    }
    Json(json!({ "message": "Task deleted" })).into_response()
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/auth", get(auth))
        .route("/signup", axum::routing::post(signup))
        .route(
            "/tasks",
            get(list_tasks).post(save_task).delete(delete_task),
        )
        .with_state(backend)
}

/// Serves a fresh backend on a random local port and returns its base URL.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

pub fn config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        ..ClientConfig::default()
    }
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&config(base_url)).unwrap()
}

/// A session with an in-memory token store.
pub fn session(base_url: &str) -> Session {
    Session::new(
        Arc::new(TokenStore::in_memory()),
        client(base_url),
        Pipeline::new(),
    )
}
