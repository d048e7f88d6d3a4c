use crate::board::BoardModel;
use crate::tracing_setup::tracing_init;
use futures::StreamExt;
use todorx::api::{AddTaskRequest, LoginRequest, TaskStatus};
use todorx::config::ClientConfig;
use todorx::{Resource, Session};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};

mod board;
mod tracing_setup;

/// Walks through a whole session against the configured backend:
/// login, add (with a double submit), list, delete, logout.
///
/// Usage: `demo_session [config.toml]`, credentials from `TODORX_EMAIL` and
/// `TODORX_PASSWORD`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_init(Level::DEBUG);

    let config = match std::env::args().nth(1) {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    }
    .with_env_overrides()?;
    info!(base_url = %config.base_url, token_path = %config.token_path.display(), "Main | start");

    let session = Session::open(&config)?;
    let mut tokens = session.tokens().observe();
    tokio::spawn(async move {
        while let Some(token) = tokens.next().await {
            info!(logged_in = token.is_some(), "Observer | session changed");
        }
    });

    // Cancelled on the way out, which abandons anything still in flight.
    let screen = CancellationToken::new();

    if !session.is_logged_in() {
        let email = std::env::var("TODORX_EMAIL").unwrap_or_else(|_| "ada@example.com".to_string());
        let password = std::env::var("TODORX_PASSWORD").unwrap_or_else(|_| "secret".to_string());
        let request = LoginRequest::new(&email, &password)?;
        match session.login(request, screen.child_token()).terminal().await {
            Some(Resource::Success { value }) => info!(user = value.id, "Main | logged in"),
            Some(Resource::Error { detail }) => {
                warn!(%detail, "Main | login failed");
                return Ok(());
            }
            _ => return Ok(()),
        }
    }

    let board = BoardModel::new(session.clone(), screen.clone());

    let request = AddTaskRequest::new("Build a Todo App", "Wire the pipeline to the backend")?
        .with_status(TaskStatus::Progress)
        .with_due_date("2026/10/20 09:00:00");
    board.add_task(request.clone())?;
    // A second tap while the first is loading is dropped.
    board.add_task(request)?;
    let state = board.added().await;
    if let Some(Resource::Error { detail }) = state.adding {
        warn!(%detail, "Main | add failed");
    }

    board.refresh()?;
    let state = board.listed().await;
    let tasks = match state.tasks {
        Some(Resource::Success { value }) => value,
        Some(Resource::Error { detail }) => {
            warn!(%detail, "Main | listing failed");
            Vec::new()
        }
        _ => Vec::new(),
    };
    for task in &tasks {
        info!("Main | [{}] {} ({})", task.id, task.title, task.status);
    }

    for task in &tasks {
        board.delete_task(task)?;
        let state = board.deleted().await;
        if let Some(Resource::Error { detail }) = state.deleting {
            warn!(task = task.id, %detail, "Main | delete failed");
        }
        board.acknowledge_delete().await?;
    }

    session.logout()?;
    screen.cancel();
    info!("Main | Finish");
    Ok(())
}
