use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use todorx::api::{AddTaskRequest, AddTasksResponse, DeleteTaskRequest, DeleteTaskResponse, Task};
use todorx::{Resource, Session, State, StateStore, StoreError, TodoRxStreamExt, ValidationError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub adding: Option<Resource<AddTasksResponse>>,
    pub tasks: Option<Resource<Vec<Task>>>,
    pub deleting: Option<Resource<DeleteTaskResponse>>,
}

impl State for BoardState {}

impl BoardState {
    fn set_tasks(self, tasks: Resource<Vec<Task>>) -> Self {
        Self {
            tasks: Some(tasks),
            ..self
        }
    }

    fn set_deleting(self, deleting: Resource<DeleteTaskResponse>) -> Self {
        Self {
            deleting: Some(deleting),
            ..self
        }
    }
}

fn is_complete<T>(resource: &Option<Resource<T>>) -> bool {
    resource.as_ref().is_some_and(Resource::is_complete)
}

#[derive(Error, Debug)]
pub enum BoardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// View model of the task list screen.
pub struct BoardModel {
    session: Session,
    store: Arc<StateStore<BoardState>>,
    // Owned by the screen; cancelled when it goes away.
    screen: CancellationToken,
}

impl BoardModel {
    pub fn new(session: Session, screen: CancellationToken) -> Self {
        Self {
            session,
            store: Arc::new(StateStore::new(BoardState::default())),
            screen,
        }
    }

    /// Ignored while a previous add is still loading. An add abandoned with
    /// the screen leaves `adding` as it was.
    pub fn add_task(&self, request: AddTaskRequest) -> Result<(), BoardError> {
        let session = self.session.clone();
        let token = self.screen.child_token();
        self.store.bind_exclusive(
            |state| state.adding.as_ref(),
            move || session.add_task(request, token),
            |state, adding| BoardState { adding, ..state },
        )?;
        Ok(())
    }

    pub fn refresh(&self) -> Result<(), BoardError> {
        let stream = self.session.list_tasks(self.screen.child_token())?;
        drop(self.store.bind(stream, |state, tasks| state.set_tasks(tasks)));
        Ok(())
    }

    pub fn delete_task(&self, task: &Task) -> Result<(), BoardError> {
        let stream = self
            .session
            .delete_task(DeleteTaskRequest::from(task), self.screen.child_token());
        drop(self.store.bind(stream, |state, deleting| state.set_deleting(deleting)));
        Ok(())
    }

    pub async fn added(&self) -> BoardState {
        self.settle(|state| is_complete(&state.adding)).await
    }

    pub async fn listed(&self) -> BoardState {
        self.settle(|state| is_complete(&state.tasks)).await
    }

    pub async fn deleted(&self) -> BoardState {
        self.settle(|state| is_complete(&state.deleting)).await
    }

    async fn settle<F>(&self, done: F) -> BoardState
    where
        F: Fn(&BoardState) -> bool,
    {
        let mut states = std::pin::pin!(self.store.to_stream().stop_if(|state| done(state)));
        let mut last = None;
        while let Some(state) = states.next().await {
            debug!(
                adding = ?state.adding.as_ref().map(summary),
                tasks = ?state.tasks.as_ref().map(summary),
                deleting = ?state.deleting.as_ref().map(summary),
                "board changed"
            );
            last = Some(state);
        }
        last.unwrap_or_else(|| self.store.get_state())
    }

    /// Forgets the last delete so the next one can be awaited.
    pub async fn acknowledge_delete(&self) -> Result<(), BoardError> {
        self.store.set_state(|state| BoardState {
            deleting: None,
            ..state
        })?;
        self.store.await_state().await?;
        info!("delete acknowledged");
        Ok(())
    }
}

fn summary<T>(resource: &Resource<T>) -> &'static str {
    match resource {
        Resource::Loading => "loading",
        Resource::Success { .. } => "success",
        Resource::Error { .. } => "error",
    }
}
