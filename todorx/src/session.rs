use crate::api::{
    AddTaskRequest, AddTasksResponse, ApiClient, DeleteTaskRequest, DeleteTaskResponse,
    IssuesSession, LoginRequest, LoginResponse, SignupRequest, SignupResponse, Task,
};
use crate::config::{ClientConfig, ConfigError};
use crate::{
    ErrorDetail, FileTokenStorage, Pipeline, ResourceStream, SessionToken, TokenStore,
    TokenStoreError, ValidationError,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] ErrorDetail),
}

/// Everything an operation needs to talk to the backend on behalf of the
/// current user.
///
/// Created once at start-up and handed to whatever needs it. Every operation
/// takes a [`CancellationToken`] owned by the caller and returns the
/// [`ResourceStream`] of its run.
#[derive(Debug, Clone)]
pub struct Session {
    tokens: Arc<TokenStore>,
    api: ApiClient,
    pipeline: Pipeline,
}

impl Session {
    pub fn new(tokens: Arc<TokenStore>, api: ApiClient, pipeline: Pipeline) -> Self {
        Self {
            tokens,
            api,
            pipeline,
        }
    }

    /// Builds a session backed by the token file named in `config`.
    pub fn open(config: &ClientConfig) -> Result<Self, SessionError> {
        let tokens = TokenStore::open(FileTokenStorage::new(&config.token_path))?;
        let api = ApiClient::new(config)?;
        Ok(Self::new(Arc::new(tokens), api, Pipeline::new()))
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.is_present()
    }

    pub fn login(
        &self,
        request: LoginRequest,
        cancellation_token: CancellationToken,
    ) -> ResourceStream<LoginResponse> {
        let api = self.api.clone();
        let tokens = self.tokens.clone();
        self.pipeline
            .run("login", cancellation_token, async move { api.login(&request).await })
            .on_success(move |response| Self::start(&tokens, response.session_token()))
    }

    pub fn signup(
        &self,
        request: SignupRequest,
        cancellation_token: CancellationToken,
    ) -> ResourceStream<SignupResponse> {
        let api = self.api.clone();
        let tokens = self.tokens.clone();
        self.pipeline
            .run("signup", cancellation_token, async move { api.signup(&request).await })
            .on_success(move |response| Self::start(&tokens, response.session_token()))
    }

    /// Adds a task. When the request names no owner, the current user is used.
    pub fn add_task(
        &self,
        request: AddTaskRequest,
        cancellation_token: CancellationToken,
    ) -> ResourceStream<AddTasksResponse> {
        let api = self.api.clone();
        let token = self.tokens.read();
        let request = match &token {
            Some(token) if request.id.is_none() => request.for_user(token),
            _ => request,
        };
        self.pipeline.run("add_task", cancellation_token, async move {
            api.add_task(&request, token.as_ref()).await
        })
    }

    pub fn edit_task(
        &self,
        task: Task,
        cancellation_token: CancellationToken,
    ) -> ResourceStream<Task> {
        let api = self.api.clone();
        let token = self.tokens.read();
        self.pipeline.run("edit_task", cancellation_token, async move {
            api.edit_task(&task, token.as_ref()).await
        })
    }

    pub fn delete_task(
        &self,
        request: DeleteTaskRequest,
        cancellation_token: CancellationToken,
    ) -> ResourceStream<DeleteTaskResponse> {
        let api = self.api.clone();
        let token = self.tokens.read();
        self.pipeline.run("delete_task", cancellation_token, async move {
            api.delete_task(&request, token.as_ref()).await
        })
    }

    /// Lists the current user's tasks. Requires a session; without one the
    /// backend is not contacted.
    pub fn list_tasks(
        &self,
        cancellation_token: CancellationToken,
    ) -> Result<ResourceStream<Vec<Task>>, ValidationError> {
        let api = self.api.clone();
        let token = self.tokens.read().ok_or(ValidationError::NotLoggedIn)?;
        Ok(self.pipeline.run("list_tasks", cancellation_token, async move {
            api.list_tasks(token.as_str(), Some(&token)).await
        }))
    }

    /// Ends the session. This is the only way a session ends; failed
    /// operations never log the user out.
    pub fn logout(&self) -> Result<(), TokenStoreError> {
        info!("logging out");
        self.tokens.clear()
    }

    /// Runs only when the success reaches the caller, so a cancelled login
    /// leaves the store untouched.
    fn start(tokens: &TokenStore, token: SessionToken) {
        // The in-memory token is set even when persisting fails.
        if let Err(e) = tokens.write(token) {
            warn!(error = %e, "session will not survive a restart");
        }
    }
}
