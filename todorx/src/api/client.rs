use crate::api::requests::{AddTaskRequest, DeleteTaskRequest, LoginRequest, SignupRequest, Task};
use crate::api::responses::{AddTasksResponse, DeleteTaskResponse, LoginResponse, SignupResponse};
use crate::config::ClientConfig;
use crate::{ErrorDetail, SessionToken, TransportFailure};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Calls the to-do backend.
///
/// Every method resolves to either the decoded response or an
/// [`ErrorDetail`]: non-2xx responses become protocol failures carrying the
/// status and raw body, everything else becomes a transport failure.
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ErrorDetail> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ErrorDetail::transport(TransportFailure::Other, e.to_string()))?;
        Ok(Self::with_http(http, &config.base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ErrorDetail> {
        let builder = self.request(Method::GET, "/auth", None).query(request);
        Self::send(builder).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse, ErrorDetail> {
        let builder = self.request(Method::POST, "/signup", None).form(request);
        Self::send(builder).await
    }

    pub async fn add_task(
        &self,
        request: &AddTaskRequest,
        token: Option<&SessionToken>,
    ) -> Result<AddTasksResponse, ErrorDetail> {
        let builder = self.request(Method::POST, "/tasks", token).json(request);
        Self::send(builder).await
    }

    pub async fn edit_task(
        &self,
        task: &Task,
        token: Option<&SessionToken>,
    ) -> Result<Task, ErrorDetail> {
        let builder = self.request(Method::POST, "/tasks", token).json(task);
        Self::send(builder).await
    }

    pub async fn delete_task(
        &self,
        request: &DeleteTaskRequest,
        token: Option<&SessionToken>,
    ) -> Result<DeleteTaskResponse, ErrorDetail> {
        let builder = self.request(Method::DELETE, "/tasks", token).json(request);
        Self::send(builder).await
    }

    /// Tasks owned by `user_id`.
    pub async fn list_tasks(
        &self,
        user_id: &str,
        token: Option<&SessionToken>,
    ) -> Result<Vec<Task>, ErrorDetail> {
        let builder = self
            .request(Method::GET, "/tasks", token)
            .query(&[("id", user_id)]);
        Self::send(builder).await
    }

    fn request(&self, method: Method, path: &str, token: Option<&SessionToken>) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ErrorDetail> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response received");
        if !status.is_success() {
            // An unreadable error body still reports the status.
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorDetail::protocol(status.as_u16(), body));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
