use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{AuthService, ProjectService, TaskService};
use crate::error::ApiError;
use crate::project::{NewProject, Project, ProjectId};
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::user::{Credentials, SessionPayload, UserId};

/// HTTP client bound to one API base URL.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token sent with every later request.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, query: &[(&str, String)]) -> RequestBuilder {
        let mut req = self.http.request(method, self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        let token = self.token.read().ok().and_then(|t| t.clone());
        if let Some(value) = token.and_then(|t| HeaderValue::from_str(&format!("Bearer {t}")).ok())
        {
            req = req.header(AUTHORIZATION, value);
        }
        req
    }

    /// Sends the request and returns the body text of a 2xx response.
    async fn execute(&self, method: Method, path: &str, req: RequestBuilder) -> Result<String, ApiError> {
        debug!(%method, path, "api request");
        let resp = req.send().await.map_err(|err| {
            warn!(%method, path, error = %err, "api transport failure");
            ApiError::from(err)
        })?;
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));
        warn!(%method, path, status = status.as_u16(), ?message, "api error response");
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let req = self.request(Method::GET, path, query);
        let body = self.execute(Method::GET, path, req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Value, ApiError> {
        let req = self.request(method.clone(), path, query).json(body);
        let text = self.execute(method, path, req).await?;
        payload(&text)
    }

    async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, path, query);
        self.execute(Method::DELETE, path, req).await.map(drop)
    }
}

// Mutation endpoints answer with varied bodies, sometimes none at all.
fn payload(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

fn user_query(user_id: UserId) -> [(&'static str, String); 1] {
    [("userId", user_id.to_string())]
}

#[async_trait]
impl AuthService for ApiClient {
    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload, ApiError> {
        let value = self
            .send_json(Method::POST, "/auth/login", &[], credentials)
            .await?;
        Ok(SessionPayload::from_json(value)?)
    }

    fn use_token(&self, token: Option<&str>) {
        self.set_token(token.map(str::to_string));
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn register(&self, credentials: &Credentials) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/auth/register", &[], credentials)
            .await
    }
}

#[async_trait]
impl ProjectService for ApiClient {
    async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, ApiError> {
        self.get_json("/projects", &user_query(user_id)).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/projects", &[], project).await
    }

    async fn delete_project(&self, id: ProjectId, user_id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("/projects/{id}"), &user_query(user_id))
            .await
    }

    async fn project_tasks(&self, id: ProjectId, user_id: UserId) -> Result<Vec<Task>, ApiError> {
        self.get_json(&format!("/projects/{id}/tasks"), &user_query(user_id))
            .await
    }

    async fn add_task(
        &self,
        id: ProjectId,
        user_id: UserId,
        task: &TaskDraft,
    ) -> Result<Value, ApiError> {
        self.send_json(
            Method::POST,
            &format!("/projects/{id}/tasks"),
            &user_query(user_id),
            task,
        )
        .await
    }
}

#[async_trait]
impl TaskService for ApiClient {
    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        self.get_json(&format!("/tasks/{id}"), &[]).await
    }

    async fn update_task(&self, id: TaskId, task: &Task) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &format!("/tasks/{id}"), &[], task)
            .await
    }

    async fn patch_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Value, ApiError> {
        self.send_json(Method::PATCH, &format!("/tasks/{id}"), &[], patch)
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.delete(&format!("/tasks/{id}"), &[]).await
    }

    async fn top_priority(&self, user_id: UserId) -> Result<Vec<Task>, ApiError> {
        self.get_json("/tasks/top", &user_query(user_id)).await
    }
}
