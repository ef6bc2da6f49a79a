//! Services the views talk to. Each trait method is one REST call: no
//! retries, no caching, payloads handed back as the server sent them.

mod client;
#[cfg(test)]
pub mod fake;

pub use client::ApiClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::project::{NewProject, Project, ProjectId};
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::user::{Credentials, SessionPayload, UserId};

#[async_trait]
pub trait AuthService {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload, ApiError>;

    /// `POST /auth/register`
    async fn register(&self, credentials: &Credentials) -> Result<Value, ApiError>;

    /// Token to authenticate later calls with; `None` after logout.
    fn use_token(&self, _token: Option<&str>) {}
}

#[async_trait]
pub trait ProjectService {
    /// `GET /projects?userId=`
    async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, ApiError>;

    /// `POST /projects`
    async fn create_project(&self, project: &NewProject) -> Result<Value, ApiError>;

    /// `DELETE /projects/{id}?userId=`
    async fn delete_project(&self, id: ProjectId, user_id: UserId) -> Result<(), ApiError>;

    /// `GET /projects/{id}/tasks?userId=`
    async fn project_tasks(&self, id: ProjectId, user_id: UserId) -> Result<Vec<Task>, ApiError>;

    /// `POST /projects/{id}/tasks?userId=`
    async fn add_task(
        &self,
        id: ProjectId,
        user_id: UserId,
        task: &TaskDraft,
    ) -> Result<Value, ApiError>;
}

#[async_trait]
pub trait TaskService {
    /// `GET /tasks/{id}`
    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError>;

    /// `PUT /tasks/{id}` with the whole task.
    async fn update_task(&self, id: TaskId, task: &Task) -> Result<Value, ApiError>;

    /// `PATCH /tasks/{id}` with only the changed fields.
    async fn patch_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Value, ApiError>;

    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError>;

    /// `GET /tasks/top?userId=`: the server-ranked top-priority subset
    /// across all of the user's projects.
    async fn top_priority(&self, user_id: UserId) -> Result<Vec<Task>, ApiError>;
}
