use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

use super::{AuthService, ProjectService, TaskService};
use crate::error::ApiError;
use crate::project::{NewProject, Project, ProjectId};
use crate::task::{ProjectRef, Task, TaskDraft, TaskId, TaskPatch};
use crate::user::{Credentials, SessionPayload, User, UserId};

/// In-memory backend that records every call it receives.
#[derive(Default)]
pub struct FakeBackend {
    pub users: Mutex<Vec<User>>,
    pub projects: Mutex<Vec<Project>>,
    pub tasks: Mutex<Vec<Task>>,
    pub calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    next_id: Mutex<i64>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            ..Self::default()
        }
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }

    pub fn with_project(self, project: Project) -> Self {
        self.projects.lock().unwrap().push(project);
        self
    }

    pub fn with_task(self, task: Task) -> Self {
        self.tasks.lock().unwrap().push(task);
        self
    }

    /// Makes the named operation answer with a 500.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }

    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op.to_string());
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Http {
                status: 500,
                message: Some(format!("{op} exploded")),
            });
        }
        Ok(())
    }

    fn id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn not_found() -> ApiError {
        ApiError::Http {
            status: 404,
            message: None,
        }
    }
}

pub fn user(id: UserId, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn project(id: ProjectId, title: &str, user_id: UserId) -> Project {
    Project {
        id,
        title: title.to_string(),
        description: None,
        start_date: None,
        end_date: None,
        user_id: Some(user_id),
    }
}

pub fn task(id: TaskId, title: &str, project_id: ProjectId, priority: Option<i32>) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        status: Default::default(),
        due_date: None,
        priority,
        created_at: Some("2024-01-05T15:07:00".into()),
        updated_at: None,
        project: Some(ProjectRef {
            id: Some(project_id),
            title: None,
        }),
    }
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload, ApiError> {
        self.enter("login")?;
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|u| u.email == credentials.email && u.name == credentials.name)
            .map(|u| SessionPayload {
                token: Some(format!("token-{}", u.id)),
                user: u.clone(),
            })
            .ok_or(ApiError::Http {
                status: 401,
                message: Some("Invalid credentials".into()),
            })
    }

    async fn register(&self, credentials: &Credentials) -> Result<Value, ApiError> {
        self.enter("register")?;
        let id = self.id();
        self.users.lock().unwrap().push(User {
            id,
            name: credentials.name.clone(),
            email: credentials.email.clone(),
        });
        Ok(json!({ "message": "registered" }))
    }
}

#[async_trait]
impl ProjectService for FakeBackend {
    async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, ApiError> {
        self.enter("list_projects")?;
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn create_project(&self, project: &NewProject) -> Result<Value, ApiError> {
        self.enter("create_project")?;
        let id = self.id();
        self.projects.lock().unwrap().push(Project {
            id,
            title: project.title.clone(),
            description: Some(project.description.clone()),
            start_date: project.start_date.clone(),
            end_date: project.end_date.clone(),
            user_id: Some(project.user_id),
        });
        Ok(json!({ "id": id }))
    }

    async fn delete_project(&self, id: ProjectId, _user_id: UserId) -> Result<(), ApiError> {
        self.enter("delete_project")?;
        self.projects.lock().unwrap().retain(|p| p.id != id);
        self.tasks
            .lock()
            .unwrap()
            .retain(|t| t.project_id() != Some(id));
        Ok(())
    }

    async fn project_tasks(&self, id: ProjectId, _user_id: UserId) -> Result<Vec<Task>, ApiError> {
        self.enter("project_tasks")?;
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.project_id() == Some(id))
            .cloned()
            .collect())
    }

    async fn add_task(
        &self,
        id: ProjectId,
        _user_id: UserId,
        draft: &TaskDraft,
    ) -> Result<Value, ApiError> {
        self.enter("add_task")?;
        let task_id = self.id();
        self.tasks.lock().unwrap().push(Task {
            id: task_id,
            title: draft.title.clone(),
            description: Some(draft.description.clone()),
            status: draft.status,
            due_date: draft.due_date.clone(),
            priority: Some(draft.priority),
            created_at: None,
            updated_at: None,
            project: Some(ProjectRef {
                id: Some(id),
                title: None,
            }),
        });
        Ok(json!({ "id": task_id }))
    }
}

#[async_trait]
impl TaskService for FakeBackend {
    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        self.enter("get_task")?;
        self.task(id).ok_or_else(Self::not_found)
    }

    async fn update_task(&self, id: TaskId, task: &Task) -> Result<Value, ApiError> {
        self.enter("update_task")?;
        let mut tasks = self.tasks.lock().unwrap();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(Self::not_found)?;
        *slot = task.clone();
        Ok(json!({ "message": "updated" }))
    }

    async fn patch_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Value, ApiError> {
        self.enter("patch_task")?;
        let mut tasks = self.tasks.lock().unwrap();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(Self::not_found)?;
        if let Some(status) = patch.status {
            slot.status = status;
        }
        if let Some(priority) = patch.priority {
            slot.priority = Some(priority);
        }
        Ok(json!({ "message": "patched" }))
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.enter("delete_task")?;
        self.tasks.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn top_priority(&self, _user_id: UserId) -> Result<Vec<Task>, ApiError> {
        self.enter("top_priority")?;
        let mut tasks = self.tasks.lock().unwrap().clone();
        tasks.sort_by_key(|t| std::cmp::Reverse(t.priority.unwrap_or(0)));
        tasks.truncate(5);
        Ok(tasks)
    }
}
