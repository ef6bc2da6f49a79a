use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownStatus;
use crate::helpers::{normalize_priority, DEFAULT_PRIORITY};
use crate::project::ProjectId;

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// The status toggle-complete flips to.
    pub fn toggled(self) -> TaskStatus {
        match self {
            TaskStatus::Completed => TaskStatus::Pending,
            _ => TaskStatus::Completed,
        }
    }

    /// Cycles through the three statuses, wrapping at either end.
    pub fn step(self, direction: isize) -> TaskStatus {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(idx + direction).rem_euclid(len) as usize]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// null and missing both mean "pending"
fn status_or_pending<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TaskStatus, D::Error> {
    Ok(Option::<TaskStatus>::deserialize(deserializer)?.unwrap_or_default())
}

/// Owning project as embedded by the API (`projectDTO`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: Option<ProjectId>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, rename = "projectDTO")]
    pub project: Option<ProjectRef>,
}

impl Task {
    /// Fills in the default priority for tasks stored without one.
    pub fn with_default_priority(mut self) -> Self {
        self.priority = Some(normalize_priority(self.priority));
        self
    }

    pub fn effective_priority(&self) -> i32 {
        normalize_priority(self.priority)
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project.as_ref().and_then(|p| p.id)
    }

    pub fn project_title(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.title.as_deref())
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Body of `POST /projects/{id}/tasks`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<String>,
    pub priority: i32,
    pub project_id: ProjectId,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Pending,
            due_date: None,
            priority: DEFAULT_PRIORITY,
            project_id,
        }
    }
}

/// Body of `PATCH /tasks/{id}`; unset fields are left out of the JSON.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_task_with_embedded_project() {
        let task: Task = serde_json::from_value(json!({
            "id": 7,
            "title": "Write report",
            "description": null,
            "status": "In-Progress",
            "dueDate": "2024-03-01",
            "priority": null,
            "createdAt": "2024-02-01T10:00:00",
            "updatedAt": "2024-02-02T11:30:00",
            "projectDTO": { "id": 3, "title": "Q1", "description": "", "startDate": null, "endDate": null }
        }))
        .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, None);
        assert_eq!(task.project_id(), Some(3));
        assert_eq!(task.project_title(), Some("Q1"));
        assert_eq!(task.with_default_priority().priority, Some(5));
    }

    #[test]
    fn missing_status_defaults_to_pending() {
        let task: Task = serde_json::from_value(json!({ "id": 1, "title": "t", "status": null })).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);

        let task: Task = serde_json::from_value(json!({ "id": 1, "title": "t" })).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let res: Result<Task, _> =
            serde_json::from_value(json!({ "id": 1, "title": "t", "status": "archived" }));
        assert!(res.is_err());
    }

    #[test]
    fn patch_only_serializes_set_fields() {
        let body = serde_json::to_value(TaskPatch::status(TaskStatus::Completed)).unwrap();
        assert_eq!(body, json!({ "status": "completed" }));
    }

    #[test]
    fn toggled_and_step() {
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.step(-1), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.step(1), TaskStatus::Pending);
    }
}
