use tracing::{debug, warn};

use crate::api::{ProjectService, TaskService};
use crate::error::ApiError;
use crate::project::{Project, ProjectId};
use crate::router::Route;
use crate::task::{Task, TaskId};
use crate::user::User;
use crate::views::{step_index, Confirmation, Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    All,
    /// The server's top-priority tasks across all of the user's projects.
    Top5,
}

#[derive(Debug)]
pub struct TaskList {
    user: User,
    project_id: ProjectId,
    pub project: Option<Project>,
    pub tasks: Vec<Task>,
    pub mode: FilterMode,
    pub loading: bool,
    pub filter_loading: bool,
    pub notice: Notice,
    pub confirm: Confirmation<TaskId>,
    pub selected: usize,
}

fn normalized(tasks: Vec<Task>) -> Vec<Task> {
    tasks.into_iter().map(Task::with_default_priority).collect()
}

impl TaskList {
    pub fn new(user: User, project_id: ProjectId) -> Self {
        Self {
            user,
            project_id,
            project: None,
            tasks: Vec::new(),
            mode: FilterMode::All,
            loading: true,
            filter_loading: false,
            notice: Notice::default(),
            confirm: Confirmation::default(),
            selected: 0,
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Fetches the project (by scanning the user's projects) and all of
    /// its tasks. Always lands in `All` mode.
    pub async fn load<A>(&mut self, api: &A)
    where
        A: ProjectService + ?Sized,
    {
        self.loading = true;
        self.notice.dismiss();
        if let Err(err) = self.fetch_all(api).await {
            warn!(error = %err, project_id = self.project_id, "loading tasks failed");
            self.notice.error("Failed to load tasks. Please try again.");
        }
        self.loading = false;
    }

    async fn fetch_all<A>(&mut self, api: &A) -> Result<(), ApiError>
    where
        A: ProjectService + ?Sized,
    {
        let projects = api.list_projects(self.user.id).await?;
        self.project = projects.into_iter().find(|p| p.id == self.project_id);
        let tasks = api.project_tasks(self.project_id, self.user.id).await?;
        debug!(count = tasks.len(), project_id = self.project_id, "tasks loaded");
        self.tasks = normalized(tasks);
        self.mode = FilterMode::All;
        self.selected = step_index(self.selected, self.tasks.len(), 0);
        Ok(())
    }

    /// Switches between the project's tasks and the top-priority subset.
    /// The two lists are never merged; each switch fetches again.
    pub async fn toggle_top<A>(&mut self, api: &A)
    where
        A: ProjectService + TaskService + ?Sized,
    {
        if self.mode == FilterMode::Top5 {
            self.load(api).await;
            return;
        }
        self.filter_loading = true;
        match api.top_priority(self.user.id).await {
            Ok(tasks) => {
                self.tasks = normalized(tasks);
                self.mode = FilterMode::Top5;
                self.selected = 0;
                self.notice.dismiss();
            }
            Err(err) => {
                warn!(error = %err, "loading top priority tasks failed");
                self.notice
                    .error("Failed to fetch top priority tasks. Please try again.");
            }
        }
        self.filter_loading = false;
    }

    pub async fn show_all<A>(&mut self, api: &A)
    where
        A: ProjectService + ?Sized,
    {
        self.load(api).await;
    }

    pub fn is_not_found(&self) -> bool {
        !self.loading && self.project.is_none()
    }

    pub fn count_label(&self) -> String {
        match self.mode {
            FilterMode::All => self.tasks.len().to_string(),
            FilterMode::Top5 => format!("{} of top priority", self.tasks.len()),
        }
    }

    pub fn empty_hint(&self) -> &'static str {
        match self.mode {
            FilterMode::All => "No tasks found in this project. Add your first task!",
            FilterMode::Top5 => "No tasks found in this project. Try showing all tasks.",
        }
    }

    pub fn select(&mut self, direction: isize) {
        self.selected = step_index(self.selected, self.tasks.len(), direction);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn open_selected(&self) -> Option<Route> {
        self.selected_task()
            .map(|t| Route::task_from(t.id, Route::ProjectTasks(self.project_id)))
    }

    pub fn add_task_route(&self) -> Route {
        Route::AddTask(Some(self.project_id))
    }

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id) {
            self.confirm.request(id);
        }
    }

    pub fn decline_delete(&mut self) {
        self.confirm.decline();
    }

    /// Deletes the confirmed task and reloads. The reload always shows the
    /// full project list, even when the top-priority filter was active.
    pub async fn confirm_delete<A>(&mut self, api: &A)
    where
        A: ProjectService + TaskService + ?Sized,
    {
        let Some(id) = self.confirm.accept() else {
            return;
        };
        match api.delete_task(id).await {
            Ok(()) => self.load(api).await,
            Err(err) => {
                warn!(error = %err, task_id = id, "deleting task failed");
                self.notice.error("Failed to delete task. Please try again.");
            }
        }
    }
}
