use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::api::TaskService;
use crate::optimistic::{self, Applied};
use crate::router::Route;
use crate::task::{Task, TaskId, TaskPatch, TaskStatus};
use crate::views::forms::TaskForm;
use crate::views::{Confirmation, Notice};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailMode {
    Viewing,
    Editing(TaskForm),
}

/// One task: view it, edit it, complete it, delete it.
#[derive(Debug)]
pub struct TaskDetail {
    id: TaskId,
    from: Option<Route>,
    flash: Duration,
    pub task: Option<Task>,
    pub mode: DetailMode,
    pub loading: bool,
    pub saving: bool,
    pub deleting: bool,
    pub notice: Notice,
    pub confirm: Confirmation<TaskId>,
    /// Status before a flip the server has not confirmed yet.
    toggle: Option<Applied<TaskStatus>>,
}

impl TaskDetail {
    /// `from` is where a successful delete returns to; `flash` is how long
    /// the save confirmation stays up.
    pub fn new(id: TaskId, from: Option<Route>, flash: Duration) -> Self {
        Self {
            id,
            from,
            flash,
            task: None,
            mode: DetailMode::Viewing,
            loading: true,
            saving: false,
            deleting: false,
            notice: Notice::default(),
            confirm: Confirmation::default(),
            toggle: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, DetailMode::Editing(_))
    }

    pub fn is_not_found(&self) -> bool {
        !self.loading && self.task.is_none()
    }

    pub async fn load<A: TaskService + ?Sized>(&mut self, api: &A) {
        self.loading = true;
        self.notice.dismiss();
        match api.get_task(self.id).await {
            Ok(task) => self.task = Some(task.with_default_priority()),
            Err(err) => {
                warn!(error = %err, task_id = self.id, "loading task failed");
                self.notice
                    .error("Failed to load task. It may have been deleted or doesn't exist.");
            }
        }
        self.loading = false;
    }

    pub fn begin_edit(&mut self) {
        if let Some(task) = &self.task {
            self.mode = DetailMode::Editing(TaskForm::from_task(task));
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        match &mut self.mode {
            DetailMode::Editing(form) => Some(form),
            DetailMode::Viewing => None,
        }
    }

    /// Sends the edited task as a full update.
    pub async fn save<A: TaskService + ?Sized>(&mut self, api: &A) {
        let (DetailMode::Editing(form), Some(task)) = (&mut self.mode, &self.task) else {
            return;
        };
        let updated = match form.apply_to(task) {
            Ok(updated) => updated,
            Err(err) => {
                form.error = Some(err.0);
                return;
            }
        };
        form.error = None;
        self.saving = true;
        self.notice.dismiss();
        match api.update_task(self.id, &updated).await {
            Ok(_) => {
                info!(task_id = self.id, "task updated");
                self.task = Some(updated);
                self.mode = DetailMode::Viewing;
                self.notice
                    .success_for("Task updated successfully!", self.flash, Instant::now());
            }
            Err(err) => {
                warn!(error = %err, task_id = self.id, "saving task failed");
                self.notice.error("Failed to save changes. Please try again.");
            }
        }
        self.saving = false;
    }

    /// Drops local edits and re-reads the task from the server.
    pub async fn cancel_edit<A: TaskService + ?Sized>(&mut self, api: &A) {
        self.mode = DetailMode::Viewing;
        self.notice.dismiss();
        match api.get_task(self.id).await {
            Ok(task) => self.task = Some(task.with_default_priority()),
            Err(err) => warn!(error = %err, task_id = self.id, "refetch after cancel failed"),
        }
    }

    /// Flips completed/pending locally so the next draw shows it. Returns
    /// false when there is nothing to flip or a flip is still unsent.
    pub fn begin_toggle(&mut self) -> bool {
        if self.toggle.is_some() {
            return false;
        }
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        self.toggle = Some(optimistic::apply(task, |t| {
            let previous = t.status;
            t.status = previous.toggled();
            previous
        }));
        true
    }

    /// Sends the flipped status. A failed call puts the old status back.
    pub async fn commit_toggle<A: TaskService + ?Sized>(&mut self, api: &A) {
        let id = self.id;
        let (Some(applied), Some(task)) = (self.toggle.take(), self.task.as_mut()) else {
            return;
        };
        let patch = TaskPatch::status(task.status);
        let result = applied
            .commit(task, api.patch_task(id, &patch), |t, previous| {
                t.status = previous
            })
            .await;
        if let Err(err) = result {
            warn!(error = %err, task_id = id, "status update failed, reverted");
            self.notice.error("Failed to update status. Please try again.");
        }
    }

    pub fn request_delete(&mut self) {
        if self.task.is_some() {
            self.confirm.request(self.id);
        }
    }

    pub fn decline_delete(&mut self) {
        self.confirm.decline();
    }

    /// Deletes after confirmation. Returns where to navigate on success.
    pub async fn confirm_delete<A: TaskService + ?Sized>(&mut self, api: &A) -> Option<Route> {
        let id = self.confirm.accept()?;
        self.deleting = true;
        match api.delete_task(id).await {
            Ok(()) => {
                info!(task_id = id, "task deleted");
                Some(self.after_delete())
            }
            Err(err) => {
                warn!(error = %err, task_id = id, "deleting task failed");
                self.notice.error("Failed to delete task. Please try again.");
                self.deleting = false;
                None
            }
        }
    }

    fn after_delete(&self) -> Route {
        self.from.clone().unwrap_or_else(|| self.back_route())
    }

    /// The owning project's list when known, else the dashboard.
    pub fn back_route(&self) -> Route {
        match self.task.as_ref().and_then(Task::project_id) {
            Some(project_id) => Route::ProjectTasks(project_id),
            None => Route::Dashboard,
        }
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.notice.tick(now)
    }
}
