use tracing::{info, warn};

use crate::api::ProjectService;
use crate::project::ProjectId;
use crate::router::Route;
use crate::user::User;
use crate::views::forms::TaskForm;
use crate::views::Notice;

#[derive(Debug)]
pub struct AddTask {
    user: User,
    pub form: TaskForm,
    pub notice: Notice,
    pub submitting: bool,
}

impl AddTask {
    pub fn new(user: User, project_id: Option<ProjectId>) -> Self {
        Self {
            user,
            form: TaskForm::new(project_id),
            notice: Notice::default(),
            submitting: false,
        }
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.form.project_id
    }

    /// Creates the task; on success, the project's task list is next.
    pub async fn submit<A: ProjectService + ?Sized>(&mut self, api: &A) -> Option<Route> {
        let draft = self.form.submit()?;
        self.submitting = true;
        let result = api.add_task(draft.project_id, self.user.id, &draft).await;
        self.submitting = false;
        match result {
            Ok(_) => {
                info!(project_id = draft.project_id, "task created");
                Some(Route::ProjectTasks(draft.project_id))
            }
            Err(err) => {
                warn!(error = %err, project_id = draft.project_id, "creating task failed");
                self.notice.error("Failed to add task. Please try again.");
                None
            }
        }
    }

    pub fn cancel(&self) -> Route {
        match self.project_id() {
            Some(id) => Route::ProjectTasks(id),
            None => Route::Dashboard,
        }
    }
}
