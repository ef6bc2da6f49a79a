use tracing::{debug, warn};

use crate::api::ProjectService;
use crate::project::{Project, ProjectId};
use crate::router::Route;
use crate::user::User;
use crate::views::forms::ProjectForm;
use crate::views::{step_index, Confirmation, Notice};

/// The user's projects, with create and delete.
#[derive(Debug)]
pub struct Dashboard {
    user: User,
    pub projects: Vec<Project>,
    pub loading: bool,
    pub notice: Notice,
    /// The create form, while it is open.
    pub form: Option<ProjectForm>,
    pub confirm: Confirmation<ProjectId>,
    pub selected: usize,
}

impl Dashboard {
    pub fn new(user: User) -> Self {
        Self {
            user,
            projects: Vec::new(),
            loading: false,
            notice: Notice::default(),
            form: None,
            confirm: Confirmation::default(),
            selected: 0,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub async fn load<A: ProjectService + ?Sized>(&mut self, api: &A) {
        self.loading = true;
        self.notice.dismiss();
        match api.list_projects(self.user.id).await {
            Ok(projects) => {
                debug!(count = projects.len(), "projects loaded");
                self.projects = projects;
                self.selected = step_index(self.selected, self.projects.len(), 0);
            }
            Err(err) => {
                warn!(error = %err, "loading projects failed");
                self.notice.error(err.user_message("Failed to load projects"));
            }
        }
        self.loading = false;
    }

    pub fn toggle_form(&mut self) {
        self.form = match self.form {
            Some(_) => None,
            None => Some(ProjectForm::new()),
        };
    }

    /// Creates the project in the open form, then reloads the list.
    pub async fn submit_form<A: ProjectService + ?Sized>(&mut self, api: &A) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let Some(project) = form.submit(self.user.id) else {
            return;
        };
        match api.create_project(&project).await {
            Ok(_) => {
                self.form = None;
                self.load(api).await;
            }
            Err(err) => {
                warn!(error = %err, "creating project failed");
                self.notice.error(err.user_message("Failed to create project"));
            }
        }
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.selected)
    }

    pub fn select(&mut self, direction: isize) {
        self.selected = step_index(self.selected, self.projects.len(), direction);
    }

    pub fn open_selected(&self) -> Option<Route> {
        self.selected_project().map(|p| Route::ProjectTasks(p.id))
    }

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_project().map(|p| p.id) {
            self.confirm.request(id);
        }
    }

    pub fn decline_delete(&mut self) {
        self.confirm.decline();
    }

    pub async fn confirm_delete<A: ProjectService + ?Sized>(&mut self, api: &A) {
        let Some(id) = self.confirm.accept() else {
            return;
        };
        match api.delete_project(id, self.user.id).await {
            Ok(()) => self.load(api).await,
            Err(err) => {
                warn!(error = %err, project_id = id, "deleting project failed");
                self.notice.error(err.user_message("Failed to delete project"));
            }
        }
    }
}
