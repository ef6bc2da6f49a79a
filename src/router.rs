use std::fmt;

use crate::project::ProjectId;
use crate::task::TaskId;
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    ProjectTasks(ProjectId),
    AddTask(Option<ProjectId>),
    TaskDetail {
        id: TaskId,
        /// Where to go after the task is deleted, when the caller knows.
        from: Option<Box<Route>>,
    },
}

impl Route {
    pub fn task(id: TaskId) -> Self {
        Route::TaskDetail { id, from: None }
    }

    pub fn task_from(id: TaskId, from: Route) -> Self {
        Route::TaskDetail {
            id,
            from: Some(Box::new(from)),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }

    /// Where "back" leads; `None` means leave the app.
    pub fn parent(&self) -> Option<Route> {
        match self {
            Route::Login | Route::Dashboard => None,
            Route::Register => Some(Route::Login),
            Route::ProjectTasks(_) | Route::AddTask(None) => Some(Route::Dashboard),
            Route::AddTask(Some(id)) => Some(Route::ProjectTasks(*id)),
            Route::TaskDetail { from, .. } => Some(
                from.as_deref()
                    .cloned()
                    .unwrap_or(Route::Dashboard),
            ),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::ProjectTasks(id) => format!("/projects/{id}/tasks"),
            Route::AddTask(Some(id)) => format!("/tasks/add?projectId={id}"),
            Route::AddTask(None) => "/tasks/add".to_string(),
            Route::TaskDetail { id, .. } => format!("/tasks/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Protected routes need a session; without one they land on Login.
pub fn guard(route: Route, user: Option<&User>) -> Route {
    if route.is_protected() && user.is_none() {
        tracing::debug!(requested = %route, "no session, redirecting to login");
        Route::Login
    } else {
        route
    }
}

/// The entry route: Dashboard when logged in, Login otherwise.
pub fn landing(user: Option<&User>) -> Route {
    guard(Route::Dashboard, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::user;

    #[test]
    fn protected_routes_need_a_user() {
        assert_eq!(guard(Route::ProjectTasks(3), None), Route::Login);
        assert_eq!(guard(Route::task(4), None), Route::Login);
        assert_eq!(guard(Route::Register, None), Route::Register);

        let ada = user(1, "Ada");
        assert_eq!(guard(Route::ProjectTasks(3), Some(&ada)), Route::ProjectTasks(3));
    }

    #[test]
    fn landing_depends_on_session() {
        let ada = user(1, "Ada");
        assert_eq!(landing(None), Route::Login);
        assert_eq!(landing(Some(&ada)), Route::Dashboard);
    }

    #[test]
    fn parents() {
        assert_eq!(Route::Dashboard.parent(), None);
        assert_eq!(Route::Register.parent(), Some(Route::Login));
        assert_eq!(Route::AddTask(Some(2)).parent(), Some(Route::ProjectTasks(2)));
        assert_eq!(
            Route::task_from(5, Route::ProjectTasks(2)).parent(),
            Some(Route::ProjectTasks(2))
        );
        assert_eq!(Route::task(5).parent(), Some(Route::Dashboard));
    }

    #[test]
    fn paths() {
        assert_eq!(Route::ProjectTasks(3).path(), "/projects/3/tasks");
        assert_eq!(Route::AddTask(Some(3)).path(), "/tasks/add?projectId=3");
        assert_eq!(Route::task_from(8, Route::Dashboard).path(), "/tasks/8");
    }
}
