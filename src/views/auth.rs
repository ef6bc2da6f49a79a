use crate::api::AuthService;
use crate::router::Route;
use crate::session::{AuthContext, AuthOutcome, SessionStore};
use crate::views::forms::{LoginForm, RegisterForm};

#[derive(Debug, Default)]
pub struct LoginView {
    pub form: LoginForm,
    pub loading: bool,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// On success, where to go next.
    pub async fn submit<A, S>(&mut self, ctx: &mut AuthContext<S>, api: &A) -> Option<Route>
    where
        A: AuthService + ?Sized,
        S: SessionStore,
    {
        let credentials = match self.form.validate() {
            Ok(c) => c,
            Err(err) => {
                self.form.error = Some(err.0);
                return None;
            }
        };
        self.loading = true;
        self.form.error = None;
        let outcome = ctx.login(api, &credentials).await;
        self.loading = false;
        match outcome {
            AuthOutcome::Success(_) => Some(Route::Dashboard),
            AuthOutcome::Failure(msg) => {
                self.form.error = Some(msg);
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RegisterView {
    pub form: RegisterForm,
    pub loading: bool,
}

impl RegisterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit<A, S>(&mut self, ctx: &mut AuthContext<S>, api: &A) -> Option<Route>
    where
        A: AuthService + ?Sized,
        S: SessionStore,
    {
        self.form.error = None;
        let credentials = match self.form.validate() {
            Ok(c) => c,
            Err(err) => {
                self.form.error = Some(err.0);
                return None;
            }
        };
        self.loading = true;
        let outcome = ctx.register(api, &credentials).await;
        self.loading = false;
        match outcome {
            AuthOutcome::Success(_) => Some(Route::Login),
            AuthOutcome::Failure(msg) => {
                self.form.error = Some(msg);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{user, FakeBackend};
    use crate::session::MemorySessionStore;

    #[tokio::test]
    async fn empty_login_never_calls_the_server() {
        let api = FakeBackend::new();
        let mut ctx = AuthContext::init(MemorySessionStore::new());
        let mut view = LoginView::new();

        assert_eq!(view.submit(&mut ctx, &api).await, None);
        assert_eq!(view.form.error.as_deref(), Some("Email and name are required"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn login_goes_to_dashboard() {
        let api = FakeBackend::new().with_user(user(1, "Ada"));
        let mut ctx = AuthContext::init(MemorySessionStore::new());
        let mut view = LoginView::new();
        view.form.name = "Ada".into();
        view.form.email = "ada@example.com".into();

        assert_eq!(view.submit(&mut ctx, &api).await, Some(Route::Dashboard));
        assert!(!view.loading);
        assert!(ctx.user().is_some());
    }

    #[tokio::test]
    async fn bad_login_shows_error() {
        let api = FakeBackend::new();
        let mut ctx = AuthContext::init(MemorySessionStore::new());
        let mut view = LoginView::new();
        view.form.name = "Eve".into();
        view.form.email = "eve@example.com".into();

        assert_eq!(view.submit(&mut ctx, &api).await, None);
        assert_eq!(view.form.error.as_deref(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn register_validates_email_then_goes_to_login() {
        let api = FakeBackend::new();
        let mut ctx = AuthContext::init(MemorySessionStore::new());
        let mut view = RegisterView::new();
        view.form.name = "Ada".into();
        view.form.email = "nope".into();

        assert_eq!(view.submit(&mut ctx, &api).await, None);
        assert_eq!(api.count("register"), 0);

        view.form.email = "ada@example.com".into();
        assert_eq!(view.submit(&mut ctx, &api).await, Some(Route::Login));
        assert_eq!(api.count("register"), 1);
    }
}
