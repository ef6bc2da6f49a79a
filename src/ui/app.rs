use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::api::{AuthService, ProjectService, TaskService};
use crate::router::{guard, landing, Route};
use crate::session::{AuthContext, SessionStore};
use crate::ui::scope::{scoped, Scoped};
use crate::views::{
    AddTask, Dashboard, Form, LoginView, RegisterView, TaskDetail, TaskList,
};

/// The screen on display. Exactly one view is alive at a time.
#[derive(Debug)]
pub enum Screen {
    Login(LoginView),
    Register(RegisterView),
    Dashboard(Dashboard),
    Tasks(TaskList),
    Detail(TaskDetail),
    AddTask(AddTask),
}

/// Work a key asks for. Synchronous edits happen in `App::key`; anything
/// that talks to the server comes back as an action so the frame can be
/// redrawn before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Go(Route),
    Back,
    Reload,
    Submit,
    ConfirmDelete,
    ToggleTop,
    ToggleComplete,
    CancelEdit,
    Logout,
    Quit,
}

impl Action {
    fn busy_label(&self) -> Option<&'static str> {
        match self {
            Action::Go(_) | Action::Back | Action::Reload => Some("Loading..."),
            Action::Submit => Some("Saving..."),
            Action::ConfirmDelete => Some("Deleting..."),
            Action::ToggleTop => Some("Loading..."),
            Action::ToggleComplete => Some("Updating..."),
            Action::CancelEdit => Some("Reloading..."),
            _ => None,
        }
    }
}

pub struct App<A, S> {
    api: A,
    ctx: AuthContext<S>,
    flash: Duration,
    route: Route,
    screen: Screen,
    busy: Option<&'static str>,
    quit: bool,
}

fn ctrl(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Shared editing keys for any focused form. Returns whether the key was
/// consumed.
fn edit_form(form: &mut dyn Form, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(1),
        KeyCode::BackTab | KeyCode::Up => form.next_field(-1),
        KeyCode::Left => form.step(-1),
        KeyCode::Right => form.step(1),
        KeyCode::Backspace => {
            form.backspace();
            form.clear_error();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.input(c);
            form.clear_error();
        }
        _ => return false,
    }
    true
}

impl<A, S> App<A, S>
where
    A: AuthService + ProjectService + TaskService + Sync,
    S: SessionStore,
{
    pub fn new(api: A, ctx: AuthContext<S>, flash: Duration) -> Self {
        api.use_token(ctx.token());
        Self {
            api,
            ctx,
            flash,
            route: Route::Login,
            screen: Screen::Login(LoginView::new()),
            busy: None,
            quit: false,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn ctx(&self) -> &AuthContext<S> {
        &self.ctx
    }

    pub fn busy(&self) -> Option<&'static str> {
        self.busy
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Opens the landing screen for whoever is (or isn't) logged in.
    pub async fn start(&mut self, events: &mut UnboundedReceiver<Event>) {
        let route = landing(self.ctx.user());
        self.go(route, events).await;
    }

    fn build(&self, route: &Route) -> Screen {
        let Some(user) = self.ctx.user().cloned() else {
            return match route {
                Route::Register => Screen::Register(RegisterView::new()),
                _ => Screen::Login(LoginView::new()),
            };
        };
        match route {
            Route::Login => Screen::Login(LoginView::new()),
            Route::Register => Screen::Register(RegisterView::new()),
            Route::Dashboard => Screen::Dashboard(Dashboard::new(user)),
            Route::ProjectTasks(id) => Screen::Tasks(TaskList::new(user, *id)),
            Route::AddTask(project_id) => Screen::AddTask(AddTask::new(user, *project_id)),
            Route::TaskDetail { id, from } => Screen::Detail(TaskDetail::new(
                *id,
                from.as_deref().cloned(),
                self.flash,
            )),
        }
    }

    /// Navigates: a fresh view, then its initial fetch. Backing out of a
    /// slow fetch walks up to the parent route instead.
    pub async fn go(&mut self, route: Route, events: &mut UnboundedReceiver<Event>) {
        let mut next = route;
        loop {
            let route = guard(next, self.ctx.user());
            debug!(route = %route, "navigate");
            self.screen = self.build(&route);
            self.route = route;
            self.busy = Some("Loading...");
            let mounted = self.mount(events).await;
            self.busy = None;
            if mounted == Scoped::Done(()) {
                return;
            }
            match self.route.parent() {
                Some(parent) => next = parent,
                None => {
                    self.settle();
                    return;
                }
            }
        }
    }

    async fn mount(&mut self, events: &mut UnboundedReceiver<Event>) -> Scoped<()> {
        let api = &self.api;
        match &mut self.screen {
            Screen::Dashboard(view) => scoped(view.load(api), events).await,
            Screen::Tasks(view) => scoped(view.load(api), events).await,
            Screen::Detail(view) => scoped(view.load(api), events).await,
            _ => Scoped::Done(()),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        let cleared = match &mut self.screen {
            Screen::Detail(v) => v.tick(now),
            Screen::Dashboard(v) => v.notice.tick(now),
            Screen::Tasks(v) => v.notice.tick(now),
            Screen::AddTask(v) => v.notice.tick(now),
            Screen::Login(_) | Screen::Register(_) => false,
        };
        if cleared {
            debug!("banner cleared");
        }
    }

    /// Applies a key press. Local edits happen here; server work is
    /// returned as an action.
    pub fn key(&mut self, key: KeyEvent) -> Option<Action> {
        if ctrl(&key, 'c') {
            return Some(Action::Quit);
        }
        match &mut self.screen {
            Screen::Login(view) => match key.code {
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Esc => Some(Action::Quit),
                _ if ctrl(&key, 'r') => Some(Action::Go(Route::Register)),
                _ => {
                    edit_form(&mut view.form, &key);
                    None
                }
            },
            Screen::Register(view) => match key.code {
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Esc => Some(Action::Go(Route::Login)),
                _ => {
                    edit_form(&mut view.form, &key);
                    None
                }
            },
            Screen::Dashboard(view) => {
                if let Some(form) = view.form.as_mut() {
                    return match key.code {
                        KeyCode::Enter => Some(Action::Submit),
                        KeyCode::Esc => {
                            view.toggle_form();
                            None
                        }
                        _ => {
                            edit_form(form, &key);
                            None
                        }
                    };
                }
                if view.confirm.pending().is_some() {
                    return confirm_keys(&key, || view.decline_delete());
                }
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => view.select(-1),
                    KeyCode::Down | KeyCode::Char('j') => view.select(1),
                    KeyCode::Enter => return view.open_selected().map(Action::Go),
                    KeyCode::Char('n') => view.toggle_form(),
                    KeyCode::Char('d') => view.request_delete(),
                    KeyCode::Char('x') => view.notice.dismiss(),
                    KeyCode::Char('r') => return Some(Action::Reload),
                    KeyCode::Char('L') => return Some(Action::Logout),
                    KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Quit),
                    _ => {}
                }
                None
            }
            Screen::Tasks(view) => {
                if view.confirm.pending().is_some() {
                    return confirm_keys(&key, || view.decline_delete());
                }
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => view.select(-1),
                    KeyCode::Down | KeyCode::Char('j') => view.select(1),
                    KeyCode::Enter => return view.open_selected().map(Action::Go),
                    KeyCode::Char('t') => return Some(Action::ToggleTop),
                    KeyCode::Char('a') => return Some(Action::Go(view.add_task_route())),
                    KeyCode::Char('d') => view.request_delete(),
                    KeyCode::Char('x') => view.notice.dismiss(),
                    KeyCode::Char('r') => return Some(Action::Reload),
                    KeyCode::Char('L') => return Some(Action::Logout),
                    KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Back),
                    _ => {}
                }
                None
            }
            Screen::Detail(view) => {
                if let Some(form) = view.form_mut() {
                    return match key.code {
                        KeyCode::Enter => Some(Action::Submit),
                        KeyCode::Esc => Some(Action::CancelEdit),
                        _ => {
                            edit_form(form, &key);
                            None
                        }
                    };
                }
                if view.confirm.pending().is_some() {
                    return confirm_keys(&key, || view.decline_delete());
                }
                match key.code {
                    KeyCode::Char('e') => view.begin_edit(),
                    KeyCode::Char('c') if view.begin_toggle() => {
                        return Some(Action::ToggleComplete)
                    }
                    KeyCode::Char('d') => view.request_delete(),
                    KeyCode::Char('p') => return Some(Action::Go(view.back_route())),
                    KeyCode::Char('x') => view.notice.dismiss(),
                    KeyCode::Char('r') => return Some(Action::Reload),
                    KeyCode::Char('L') => return Some(Action::Logout),
                    KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Back),
                    _ => {}
                }
                None
            }
            Screen::AddTask(view) => match key.code {
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Esc => Some(Action::Go(view.cancel())),
                _ => {
                    edit_form(&mut view.form, &key);
                    None
                }
            },
        }
    }

    /// Clears the in-flight flags a cancelled operation left behind.
    fn settle(&mut self) {
        match &mut self.screen {
            Screen::Login(v) => v.loading = false,
            Screen::Register(v) => v.loading = false,
            Screen::Dashboard(v) => v.loading = false,
            Screen::Tasks(v) => {
                v.loading = false;
                v.filter_loading = false;
            }
            Screen::Detail(v) => {
                v.loading = false;
                v.saving = false;
                v.deleting = false;
            }
            Screen::AddTask(v) => v.submitting = false,
        }
    }

    /// Shows the busy line for `action` before it starts.
    pub fn prepare(&mut self, action: &Action) {
        self.busy = action.busy_label();
    }

    /// Runs an action inside the current screen's scope.
    pub async fn perform(&mut self, action: Action, events: &mut UnboundedReceiver<Event>) {
        self.busy = action.busy_label();
        let next = self.run(action, events).await;
        self.busy = None;
        match next {
            Some(Action::Go(route)) => self.go(route, events).await,
            // Backing out of a root screen keeps it, minus its busy flags.
            Some(Action::Back) => match self.route.parent() {
                Some(parent) => self.go(parent, events).await,
                None => self.settle(),
            },
            Some(Action::Quit) => self.quit = true,
            _ => {}
        }
    }

    async fn run(&mut self, action: Action, events: &mut UnboundedReceiver<Event>) -> Option<Action> {
        let api = &self.api;
        match action {
            Action::Go(_) | Action::Back | Action::Quit => Some(action),
            Action::Logout => {
                self.ctx.logout();
                api.use_token(None);
                Some(Action::Go(Route::Login))
            }
            Action::Reload => {
                let done = match &mut self.screen {
                    Screen::Dashboard(v) => scoped(v.load(api), events).await,
                    Screen::Tasks(v) => scoped(v.show_all(api), events).await,
                    Screen::Detail(v) => scoped(v.load(api), events).await,
                    _ => Scoped::Done(()),
                };
                cancelled_to_back(done)
            }
            Action::Submit => match &mut self.screen {
                // Cancelling a login or registration keeps the form on screen.
                Screen::Login(v) => {
                    let outcome = scoped(v.submit(&mut self.ctx, api), events).await;
                    if let Scoped::Done(Some(_)) = &outcome {
                        api.use_token(self.ctx.token());
                    }
                    routed(outcome)
                }
                Screen::Register(v) => routed(scoped(v.submit(&mut self.ctx, api), events).await),
                Screen::Dashboard(v) => cancelled_to_back(scoped(v.submit_form(api), events).await),
                Screen::Detail(v) => cancelled_to_back(scoped(v.save(api), events).await),
                Screen::AddTask(v) => routed(scoped(v.submit(api), events).await),
                Screen::Tasks(_) => None,
            },
            Action::ConfirmDelete => match &mut self.screen {
                Screen::Dashboard(v) => cancelled_to_back(scoped(v.confirm_delete(api), events).await),
                Screen::Tasks(v) => cancelled_to_back(scoped(v.confirm_delete(api), events).await),
                Screen::Detail(v) => routed(scoped(v.confirm_delete(api), events).await),
                _ => None,
            },
            Action::ToggleTop => match &mut self.screen {
                Screen::Tasks(v) => cancelled_to_back(scoped(v.toggle_top(api), events).await),
                _ => None,
            },
            Action::ToggleComplete => match &mut self.screen {
                Screen::Detail(v) => cancelled_to_back(scoped(v.commit_toggle(api), events).await),
                _ => None,
            },
            Action::CancelEdit => match &mut self.screen {
                Screen::Detail(v) => cancelled_to_back(scoped(v.cancel_edit(api), events).await),
                _ => None,
            },
        }
    }
}

fn confirm_keys(key: &KeyEvent, decline: impl FnOnce()) -> Option<Action> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Some(Action::ConfirmDelete),
        KeyCode::Char('n') | KeyCode::Esc => {
            decline();
            None
        }
        _ => None,
    }
}

fn cancelled_to_back(outcome: Scoped<()>) -> Option<Action> {
    match outcome {
        Scoped::Done(()) => None,
        Scoped::Cancelled => Some(Action::Back),
    }
}

fn routed(outcome: Scoped<Option<Route>>) -> Option<Action> {
    match outcome {
        Scoped::Done(route) => route.map(Action::Go),
        Scoped::Cancelled => Some(Action::Back),
    }
}
