//! Screen state. Each view owns its data, loading flags and banner, and
//! exposes the operations its keys trigger. Nothing is shared between
//! views; navigating builds a fresh one that fetches again.

pub mod add_task;
pub mod auth;
pub mod dashboard;
pub mod forms;
pub mod task_detail;
pub mod task_list;

pub use add_task::AddTask;
pub use auth::{LoginView, RegisterView};
pub use dashboard::Dashboard;
pub use forms::{Form, LoginForm, ProjectForm, RegisterForm, TaskForm};
pub use task_detail::{DetailMode, TaskDetail};
pub use task_list::{FilterMode, TaskList};

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Error(String),
    Success(String),
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Error(t) | Banner::Success(t) => t,
        }
    }
}

/// A view's dismissible banner, with at most one pending auto-clear.
#[derive(Debug, Default)]
pub struct Notice {
    banner: Option<Banner>,
    clear_at: Option<Instant>,
}

impl Notice {
    pub fn error(&mut self, message: impl Into<String>) {
        self.banner = Some(Banner::Error(message.into()));
        self.clear_at = None;
    }

    /// Shows `message` until `now + delay`. Replaces any clear already
    /// scheduled.
    pub fn success_for(&mut self, message: impl Into<String>, delay: Duration, now: Instant) {
        self.banner = Some(Banner::Success(message.into()));
        // An unrepresentable deadline leaves the banner up until dismissed.
        self.clear_at = now.checked_add(delay);
    }

    pub fn dismiss(&mut self) {
        self.banner = None;
        self.clear_at = None;
    }

    /// Applies a due clear. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(at) if now >= at => {
                self.dismiss();
                true
            }
            _ => false,
        }
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn error_text(&self) -> Option<&str> {
        match &self.banner {
            Some(Banner::Error(t)) => Some(t),
            _ => None,
        }
    }

    pub fn is_clear_pending(&self) -> bool {
        self.clear_at.is_some()
    }
}

/// Destructive actions wait here until the user says yes or no.
#[derive(Debug)]
pub struct Confirmation<T> {
    pending: Option<T>,
}

impl<T> Default for Confirmation<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Confirmation<T> {
    pub fn request(&mut self, target: T) {
        self.pending = Some(target);
    }

    pub fn decline(&mut self) {
        self.pending = None;
    }

    pub fn accept(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }
}

/// Moves a list cursor one step, staying inside `0..len`.
pub fn step_index(current: usize, len: usize, direction: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + direction).clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_clears_after_delay() {
        let now = Instant::now();
        let mut notice = Notice::default();
        notice.success_for("Saved", Duration::from_secs(3), now);

        assert!(!notice.tick(now + Duration::from_secs(2)));
        assert_eq!(notice.banner().map(Banner::text), Some("Saved"));
        assert!(notice.tick(now + Duration::from_secs(3)));
        assert!(notice.banner().is_none());
    }

    #[test]
    fn new_success_replaces_pending_clear() {
        let now = Instant::now();
        let mut notice = Notice::default();
        notice.success_for("first", Duration::from_secs(3), now);
        notice.success_for("second", Duration::from_secs(3), now + Duration::from_secs(2));

        assert!(!notice.tick(now + Duration::from_secs(4)));
        assert_eq!(notice.banner().map(Banner::text), Some("second"));
        assert!(notice.tick(now + Duration::from_secs(5)));
    }

    #[test]
    fn endless_delay_does_not_overflow() {
        let now = Instant::now();
        let mut notice = Notice::default();
        notice.success_for("Saved", Duration::MAX, now);
        assert!(!notice.is_clear_pending());
        assert!(!notice.tick(now + Duration::from_secs(60)));
        assert_eq!(notice.banner().map(Banner::text), Some("Saved"));
    }

    #[test]
    fn errors_stay_until_dismissed() {
        let now = Instant::now();
        let mut notice = Notice::default();
        notice.success_for("Saved", Duration::from_secs(1), now);
        notice.error("Failed");

        assert!(!notice.is_clear_pending());
        assert!(!notice.tick(now + Duration::from_secs(60)));
        assert_eq!(notice.error_text(), Some("Failed"));
        notice.dismiss();
        assert!(notice.banner().is_none());
    }

    #[test]
    fn confirmation_flow() {
        let mut confirm = Confirmation::default();
        confirm.request(4);
        assert_eq!(confirm.pending(), Some(&4));
        confirm.decline();
        assert_eq!(confirm.accept(), None);
        confirm.request(5);
        assert_eq!(confirm.accept(), Some(5));
        assert_eq!(confirm.pending(), None);
    }

    #[test]
    fn step_index_clamps() {
        assert_eq!(step_index(0, 0, 1), 0);
        assert_eq!(step_index(0, 3, -1), 0);
        assert_eq!(step_index(2, 3, 1), 2);
        assert_eq!(step_index(1, 3, 1), 2);
    }
}
